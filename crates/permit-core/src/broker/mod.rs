//! Permission broker: one per host window.
//!
//! Turns "ask the user for these permissions" into a single [`PendingResult`]
//! and correlates each outstanding prompt with its answer by [`Ticket`].

mod deferred;
mod engine;
mod pending;
mod ticket;
mod types;

pub use engine::{PermissionBroker, PermissionRequester};
pub use pending::PendingResult;
pub use ticket::TicketGenerator;
pub use types::Ticket;
