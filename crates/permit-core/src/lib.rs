//! `Permit` Core Library
//!
//! Runtime permission requests as one-shot async results:
//! - Per-window permission broker with ticket correlation
//! - Deferred work queued until the host window attaches
//! - Registry tying brokers to host window lifecycle
//! - Configuration and tracing setup

pub mod broker;
pub mod config;
pub mod error;
pub mod host;
pub mod registry;
pub mod tracing_init;

pub use broker::{PendingResult, PermissionBroker, PermissionRequester, Ticket};
pub use config::Config;
pub use error::{Error, Result};
pub use host::{HostWindow, LifecycleListener, ListenerId, PermissionStatus, WindowId};
pub use registry::BrokerRegistry;
