//! Ticket allocation.

use std::sync::atomic::{AtomicU32, Ordering};

use super::types::Ticket;

/// Hands out tickets `1..=limit`, wrapping back to 1.
///
/// Shared by every broker created from the same registry so tickets are
/// unique across windows until the counter wraps.
#[derive(Debug)]
pub struct TicketGenerator {
    next: AtomicU32,
    limit: u32,
}

impl TicketGenerator {
    pub fn new(limit: u32) -> Self {
        Self {
            next: AtomicU32::new(1),
            limit: limit.max(1),
        }
    }

    pub fn generate(&self) -> Ticket {
        let limit = self.limit;
        let current = self
            .next
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                Some(if n >= limit { 1 } else { n + 1 })
            })
            .unwrap_or_else(|n| n);
        Ticket(current)
    }

    pub const fn limit(&self) -> u32 {
        self.limit
    }
}
