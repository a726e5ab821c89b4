//! One-shot permission outcome.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;
use tracing::debug;

/// Producer half, owned by the broker under a ticket.
#[derive(Debug)]
pub(crate) struct PendingSender {
    tx: oneshot::Sender<bool>,
}

impl PendingSender {
    /// Deliver the outcome. Consumes the sender, so a second fulfilment
    /// cannot happen.
    pub(crate) fn fulfill(self, granted: bool) {
        if self.tx.send(granted).is_err() {
            debug!(granted, "Permission result dropped by caller before delivery");
        }
    }
}

/// Resolves once with whether every requested permission was granted.
///
/// Resolves to `None` only if the broker holding the request is dropped
/// before answering it. Polling again after completion stays pending; use
/// [`PendingResult::is_terminated`] to tell the two apart.
#[derive(Debug)]
#[must_use = "a permission result does nothing unless awaited"]
pub struct PendingResult {
    state: ResultState,
}

#[derive(Debug)]
enum ResultState {
    Ready(bool),
    Waiting(oneshot::Receiver<bool>),
    Done,
}

impl PendingResult {
    /// An already-answered result.
    pub const fn ready(granted: bool) -> Self {
        Self {
            state: ResultState::Ready(granted),
        }
    }

    pub(crate) fn channel() -> (PendingSender, Self) {
        let (tx, rx) = oneshot::channel();
        (
            PendingSender { tx },
            Self {
                state: ResultState::Waiting(rx),
            },
        )
    }

    /// Whether the outcome was known when the request returned.
    pub const fn is_immediate(&self) -> bool {
        matches!(self.state, ResultState::Ready(_))
    }

    /// Whether the outcome has already been yielded.
    pub const fn is_terminated(&self) -> bool {
        matches!(self.state, ResultState::Done)
    }
}

impl Future for PendingResult {
    type Output = Option<bool>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let outcome = match &mut this.state {
            ResultState::Ready(granted) => Some(*granted),
            ResultState::Waiting(rx) => match Pin::new(rx).poll(cx) {
                Poll::Ready(received) => received.ok(),
                Poll::Pending => return Poll::Pending,
            },
            ResultState::Done => return Poll::Pending,
        };
        this.state = ResultState::Done;
        Poll::Ready(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ready_resolves_immediately() {
        let result = PendingResult::ready(true);
        assert!(result.is_immediate());
        assert_eq!(result.await, Some(true));
    }

    #[tokio::test]
    async fn channel_resolves_with_fulfilled_value() {
        let (sender, result) = PendingResult::channel();
        assert!(!result.is_immediate());
        sender.fulfill(false);
        assert_eq!(result.await, Some(false));
    }

    #[tokio::test]
    async fn dropped_sender_resolves_empty() {
        let (sender, result) = PendingResult::channel();
        drop(sender);
        assert_eq!(result.await, None);
    }

    #[test]
    fn yields_exactly_one_outcome() {
        let (sender, mut result) = PendingResult::channel();
        let mut cx = Context::from_waker(std::task::Waker::noop());

        assert_eq!(Pin::new(&mut result).poll(&mut cx), Poll::Pending);
        assert!(!result.is_terminated());

        sender.fulfill(true);
        assert_eq!(Pin::new(&mut result).poll(&mut cx), Poll::Ready(Some(true)));
        assert!(result.is_terminated());

        assert_eq!(Pin::new(&mut result).poll(&mut cx), Poll::Pending);
        assert_eq!(Pin::new(&mut result).poll(&mut cx), Poll::Pending);
    }

    #[test]
    fn fulfill_after_caller_dropped_is_harmless() {
        let (sender, result) = PendingResult::channel();
        drop(result);
        sender.fulfill(true);
    }
}
