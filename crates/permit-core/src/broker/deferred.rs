//! Actions waiting for the host window to become available.

use std::sync::Arc;

use crate::host::HostWindow;

pub(crate) type DeferredAction = Box<dyn FnOnce(&Arc<dyn HostWindow>) + Send>;

/// Queue of actions drained newest-first when the host attaches.
#[derive(Default)]
pub(crate) struct DeferredQueue {
    actions: Vec<DeferredAction>,
}

impl DeferredQueue {
    pub(crate) fn push(&mut self, action: DeferredAction) {
        self.actions.push(action);
    }

    /// Empty the queue, returning actions in reverse order of enqueueing.
    pub(crate) fn drain_lifo(&mut self) -> Vec<DeferredAction> {
        let mut actions = std::mem::take(&mut self.actions);
        actions.reverse();
        actions
    }

    pub(crate) fn len(&self) -> usize {
        self.actions.len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::broker::{PermissionBroker, Ticket};
    use crate::host::{LifecycleListener, ListenerId, PermissionStatus, WindowId};

    struct NullWindow;

    impl HostWindow for NullWindow {
        fn id(&self) -> WindowId {
            WindowId(0)
        }
        fn check_permission(&self, _permission: &str) -> PermissionStatus {
            PermissionStatus::Denied
        }
        fn request_permissions(&self, _ticket: Ticket, _permissions: &[String]) {}
        fn find_broker(&self) -> Option<Arc<PermissionBroker>> {
            None
        }
        fn install_broker(&self, _broker: Arc<PermissionBroker>) {}
        fn add_lifecycle_listener(
            &self,
            _listener: std::sync::Weak<dyn LifecycleListener>,
        ) -> ListenerId {
            ListenerId(0)
        }
        fn remove_lifecycle_listener(&self, _id: ListenerId) {}
    }

    #[test]
    fn drains_newest_first_and_clears() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut queue = DeferredQueue::default();
        for i in 0..3 {
            let order = Arc::clone(&order);
            queue.push(Box::new(move |_: &Arc<dyn HostWindow>| {
                order.lock().unwrap_or_else(std::sync::PoisonError::into_inner).push(i);
            }));
        }
        assert_eq!(queue.len(), 3);

        let window: Arc<dyn HostWindow> = Arc::new(NullWindow);
        for action in queue.drain_lifo() {
            action(&window);
        }

        assert_eq!(queue.len(), 0);
        let order = order.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        assert_eq!(*order, vec![2, 1, 0]);
    }
}
