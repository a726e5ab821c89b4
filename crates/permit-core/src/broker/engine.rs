//! Per-window permission broker.
//!
//! State lives behind a mutex, but host callbacks are never invoked while it
//! is held: the host may answer a prompt synchronously from inside
//! [`HostWindow::request_permissions`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::{debug, info, warn};

use crate::config::BrokerConfig;
use crate::host::{HostWindow, LifecycleListener, ListenerId, PermissionStatus, WindowId};
use crate::registry::BrokerRegistry;

use super::deferred::{DeferredAction, DeferredQueue};
use super::pending::{PendingResult, PendingSender};
use super::ticket::TicketGenerator;
use super::types::Ticket;

/// Anything that can turn permission names into a one-shot outcome.
pub trait PermissionRequester: Send + Sync {
    fn request(&self, permissions: &[&str]) -> PendingResult;
}

/// Lifecycle subscription held while the broker is bound to a window.
struct WindowBinding {
    window: Weak<dyn HostWindow>,
    window_id: WindowId,
    listener: ListenerId,
}

#[derive(Default)]
struct BrokerState {
    pending: HashMap<Ticket, PendingSender>,
    deferred: DeferredQueue,
    /// Set between `on_attach` and `on_detach`.
    context: Option<Weak<dyn HostWindow>>,
    registered: bool,
    binding: Option<WindowBinding>,
    registry: Option<Weak<BrokerRegistry>>,
}

/// Permission broker for a single host window.
pub struct PermissionBroker {
    self_ref: Weak<Self>,
    platform_version: u32,
    config: BrokerConfig,
    tickets: Arc<TicketGenerator>,
    state: Mutex<BrokerState>,
}

impl PermissionBroker {
    pub(crate) fn new(
        platform_version: u32,
        config: BrokerConfig,
        tickets: Arc<TicketGenerator>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|self_ref| Self {
            self_ref: self_ref.clone(),
            platform_version,
            config,
            tickets,
            state: Mutex::new(BrokerState::default()),
        })
    }

    /// Ask for `permissions`, resolving to `true` only if all are granted.
    pub fn request(&self, permissions: &[&str]) -> PendingResult {
        if self.platform_version < self.config.runtime_permissions_min_version {
            debug!(
                platform_version = self.platform_version,
                "Platform grants permissions at install time"
            );
            return PendingResult::ready(true);
        }

        let permissions: Vec<String> = permissions.iter().map(|p| (*p).to_string()).collect();

        if let Some(context) = self.context() {
            if all_granted(context.as_ref(), &permissions) {
                debug!(window = %context.id(), ?permissions, "Permissions already granted");
                return PendingResult::ready(true);
            }
        }

        let (sender, result) = PendingResult::channel();
        let ticket = {
            let mut state = self.lock();
            let Some(ticket) = self.allocate_ticket(&state) else {
                drop(state);
                warn!(
                    outstanding = self.tickets.limit(),
                    ?permissions,
                    "Ticket space exhausted, request denied without prompting"
                );
                return PendingResult::ready(false);
            };
            state.pending.insert(ticket, sender);
            ticket
        };
        debug!(%ticket, ?permissions, "Permission request pending");

        let broker = self.self_ref.clone();
        self.require_context(Box::new(move |context: &Arc<dyn HostWindow>| {
            if let Some(broker) = broker.upgrade() {
                broker.check_and_prompt(context, ticket, &permissions);
            }
        }));

        result
    }

    /// Complete the request for `ticket` with the host's decisions.
    ///
    /// `granted` is the AND over `grant_results`; fewer results than
    /// permissions counts as a denial. Unknown or already answered tickets
    /// are ignored. Returns whether a pending request was completed.
    pub fn deliver_result(
        &self,
        ticket: Ticket,
        permissions: &[&str],
        grant_results: &[PermissionStatus],
    ) -> bool {
        let sender = self.lock().pending.remove(&ticket);
        let Some(sender) = sender else {
            debug!(%ticket, "Ignoring result for unknown ticket");
            return false;
        };

        let granted = grant_results.len() >= permissions.len()
            && grant_results.iter().all(|s| s.is_granted());
        sender.fulfill(granted);

        info!(%ticket, ?permissions, granted, "Permission result delivered");
        true
    }

    /// The host container made `context` available to the broker.
    ///
    /// Runs every deferred action, newest first, then clears the queue.
    pub fn on_attach(&self, context: &Arc<dyn HostWindow>) {
        let actions = {
            let mut state = self.lock();
            state.context = Some(Arc::downgrade(context));
            state.deferred.drain_lifo()
        };
        debug!(window = %context.id(), deferred = actions.len(), "Broker attached");

        for action in actions {
            action(context);
        }
    }

    /// The host container withdrew the context; new work is deferred.
    pub fn on_detach(&self) {
        self.lock().context = None;
        debug!("Broker detached");
    }

    /// Bind to `window`'s lifecycle. Subscribes at most once until the
    /// window is destroyed. Returns whether a new subscription was made.
    pub(crate) fn bind_window(
        &self,
        window: &Arc<dyn HostWindow>,
        registry: Weak<BrokerRegistry>,
    ) -> bool {
        {
            let mut state = self.lock();
            state.registry = Some(registry);
            if state.registered {
                return false;
            }
            state.registered = true;
        }

        let listener: Weak<dyn LifecycleListener> = self.self_ref.clone();
        let listener = window.add_lifecycle_listener(listener);
        let window_id = window.id();
        self.lock().binding = Some(WindowBinding {
            window: Arc::downgrade(window),
            window_id,
            listener,
        });

        info!(window = %window_id, "Broker bound to window");
        true
    }

    /// Number of tickets awaiting an answer.
    pub fn pending_count(&self) -> usize {
        self.lock().pending.len()
    }

    /// Number of actions waiting for the host to attach.
    pub fn deferred_count(&self) -> usize {
        self.lock().deferred.len()
    }

    pub fn is_attached(&self) -> bool {
        self.context().is_some()
    }

    /// Window this broker currently observes.
    pub fn window_id(&self) -> Option<WindowId> {
        self.lock().binding.as_ref().map(|b| b.window_id)
    }

    fn check_and_prompt(&self, context: &Arc<dyn HostWindow>, ticket: Ticket, permissions: &[String]) {
        let undecided: Vec<String> = permissions
            .iter()
            .filter(|p| !context.check_permission(p).is_granted())
            .cloned()
            .collect();

        if undecided.is_empty() {
            let sender = self.lock().pending.remove(&ticket);
            if let Some(sender) = sender {
                sender.fulfill(true);
                debug!(%ticket, "Permissions granted while request was queued");
            }
            return;
        }

        info!(%ticket, window = %context.id(), permissions = ?undecided, "Prompting for permissions");
        context.request_permissions(ticket, &undecided);
    }

    fn require_context(&self, action: DeferredAction) {
        let mut state = self.lock();
        let context = state.context.as_ref().and_then(Weak::upgrade);
        match context {
            Some(context) => {
                drop(state);
                action(&context);
            }
            None => {
                state.deferred.push(action);
                debug!(deferred = state.deferred.len(), "Host unavailable, action deferred");
            }
        }
    }

    /// Next ticket not outstanding on this broker, or `None` once every
    /// ticket up to the limit is in use.
    fn allocate_ticket(&self, state: &BrokerState) -> Option<Ticket> {
        (0..self.tickets.limit())
            .map(|_| self.tickets.generate())
            .find(|ticket| !state.pending.contains_key(ticket))
    }

    fn context(&self) -> Option<Arc<dyn HostWindow>> {
        self.lock().context.as_ref().and_then(Weak::upgrade)
    }

    fn lock(&self) -> MutexGuard<'_, BrokerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PermissionRequester for PermissionBroker {
    fn request(&self, permissions: &[&str]) -> PendingResult {
        Self::request(self, permissions)
    }
}

impl LifecycleListener for PermissionBroker {
    fn on_window_destroyed(&self, window: WindowId) {
        let (binding, registry) = {
            let mut state = self.lock();
            if state.binding.as_ref().map(|b| b.window_id) != Some(window) {
                return;
            }
            state.registered = false;
            let binding = state.binding.take();
            let same_window = match (&state.context, &binding) {
                (Some(context), Some(binding)) => Weak::ptr_eq(context, &binding.window),
                _ => false,
            };
            if same_window {
                state.context = None;
            }
            (binding, state.registry.clone())
        };

        if let Some(binding) = binding {
            if let Some(host) = binding.window.upgrade() {
                host.remove_lifecycle_listener(binding.listener);
            }
        }
        if let Some(registry) = registry.and_then(|r| r.upgrade()) {
            registry.evict(window);
        }

        info!(%window, pending = self.pending_count(), "Broker unbound from destroyed window");
    }
}

fn all_granted(context: &dyn HostWindow, permissions: &[String]) -> bool {
    permissions
        .iter()
        .all(|p| context.check_permission(p).is_granted())
}
