//! Process-wide map from host window to its permission broker.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::{info, warn};

use crate::broker::{PendingResult, PermissionBroker, TicketGenerator};
use crate::config::{BrokerConfig, Config};
use crate::host::{HostWindow, WindowId};

/// Finds or creates the broker for a window and forgets it when the window
/// is destroyed.
///
/// Owned by the application and passed where needed; brokers only hold a
/// weak reference back to it.
pub struct BrokerRegistry {
    self_ref: Weak<Self>,
    platform_version: u32,
    config: BrokerConfig,
    tickets: Arc<TicketGenerator>,
    brokers: Mutex<HashMap<WindowId, Arc<PermissionBroker>>>,
}

impl BrokerRegistry {
    /// Create a registry for a platform running `platform_version`.
    pub fn new(platform_version: u32, config: BrokerConfig) -> Arc<Self> {
        let tickets = Arc::new(TicketGenerator::new(config.ticket_limit));
        Arc::new_cyclic(|self_ref| Self {
            self_ref: self_ref.clone(),
            platform_version,
            config,
            tickets,
            brokers: Mutex::new(HashMap::new()),
        })
    }

    pub fn from_config(platform_version: u32, config: &Config) -> Arc<Self> {
        Self::new(platform_version, config.broker.clone())
    }

    /// Broker for `window`.
    ///
    /// Lookup order: this registry, then the window's container, then a new
    /// broker installed into the container. The broker subscribes to the
    /// window's destroy event only the first time.
    pub fn get(&self, window: &Arc<dyn HostWindow>) -> Arc<PermissionBroker> {
        let window_id = window.id();
        let known = self.lock().get(&window_id).cloned();

        let broker = match known.or_else(|| window.find_broker()) {
            Some(broker) => broker,
            None => {
                let broker = PermissionBroker::new(
                    self.platform_version,
                    self.config.clone(),
                    Arc::clone(&self.tickets),
                );
                window.install_broker(Arc::clone(&broker));
                info!(window = %window_id, "Installed permission broker");
                broker
            }
        };

        if broker.bind_window(window, self.self_ref.clone()) {
            self.lock().insert(window_id, Arc::clone(&broker));
        }
        broker
    }

    /// Ask `window`'s broker for `permissions`.
    pub fn request(&self, window: &Arc<dyn HostWindow>, permissions: &[&str]) -> PendingResult {
        self.get(window).request(permissions)
    }

    /// Drop the entry for a destroyed window.
    pub(crate) fn evict(&self, window: WindowId) -> Option<Arc<PermissionBroker>> {
        let broker = self.lock().remove(&window);
        if broker.is_some() {
            info!(%window, "Broker evicted from registry");
        } else {
            warn!(%window, "Tried to evict unknown window");
        }
        broker
    }

    pub fn contains(&self, window: WindowId) -> bool {
        self.lock().contains_key(&window)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<WindowId, Arc<PermissionBroker>>> {
        self.brokers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
