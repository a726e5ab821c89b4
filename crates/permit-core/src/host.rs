//! Contract between the broker and the host window it serves.
//!
//! The host owns the UI thread, the permission database, the prompt UI and
//! the container the broker lives in. Everything here is implemented by the
//! embedding application; the broker only calls into it.

use std::fmt;
use std::sync::{Arc, Weak};

use crate::broker::{PermissionBroker, Ticket};

/// Identity of a host window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(pub u64);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window-{}", self.0)
    }
}

/// Handle returned by [`HostWindow::add_lifecycle_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Grant state of a single permission as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

impl PermissionStatus {
    /// Host code for a granted permission.
    pub const GRANTED_CODE: i32 = 0;
    /// Host code for a denied permission.
    pub const DENIED_CODE: i32 = -1;

    /// Decode a host decision code. Anything but [`Self::GRANTED_CODE`] is a denial.
    pub const fn from_code(code: i32) -> Self {
        if code == Self::GRANTED_CODE {
            Self::Granted
        } else {
            Self::Denied
        }
    }

    pub const fn code(self) -> i32 {
        match self {
            Self::Granted => Self::GRANTED_CODE,
            Self::Denied => Self::DENIED_CODE,
        }
    }

    pub const fn is_granted(self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// Observer of host window lifecycle events.
pub trait LifecycleListener: Send + Sync {
    /// Called when `window` is destroyed. Listeners may unsubscribe from
    /// inside this callback.
    fn on_window_destroyed(&self, window: WindowId);
}

/// A platform window that can check and prompt for permissions.
pub trait HostWindow: Send + Sync {
    fn id(&self) -> WindowId;

    /// Synchronous grant query for one permission.
    fn check_permission(&self, permission: &str) -> PermissionStatus;

    /// Show the platform prompt for `permissions`.
    ///
    /// The host must later report the decisions through
    /// [`PermissionBroker::deliver_result`] with the same `ticket`. It may do
    /// so from inside this call.
    fn request_permissions(&self, ticket: Ticket, permissions: &[String]);

    /// Broker previously installed into this window's container, if any.
    fn find_broker(&self) -> Option<Arc<PermissionBroker>>;

    /// Install a broker into this window's container. The container calls
    /// [`PermissionBroker::on_attach`] once the broker may use the window.
    fn install_broker(&self, broker: Arc<PermissionBroker>);

    fn add_lifecycle_listener(&self, listener: Weak<dyn LifecycleListener>) -> ListenerId;

    fn remove_lifecycle_listener(&self, id: ListenerId);
}
