//! State shared by every window: the session, toasts, modals and the window stack
mod modals;
mod notifications;
mod session;

pub use modals::{Modal, Modals};
pub use notifications::{Notification, Notifications, DEFAULT_TTL, MAX_NOTIFICATIONS};
pub use session::Session;

use crate::windows::WindowManager;

/// Handed to views instead of a tangle of globals
#[derive(Debug, Default)]
pub struct AppContext {
    pub session: Session,
    pub notifications: Notifications,
    pub modals: Modals,
    pub windows: WindowManager,
}

impl AppContext {
    pub fn new() -> Self {
        Self::default()
    }
}
