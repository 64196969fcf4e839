use crossterm::event::KeyCode;

use crate::context::{Notifications, Session};

pub const BELL_LOGGED_OUT_MESSAGE: &str = "Please log in first.";
pub const BELL_LOGGED_IN_MESSAGE: &str = "You're all caught up.";

/// Entry in the bottom dock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DockItem {
    Posts,
    Bell,
    Add,
    Settings,
    Authentication,
}

impl DockItem {
    pub fn label(&self) -> &'static str {
        match self {
            DockItem::Posts => "Posts",
            DockItem::Bell => "Bell",
            DockItem::Add => "Add",
            DockItem::Settings => "Settings",
            DockItem::Authentication => "Log in",
        }
    }

    pub fn hotkey(&self) -> KeyCode {
        match self {
            DockItem::Posts => KeyCode::F(1),
            DockItem::Authentication | DockItem::Settings => KeyCode::F(2),
            DockItem::Add => KeyCode::F(3),
            DockItem::Bell => KeyCode::F(4),
        }
    }

    /// Window path opened by this item; the bell opens nothing
    pub fn path(&self) -> Option<&'static str> {
        match self {
            DockItem::Posts => Some("/posts"),
            DockItem::Add => Some("/post/create"),
            DockItem::Settings => Some("/settings"),
            DockItem::Authentication => Some("/authentication"),
            DockItem::Bell => None,
        }
    }
}

/// Dock entries for the current session, left to right
pub fn dock_items(session: &Session) -> Vec<DockItem> {
    let mut items = vec![DockItem::Posts, DockItem::Bell];
    if session.is_logged_in() {
        items.push(DockItem::Add);
        items.push(DockItem::Settings);
    } else {
        items.push(DockItem::Authentication);
    }
    items
}

/// Item bound to a hotkey in the current session
pub fn item_for_key(session: &Session, code: KeyCode) -> Option<DockItem> {
    dock_items(session).into_iter().find(|item| item.hotkey() == code)
}

pub fn ring_bell(session: &Session, notifications: &mut Notifications) {
    if session.is_logged_in() {
        notifications.info(BELL_LOGGED_IN_MESSAGE, None);
    } else {
        notifications.info(BELL_LOGGED_OUT_MESSAGE, Some("/authentication"));
    }
}
