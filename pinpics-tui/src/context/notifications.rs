use std::time::{Duration, Instant};

use pinpics_types::Status;

/// How long a notification stays on screen by default
pub const DEFAULT_TTL: Duration = Duration::from_secs(5);

/// Oldest entries are dropped past this many
pub const MAX_NOTIFICATIONS: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: u64,
    pub message: String,
    pub status: Status,
    /// Window path opened when the user follows the notification
    pub link_to: Option<String>,
    pub created_at: Instant,
    pub ttl: Duration,
}

impl Notification {
    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) >= self.ttl
    }
}

/// Queue of transient toasts, newest last
#[derive(Debug, Default)]
pub struct Notifications {
    items: Vec<Notification>,
    next_id: u64,
}

impl Notifications {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &mut self,
        status: Status,
        message: impl Into<String>,
        link_to: Option<&str>,
    ) -> u64 {
        self.push_with_ttl(status, message, link_to, DEFAULT_TTL)
    }

    pub fn push_with_ttl(
        &mut self,
        status: Status,
        message: impl Into<String>,
        link_to: Option<&str>,
        ttl: Duration,
    ) -> u64 {
        self.next_id += 1;
        let notification = Notification {
            id: self.next_id,
            message: message.into(),
            status,
            link_to: link_to.map(str::to_string),
            created_at: Instant::now(),
            ttl,
        };
        log::info!(
            target: "notifications",
            "[{}] {}",
            notification.status.as_str(),
            notification.message
        );
        self.items.push(notification);

        if self.items.len() > MAX_NOTIFICATIONS {
            let overflow = self.items.len() - MAX_NOTIFICATIONS;
            self.items.drain(..overflow);
        }
        self.next_id
    }

    pub fn success(&mut self, message: impl Into<String>) -> u64 {
        self.push(Status::Success, message, None)
    }

    pub fn info(&mut self, message: impl Into<String>, link_to: Option<&str>) -> u64 {
        self.push(Status::Info, message, link_to)
    }

    pub fn error(&mut self, message: impl Into<String>, link_to: Option<&str>) -> u64 {
        self.push(Status::Error, message, link_to)
    }

    pub fn dismiss(&mut self, id: u64) {
        self.items.retain(|n| n.id != id);
    }

    /// Drop everything whose TTL has run out; returns how many were removed
    pub fn expire(&mut self, now: Instant) -> usize {
        let before = self.items.len();
        self.items.retain(|n| !n.is_expired(now));
        before - self.items.len()
    }

    /// Newest notification that carries a link
    pub fn latest_link(&self) -> Option<(u64, &str)> {
        self.items
            .iter()
            .rev()
            .find_map(|n| n.link_to.as_deref().map(|link| (n.id, link)))
    }

    pub fn latest(&self) -> Option<&Notification> {
        self.items.last()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Notification> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
