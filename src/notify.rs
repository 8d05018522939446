use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Keep at most this many notifications around, dismissed or not.
const MAX_NOTIFICATIONS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::Success => "success",
            NotificationKind::Error => "error",
            NotificationKind::Warning => "warning",
            NotificationKind::Info => "info",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            NotificationKind::Success => "fa-check-circle",
            NotificationKind::Error => "fa-exclamation-triangle",
            NotificationKind::Warning => "fa-exclamation-circle",
            NotificationKind::Info => "fa-info-circle",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

struct Inner {
    ttl: chrono::Duration,
    queue: VecDeque<Notification>,
}

/// Transient user-facing messages with auto-dismiss.
///
/// Cheap to clone; every clone feeds the same queue.
#[derive(Clone)]
pub struct Notifier {
    inner: Arc<Mutex<Inner>>,
}

impl Notifier {
    pub fn new(ttl: Duration) -> Self {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::seconds(5));
        Self {
            inner: Arc::new(Mutex::new(Inner {
                ttl,
                queue: VecDeque::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panic while holding the lock leaves the queue itself intact.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn show(&self, kind: NotificationKind, message: impl Into<String>) -> Uuid {
        self.show_at(kind, message, Utc::now())
    }

    pub fn show_at(
        &self,
        kind: NotificationKind,
        message: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Uuid {
        let message = message.into();
        log::info!("[{kind}] {message}");

        let mut inner = self.lock();
        let notification = Notification {
            id: Uuid::new_v4(),
            kind,
            message,
            created_at: now,
            expires_at: now
                .checked_add_signed(inner.ttl)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        };
        let id = notification.id;
        inner.queue.push_back(notification);
        if inner.queue.len() > MAX_NOTIFICATIONS {
            inner.queue.pop_front();
        }
        id
    }

    pub fn success(&self, message: impl Into<String>) -> Uuid {
        self.show(NotificationKind::Success, message)
    }

    pub fn error(&self, message: impl Into<String>) -> Uuid {
        self.show(NotificationKind::Error, message)
    }

    pub fn warning(&self, message: impl Into<String>) -> Uuid {
        self.show(NotificationKind::Warning, message)
    }

    pub fn info(&self, message: impl Into<String>) -> Uuid {
        self.show(NotificationKind::Info, message)
    }

    pub fn dismiss(&self, id: Uuid) -> bool {
        let mut inner = self.lock();
        let before = inner.queue.len();
        inner.queue.retain(|notification| notification.id != id);
        inner.queue.len() != before
    }

    /// Drops expired notifications and returns the ones still visible.
    pub fn active_at(&self, now: DateTime<Utc>) -> Vec<Notification> {
        let mut inner = self.lock();
        inner.queue.retain(|notification| notification.expires_at > now);
        inner.queue.iter().cloned().collect()
    }

    pub fn active(&self) -> Vec<Notification> {
        self.active_at(Utc::now())
    }

    /// Most recent notification, expired or not.
    pub fn latest(&self) -> Option<Notification> {
        self.lock().queue.back().cloned()
    }

    pub fn messages(&self) -> Vec<String> {
        self.lock()
            .queue
            .iter()
            .map(|notification| notification.message.clone())
            .collect()
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notifications_expire_after_ttl() {
        let notifier = Notifier::new(Duration::from_secs(5));
        let t0 = Utc::now();
        notifier.show_at(NotificationKind::Info, "first", t0);
        notifier.show_at(
            NotificationKind::Error,
            "second",
            t0 + chrono::Duration::seconds(3),
        );

        assert_eq!(notifier.active_at(t0 + chrono::Duration::seconds(4)).len(), 2);
        let remaining = notifier.active_at(t0 + chrono::Duration::seconds(6));
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].message, "second");
        assert!(notifier.active_at(t0 + chrono::Duration::seconds(9)).is_empty());
    }

    #[test]
    fn huge_ttl_never_expires() {
        let notifier = Notifier::new(Duration::from_secs(10_000_000_000_000));
        notifier.info("x");
        notifier.warning("y");
        assert_eq!(notifier.latest().unwrap().expires_at, DateTime::<Utc>::MAX_UTC);
        assert_eq!(notifier.active().len(), 2);
    }

    #[test]
    fn dismiss_removes_only_target() {
        let notifier = Notifier::default();
        let a = notifier.success("a");
        notifier.info("b");
        assert!(notifier.dismiss(a));
        assert!(!notifier.dismiss(a));
        assert_eq!(notifier.messages(), vec!["b"]);
    }

    #[test]
    fn clones_share_queue_and_cap_is_enforced() {
        let notifier = Notifier::default();
        let other = notifier.clone();
        for i in 0..(MAX_NOTIFICATIONS + 5) {
            other.warning(format!("n{i}"));
        }
        let messages = notifier.messages();
        assert_eq!(messages.len(), MAX_NOTIFICATIONS);
        assert_eq!(messages[0], "n5");
        assert_eq!(
            notifier.latest().map(|n| n.kind),
            Some(NotificationKind::Warning)
        );
    }
}
