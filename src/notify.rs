use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::time::Instant;

use crate::config::DEFAULT_NOTIFICATION_MS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

/// Transient user-facing message.
#[derive(Debug, Clone)]
pub struct Notification {
    pub id: u64,
    pub kind: NotificationKind,
    pub message: String,
    /// `None` means sticky: the entry stays until explicitly removed.
    expires_at: Option<Instant>,
}

#[derive(Debug, Default)]
struct StoreInner {
    entries: Vec<Notification>,
    last_id: u64,
}

/// Shared list of transient messages, one per application session.
///
/// Explicitly constructed and cloneable so tests run against fresh instances
/// instead of a process-wide singleton. Entries expire lazily: `visible`
/// prunes anything past its deadline before returning, so no background task
/// is needed and paused-clock tests stay deterministic.
#[derive(Debug, Clone, Default)]
pub struct NotificationStore {
    inner: Arc<Mutex<StoreInner>>,
}

impl NotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a notification and returns its id.
    ///
    /// `duration` of `None` uses the 5s default; an explicit zero duration
    /// makes the entry sticky.
    pub fn push(&self, kind: NotificationKind, message: impl Into<String>, duration: Option<Duration>) -> u64 {
        let duration = duration.unwrap_or(Duration::from_millis(DEFAULT_NOTIFICATION_MS));
        let expires_at = if duration.is_zero() {
            None
        } else {
            Some(Instant::now() + duration)
        };

        let mut inner = self.inner.lock().unwrap();
        // Timestamp-derived, bumped past the previous id on collision.
        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        let id = now_ms.max(inner.last_id + 1);
        inner.last_id = id;

        inner.entries.push(Notification {
            id,
            kind,
            message: message.into(),
            expires_at,
        });
        id
    }

    pub fn success(&self, message: impl Into<String>) -> u64 {
        self.push(NotificationKind::Success, message, None)
    }

    pub fn error(&self, message: impl Into<String>) -> u64 {
        self.push(NotificationKind::Error, message, None)
    }

    pub fn warning(&self, message: impl Into<String>) -> u64 {
        self.push(NotificationKind::Warning, message, None)
    }

    pub fn info(&self, message: impl Into<String>) -> u64 {
        self.push(NotificationKind::Info, message, None)
    }

    pub fn remove(&self, id: u64) {
        let mut inner = self.inner.lock().unwrap();
        inner.entries.retain(|n| n.id != id);
    }

    /// Live entries in insertion order, expired ones pruned.
    pub fn visible(&self) -> Vec<Notification> {
        let now = Instant::now();
        let mut inner = self.inner.lock().unwrap();
        inner
            .entries
            .retain(|n| n.expires_at.map(|at| at > now).unwrap_or(true));
        inner.entries.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn auto_expires_after_duration() {
        let store = NotificationStore::new();
        store.push(NotificationKind::Info, "short lived", Some(Duration::from_millis(100)));

        assert_eq!(store.visible().len(), 1);

        tokio::time::advance(Duration::from_millis(150)).await;
        assert!(store.visible().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn zero_duration_is_sticky() {
        let store = NotificationStore::new();
        let id = store.push(NotificationKind::Error, "needs dismissal", Some(Duration::ZERO));

        tokio::time::advance(Duration::from_secs(60)).await;
        assert_eq!(store.visible().len(), 1);

        store.remove(id);
        assert!(store.visible().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn preserves_insertion_order() {
        let store = NotificationStore::new();
        store.info("first");
        store.success("second");
        store.warning("third");

        let messages: Vec<_> = store.visible().into_iter().map(|n| n.message).collect();
        assert_eq!(messages, vec!["first", "second", "third"]);
    }

    #[tokio::test(start_paused = true)]
    async fn ids_strictly_increase() {
        let store = NotificationStore::new();
        let a = store.info("a");
        let b = store.info("b");
        let c = store.info("c");
        assert!(a < b && b < c);
    }
}
