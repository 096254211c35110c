use std::time::Duration;

pub const DEFAULT_SETTLE_MS: u64 = 500;
pub const DEFAULT_POLL_SECS: u64 = 10;
pub const DEFAULT_NOTIFICATION_MS: u64 = 5000;

/// Tuning knobs for the settings sync driver.
///
/// `poll_interval` bounds how stale the cached snapshot can get when writes
/// to other fields race each other: the periodic refetch is the reconciliation
/// mechanism, so it is an explicit parameter rather than a constant.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// How long a field must stay untouched before its pending edit is sent.
    pub settle_delay: Duration,
    /// Background refetch period for the settings snapshot.
    pub poll_interval: Duration,
    /// Auto-expiry for notifications raised by the driver.
    pub notification_duration: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(DEFAULT_SETTLE_MS),
            poll_interval: Duration::from_secs(DEFAULT_POLL_SECS),
            notification_duration: Duration::from_millis(DEFAULT_NOTIFICATION_MS),
        }
    }
}
