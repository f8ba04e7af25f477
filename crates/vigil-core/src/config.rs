use std::time::Duration;

/// Default seconds between screen checks.
pub const DEFAULT_CHECK_INTERVAL_SECS: u64 = 40;

/// Default penalty duration in seconds.
pub const DEFAULT_PENALTY_SECS: u64 = 30;

/// Runtime settings for the monitoring coordinator.
#[derive(Debug, Clone, Copy)]
pub struct GuardConfig {
    pub check_interval: Duration,
    pub penalty_duration: Duration,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_secs(DEFAULT_CHECK_INTERVAL_SECS),
            penalty_duration: Duration::from_secs(DEFAULT_PENALTY_SECS),
        }
    }
}

impl GuardConfig {
    #[must_use]
    pub const fn new(check_interval_secs: u64, penalty_secs: u64) -> Self {
        Self {
            check_interval: Duration::from_secs(check_interval_secs),
            penalty_duration: Duration::from_secs(penalty_secs),
        }
    }
}
