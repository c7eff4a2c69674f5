use std::time::Duration;

use crate::LedgerIndex;

/// Snapshot of a ledger advancement loop, produced on demand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerAdvancementStatus {
    pub running: bool,
    pub interval: Duration,
    /// Successful advancements since the loop was started.
    pub advanced_count: u64,
    /// Last index reported by the node. Recorded as-is, never checked for monotonicity.
    pub last_ledger_index: LedgerIndex,
    /// Message of the most recent failed attempt, cleared by the next success.
    pub last_error: Option<String>,
}

impl LedgerAdvancementStatus {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            ..Default::default()
        }
    }

    pub fn record_success(&mut self, ledger_index: LedgerIndex) {
        self.advanced_count += 1;
        self.last_ledger_index = ledger_index;
        self.last_error = None;
    }

    pub fn record_failure(&mut self, error: impl ToString) {
        self.last_error = Some(error.to_string());
    }

    /// Clears counters ahead of a fresh start, keeping the configured interval.
    pub fn reset(&mut self) {
        *self = Self::new(self.interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_clears_error() {
        let mut status = LedgerAdvancementStatus::new(Duration::from_millis(100));
        status.record_failure("connection refused");
        assert_eq!(status.last_error.as_deref(), Some("connection refused"));

        status.record_success(7);
        assert_eq!(status.last_error, None);
        assert_eq!(status.advanced_count, 1);
        assert_eq!(status.last_ledger_index, 7);
    }

    #[test]
    fn test_failure_keeps_counters() {
        let mut status = LedgerAdvancementStatus::new(Duration::from_millis(100));
        status.record_success(3);
        status.record_failure("node busy");

        assert_eq!(status.advanced_count, 1);
        assert_eq!(status.last_ledger_index, 3);
    }

    #[test]
    fn test_ledger_index_recorded_as_reported() {
        let mut status = LedgerAdvancementStatus::new(Duration::from_millis(100));
        status.record_success(10);
        status.record_success(4);
        assert_eq!(status.last_ledger_index, 4);
        assert_eq!(status.advanced_count, 2);
    }

    #[test]
    fn test_reset_keeps_interval() {
        let mut status = LedgerAdvancementStatus::new(Duration::from_millis(500));
        status.running = true;
        status.record_success(12);
        status.reset();

        assert_eq!(status, LedgerAdvancementStatus::new(Duration::from_millis(500)));
    }
}
