//! Suppression of repeated error notifications
//!
//! A failing endpoint produces the same error every cycle. Only the first
//! occurrence of a message in a streak reaches the chat; later repeats are
//! logged and dropped until a different message breaks the streak.

use tracing::debug;

/// Remembers the last error message delivered to the chat
#[derive(Debug, Default, Clone)]
pub struct ErrorDeduplicator {
    last_notified: Option<String>,
    suppressed: u64,
}

impl ErrorDeduplicator {
    /// Creates an empty deduplicator
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_notified: None,
            suppressed: 0,
        }
    }

    /// Returns `true` if `message` differs from the last delivered one
    ///
    /// Repeats are counted and logged at debug level.
    pub fn should_notify(&mut self, message: &str) -> bool {
        if self.last_notified.as_deref() != Some(message) {
            return true;
        }

        self.suppressed += 1;
        debug!(
            suppressed = self.suppressed,
            "Repeated error, notification suppressed"
        );
        false
    }

    /// Records that `message` was delivered, starting a new streak
    pub fn mark_notified(&mut self, message: &str) {
        self.last_notified = Some(message.to_string());
    }

    /// Last error message delivered to the chat
    #[must_use]
    pub fn last_notified(&self) -> Option<&str> {
        self.last_notified.as_deref()
    }

    /// Total number of suppressed repeats
    #[must_use]
    pub const fn suppressed_count(&self) -> u64 {
        self.suppressed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_error_notifies() {
        let mut dedup = ErrorDeduplicator::new();
        assert!(dedup.should_notify("E1"));
    }

    #[test]
    fn test_repeat_is_suppressed() {
        let mut dedup = ErrorDeduplicator::new();
        dedup.mark_notified("E1");

        assert!(!dedup.should_notify("E1"));
        assert!(!dedup.should_notify("E1"));
        assert_eq!(dedup.suppressed_count(), 2);
    }

    #[test]
    fn test_sequence_counts_streaks() {
        let mut dedup = ErrorDeduplicator::new();
        let mut sent = 0;
        for message in ["E1", "E1", "E2", "E1"] {
            if dedup.should_notify(message) {
                dedup.mark_notified(message);
                sent += 1;
            }
        }

        assert_eq!(sent, 3);
        assert_eq!(dedup.last_notified(), Some("E1"));
    }

    #[test]
    fn test_undelivered_message_is_retried() {
        let mut dedup = ErrorDeduplicator::new();

        // Delivery failed, so nothing is marked
        assert!(dedup.should_notify("E1"));
        assert!(dedup.should_notify("E1"));
    }
}
