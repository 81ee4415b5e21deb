//! Configuration for [`crate::EventLog`].

use std::time::Duration;

/// Configuration for an [`crate::EventLog`].
#[derive(Debug, Clone, Copy)]
pub struct EventLogConfig {
    /// Requested ring capacity. The log rounds this up to the next power of
    /// two; see [`crate::EventLog::capacity`] for the realized value.
    pub capacity_hint: usize,

    /// How long a blocked `next_block` call waits between checks of its
    /// cancellation token.
    ///
    /// A blocked reader is woken immediately by a matching commit; this
    /// interval is a safety net that bounds how long cancellation can take
    /// to notice, not the primary wakeup path.
    ///
    /// Default: 50ms.
    pub wait_poll_interval: Duration,
}

impl EventLogConfig {
    /// Creates a configuration requesting at least `capacity_hint` slots.
    #[must_use]
    pub fn new(capacity_hint: usize) -> Self {
        Self { capacity_hint, ..Self::default() }
    }

    /// Sets the cancellation poll interval.
    #[must_use]
    pub fn with_wait_poll_interval(mut self, interval: Duration) -> Self {
        self.wait_poll_interval = interval;
        self
    }

    /// A small buffer suited to tests and short-lived logs (128 slots).
    #[must_use]
    pub fn low_memory() -> Self {
        Self::new(128)
    }

    /// A larger buffer suited to a busy server with many slow subscribers
    /// (16K slots).
    #[must_use]
    pub fn high_throughput() -> Self {
        Self::new(16 * 1024)
    }
}

impl Default for EventLogConfig {
    fn default() -> Self {
        Self { capacity_hint: 512, wait_poll_interval: Duration::from_millis(50) }
    }
}
