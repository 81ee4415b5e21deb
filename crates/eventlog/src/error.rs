//! Error types for event log operations.

use thiserror::Error;

/// Errors returned by [`crate::EventLog::prepare`].
#[derive(Debug, Error)]
pub enum PublishError {
    /// `event.index` was non-positive or not greater than the log's current
    /// maximum index.
    #[error("event index {index} is not greater than the log's current max index {max_index}")]
    BadIndex {
        /// The rejected index.
        index: u64,
        /// The log's max index at the time of the call.
        max_index: u64,
    },

    /// A second `prepare` was called while an event was already staged.
    #[error("an event is already staged; call commit() or abort() first")]
    AlreadyStaged,

    /// The event body could not be encoded.
    #[error("failed to encode event body: {0}")]
    Encode(#[from] rmp_serde::encode::Error),
}

/// Errors returned by [`crate::EventLog::next`] / [`crate::EventLog::next_block`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ReadError {
    /// The reader's last-seen index has fallen behind the oldest event still
    /// in the buffer. The caller must re-seed from a snapshot.
    #[error("index truncated from stream, restart from new snapshot")]
    IndexTruncated,

    /// The blocking read's cancellation token fired before a matching event
    /// arrived.
    #[error("blocking read was cancelled")]
    Cancelled,
}

impl ReadError {
    /// Returns `true` if the caller should re-seed from a snapshot.
    #[must_use]
    pub fn is_truncated(self) -> bool {
        matches!(self, ReadError::IndexTruncated)
    }

    /// Returns `true` if the read was cancelled rather than falling behind.
    #[must_use]
    pub fn is_cancelled(self) -> bool {
        matches!(self, ReadError::Cancelled)
    }
}

/// Errors returned by [`crate::EventLog::from_snapshot`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RestoreError {
    /// `from_snapshot` was called with no snapshot to restore from.
    #[error("cannot restore from a nil snapshot")]
    NilSnapshot,
}
