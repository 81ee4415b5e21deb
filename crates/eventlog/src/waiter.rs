//! Broadcast wakeup for blocked readers.
//!
//! The original signals "new data is available" by closing a channel and
//! installing a fresh one, so every reader parked on a receive wakes at
//! once. There is no equivalent "closable, re-armable" channel in
//! `std::sync`, so this reaches for the channel-less version of the same
//! idea: a generation counter protected by a [`Mutex`], bumped under the
//! same lock as the commit that produced the new data, with waiters parked
//! on a [`Condvar`] over that counter. A waiter that wakes re-checks its own
//! condition (did the generation change, or did my data actually show up)
//! rather than trusting the wakeup alone, same as any condvar usage must.
//!
//! Waits are bounded by [`crate::EventLogConfig::wait_poll_interval`] so a
//! cancelled waiter notices within one interval even if no commit ever
//! arrives to wake it directly.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

/// Shared cancellation flag for a blocked read. Cloning a token gives a
/// second handle to the same underlying flag; cancelling through any clone
/// cancels them all.
///
/// Modeled on a shutdown flag a caller flips once from another thread: there
/// is no "un-cancel".
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a fresh, not-yet-cancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks this token (and every clone of it) cancelled.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Returns `true` once [`CancelToken::cancel`] has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// A generation counter plus the condvar that wakes waiters on it.
///
/// Held separately from the data it guards: callers bump the generation
/// while holding whatever lock protects the actual ring, then notify after
/// releasing it, so waiters never wake only to immediately block again on
/// the same lock the notifier just held.
pub(crate) struct Waiter {
    generation: AtomicU64,
    gate: Mutex<()>,
    condvar: Condvar,
}

impl Waiter {
    pub(crate) fn new() -> Self {
        Self { generation: AtomicU64::new(0), gate: Mutex::new(()), condvar: Condvar::new() }
    }

    /// The current generation. A waiter that observes generation `g` before
    /// checking its condition only needs to re-check once `current()` moves
    /// past `g`.
    pub(crate) fn current(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Advances the generation and wakes every parked waiter. Call this
    /// after releasing the lock that guards the data the waiters care
    /// about, so they don't wake only to contend on a lock you're still
    /// holding.
    pub(crate) fn notify_all(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        let _guard = self.gate.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        self.condvar.notify_all();
    }

    /// Blocks until the generation advances past `observed`, the poll
    /// interval elapses, or `cancel` is set — whichever comes first.
    /// Returns the generation observed on wakeup, which the caller compares
    /// against `observed` to tell a real change from a spurious/poll wakeup.
    pub(crate) fn wait(&self, observed: u64, poll_interval: Duration, cancel: &CancelToken) -> u64 {
        if cancel.is_cancelled() || self.current() != observed {
            return self.current();
        }
        let guard = self.gate.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let _ = self
            .condvar
            .wait_timeout_while(guard, poll_interval, |()| {
                self.current() == observed && !cancel.is_cancelled()
            })
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        self.current()
    }
}
