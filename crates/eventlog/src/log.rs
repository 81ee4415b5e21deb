//! The event log itself: a mutex-guarded ring plus the publish/read
//! protocol around it.

use crate::config::EventLogConfig;
use crate::error::{PublishError, ReadError, RestoreError};
use crate::event::Publish;
use crate::invariants::{debug_assert_high_water_mark_covers_event, debug_assert_no_staged_event};
use crate::ring::Ring;
use crate::snapshot::{self, Snapshot};
use crate::staging::Staging;
use crate::topic::Topic;
use crate::waiter::{CancelToken, Waiter};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

struct Inner {
    ring: Ring,
    staged: Option<Staging>,
    spare_buffer: Vec<u8>,
    last_truncated_index: u64,
    high_water_marks: HashMap<Topic, u64>,
}

/// A bounded, in-memory log of framed events backing change notifications
/// for a replicated state store.
///
/// Writers go through a two-phase [`EventLog::prepare`] /
/// [`EventLog::commit`] (or [`EventLog::abort`]) protocol so an event only
/// becomes visible to readers once the transaction that produced it has
/// actually committed elsewhere. Readers call [`EventLog::next`] or
/// [`EventLog::next_block`] to walk forward from an index they last saw,
/// filtered by topic and optionally by key.
pub struct EventLog {
    inner: Mutex<Inner>,
    waiter: Waiter,
    poll_interval: Duration,
}

impl EventLog {
    /// Creates an empty log per `config`.
    #[must_use]
    pub fn new(config: EventLogConfig) -> Self {
        Self {
            inner: Mutex::new(Inner {
                ring: Ring::new(config.capacity_hint),
                staged: None,
                spare_buffer: Vec::new(),
                last_truncated_index: 0,
                high_water_marks: HashMap::new(),
            }),
            waiter: Waiter::new(),
            poll_interval: config.wait_poll_interval,
        }
    }

    /// Rebuilds a log from a previously captured [`Snapshot`], sized per
    /// `config`. `None` is a caller error: there is nothing to restore.
    pub fn from_snapshot(config: EventLogConfig, snapshot: Option<Snapshot>) -> Result<Self, RestoreError> {
        let snapshot = snapshot.ok_or(RestoreError::NilSnapshot)?;
        let (ring, last_truncated_index, high_water_marks) = snapshot::restore(config.capacity_hint, snapshot);
        Ok(Self {
            inner: Mutex::new(Inner { ring, staged: None, spare_buffer: Vec::new(), last_truncated_index, high_water_marks }),
            waiter: Waiter::new(),
            poll_interval: config.wait_poll_interval,
        })
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The realized ring capacity (`config.capacity_hint` rounded up to a
    /// power of two).
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.lock().ring.capacity()
    }

    /// Index of the oldest event still in the buffer, or `0` if empty.
    #[must_use]
    pub fn min_index(&self) -> u64 {
        self.lock().ring.min_index()
    }

    /// Index of the newest event in the buffer, or `0` if empty.
    #[must_use]
    pub fn max_index(&self) -> u64 {
        self.lock().ring.max_index()
    }

    /// Encodes and stages `publish` for the next [`EventLog::commit`].
    ///
    /// Fails without modifying the log if another event is already staged,
    /// if `publish.index` isn't strictly greater than the log's current max
    /// index, or if encoding fails.
    pub fn prepare<V: Serialize>(&self, publish: Publish<V>) -> Result<(), PublishError> {
        let mut inner = self.lock();
        if inner.staged.is_some() {
            return Err(PublishError::AlreadyStaged);
        }

        let max_index = inner.ring.max_index();
        if publish.index < 1 || publish.index <= max_index {
            return Err(PublishError::BadIndex { index: publish.index, max_index });
        }

        let reuse = std::mem::take(&mut inner.spare_buffer);
        let staging = Staging::encode(publish, reuse)?;
        debug_assert_no_staged_event!(inner.staged);
        inner.staged = Some(staging);
        Ok(())
    }

    /// Installs the staged event, if any, making it visible to readers and
    /// waking anyone blocked in [`EventLog::next_block`]. A no-op if
    /// nothing is staged. Never fails: prepare already did the work that
    /// could.
    pub fn commit(&self) {
        let mut inner = self.lock();
        let Some(staging) = inner.staged.take() else {
            return;
        };

        let topic = staging.topic;
        let event = staging.into_event();
        let evicted = inner.ring.install(event);
        inner.last_truncated_index = evicted.index;
        let committed_index = inner.ring.max_index();
        inner.high_water_marks.insert(topic, committed_index);
        debug_assert_high_water_mark_covers_event!(inner.high_water_marks[&topic], committed_index);
        inner.spare_buffer = evicted.payload;
        drop(inner);

        self.waiter.notify_all();
    }

    /// Discards the staged event, if any, recycling its buffer for the next
    /// [`EventLog::prepare`]. A no-op if nothing is staged.
    pub fn abort(&self) {
        let mut inner = self.lock();
        if let Some(staging) = inner.staged.take() {
            inner.spare_buffer = staging.payload;
        }
    }

    /// Stages, commits, and returns in one call. Convenience wrapper for
    /// callers with no separate transaction boundary to straddle.
    pub fn publish<V: Serialize>(&self, publish: Publish<V>) -> Result<(), PublishError> {
        self.prepare(publish)?;
        self.commit();
        Ok(())
    }

    /// Returns the next matching event after `index`, or `None` if the
    /// reader is caught up. Never blocks.
    pub fn next(&self, index: u64, topic: Topic, key: Option<&str>) -> Result<Option<(u64, Vec<u8>)>, ReadError> {
        self.advance(index, topic, key, None)
    }

    /// Like [`EventLog::next`], but blocks until a matching event arrives,
    /// `cancel` is cancelled, or the reader's position turns out to have
    /// been truncated out of the buffer.
    pub fn next_block(
        &self,
        index: u64,
        topic: Topic,
        key: Option<&str>,
        cancel: &CancelToken,
    ) -> Result<(u64, Vec<u8>), ReadError> {
        self.advance(index, topic, key, Some(cancel))?.ok_or(ReadError::Cancelled)
    }

    /// Takes a [`Snapshot`] of events at or before `snapshot_index`, for a
    /// caller to serialize alongside a state-store snapshot.
    #[must_use]
    pub fn snapshot(&self, snapshot_index: u64) -> Snapshot {
        let inner = self.lock();
        snapshot::capture(&inner.ring, &inner.high_water_marks, inner.last_truncated_index, snapshot_index)
    }

    /// Shared implementation of `next`/`next_block`. `cancel.is_none()`
    /// means non-blocking: the first time there's nothing new, return
    /// `Ok(None)` instead of waiting.
    fn advance(
        &self,
        mut index: u64,
        topic: Topic,
        key: Option<&str>,
        cancel: Option<&CancelToken>,
    ) -> Result<Option<(u64, Vec<u8>)>, ReadError> {
        let mut next_pos: Option<u64> = None;
        let mut inner = self.lock();

        loop {
            let max_index =
                if topic.is_wildcard() { inner.ring.max_index() } else { inner.high_water_marks.get(&topic).copied().unwrap_or(0) };

            if max_index <= index {
                let Some(cancel) = cancel else {
                    return Ok(None);
                };
                if cancel.is_cancelled() {
                    return Err(ReadError::Cancelled);
                }

                let generation = self.waiter.current();
                drop(inner);
                self.waiter.wait(generation, self.poll_interval, cancel);
                if cancel.is_cancelled() {
                    return Err(ReadError::Cancelled);
                }
                inner = self.lock();
                next_pos = None;
                continue;
            }

            if index < inner.last_truncated_index {
                return Err(ReadError::IndexTruncated);
            }

            let pos = match next_pos.or_else(|| inner.ring.next_pos_after(index)).or_else(|| inner.ring.oldest_pos()) {
                Some(pos) => pos,
                // Only reachable if the buffer is empty, which the maxIndex
                // check above already rules out.
                None => continue,
            };

            let slot = inner.ring.slot(pos);
            if slot.topic.matches(topic) && key.map_or(true, |k| k == slot.key) {
                return Ok(Some((slot.index, slot.payload.clone())));
            }

            index = slot.index;
            next_pos = Some(inner.ring.advance_pos(pos));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topic::Topic;
    use std::sync::Arc;
    use std::thread;

    fn log() -> EventLog {
        EventLog::new(EventLogConfig::new(4))
    }

    #[test]
    fn publish_then_read_forward() {
        let log = log();
        log.publish(Publish::new(1, Topic::Kv, "a", 1u32)).unwrap();
        log.publish(Publish::new(2, Topic::Kv, "b", 2u32)).unwrap();

        let (idx, _payload) = log.next(0, Topic::All, None).unwrap().unwrap();
        assert_eq!(idx, 1);
        let (idx, _payload) = log.next(1, Topic::All, None).unwrap().unwrap();
        assert_eq!(idx, 2);
        assert!(log.next(2, Topic::All, None).unwrap().is_none());
    }

    #[test]
    fn prepare_rejects_non_increasing_index() {
        let log = log();
        log.publish(Publish::new(5, Topic::Kv, "a", 1u32)).unwrap();
        let err = log.prepare(Publish::new(5, Topic::Kv, "a", 1u32)).unwrap_err();
        assert!(matches!(err, PublishError::BadIndex { index: 5, max_index: 5 }));
    }

    #[test]
    fn prepare_twice_without_commit_or_abort_fails() {
        let log = log();
        log.prepare(Publish::new(1, Topic::Kv, "a", 1u32)).unwrap();
        let err = log.prepare(Publish::new(2, Topic::Kv, "a", 1u32)).unwrap_err();
        assert!(matches!(err, PublishError::AlreadyStaged));
    }

    #[test]
    fn abort_discards_the_staged_event() {
        let log = log();
        log.prepare(Publish::new(1, Topic::Kv, "a", 1u32)).unwrap();
        log.abort();
        assert_eq!(log.max_index(), 0);
        log.prepare(Publish::new(1, Topic::Kv, "a", 1u32)).unwrap();
        log.commit();
        assert_eq!(log.max_index(), 1);
    }

    #[test]
    fn reading_a_truncated_index_is_an_error() {
        let log = EventLog::new(EventLogConfig::new(2));
        for i in 1..=3 {
            log.publish(Publish::new(i, Topic::Kv, "a", i as u32)).unwrap();
        }
        let err = log.next(0, Topic::All, None).unwrap_err();
        assert!(err.is_truncated());
    }

    #[test]
    fn topic_filter_skips_non_matching_events() {
        let log = log();
        log.publish(Publish::new(1, Topic::Kv, "a", 1u32)).unwrap();
        log.publish(Publish::new(2, Topic::CatalogServices, "svc", 2u32)).unwrap();
        log.publish(Publish::new(3, Topic::Kv, "b", 3u32)).unwrap();

        let (idx, _) = log.next(0, Topic::Kv, None).unwrap().unwrap();
        assert_eq!(idx, 1);
        let (idx, _) = log.next(1, Topic::Kv, None).unwrap().unwrap();
        assert_eq!(idx, 3);
    }

    #[test]
    fn key_filter_skips_non_matching_keys() {
        let log = log();
        log.publish(Publish::new(1, Topic::Kv, "a", 1u32)).unwrap();
        log.publish(Publish::new(2, Topic::Kv, "b", 2u32)).unwrap();
        log.publish(Publish::new(3, Topic::Kv, "a", 3u32)).unwrap();

        let (idx, _) = log.next(0, Topic::Kv, Some("a")).unwrap().unwrap();
        assert_eq!(idx, 1);
        let (idx, _) = log.next(1, Topic::Kv, Some("a")).unwrap().unwrap();
        assert_eq!(idx, 3);
    }

    #[test]
    fn caught_up_readers_wait_for_a_high_water_mark_even_with_nothing_in_buffer_for_their_topic() {
        let log = log();
        log.publish(Publish::new(1, Topic::CatalogServices, "svc", 1u32)).unwrap();
        assert!(log.next(0, Topic::Kv, None).unwrap().is_none());
    }

    #[test]
    fn next_block_wakes_on_commit_from_another_thread() {
        let log = Arc::new(log());
        let reader = Arc::clone(&log);
        let cancel = CancelToken::new();
        let cancel_for_reader = cancel.clone();

        let handle = thread::spawn(move || reader.next_block(0, Topic::All, None, &cancel_for_reader).unwrap());

        thread::sleep(Duration::from_millis(20));
        log.publish(Publish::new(1, Topic::Kv, "a", 42u32)).unwrap();

        let (idx, _payload) = handle.join().unwrap();
        assert_eq!(idx, 1);
        let _ = cancel;
    }

    #[test]
    fn next_block_returns_cancelled_when_the_token_fires() {
        let log = Arc::new(log());
        let reader = Arc::clone(&log);
        let cancel = CancelToken::new();
        let cancel_for_reader = cancel.clone();

        let handle = thread::spawn(move || reader.next_block(0, Topic::All, None, &cancel_for_reader));

        thread::sleep(Duration::from_millis(20));
        cancel.cancel();

        let err = handle.join().unwrap().unwrap_err();
        assert!(err.is_cancelled());
    }

    #[test]
    fn snapshot_then_restore_preserves_visible_events() {
        let log = log();
        log.publish(Publish::new(1, Topic::Kv, "a", 1u32)).unwrap();
        log.publish(Publish::new(2, Topic::Kv, "b", 2u32)).unwrap();

        let snap = log.snapshot(2);
        let restored = EventLog::from_snapshot(EventLogConfig::new(4), Some(snap)).unwrap();

        assert_eq!(restored.min_index(), 1);
        assert_eq!(restored.max_index(), 2);
        let (idx, _) = restored.next(0, Topic::All, None).unwrap().unwrap();
        assert_eq!(idx, 1);
    }

    #[test]
    fn from_snapshot_rejects_none() {
        let err = EventLog::from_snapshot(EventLogConfig::new(4), None).unwrap_err();
        assert!(matches!(err, RestoreError::NilSnapshot));
    }
}
