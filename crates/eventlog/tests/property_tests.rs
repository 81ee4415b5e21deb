//! Property-based tests for the invariants the event log is expected to
//! hold across arbitrary publish sequences.

use eventlog::{EventLog, EventLogConfig, Publish, Topic};
use proptest::prelude::*;

// =============================================================================
// INV-LOG-01: strictly increasing read-back
// "successive next() calls on the wildcard topic observe strictly
// increasing indices"
// =============================================================================

proptest! {
    #[test]
    fn prop_read_back_is_strictly_increasing(
        indices in prop::collection::vec(1u64..10_000, 1..200),
    ) {
        // Raft indices must themselves be strictly increasing; derive a
        // valid sequence by taking a running max + 1 over arbitrary deltas.
        let log = EventLog::new(EventLogConfig::new(16));
        let mut last = 0u64;
        for delta in indices {
            last += delta.max(1);
            log.publish(Publish::new(last, Topic::Kv, "k", last as u32)).unwrap();
        }

        let mut seen = 0u64;
        let mut prev = None;
        let mut cursor = 0u64;
        loop {
            match log.next(cursor, Topic::All, None).unwrap() {
                Some((idx, _)) => {
                    if let Some(prev_idx) = prev {
                        prop_assert!(idx > prev_idx, "INV-LOG-01 violated: {} did not increase past {}", idx, prev_idx);
                    }
                    prev = Some(idx);
                    cursor = idx;
                    seen += 1;
                }
                None => break,
            }
        }
        prop_assert!(seen > 0);
    }
}

// =============================================================================
// full read-back within capacity, IndexTruncated once exceeded
// =============================================================================

proptest! {
    #[test]
    fn prop_full_read_back_within_capacity_then_truncated_beyond_it(
        count in 1usize..64,
    ) {
        let capacity = 16usize;
        let log = EventLog::new(EventLogConfig::new(capacity));
        for i in 1..=count as u64 {
            log.publish(Publish::new(i, Topic::Kv, "k", i as u32)).unwrap();
        }

        let mut cursor = 0u64;
        let mut read = Vec::new();
        loop {
            match log.next(cursor, Topic::All, None) {
                Ok(Some((idx, _))) => { read.push(idx); cursor = idx; }
                Ok(None) => break,
                Err(err) => {
                    prop_assert!(err.is_truncated());
                    prop_assert!(count > capacity, "truncation should only occur once capacity is exceeded");
                    return Ok(());
                }
            }
        }

        prop_assert!(count <= capacity, "should have hit IndexTruncated once capacity was exceeded");
        prop_assert_eq!(read, (1..=count as u64).collect::<Vec<_>>());
    }
}

// =============================================================================
// snapshot(state_index) contains only events with index <= state_index,
// sorted by index
// =============================================================================

proptest! {
    #[test]
    fn prop_snapshot_respects_state_index_and_is_sorted(
        count in 1u64..64,
        state_index in 0u64..64,
    ) {
        let log = EventLog::new(EventLogConfig::new(16));
        for i in 1..=count {
            log.publish(Publish::new(i, Topic::Kv, "k", i as u32)).unwrap();
        }

        let snap = log.snapshot(state_index);
        for event in &snap.events {
            prop_assert!(event.index <= state_index);
        }
        for pair in snap.events.windows(2) {
            prop_assert!(pair[0].index < pair[1].index);
        }
    }
}

// =============================================================================
// round-trip: from_snapshot(cap, snapshot(inf)) reproduces the original
// read-out sequence when cap >= snapshot length
// =============================================================================

proptest! {
    #[test]
    fn prop_snapshot_restore_round_trip_preserves_read_out(
        count in 1u64..20,
    ) {
        let log = EventLog::new(EventLogConfig::new(32));
        for i in 1..=count {
            log.publish(Publish::new(i, Topic::Kv, "k", i as u32)).unwrap();
        }

        let snap = log.snapshot(u64::MAX);
        let restored = EventLog::from_snapshot(EventLogConfig::new(32), Some(snap)).unwrap();

        let read_out = |l: &EventLog| {
            let mut cursor = 0u64;
            let mut out = Vec::new();
            while let Some((idx, _)) = l.next(cursor, Topic::All, None).unwrap() {
                out.push(idx);
                cursor = idx;
            }
            out
        };

        prop_assert_eq!(read_out(&log), read_out(&restored));
    }
}

// =============================================================================
// resize-down round-trip: restoring into a smaller capacity drops exactly
// the oldest events, and last_truncated_index tracks the last of them
// =============================================================================

proptest! {
    #[test]
    fn prop_resize_down_round_trip_drops_the_oldest_events(
        count in 8u64..40,
        smaller_capacity in 2usize..8,
    ) {
        let log = EventLog::new(EventLogConfig::new(64));
        for i in 1..=count {
            log.publish(Publish::new(i, Topic::Kv, "k", i as u32)).unwrap();
        }

        let snap = log.snapshot(u64::MAX);
        let snapshot_len = snap.events.len();
        prop_assume!(smaller_capacity < snapshot_len);

        let restored = EventLog::from_snapshot(EventLogConfig::new(smaller_capacity), Some(snap)).unwrap();
        let realized_capacity = restored.capacity();
        prop_assume!(realized_capacity < snapshot_len);

        let dropped = snapshot_len - realized_capacity;
        prop_assert_eq!(restored.min_index(), count - realized_capacity as u64 + 1);

        let expected_last_truncated = dropped as u64;
        match restored.next(expected_last_truncated - 1, Topic::Kv, None) {
            Err(err) => prop_assert!(err.is_truncated()),
            Ok(_) => prop_assert!(false, "expected IndexTruncated for an index before last_truncated_index"),
        }
    }
}
