//! Point-in-time capture and restore of an [`crate::EventLog`]'s state.
//!
//! A snapshot is what a caller serializes alongside a state-store snapshot
//! so a restored replica can resume delivering events from where the
//! snapshot left off, without replaying the full event history.

use crate::event::Event;
use crate::ring::Ring;
use crate::topic::Topic;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A serializable capture of an [`crate::EventLog`]'s events and bookkeeping
/// as of some state-store index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Live events at the time of the snapshot, oldest first.
    pub events: Vec<Event>,
    /// Per-topic high-water marks as of the snapshot.
    pub high_water_marks: HashMap<Topic, u64>,
    /// The index of the last event evicted from the ring before the
    /// snapshot was taken.
    pub last_truncated_index: u64,
}

/// Captures a [`Snapshot`] of `ring`'s events at or before `snapshot_index`.
///
/// High-water marks older than the ring's retained window are carried
/// through verbatim (`high_water_marks` as observed at snapshot time);
/// marks for topics still represented in the retained events are instead
/// rebuilt while walking them, so they reflect exactly what the snapshot
/// actually contains rather than what was true a moment later.
pub(crate) fn capture(
    ring: &Ring,
    high_water_marks: &HashMap<Topic, u64>,
    last_truncated_index: u64,
    snapshot_index: u64,
) -> Snapshot {
    let min_index = ring.min_index();
    let mut snap = Snapshot { last_truncated_index, ..Snapshot::default() };

    for (&topic, &index) in high_water_marks {
        if index < min_index {
            snap.high_water_marks.insert(topic, index);
        }
    }

    for event in ring.iter_from_oldest() {
        if event.index > snapshot_index {
            break;
        }
        snap.high_water_marks.insert(event.topic, event.index);
        snap.events.push(event.clone());
    }

    snap
}

/// Rebuilds a `(Ring, last_truncated_index, high_water_marks)` triple from a
/// [`Snapshot`], sized to hold at least `capacity_hint` events.
///
/// The new capacity is independent of whatever the ring was sized at when
/// the snapshot was taken. If it's smaller than the snapshot, the oldest
/// events are dropped and `last_truncated_index` is advanced to cover them,
/// so a reader who only ever saw up to the old truncation point still gets
/// a correct [`crate::ReadError::IndexTruncated`] instead of silently
/// missing events.
///
/// `snapshot.high_water_marks` is installed verbatim and then overwritten
/// for any topic whose replayed events carry a newer index, per
/// SPEC_FULL.md §4.5. `Snapshot` is a public, serializable type that can
/// arrive here via deserialization rather than only from
/// [`crate::EventLog::snapshot`], so its bookkeeping cannot be trusted to
/// already satisfy invariant 5 (`high_water_marks[topic] >= event.index`
/// for every stored event) — this walk re-establishes it regardless of what
/// the input claims.
pub(crate) fn restore(capacity_hint: usize, snapshot: Snapshot) -> (Ring, u64, HashMap<Topic, u64>) {
    let mut events = snapshot.events;
    let mut last_truncated_index = snapshot.last_truncated_index;

    let probe = Ring::new(capacity_hint);
    let capacity = probe.capacity();
    if events.len() > capacity {
        let drop_count = events.len() - capacity;
        last_truncated_index = events[drop_count - 1].index;
        events.drain(0..drop_count);
    }

    let mut high_water_marks = snapshot.high_water_marks;
    for event in &events {
        high_water_marks
            .entry(event.topic)
            .and_modify(|mark| *mark = (*mark).max(event.index))
            .or_insert(event.index);
    }

    let ring = Ring::from_events(capacity_hint, events);
    (ring, last_truncated_index, high_water_marks)
}
