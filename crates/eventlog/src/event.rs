//! Event types.
//!
//! There are two distinct shapes here, mirroring the split between the
//! value a caller hands to [`crate::EventLog::prepare`] and the framed
//! bytes the log actually stores and hands back to readers: encoding a
//! value and framing it is work done exactly once, at `prepare` time, never
//! per reader.

use crate::topic::Topic;
use serde::{Deserialize, Serialize};

/// The input to [`crate::EventLog::prepare`]: an index, topic and key plus
/// an arbitrary serializable value to encode into the event body.
#[derive(Debug, Clone)]
pub struct Publish<V> {
    /// The raft-log index this event is published at.
    pub index: u64,
    /// The event's topic. Must not be [`Topic::All`].
    pub topic: Topic,
    /// The event's key within its topic.
    pub key: String,
    /// The event's opaque value, encoded into the stored frame.
    pub value: V,
}

impl<V: Serialize> Publish<V> {
    /// Convenience constructor.
    pub fn new(index: u64, topic: Topic, key: impl Into<String>, value: V) -> Self {
        Self { index, topic, key: key.into(), value }
    }
}

/// An event as stored in the ring buffer: already framed, so the log never
/// re-encodes a stored event per reader.
///
/// Carries `serde` derives (unlike [`Publish`]) because this is the shape
/// that actually crosses the wire inside a [`crate::Snapshot`], embedded in
/// a larger state-store snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Event {
    /// The event's raft-log index. `0` means "no event in this slot".
    pub index: u64,
    /// The event's topic.
    pub topic: Topic,
    /// The event's key within its topic.
    pub key: String,
    /// The framed, encoded payload: an 8-byte header followed by the
    /// encoded body.
    pub payload: Vec<u8>,
}
