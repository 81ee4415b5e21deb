//! The publisher's reusable staging cell.

use crate::codec::{encode_body_into, EncodedBody};
use crate::error::PublishError;
use crate::event::{Event, Publish};
use crate::frame::{FrameHeader, MsgType, FRAME_HEADER_LEN};
use crate::invariants::debug_assert_not_wildcard_topic;
use crate::topic::Topic;
use serde::Serialize;

/// An event that has been encoded and framed but not yet installed into the
/// ring. At most one of these exists at a time; a second `prepare` while one
/// is outstanding is a caller error ([`PublishError::AlreadyStaged`]).
#[derive(Debug)]
pub(crate) struct Staging {
    pub index: u64,
    pub topic: Topic,
    pub key: String,
    pub payload: Vec<u8>,
}

impl Staging {
    /// Encodes `publish` into `reuse` (a buffer recycled from a prior
    /// commit's evicted slot, if any) and returns the staged event.
    ///
    /// Reusing the buffer is what makes steady-state publishing
    /// allocation-free: the buffer only grows, never gets dropped and
    /// reallocated, across the life of the log.
    pub(crate) fn encode<V: Serialize>(
        publish: Publish<V>,
        mut reuse: Vec<u8>,
    ) -> Result<Self, PublishError> {
        debug_assert_not_wildcard_topic!(publish.topic);
        reuse.clear();
        reuse.resize(FRAME_HEADER_LEN, 0);

        let body = EncodedBody {
            index: publish.index,
            topic: publish.topic,
            key: publish.key.clone(),
            value: publish.value,
        };
        encode_body_into(&mut reuse, &body)?;

        let header = FrameHeader {
            len: (reuse.len() - FRAME_HEADER_LEN) as u32,
            msg_type: MsgType::Event,
            flags: 0,
        };
        header.write_to(&mut reuse[0..FRAME_HEADER_LEN]);

        Ok(Self { index: publish.index, topic: publish.topic, key: publish.key, payload: reuse })
    }

    /// Converts the staged event into a ring-storable [`Event`].
    pub(crate) fn into_event(self) -> Event {
        Event { index: self.index, topic: self.topic, key: self.key, payload: self.payload }
    }
}
