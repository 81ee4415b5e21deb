//! Self-describing encoding of an event body.
//!
//! The body is MessagePack, chosen so the same "raw bytes come back as the
//! types that went in" property the original codec's `RawToString` option
//! gives on the read side falls out of MessagePack's native `str`/`bin`
//! distinction with no special configuration.

use crate::topic::Topic;
use serde::{Deserialize, Serialize};

/// The fields carried inside an event's encoded body, independent of the
/// frame header that precedes it on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodedBody<V> {
    /// The event's raft-log index.
    pub index: u64,
    /// The event's topic.
    pub topic: Topic,
    /// The event's key within its topic.
    pub key: String,
    /// The event's opaque value.
    pub value: V,
}

/// Serializes `body` as a MessagePack map and appends it to `buf`.
///
/// Using a struct-as-map encoding (rather than rmp-serde's default
/// struct-as-array) keeps the body genuinely self-describing: a reader with
/// only the field names, not their declaration order, can still decode it.
pub fn encode_body_into<V: Serialize>(
    buf: &mut Vec<u8>,
    body: &EncodedBody<V>,
) -> Result<(), rmp_serde::encode::Error> {
    let mut serializer = rmp_serde::Serializer::new(buf).with_struct_map();
    body.serialize(&mut serializer)
}

/// Decodes an event body previously written by [`encode_body_into`].
pub fn decode_body<V: for<'de> Deserialize<'de>>(
    bytes: &[u8],
) -> Result<EncodedBody<V>, rmp_serde::decode::Error> {
    rmp_serde::from_slice(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_body() {
        let body = EncodedBody { index: 42, topic: Topic::Kv, key: "foo".to_string(), value: vec![1u8, 2, 3] };
        let mut buf = Vec::new();
        encode_body_into(&mut buf, &body).unwrap();

        let decoded: EncodedBody<Vec<u8>> = decode_body(&buf).unwrap();
        assert_eq!(decoded.index, 42);
        assert_eq!(decoded.topic, Topic::Kv);
        assert_eq!(decoded.key, "foo");
        assert_eq!(decoded.value, vec![1u8, 2, 3]);
    }
}
