//! Fixed-size wire framing for encoded event bodies.
//!
//! Every payload handed to a reader is `FRAME_HEADER_LEN` bytes of
//! fixed-width big-endian header followed by a self-describing encoded
//! body. The header is deliberately not part of the self-describing
//! encoding so a client can read it with no decoder at all.

use std::convert::TryFrom;

/// Size in bytes of [`FrameHeader`]'s wire representation.
pub const FRAME_HEADER_LEN: usize = 8;

/// Message type carried in a frame header.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MsgType {
    /// No-op frame.
    Nop = 0,
    /// A real event body follows.
    Event = 1,
}

impl TryFrom<u16> for MsgType {
    type Error = u16;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(MsgType::Nop),
            1 => Ok(MsgType::Event),
            other => Err(other),
        }
    }
}

/// Fixed 8-byte frame header: `len: u32`, `type: u16`, `flags: u16`, all
/// big-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Length in bytes of the body that follows the header.
    pub len: u32,
    /// Message type.
    pub msg_type: MsgType,
    /// Reserved for future use; currently always 0.
    pub flags: u16,
}

impl FrameHeader {
    /// Writes this header into the first [`FRAME_HEADER_LEN`] bytes of `buf`.
    ///
    /// # Panics
    ///
    /// Panics if `buf` is shorter than [`FRAME_HEADER_LEN`].
    pub fn write_to(&self, buf: &mut [u8]) {
        assert!(buf.len() >= FRAME_HEADER_LEN, "buffer too small for frame header");
        buf[0..4].copy_from_slice(&self.len.to_be_bytes());
        buf[4..6].copy_from_slice(&(self.msg_type as u16).to_be_bytes());
        buf[6..8].copy_from_slice(&self.flags.to_be_bytes());
    }

    /// Reads a header from the first [`FRAME_HEADER_LEN`] bytes of `buf`.
    ///
    /// Returns `None` if `buf` is too short or carries an unknown message
    /// type.
    #[must_use]
    pub fn read_from(buf: &[u8]) -> Option<Self> {
        if buf.len() < FRAME_HEADER_LEN {
            return None;
        }
        let len = u32::from_be_bytes(buf[0..4].try_into().unwrap());
        let raw_type = u16::from_be_bytes(buf[4..6].try_into().unwrap());
        let flags = u16::from_be_bytes(buf[6..8].try_into().unwrap());
        let msg_type = MsgType::try_from(raw_type).ok()?;
        Some(Self { len, msg_type, flags })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_bytes() {
        let header = FrameHeader { len: 42, msg_type: MsgType::Event, flags: 0 };
        let mut buf = [0u8; FRAME_HEADER_LEN];
        header.write_to(&mut buf);
        assert_eq!(FrameHeader::read_from(&buf), Some(header));
    }

    #[test]
    fn rejects_unknown_message_type() {
        let mut buf = [0u8; FRAME_HEADER_LEN];
        buf[4..6].copy_from_slice(&99u16.to_be_bytes());
        assert_eq!(FrameHeader::read_from(&buf), None);
    }

    #[test]
    fn rejects_short_buffer() {
        assert_eq!(FrameHeader::read_from(&[0u8; 4]), None);
    }
}
