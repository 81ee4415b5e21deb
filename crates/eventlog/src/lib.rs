//! A bounded, in-memory event log for change notifications on top of a
//! replicated state store.
//!
//! An [`EventLog`] holds the last `capacity()` events published by state
//! store transactions in a fixed-size ring, indexed by the store's own
//! monotonic index (a Raft log index, in the system this was built for).
//! Writers stage an event, then commit or abort it; readers walk forward
//! from an index they last saw, either polling once ([`EventLog::next`]) or
//! blocking until something new matches their filter
//! ([`EventLog::next_block`]). A reader who falls behind the ring's
//! retention window gets [`ReadError::IndexTruncated`] and is expected to
//! re-seed itself from a [`Snapshot`] of the outer store.
//!
//! ```
//! use eventlog::{EventLog, EventLogConfig, Publish, Topic};
//!
//! let log = EventLog::new(EventLogConfig::new(64));
//! log.publish(Publish::new(1, Topic::Kv, "some/key", "hello")).unwrap();
//!
//! let (index, payload) = log.next(0, Topic::All, None).unwrap().unwrap();
//! assert_eq!(index, 1);
//! assert!(!payload.is_empty());
//! ```

mod codec;
mod config;
mod error;
mod event;
mod frame;
mod invariants;
mod log;
mod ring;
mod snapshot;
mod staging;
mod topic;
mod waiter;

pub use codec::{decode_body, EncodedBody};
pub use config::EventLogConfig;
pub use error::{PublishError, ReadError, RestoreError};
pub use event::{Event, Publish};
pub use frame::{FrameHeader, MsgType, FRAME_HEADER_LEN};
pub use log::EventLog;
pub use snapshot::Snapshot;
pub use topic::Topic;
pub use waiter::CancelToken;
