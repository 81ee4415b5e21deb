//! Topic enumeration.

use serde_repr::{Deserialize_repr, Serialize_repr};

/// Coarse routing tag for an event.
///
/// `Topic::All` is a reader-side wildcard only: it is never the topic of a
/// stored event, only a filter value meaning "any topic". Adding a new
/// variant is a compatible change as long as existing discriminants are
/// preserved, since the numeric value (not the Rust variant name) is what
/// crosses the wire.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize_repr, Deserialize_repr)]
pub enum Topic {
    /// Wildcard filter meaning "any topic". Never appears on a stored event.
    All = 0,
    /// Key/value store mutations.
    Kv = 1,
    /// Catalog service registration changes.
    CatalogServices = 2,
}

impl Default for Topic {
    /// Defaults to `All` so a zero-initialized ring slot (no event ever
    /// written) reads as "matches nothing stored, since `All` is never a
    /// stored topic" rather than picking an arbitrary real topic.
    fn default() -> Self {
        Topic::All
    }
}

impl Topic {
    /// Returns `true` if this is the reader-only wildcard.
    #[inline]
    #[must_use]
    pub fn is_wildcard(self) -> bool {
        matches!(self, Topic::All)
    }

    /// Returns `true` if `self` matches `filter`, where `filter` may be the
    /// wildcard.
    #[inline]
    #[must_use]
    pub fn matches(self, filter: Topic) -> bool {
        filter.is_wildcard() || self == filter
    }
}
