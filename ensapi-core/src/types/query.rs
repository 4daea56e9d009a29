//! Query classification.
//!
//! A path segment is normalized once and dispatched once: it is either a
//! name, an address, or neither.

use crate::constants::ENS_NAME_SUFFIX;
use super::address::is_address_like;

/// What a query looks like.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueryKind {
    /// `0x` followed by 40 hex digits
    Address,
    /// Ends with `.eth`
    Name,
    /// Neither shape
    Unknown,
}

/// A normalized, classified query string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Query {
    normalized: String,
    kind: QueryKind,
}

impl Query {
    /// Normalizes (trim + lowercase) and classifies a raw query.
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.trim().to_lowercase();
        let kind = if is_name_like(&normalized) {
            QueryKind::Name
        } else if is_address_like(&normalized) {
            QueryKind::Address
        } else {
            QueryKind::Unknown
        };

        Self { normalized, kind }
    }

    /// The normalized query text.
    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    /// The classification.
    pub fn kind(&self) -> QueryKind {
        self.kind
    }

    /// Returns true for address queries.
    pub fn is_address(&self) -> bool {
        self.kind == QueryKind::Address
    }

    /// Returns true for name queries.
    pub fn is_name(&self) -> bool {
        self.kind == QueryKind::Name
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.normalized)
    }
}

/// Returns true if `s` ends with `.eth` and has a label before the suffix.
pub fn is_name_like(s: &str) -> bool {
    s.len() > ENS_NAME_SUFFIX.len() && s.ends_with(ENS_NAME_SUFFIX)
}
