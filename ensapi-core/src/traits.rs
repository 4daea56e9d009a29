//! Capability traits for the external collaborators.
//!
//! The resolution layer only talks to these interfaces, so the live JSON-RPC
//! and GraphQL clients can be swapped for in-memory fakes in tests.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::Network;

// ═══════════════════════════════════════════════════════════════════════════════
// ENS LOOKUP TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Interface for ENS record lookups.
///
/// Every method returns `Ok(None)` when the record is simply not set and an
/// error when the upstream could not be asked or answered garbage.
#[async_trait]
pub trait EnsLookup: Send + Sync {
    /// Reverse resolution: address to primary name.
    ///
    /// `address` is a lowercase `0x`-prefixed hex string.
    async fn resolve_address_to_name(&self, address: &str) -> Result<Option<String>>;

    /// Forward resolution: name to address.
    ///
    /// Returns the address as hex, with or without `0x` prefix and in any case;
    /// callers normalize it.
    async fn resolve_name_to_address(&self, name: &str) -> Result<Option<String>>;

    /// Fetches the avatar record and derives a displayable image URL.
    async fn avatar_url(&self, name: &str) -> Result<Option<String>>;

    /// Fetches and decodes the content hash record to a URL.
    async fn content_hash(&self, name: &str) -> Result<Option<String>>;

    /// Fetches an arbitrary text record.
    async fn text_record(&self, name: &str, key: &str) -> Result<Option<String>>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// DOMAIN INDEX TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Interface for the domain-ownership index.
#[async_trait]
pub trait DomainIndex: Send + Sync {
    /// Returns the names owned by `address` on `network`, in index order.
    ///
    /// At most [`SUBGRAPH_PAGE_SIZE`](crate::constants::SUBGRAPH_PAGE_SIZE)
    /// names are returned.
    async fn names_owned_by(&self, address: &str, network: Network) -> Result<Vec<String>>;
}
