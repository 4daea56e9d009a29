//! The merged identity record returned by `/ens/resolve`.

use serde::{Deserialize, Serialize};

use crate::constants::{IPFS_GATEWAY_URL, IPFS_IPFS_SCHEME};
use super::address::{is_address_like, truncate_address};

/// Result of resolving one query.
///
/// Field order is alphabetical by JSON key so the serialized object comes out
/// with sorted keys. Absent fields serialize as `null`, except `domainList`
/// (omitted when empty) and `juiceboxProjectID` (omitted when absent).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionResult {
    /// Lowercase `0x`-prefixed address
    pub address: Option<String>,
    /// Avatar image URL
    pub avatar: Option<String>,
    /// Decoded content hash URL
    pub content_hash: Option<String>,
    /// Name, or truncated address when no name is known
    pub display_name: Option<String>,
    /// Names owned by `address`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub domain_list: Vec<String>,
    /// Value of the custom project id text record
    #[serde(
        rename = "juiceboxProjectID",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub custom_project_id: Option<String>,
    /// ENS name
    pub name: Option<String>,
}

impl ResolutionResult {
    /// Creates an empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `display_name` from what is known: the name if any, otherwise the
    /// truncated address if it is well-formed.
    pub fn fill_display_name(&mut self) {
        self.display_name = match (&self.name, &self.address) {
            (Some(name), _) => Some(name.clone()),
            (None, Some(address)) if is_address_like(address) => Some(truncate_address(address)),
            _ => None,
        };
    }

    /// Returns true if neither an address nor a name is known.
    pub fn is_empty(&self) -> bool {
        self.address.is_none() && self.name.is_none()
    }

    /// Returns true if at least one record beyond the name/address pair was found.
    pub fn has_records(&self) -> bool {
        self.avatar.is_some() || self.content_hash.is_some() || self.custom_project_id.is_some()
    }

    /// Serializes as pretty-printed JSON with explicit nulls.
    pub fn to_pretty_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Rewrites `ipfs://ipfs/<cid>` to the public HTTPS gateway.
///
/// Every other URL is returned unchanged.
pub fn rewrite_ipfs_gateway(url: &str) -> String {
    match url.strip_prefix(IPFS_IPFS_SCHEME) {
        Some(cid) => format!("{IPFS_GATEWAY_URL}{cid}"),
        None => url.to_string(),
    }
}
