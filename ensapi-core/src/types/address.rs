//! Ethereum address handling.
//!
//! Addresses travel through the API as lowercase `0x`-prefixed hex strings.
//! [`EthAddress`] is the parsed form used where raw bytes matter (ABI words,
//! reverse-record labels).

use serde::{Deserialize, Serialize};

use crate::constants::{ETH_ADDRESS_HEX_LEN, ETH_ADDRESS_SIZE};
use crate::error::{EnsApiError, Result};

/// Number of leading characters kept by [`truncate_address`] (`0x` + 3 digits).
const TRUNCATE_PREFIX_LEN: usize = 5;

/// Number of trailing characters kept by [`truncate_address`].
const TRUNCATE_SUFFIX_LEN: usize = 4;

/// A 20-byte Ethereum account address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EthAddress {
    bytes: [u8; ETH_ADDRESS_SIZE],
}

impl EthAddress {
    /// Creates an address from raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != ETH_ADDRESS_SIZE {
            return Err(EnsApiError::ValidationError(format!(
                "expected {} address bytes, got {}",
                ETH_ADDRESS_SIZE,
                bytes.len()
            )));
        }

        let mut arr = [0u8; ETH_ADDRESS_SIZE];
        arr.copy_from_slice(bytes);
        Ok(Self { bytes: arr })
    }

    /// Creates from a fixed-size array.
    pub fn from_array(bytes: [u8; ETH_ADDRESS_SIZE]) -> Self {
        Self { bytes }
    }

    /// Parses from hex string (with or without 0x prefix, any case).
    pub fn from_hex(s: &str) -> Result<Self> {
        let s = s.trim();
        let s = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        let bytes = hex::decode(s)?;
        Self::from_bytes(&bytes)
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the lowercase `0x`-prefixed hex form.
    pub fn to_hex_string(&self) -> String {
        format!("0x{}", hex::encode(self.bytes))
    }

    /// Returns the hex digits without prefix, as used in reverse-record labels.
    pub fn to_hex_label(&self) -> String {
        hex::encode(self.bytes)
    }

    /// Returns the zero address.
    pub fn zero() -> Self {
        Self {
            bytes: [0u8; ETH_ADDRESS_SIZE],
        }
    }

    /// Returns true if this is the zero address.
    pub fn is_zero(&self) -> bool {
        self.bytes.iter().all(|&b| b == 0)
    }
}

impl std::fmt::Debug for EthAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EthAddress({})", self.to_hex_string())
    }
}

impl std::fmt::Display for EthAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex_string())
    }
}

impl std::str::FromStr for EthAddress {
    type Err = EnsApiError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

/// Returns true if `s` is `0x` followed by exactly 40 hex digits.
pub fn is_address_like(s: &str) -> bool {
    s.len() == ETH_ADDRESS_HEX_LEN
        && s.starts_with("0x")
        && s[2..].bytes().all(|b| b.is_ascii_hexdigit())
}

/// Shortens an address for display: first 5 characters, `…`, last 4.
///
/// Strings that are not 42 characters long are returned unchanged.
pub fn truncate_address(address: &str) -> String {
    if address.len() != ETH_ADDRESS_HEX_LEN || !address.is_ascii() {
        return address.to_string();
    }
    format!(
        "{}…{}",
        &address[..TRUNCATE_PREFIX_LEN],
        &address[ETH_ADDRESS_HEX_LEN - TRUNCATE_SUFFIX_LEN..]
    )
}

/// Normalizes a resolver-returned address to lowercase `0x` + 40 hex digits.
pub fn normalize_address(raw: &str) -> Result<String> {
    Ok(EthAddress::from_hex(raw)?.to_hex_string())
}
