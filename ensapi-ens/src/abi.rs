//! Minimal ABI plumbing for the ENS registry and resolver calls.
//!
//! Only the handful of shapes ENS needs are covered: a `bytes32` node
//! argument, an extra `string` argument for `text()`, and `address`,
//! `string` and `bytes` return values.

use sha3::{Digest, Keccak256};

use ensapi_core::constants::KECCAK256_SIZE;
use ensapi_core::error::{EnsApiError, Result};
use ensapi_core::types::EthAddress;

/// One ABI word.
const WORD: usize = 32;

/// `resolver(bytes32)` on the ENS registry.
pub const SIG_RESOLVER: &str = "resolver(bytes32)";
/// `addr(bytes32)` on a public resolver.
pub const SIG_ADDR: &str = "addr(bytes32)";
/// `name(bytes32)` on a reverse resolver.
pub const SIG_NAME: &str = "name(bytes32)";
/// `text(bytes32,string)` on a public resolver.
pub const SIG_TEXT: &str = "text(bytes32,string)";
/// `contenthash(bytes32)` on a public resolver.
pub const SIG_CONTENTHASH: &str = "contenthash(bytes32)";

/// A 32-byte ENS node identifier.
pub type Node = [u8; KECCAK256_SIZE];

/// Computes the EIP-137 namehash of `name`.
///
/// The empty name hashes to 32 zero bytes.
pub fn namehash(name: &str) -> Node {
    let mut node = [0u8; KECCAK256_SIZE];

    for label in name.rsplit('.') {
        if label.is_empty() {
            continue;
        }

        let label_hash = Keccak256::digest(label.as_bytes());

        let mut combined = [0u8; 2 * KECCAK256_SIZE];
        combined[..KECCAK256_SIZE].copy_from_slice(&node);
        combined[KECCAK256_SIZE..].copy_from_slice(&label_hash);

        node = Keccak256::digest(combined).into();
    }

    node
}

/// Returns the 4-byte function selector for a canonical signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = Keccak256::digest(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Encodes `signature(node)` as `0x`-prefixed call data.
pub fn encode_node_call(signature: &str, node: &Node) -> String {
    let mut data = Vec::with_capacity(4 + WORD);
    data.extend_from_slice(&selector(signature));
    data.extend_from_slice(node);
    format!("0x{}", hex::encode(data))
}

/// Encodes `text(node, key)` as `0x`-prefixed call data.
pub fn encode_text_call(node: &Node, key: &str) -> String {
    let mut data = Vec::with_capacity(4 + 4 * WORD + key.len());
    data.extend_from_slice(&selector(SIG_TEXT));
    data.extend_from_slice(node);
    // head: offset of the string argument, past the two head words
    data.extend_from_slice(&uint_word(2 * WORD));
    data.extend_from_slice(&encode_dynamic(key.as_bytes()));
    format!("0x{}", hex::encode(data))
}

/// Decodes an `address` return value.
///
/// Empty return data means the call had nothing to say and decodes to `None`.
pub fn decode_address(data: &[u8]) -> Result<Option<EthAddress>> {
    if data.is_empty() {
        return Ok(None);
    }
    if data.len() < WORD {
        return Err(EnsApiError::AbiDecodeError(format!(
            "address return is {} bytes, expected {WORD}",
            data.len()
        )));
    }

    let address = EthAddress::from_bytes(&data[WORD - 20..WORD])?;
    Ok((!address.is_zero()).then_some(address))
}

/// Decodes a dynamic `bytes` return value. Empty values decode to `None`.
pub fn decode_bytes(data: &[u8]) -> Result<Option<Vec<u8>>> {
    if data.is_empty() {
        return Ok(None);
    }

    let offset = read_usize(data, 0)?;
    let length = read_usize(data, offset)?;
    let start = offset + WORD;
    let end = start
        .checked_add(length)
        .filter(|&end| end <= data.len())
        .ok_or_else(|| {
            EnsApiError::AbiDecodeError(format!(
                "dynamic value of {length} bytes overruns {} byte return",
                data.len()
            ))
        })?;

    if length == 0 {
        return Ok(None);
    }
    Ok(Some(data[start..end].to_vec()))
}

/// Decodes a `string` return value. Empty strings decode to `None`.
pub fn decode_string(data: &[u8]) -> Result<Option<String>> {
    match decode_bytes(data)? {
        Some(bytes) => String::from_utf8(bytes)
            .map(Some)
            .map_err(|e| EnsApiError::AbiDecodeError(format!("string is not UTF-8: {e}"))),
        None => Ok(None),
    }
}

/// Encodes a left-padded `address` word.
pub fn encode_address_word(address: &EthAddress) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[WORD - 20..].copy_from_slice(address.as_bytes());
    word
}

/// Encodes a standalone dynamic return value (`bytes` or `string`): offset,
/// length, then the right-padded payload.
pub fn encode_dynamic_return(payload: &[u8]) -> Vec<u8> {
    let mut out = uint_word(WORD).to_vec();
    out.extend_from_slice(&encode_dynamic(payload));
    out
}

/// Length word followed by the payload padded to a word boundary.
fn encode_dynamic(payload: &[u8]) -> Vec<u8> {
    let padded_len = payload.len().div_ceil(WORD) * WORD;
    let mut out = Vec::with_capacity(WORD + padded_len);
    out.extend_from_slice(&uint_word(payload.len()));
    out.extend_from_slice(payload);
    out.resize(WORD + padded_len, 0);
    out
}

fn uint_word(value: usize) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[WORD - 8..].copy_from_slice(&(value as u64).to_be_bytes());
    word
}

/// Reads the word at `at` as a `usize`, rejecting values that do not fit.
fn read_usize(data: &[u8], at: usize) -> Result<usize> {
    let word = data
        .get(at..at.saturating_add(WORD))
        .ok_or_else(|| EnsApiError::AbiDecodeError(format!("no word at offset {at}")))?;

    if word[..WORD - 8].iter().any(|&b| b != 0) {
        return Err(EnsApiError::AbiDecodeError(format!(
            "word at offset {at} does not fit in usize"
        )));
    }

    let mut be = [0u8; 8];
    be.copy_from_slice(&word[WORD - 8..]);
    usize::try_from(u64::from_be_bytes(be))
        .map_err(|_| EnsApiError::AbiDecodeError(format!("word at offset {at} too large")))
}
