//! EIP-1577 content hash decoding.
//!
//! A content hash is `<protoCode uvarint><value>`. For the IPFS, IPNS and
//! Swarm namespaces the value is a binary CID; for Tor it is the onion
//! address in ASCII.

use cid::{Cid, Version};
use multihash::Multihash;

use ensapi_core::error::{EnsApiError, Result};

/// ipfs-ns multicodec.
pub const CODEC_IPFS_NS: u64 = 0xe3;
/// swarm-ns multicodec.
pub const CODEC_SWARM_NS: u64 = 0xe4;
/// ipns-ns multicodec.
pub const CODEC_IPNS_NS: u64 = 0xe5;
/// onion multicodec.
pub const CODEC_ONION: u64 = 0x01bc;
/// onion3 multicodec.
pub const CODEC_ONION3: u64 = 0x01bd;

const DAG_PB: u64 = 0x70;
const SHA2_256: u64 = 0x12;
const IDENTITY: u64 = 0x00;

/// Decodes raw content hash bytes into a URL.
///
/// Empty input means the record is unset and yields `Ok(None)`.
pub fn decode_content_hash(bytes: &[u8]) -> Result<Option<String>> {
    if bytes.is_empty() {
        return Ok(None);
    }

    let (codec, value) = read_uvarint(bytes)?;
    let url = match codec {
        CODEC_IPFS_NS => format!("ipfs://{}", render_ipfs(parse_cid(value)?)?),
        CODEC_IPNS_NS => format!("ipns://{}", render_ipns(parse_cid(value)?)?),
        CODEC_SWARM_NS => format!("bzz://{}", hex::encode(parse_cid(value)?.hash().digest())),
        CODEC_ONION => format!("onion://{}", ascii_value(value)?),
        CODEC_ONION3 => format!("onion3://{}", ascii_value(value)?),
        other => {
            return Err(EnsApiError::InvalidContentHash(format!(
                "unsupported namespace codec 0x{other:x}"
            )))
        }
    };

    Ok(Some(url))
}

/// Reads an unsigned LEB128 varint, returning the value and the remainder.
fn read_uvarint(bytes: &[u8]) -> Result<(u64, &[u8])> {
    let mut value: u64 = 0;
    for (i, &byte) in bytes.iter().enumerate().take(9) {
        value |= u64::from(byte & 0x7f) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok((value, &bytes[i + 1..]));
        }
    }
    Err(EnsApiError::InvalidContentHash("truncated varint".into()))
}

fn parse_cid(value: &[u8]) -> Result<Cid> {
    Cid::try_from(value).map_err(|e| EnsApiError::InvalidContentHash(format!("bad CID: {e}")))
}

/// IPFS content is shown in CIDv0 form when it can be, as the ENS app does.
fn render_ipfs(cid: Cid) -> Result<String> {
    if cid.version() == Version::V1 && cid.codec() == DAG_PB && is_sha2_256(cid.hash()) {
        let v0 = Cid::new_v0(*cid.hash())
            .map_err(|e| EnsApiError::InvalidContentHash(format!("bad CIDv0: {e}")))?;
        return Ok(v0.to_string());
    }
    Ok(cid.to_string())
}

/// DNSLink-style IPNS records carry the domain in an identity multihash.
fn render_ipns(cid: Cid) -> Result<String> {
    if cid.hash().code() == IDENTITY {
        return String::from_utf8(cid.hash().digest().to_vec())
            .map_err(|e| EnsApiError::InvalidContentHash(format!("IPNS name is not UTF-8: {e}")));
    }
    Ok(cid.to_string())
}

fn is_sha2_256(hash: &Multihash<64>) -> bool {
    hash.code() == SHA2_256 && hash.size() == 32
}

fn ascii_value(value: &[u8]) -> Result<&str> {
    if value.is_empty() || !value.is_ascii() {
        return Err(EnsApiError::InvalidContentHash("onion address is not ASCII".into()));
    }
    std::str::from_utf8(value).map_err(|e| EnsApiError::InvalidContentHash(e.to_string()))
}
