//! Constants for the ENS identity API.
//!
//! Contract addresses and record keys follow the deployed ENS contracts on
//! Ethereum mainnet and the public ENS subgraphs.

// ═══════════════════════════════════════════════════════════════════════════════
// ETHEREUM CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Size of Ethereum address in bytes (20 bytes = 160 bits).
pub const ETH_ADDRESS_SIZE: usize = 20;

/// Length of a `0x`-prefixed hex address string.
pub const ETH_ADDRESS_HEX_LEN: usize = 2 + ETH_ADDRESS_SIZE * 2;

/// Size of keccak256 hash output (also one ABI word).
pub const KECCAK256_SIZE: usize = 32;

/// Default Ethereum JSON-RPC endpoint.
pub const DEFAULT_ETH_RPC_URL: &str = "https://rpc.flashbots.net";

// ═══════════════════════════════════════════════════════════════════════════════
// ENS CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// ENS registry (with fallback) contract, same address on every network.
pub const ENS_REGISTRY_ADDRESS: &str = "0x00000000000C2E074eC69A0dFb2997BA6C7d2e1e";

/// Suffix of reverse records (`<hex address>.addr.reverse`).
pub const ENS_REVERSE_SUFFIX: &str = "addr.reverse";

/// Suffix every resolvable query name must carry.
pub const ENS_NAME_SUFFIX: &str = ".eth";

/// ENS text record key holding the avatar URI (ENSIP-12).
pub const ENS_AVATAR_KEY: &str = "avatar";

/// Default text record key for the custom project id.
pub const DEFAULT_PROJECT_ID_KEY: &str = "juicebox_project_id";

/// ENS metadata service, used to render NFT avatars to an image URL.
pub const ENS_METADATA_URL: &str = "https://metadata.ens.domains";

// ═══════════════════════════════════════════════════════════════════════════════
// IPFS CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Avatar prefix rewritten to the HTTPS gateway.
pub const IPFS_IPFS_SCHEME: &str = "ipfs://ipfs/";

/// Public HTTPS gateway for IPFS content.
pub const IPFS_GATEWAY_URL: &str = "https://ipfs.io/ipfs/";

// ═══════════════════════════════════════════════════════════════════════════════
// SUBGRAPH CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// ENS subgraph on Ethereum mainnet.
pub const SUBGRAPH_URL_MAINNET: &str = "https://api.thegraph.com/subgraphs/name/ensdomains/ens";

/// ENS subgraph on Goerli.
pub const SUBGRAPH_URL_GOERLI: &str = "https://api.thegraph.com/subgraphs/name/ensdomains/ensgoerli";

/// ENS subgraph on Sepolia.
pub const SUBGRAPH_URL_SEPOLIA: &str =
    "https://api.studio.thegraph.com/query/49574/enssepolia/version/latest";

/// Maximum number of domains requested from the subgraph in one query.
pub const SUBGRAPH_PAGE_SIZE: usize = 1000;

// ═══════════════════════════════════════════════════════════════════════════════
// SERVICE DEFAULTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Default listen address.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8721";

/// Default budget for one upstream call, in milliseconds.
pub const DEFAULT_UPSTREAM_TIMEOUT_MS: u64 = 5_000;

/// Edge cache hint attached to resolve responses.
pub const CDN_CACHE_CONTROL_VALUE: &str = "public, stale-while-revalidate=8640000, max-age=600";
