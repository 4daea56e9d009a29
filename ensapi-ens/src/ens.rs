//! ENS client over Ethereum JSON-RPC.
//!
//! Every lookup is two `eth_call`s: ask the registry for the node's resolver,
//! then ask the resolver for the record.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use ensapi_core::constants::{
    DEFAULT_ETH_RPC_URL, DEFAULT_UPSTREAM_TIMEOUT_MS, ENS_AVATAR_KEY, ENS_METADATA_URL,
    ENS_REGISTRY_ADDRESS, ENS_REVERSE_SUFFIX,
};
use ensapi_core::error::{EnsApiError, Result};
use ensapi_core::traits::EnsLookup;
use ensapi_core::types::{EthAddress, Network};

use crate::abi::{self, Node, SIG_ADDR, SIG_CONTENTHASH, SIG_NAME, SIG_RESOLVER};
use crate::contenthash::decode_content_hash;

/// ENS client configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EnsConfig {
    /// Ethereum RPC URL
    pub rpc_url: String,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
    /// ENS registry contract
    pub registry_address: String,
    /// Network name used for metadata-service avatar URLs
    pub network: Network,
}

impl Default for EnsConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_ETH_RPC_URL.into(),
            timeout_ms: DEFAULT_UPSTREAM_TIMEOUT_MS,
            registry_address: ENS_REGISTRY_ADDRESS.into(),
            network: Network::Mainnet,
        }
    }
}

impl EnsConfig {
    /// Creates a new configuration with the given RPC URL.
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            ..Default::default()
        }
    }

    /// Sets the request timeout.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

/// ENS client for forward, reverse and record lookups.
pub struct EnsClient {
    config: EnsConfig,
    http_client: reqwest::Client,
    next_id: AtomicU64,
}

impl EnsClient {
    /// Creates a new ENS client with default configuration.
    pub fn new(rpc_url: impl Into<String>) -> Result<Self> {
        Self::with_config(EnsConfig::new(rpc_url))
    }

    /// Creates a new ENS client with custom configuration.
    pub fn with_config(config: EnsConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| EnsApiError::HttpError(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            config,
            http_client,
            next_id: AtomicU64::new(1),
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &EnsConfig {
        &self.config
    }

    /// Resolves a name to its address.
    #[instrument(skip(self))]
    pub async fn resolve_address(&self, name: &str) -> Result<Option<EthAddress>> {
        let name = normalize_name(name)?;
        let node = abi::namehash(&name);

        let Some(resolver) = self.resolver_of(&node).await? else {
            debug!(name = %name, "No resolver set");
            return Ok(None);
        };

        let data = self
            .eth_call(&resolver, &abi::encode_node_call(SIG_ADDR, &node))
            .await?;
        abi::decode_address(&data)
    }

    /// Looks up the primary name of an address.
    ///
    /// The reverse record is only trusted if the name resolves back to the
    /// same address.
    #[instrument(skip(self))]
    pub async fn lookup_name(&self, address: &str) -> Result<Option<String>> {
        let address = EthAddress::from_hex(address)?;
        let reverse = format!("{}.{}", address.to_hex_label(), ENS_REVERSE_SUFFIX);
        let node = abi::namehash(&reverse);

        let Some(resolver) = self.resolver_of(&node).await? else {
            debug!(%address, "No reverse resolver set");
            return Ok(None);
        };

        let data = self
            .eth_call(&resolver, &abi::encode_node_call(SIG_NAME, &node))
            .await?;
        let Some(name) = abi::decode_string(&data)? else {
            return Ok(None);
        };

        match self.resolve_address(&name).await? {
            Some(forward) if forward == address => Ok(Some(name)),
            forward => {
                warn!(%address, name = %name, ?forward, "Reverse record does not resolve back");
                Ok(None)
            }
        }
    }

    /// Gets a specific text record for an ENS name.
    #[instrument(skip(self))]
    pub async fn get_text_record(&self, name: &str, key: &str) -> Result<Option<String>> {
        let name = normalize_name(name)?;
        let node = abi::namehash(&name);

        let Some(resolver) = self.resolver_of(&node).await? else {
            return Ok(None);
        };

        let data = self
            .eth_call(&resolver, &abi::encode_text_call(&node, key))
            .await?;
        abi::decode_string(&data)
    }

    /// Gets the decoded content hash of an ENS name.
    #[instrument(skip(self))]
    pub async fn get_content_hash(&self, name: &str) -> Result<Option<String>> {
        let name = normalize_name(name)?;
        let node = abi::namehash(&name);

        let Some(resolver) = self.resolver_of(&node).await? else {
            return Ok(None);
        };

        let data = self
            .eth_call(&resolver, &abi::encode_node_call(SIG_CONTENTHASH, &node))
            .await?;
        match abi::decode_bytes(&data)? {
            Some(raw) => decode_content_hash(&raw),
            None => Ok(None),
        }
    }

    /// Gets the avatar of an ENS name as an image URL.
    #[instrument(skip(self))]
    pub async fn get_avatar_url(&self, name: &str) -> Result<Option<String>> {
        let Some(record) = self.get_text_record(name, ENS_AVATAR_KEY).await? else {
            return Ok(None);
        };
        Ok(Some(avatar_image_url(&record, &normalize_name(name)?, self.config.network)))
    }

    /// Returns the resolver contract for a node, if one is set.
    async fn resolver_of(&self, node: &Node) -> Result<Option<String>> {
        let data = self
            .eth_call(
                &self.config.registry_address,
                &abi::encode_node_call(SIG_RESOLVER, node),
            )
            .await?;
        Ok(abi::decode_address(&data)?.map(|a| a.to_hex_string()))
    }

    /// Performs an `eth_call` against `to` and returns the raw return data.
    async fn eth_call(&self, to: &str, data: &str) -> Result<Vec<u8>> {
        let request = serde_json::json!({
            "jsonrpc": "2.0",
            "method": "eth_call",
            "params": [
                { "to": to, "data": data },
                "latest"
            ],
            "id": self.next_id.fetch_add(1, Ordering::Relaxed)
        });

        let response = self
            .http_client
            .post(&self.config.rpc_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| EnsApiError::HttpError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(EnsApiError::HttpError(format!(
                "RPC endpoint returned HTTP {}",
                response.status()
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| EnsApiError::HttpError(e.to_string()))?;

        if let Some(error) = json.get("error").filter(|e| !e.is_null()) {
            return Err(EnsApiError::RpcError(error.to_string()));
        }

        let result = json
            .get("result")
            .and_then(|v| v.as_str())
            .ok_or_else(|| EnsApiError::UnexpectedResponse("missing result".into()))?;

        Ok(hex::decode(result.strip_prefix("0x").unwrap_or(result))?)
    }
}

#[async_trait]
impl EnsLookup for EnsClient {
    async fn resolve_address_to_name(&self, address: &str) -> Result<Option<String>> {
        self.lookup_name(address).await
    }

    async fn resolve_name_to_address(&self, name: &str) -> Result<Option<String>> {
        Ok(self.resolve_address(name).await?.map(|a| a.to_hex_string()))
    }

    async fn avatar_url(&self, name: &str) -> Result<Option<String>> {
        self.get_avatar_url(name).await
    }

    async fn content_hash(&self, name: &str) -> Result<Option<String>> {
        self.get_content_hash(name).await
    }

    async fn text_record(&self, name: &str, key: &str) -> Result<Option<String>> {
        self.get_text_record(name, key).await
    }
}

/// Normalizes an ENS name (trim, lowercase, validate format).
fn normalize_name(name: &str) -> Result<String> {
    let normalized = name.trim().to_lowercase();

    if normalized.is_empty() {
        return Err(EnsApiError::ValidationError("ENS name cannot be empty".into()));
    }
    if normalized.split('.').any(str::is_empty) {
        return Err(EnsApiError::ValidationError(format!(
            "ENS name '{normalized}' has an empty label"
        )));
    }

    Ok(normalized)
}

/// Maps an ENSIP-12 avatar record to something an `<img>` can load.
///
/// URLs pass through; NFT references and anything else are rendered by the
/// ENS metadata service.
fn avatar_image_url(record: &str, name: &str, network: Network) -> String {
    let record = record.trim();
    let lower = record.to_ascii_lowercase();

    if ["https://", "http://", "ipfs://", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
    {
        record.to_string()
    } else {
        format!("{ENS_METADATA_URL}/{network}/avatar/{name}")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::abi::{encode_address_word, encode_dynamic_return, encode_text_call};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

    const RESOLVER: &str = "0x231b0ee14048e9dccd1d247744d114a4eb5e8e63";
    const VITALIK: &str = "0xd8da6bf26964af9d7eed9e03e53415d37aa96045";

    /// Answers `eth_call`s from a table keyed by (to, data).
    #[derive(Default)]
    struct FakeChain {
        calls: HashMap<(String, String), String>,
    }

    impl FakeChain {
        fn on(mut self, to: &str, data: String, result: &[u8]) -> Self {
            self.calls
                .insert((to.to_lowercase(), data), format!("0x{}", hex::encode(result)));
            self
        }

        fn with_resolver(self, name: &str) -> Self {
            let node = abi::namehash(name);
            let resolver = EthAddress::from_hex(RESOLVER).unwrap();
            self.on(
                ENS_REGISTRY_ADDRESS,
                abi::encode_node_call(SIG_RESOLVER, &node),
                &encode_address_word(&resolver),
            )
        }

        fn with_addr(self, name: &str, address: &str) -> Self {
            let node = abi::namehash(name);
            let address = EthAddress::from_hex(address).unwrap();
            self.with_resolver(name).on(
                RESOLVER,
                abi::encode_node_call(SIG_ADDR, &node),
                &encode_address_word(&address),
            )
        }

        fn with_reverse(self, address: &str, name: &str) -> Self {
            let reverse = format!("{}.addr.reverse", &address[2..]);
            let node = abi::namehash(&reverse);
            self.with_resolver(&reverse).on(
                RESOLVER,
                abi::encode_node_call(SIG_NAME, &node),
                &encode_dynamic_return(name.as_bytes()),
            )
        }

        fn with_text(self, name: &str, key: &str, value: &str) -> Self {
            let node = abi::namehash(name);
            self.with_resolver(name).on(
                RESOLVER,
                encode_text_call(&node, key),
                &encode_dynamic_return(value.as_bytes()),
            )
        }

        fn with_contenthash(self, name: &str, raw: &[u8]) -> Self {
            let node = abi::namehash(name);
            self.with_resolver(name).on(
                RESOLVER,
                abi::encode_node_call(SIG_CONTENTHASH, &node),
                &encode_dynamic_return(raw),
            )
        }
    }

    impl Respond for FakeChain {
        fn respond(&self, request: &Request) -> ResponseTemplate {
            let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
            let call = &body["params"][0];
            let key = (
                call["to"].as_str().unwrap().to_lowercase(),
                call["data"].as_str().unwrap().to_string(),
            );
            let result = self.calls.get(&key).cloned().unwrap_or_else(|| "0x".into());

            ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "jsonrpc": "2.0",
                "id": body["id"],
                "result": result,
            }))
        }
    }

    async fn client_with(chain: FakeChain) -> (MockServer, EnsClient) {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(chain)
            .mount(&server)
            .await;
        let client = EnsClient::new(server.uri()).unwrap();
        (server, client)
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("Alice.eth").unwrap(), "alice.eth");
        assert_eq!(normalize_name("  BOB.ETH  ").unwrap(), "bob.eth");
        assert!(normalize_name("").is_err());
        assert!(normalize_name("a..eth").is_err());
    }

    #[test]
    fn test_avatar_image_url() {
        assert_eq!(
            avatar_image_url("https://example.com/a.png", "a.eth", Network::Mainnet),
            "https://example.com/a.png"
        );
        assert_eq!(
            avatar_image_url("ipfs://ipfs/QmAvatar", "a.eth", Network::Mainnet),
            "ipfs://ipfs/QmAvatar"
        );
        assert_eq!(
            avatar_image_url(
                "eip155:1/erc721:0xb7f7f6c52f2e2fdb1963eab30438024864c313f6/2430",
                "vitalik.eth",
                Network::Mainnet
            ),
            "https://metadata.ens.domains/mainnet/avatar/vitalik.eth"
        );
    }

    #[tokio::test]
    async fn test_resolve_address() {
        let (_server, client) = client_with(FakeChain::default().with_addr("vitalik.eth", VITALIK)).await;

        let address = client.resolve_address("Vitalik.eth").await.unwrap();
        assert_eq!(address.unwrap().to_hex_string(), VITALIK);
    }

    #[tokio::test]
    async fn test_resolve_address_without_resolver() {
        let (_server, client) = client_with(FakeChain::default()).await;
        assert!(client.resolve_address("nobody.eth").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_lookup_name_verified() {
        let chain = FakeChain::default()
            .with_reverse(VITALIK, "vitalik.eth")
            .with_addr("vitalik.eth", VITALIK);
        let (_server, client) = client_with(chain).await;

        let name = client.lookup_name(VITALIK).await.unwrap();
        assert_eq!(name.as_deref(), Some("vitalik.eth"));
    }

    #[tokio::test]
    async fn test_lookup_name_rejects_unverified() {
        let other = "0x1111111111111111111111111111111111111111";
        let chain = FakeChain::default()
            .with_reverse(VITALIK, "vitalik.eth")
            .with_addr("vitalik.eth", other);
        let (_server, client) = client_with(chain).await;

        assert!(client.lookup_name(VITALIK).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_text_record() {
        let chain = FakeChain::default().with_text("jango.eth", "juicebox_project_id", "55");
        let (_server, client) = client_with(chain).await;

        let value = client
            .get_text_record("jango.eth", "juicebox_project_id")
            .await
            .unwrap();
        assert_eq!(value.as_deref(), Some("55"));

        let missing = client.get_text_record("jango.eth", "url").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_content_hash() {
        let raw = hex::decode(
            "e3010170122029f2d17be6139079dc48696d1f582a8530eb9805b561eda517e22a892c7e3f1f",
        )
        .unwrap();
        let chain = FakeChain::default().with_contenthash("site.eth", &raw);
        let (_server, client) = client_with(chain).await;

        let url = client.get_content_hash("site.eth").await.unwrap();
        assert_eq!(
            url.as_deref(),
            Some("ipfs://QmRAQB6YaCyidP37UdDnjFY5vQuiBrcqdyoW1CuDgwxkD4")
        );
    }

    #[tokio::test]
    async fn test_avatar_url_via_trait() {
        let chain = FakeChain::default().with_text("vitalik.eth", "avatar", "ipfs://ipfs/QmAvatar");
        let (_server, client) = client_with(chain).await;

        let lookup: &dyn EnsLookup = &client;
        let avatar = lookup.avatar_url("vitalik.eth").await.unwrap();
        assert_eq!(avatar.as_deref(), Some("ipfs://ipfs/QmAvatar"));
    }

    #[tokio::test]
    async fn test_rpc_error_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "jsonrpc": "2.0",
                "id": 1,
                "error": { "code": -32000, "message": "execution reverted" }
            })))
            .mount(&server)
            .await;
        let client = EnsClient::new(server.uri()).unwrap();

        let err = client.resolve_address("vitalik.eth").await.unwrap_err();
        assert!(matches!(err, EnsApiError::RpcError(_)));
    }
}
