//! Subgraph client implementation.
//!
//! Sends the `getNamesFromSubgraph` query the ENS manager app uses and
//! extracts `data.domains[].name` from the response.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

use ensapi_core::constants::{
    DEFAULT_UPSTREAM_TIMEOUT_MS, SUBGRAPH_PAGE_SIZE, SUBGRAPH_URL_GOERLI, SUBGRAPH_URL_MAINNET,
    SUBGRAPH_URL_SEPOLIA,
};
use ensapi_core::error::{EnsApiError, Result};
use ensapi_core::traits::DomainIndex;
use ensapi_core::types::Network;

const OPERATION_NAME: &str = "getNamesFromSubgraph";

const ENS_APP_ORIGIN: &str = "https://app.ens.domains";

/// Subgraph client configuration.
///
/// A network without an endpoint is not served: queries against it fail
/// with a configuration error instead of falling back to another network.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SubgraphConfig {
    /// Mainnet endpoint
    pub mainnet_url: Option<String>,
    /// Goerli endpoint
    pub goerli_url: Option<String>,
    /// Sepolia endpoint
    pub sepolia_url: Option<String>,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for SubgraphConfig {
    fn default() -> Self {
        Self {
            mainnet_url: Some(SUBGRAPH_URL_MAINNET.into()),
            goerli_url: Some(SUBGRAPH_URL_GOERLI.into()),
            sepolia_url: Some(SUBGRAPH_URL_SEPOLIA.into()),
            timeout_ms: DEFAULT_UPSTREAM_TIMEOUT_MS,
        }
    }
}

impl SubgraphConfig {
    /// Creates a config serving a single network from `url`.
    pub fn single(network: Network, url: impl Into<String>) -> Self {
        let mut config = Self {
            mainnet_url: None,
            goerli_url: None,
            sepolia_url: None,
            ..Default::default()
        };
        *config.endpoint_slot(network) = Some(url.into());
        config
    }

    /// Overrides the endpoint for one network.
    pub fn with_endpoint(mut self, network: Network, url: impl Into<String>) -> Self {
        *self.endpoint_slot(network) = Some(url.into());
        self
    }

    /// Returns the validated endpoint URL for `network`.
    pub fn endpoint(&self, network: Network) -> Result<Url> {
        let raw = match network {
            Network::Mainnet => self.mainnet_url.as_deref(),
            Network::Goerli => self.goerli_url.as_deref(),
            Network::Sepolia => self.sepolia_url.as_deref(),
        }
        .ok_or_else(|| {
            EnsApiError::ConfigError(format!("no subgraph endpoint configured for {network}"))
        })?;

        let url = Url::parse(raw)
            .map_err(|e| EnsApiError::ConfigError(format!("invalid subgraph URL '{raw}': {e}")))?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(EnsApiError::ConfigError(format!(
                "unsupported subgraph URL scheme '{scheme}'"
            ))),
        }
    }

    fn endpoint_slot(&mut self, network: Network) -> &mut Option<String> {
        match network {
            Network::Mainnet => &mut self.mainnet_url,
            Network::Goerli => &mut self.goerli_url,
            Network::Sepolia => &mut self.sepolia_url,
        }
    }
}

/// Client for the ENS domain-ownership subgraph.
pub struct SubgraphClient {
    config: SubgraphConfig,
    http_client: reqwest::Client,
}

impl SubgraphClient {
    /// Creates a client with default endpoints.
    pub fn new() -> Result<Self> {
        Self::with_config(SubgraphConfig::default())
    }

    /// Creates a client with custom configuration.
    pub fn with_config(config: SubgraphConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| EnsApiError::HttpError(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SubgraphConfig {
        &self.config
    }

    /// Fetches up to [`SUBGRAPH_PAGE_SIZE`] names owned by `address`.
    #[instrument(skip(self))]
    pub async fn names_owned_by(&self, address: &str, network: Network) -> Result<Vec<String>> {
        let url = self.config.endpoint(network)?;
        let owner = address.trim().to_lowercase();

        let response = self
            .http_client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(reqwest::header::ORIGIN, ENS_APP_ORIGIN)
            .header(reqwest::header::REFERER, format!("{ENS_APP_ORIGIN}/"))
            .json(&build_request(&owner))
            .send()
            .await
            .map_err(|e| EnsApiError::HttpError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(EnsApiError::HttpError(format!(
                "subgraph returned HTTP {}",
                response.status()
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| EnsApiError::UnexpectedResponse(e.to_string()))?;

        let names = extract_names(&json)?;
        debug!(owner = %owner, %network, count = names.len(), "Fetched names from subgraph");
        Ok(names)
    }
}

#[async_trait]
impl DomainIndex for SubgraphClient {
    async fn names_owned_by(&self, address: &str, network: Network) -> Result<Vec<String>> {
        SubgraphClient::names_owned_by(self, address, network).await
    }
}

/// Builds the GraphQL request body.
fn build_request(owner: &str) -> serde_json::Value {
    let query = format!(
        "query {OPERATION_NAME}($address: String!) {{\n  \
         domains(first: {SUBGRAPH_PAGE_SIZE}, where: {{owner: $address}}) {{\n    \
         name\n  }}\n}}"
    );

    serde_json::json!({
        "operationName": OPERATION_NAME,
        "variables": { "address": owner },
        "query": query,
    })
}

#[derive(Debug, Deserialize)]
struct DomainEntry {
    name: Option<String>,
}

/// Pulls `data.domains[].name` out of a GraphQL response, preserving order.
fn extract_names(json: &serde_json::Value) -> Result<Vec<String>> {
    if let Some(errors) = json.get("errors").filter(|e| !e.is_null()) {
        return Err(EnsApiError::UnexpectedResponse(format!(
            "subgraph errors: {errors}"
        )));
    }

    let domains = json
        .get("data")
        .and_then(|d| d.get("domains"))
        .ok_or_else(|| EnsApiError::UnexpectedResponse("missing data.domains".into()))?;

    let entries: Vec<DomainEntry> = serde_json::from_value(domains.clone())
        .map_err(|e| EnsApiError::UnexpectedResponse(format!("malformed domains: {e}")))?;

    Ok(entries.into_iter().filter_map(|d| d.name).collect())
}
