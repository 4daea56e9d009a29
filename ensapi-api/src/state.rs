//! App state: configuration and the identity resolver.

use std::net::SocketAddr;
use std::sync::Arc;

use ensapi_core::constants::{
    DEFAULT_BIND_ADDR, DEFAULT_ETH_RPC_URL, DEFAULT_PROJECT_ID_KEY, DEFAULT_UPSTREAM_TIMEOUT_MS,
};
use ensapi_core::error::{EnsApiError, Result};
use ensapi_core::traits::{DomainIndex, EnsLookup};
use ensapi_core::types::Network;
use ensapi_ens::{EnsClient, EnsConfig, IdentityResolver, ResolverConfig};
use ensapi_subgraph::{SubgraphClient, SubgraphConfig};

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Listen address
    pub bind_addr: SocketAddr,
    /// Ethereum JSON-RPC endpoint
    pub rpc_url: String,
    /// Subgraph endpoints per network
    pub subgraph: SubgraphConfig,
    /// Budget for each upstream call in milliseconds
    pub upstream_timeout_ms: u64,
    /// Text record key surfaced as `juiceboxProjectID`
    pub project_id_key: String,
    /// Answer 404 when a resolve finds nothing
    pub strict_not_found: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8721)),
            rpc_url: DEFAULT_ETH_RPC_URL.into(),
            subgraph: SubgraphConfig::default(),
            upstream_timeout_ms: DEFAULT_UPSTREAM_TIMEOUT_MS,
            project_id_key: DEFAULT_PROJECT_ID_KEY.into(),
            strict_not_found: false,
        }
    }
}

impl ApiConfig {
    /// Loads `.env` if present, then reads the environment.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from a variable lookup. Unset variables keep their
    /// defaults; malformed ones are rejected.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let bind_addr = lookup("ENS_API_BIND")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.into())
            .parse()
            .map_err(|e| EnsApiError::ConfigError(format!("invalid ENS_API_BIND: {e}")))?;

        let upstream_timeout_ms = match lookup("UPSTREAM_TIMEOUT_MS") {
            Some(raw) => raw.trim().parse().map_err(|e| {
                EnsApiError::ConfigError(format!("invalid UPSTREAM_TIMEOUT_MS '{raw}': {e}"))
            })?,
            None => defaults.upstream_timeout_ms,
        };

        let strict_not_found = match lookup("ENS_API_STRICT_NOT_FOUND") {
            Some(raw) => parse_flag(&raw)?,
            None => false,
        };

        let mut subgraph = SubgraphConfig {
            timeout_ms: upstream_timeout_ms,
            ..defaults.subgraph
        };
        for (network, key) in [
            (Network::Mainnet, "ENS_SUBGRAPH_MAINNET"),
            (Network::Goerli, "ENS_SUBGRAPH_GOERLI"),
            (Network::Sepolia, "ENS_SUBGRAPH_SEPOLIA"),
        ] {
            if let Some(url) = lookup(key) {
                subgraph = subgraph.with_endpoint(network, url);
            }
        }

        Ok(Self {
            bind_addr,
            rpc_url: lookup("ETH_RPC_URL").unwrap_or(defaults.rpc_url),
            subgraph,
            upstream_timeout_ms,
            project_id_key: lookup("ENS_PROJECT_ID_KEY").unwrap_or(defaults.project_id_key),
            strict_not_found,
        })
    }

    fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            call_timeout_ms: self.upstream_timeout_ms,
            project_id_key: self.project_id_key.clone(),
        }
    }
}

fn parse_flag(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(EnsApiError::ConfigError(format!(
            "invalid ENS_API_STRICT_NOT_FOUND '{other}'"
        ))),
    }
}

/// Shared, immutable request state.
pub struct AppState {
    /// Server configuration
    pub config: ApiConfig,
    /// Identity resolver
    pub resolver: IdentityResolver,
}

impl AppState {
    /// Builds the live JSON-RPC and subgraph clients from `config`.
    pub fn new(config: ApiConfig) -> Result<Self> {
        let ens = EnsClient::with_config(
            EnsConfig::new(&config.rpc_url).with_timeout_ms(config.upstream_timeout_ms),
        )?;
        let index = SubgraphClient::with_config(config.subgraph.clone())?;

        Ok(Self::with_collaborators(config, Arc::new(ens), Arc::new(index)))
    }

    /// Builds state over arbitrary lookup and index implementations.
    pub fn with_collaborators(
        config: ApiConfig,
        ens: Arc<dyn EnsLookup>,
        index: Arc<dyn DomainIndex>,
    ) -> Self {
        let resolver = IdentityResolver::new(ens, index, config.resolver_config());
        Self { config, resolver }
    }
}
