//! Identity resolution: merges ENS lookups into one [`ResolutionResult`].
//!
//! Every upstream call is best-effort. A failure or timeout leaves its field
//! empty and is logged; the merged result is always produced.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use ensapi_core::constants::{DEFAULT_PROJECT_ID_KEY, DEFAULT_UPSTREAM_TIMEOUT_MS};
use ensapi_core::error::{EnsApiError, Result};
use ensapi_core::traits::{DomainIndex, EnsLookup};
use ensapi_core::types::{
    normalize_address, rewrite_ipfs_gateway, Network, Query, QueryKind, ResolutionResult,
};

/// Resolver configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Budget for each upstream call in milliseconds
    pub call_timeout_ms: u64,
    /// Text record key surfaced as `juiceboxProjectID`
    pub project_id_key: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            call_timeout_ms: DEFAULT_UPSTREAM_TIMEOUT_MS,
            project_id_key: DEFAULT_PROJECT_ID_KEY.into(),
        }
    }
}

/// Per-request options for [`IdentityResolver::resolve_query`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Also list the names owned by the resolved address (mainnet index).
    pub include_domains: bool,
}

/// Record lookups that only depend on a known name.
#[derive(Default)]
struct NameRecords {
    avatar: Option<String>,
    content_hash: Option<String>,
    project_id: Option<String>,
}

impl NameRecords {
    fn apply(self, result: &mut ResolutionResult) {
        result.avatar = self.avatar.map(|url| rewrite_ipfs_gateway(&url));
        result.content_hash = self.content_hash;
        result.custom_project_id = self.project_id;
    }
}

/// Resolves names and addresses against an [`EnsLookup`] and a [`DomainIndex`].
pub struct IdentityResolver {
    ens: Arc<dyn EnsLookup>,
    index: Arc<dyn DomainIndex>,
    config: ResolverConfig,
}

impl IdentityResolver {
    /// Creates a resolver over the given collaborators.
    pub fn new(
        ens: Arc<dyn EnsLookup>,
        index: Arc<dyn DomainIndex>,
        config: ResolverConfig,
    ) -> Self {
        Self { ens, index, config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolves a raw query with default options.
    pub async fn resolve(&self, raw: &str) -> ResolutionResult {
        self.resolve_query(&Query::parse(raw), ResolveOptions::default())
            .await
    }

    /// Resolves a classified query.
    ///
    /// Address queries go through reverse resolution first, since the
    /// records hang off the name. Name queries fetch the address and the
    /// records concurrently.
    #[instrument(skip(self, query), fields(query = %query))]
    pub async fn resolve_query(&self, query: &Query, options: ResolveOptions) -> ResolutionResult {
        let mut result = ResolutionResult::new();

        match query.kind() {
            QueryKind::Address => {
                let address = query.normalized().to_string();
                let name = self
                    .best_effort("name", self.ens.resolve_address_to_name(&address))
                    .await
                    .map(|name| name.trim().to_lowercase())
                    .filter(|name| !name.is_empty());

                if let Some(name) = &name {
                    self.fetch_records(name).await.apply(&mut result);
                }
                result.address = Some(address);
                result.name = name;
            }
            QueryKind::Name => {
                let name = query.normalized();
                let (address, records) = tokio::join!(
                    self.forward_address(name),
                    self.fetch_records(name)
                );

                records.apply(&mut result);
                result.address = address;
                result.name = Some(name.to_string());
            }
            QueryKind::Unknown => {
                debug!("Query is neither a name nor an address");
            }
        }

        if options.include_domains {
            if let Some(address) = &result.address {
                result.domain_list = self.names_for_address(address, Network::Mainnet).await;
            }
        }

        result.fill_display_name();
        result
    }

    /// Lists the names owned by an address, or by the address a name resolves to.
    ///
    /// Never fails: anything that goes wrong yields an empty list.
    #[instrument(skip(self))]
    pub async fn list_owned_names(&self, raw: &str, network: Network) -> Vec<String> {
        let query = Query::parse(raw);

        let address = match query.kind() {
            QueryKind::Address => query.normalized().to_string(),
            QueryKind::Name => match self.forward_address(query.normalized()).await {
                Some(address) => address,
                None => {
                    debug!("Name does not resolve, nothing to list");
                    return Vec::new();
                }
            },
            QueryKind::Unknown => return Vec::new(),
        };

        self.names_for_address(&address, network).await
    }

    async fn names_for_address(&self, address: &str, network: Network) -> Vec<String> {
        let lookup = async {
            self.index
                .names_owned_by(address, network)
                .await
                .map(Some)
        };
        self.best_effort("domainList", lookup)
            .await
            .unwrap_or_default()
    }

    /// Forward resolution, normalized to lowercase `0x` hex.
    async fn forward_address(&self, name: &str) -> Option<String> {
        let raw = self
            .best_effort("address", self.ens.resolve_name_to_address(name))
            .await?;

        match normalize_address(&raw) {
            Ok(address) => Some(address),
            Err(e) => {
                warn!(name, raw = %raw, error = %e, "Resolver returned a malformed address");
                None
            }
        }
    }

    async fn fetch_records(&self, name: &str) -> NameRecords {
        let (avatar, content_hash, project_id) = tokio::join!(
            self.best_effort("avatar", self.ens.avatar_url(name)),
            self.best_effort("contentHash", self.ens.content_hash(name)),
            self.best_effort(
                "juiceboxProjectID",
                self.ens.text_record(name, &self.config.project_id_key)
            ),
        );

        NameRecords {
            avatar,
            content_hash,
            project_id,
        }
    }

    /// Runs one upstream call under the per-call budget, degrading any
    /// failure to `None`.
    async fn best_effort<T, F>(&self, field: &'static str, call: F) -> Option<T>
    where
        F: Future<Output = Result<Option<T>>>,
    {
        let millis = self.config.call_timeout_ms;

        match tokio::time::timeout(Duration::from_millis(millis), call).await {
            Ok(Ok(value)) => value,
            Ok(Err(e)) => {
                warn!(field, error = %e, recoverable = e.is_recoverable(), "Lookup failed");
                None
            }
            Err(_) => {
                let e = EnsApiError::Timeout {
                    operation: field.into(),
                    millis,
                };
                warn!(field, error = %e, "Lookup timed out");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;

    const VITALIK: &str = "0xd8da6bf26964af9d7eed9e03e53415d37aa96045";
    const JANGO: &str = "0xe7879a2d05dba966fcca34ee9c3f99eee7edefd1";

    /// In-memory ENS with a consistent forward/reverse view.
    #[derive(Default)]
    struct MockEns {
        addresses: HashMap<String, String>,
        texts: HashMap<(String, String), String>,
        content_hashes: HashMap<String, String>,
        avatars: HashMap<String, String>,
    }

    impl MockEns {
        fn fixtures() -> Self {
            let mut ens = Self::default();
            ens.addresses.insert("vitalik.eth".into(), VITALIK.to_uppercase().replacen("0X", "0x", 1));
            ens.addresses.insert("jango.eth".into(), JANGO.into());
            ens.texts.insert(
                ("jango.eth".into(), DEFAULT_PROJECT_ID_KEY.into()),
                "55".into(),
            );
            ens.avatars
                .insert("vitalik.eth".into(), "ipfs://ipfs/QmAvatar".into());
            ens.content_hashes
                .insert("vitalik.eth".into(), "ipfs://QmSite".into());
            ens
        }
    }

    #[async_trait]
    impl EnsLookup for MockEns {
        async fn resolve_address_to_name(&self, address: &str) -> Result<Option<String>> {
            Ok(self
                .addresses
                .iter()
                .find(|(_, a)| a.to_lowercase() == address)
                .map(|(name, _)| name.clone()))
        }

        async fn resolve_name_to_address(&self, name: &str) -> Result<Option<String>> {
            Ok(self.addresses.get(name).cloned())
        }

        async fn avatar_url(&self, name: &str) -> Result<Option<String>> {
            Ok(self.avatars.get(name).cloned())
        }

        async fn content_hash(&self, name: &str) -> Result<Option<String>> {
            Ok(self.content_hashes.get(name).cloned())
        }

        async fn text_record(&self, name: &str, key: &str) -> Result<Option<String>> {
            Ok(self.texts.get(&(name.into(), key.into())).cloned())
        }
    }

    /// Reverse records come back padded and mixed-case; everything else
    /// defers to the fixtures.
    struct UntidyReverseEns(MockEns);

    #[async_trait]
    impl EnsLookup for UntidyReverseEns {
        async fn resolve_address_to_name(&self, address: &str) -> Result<Option<String>> {
            Ok(match address {
                JANGO => Some(" Jango.ETH\n".into()),
                VITALIK => Some("   ".into()),
                _ => None,
            })
        }

        async fn resolve_name_to_address(&self, name: &str) -> Result<Option<String>> {
            self.0.resolve_name_to_address(name).await
        }

        async fn avatar_url(&self, name: &str) -> Result<Option<String>> {
            self.0.avatar_url(name).await
        }

        async fn content_hash(&self, name: &str) -> Result<Option<String>> {
            self.0.content_hash(name).await
        }

        async fn text_record(&self, name: &str, key: &str) -> Result<Option<String>> {
            self.0.text_record(name, key).await
        }
    }

    /// Every call fails.
    struct FailingEns;

    #[async_trait]
    impl EnsLookup for FailingEns {
        async fn resolve_address_to_name(&self, _: &str) -> Result<Option<String>> {
            Err(EnsApiError::HttpError("connection refused".into()))
        }

        async fn resolve_name_to_address(&self, _: &str) -> Result<Option<String>> {
            Err(EnsApiError::RpcError("execution reverted".into()))
        }

        async fn avatar_url(&self, _: &str) -> Result<Option<String>> {
            Err(EnsApiError::HttpError("connection refused".into()))
        }

        async fn content_hash(&self, _: &str) -> Result<Option<String>> {
            Err(EnsApiError::InvalidContentHash("garbage".into()))
        }

        async fn text_record(&self, _: &str, _: &str) -> Result<Option<String>> {
            Err(EnsApiError::HttpError("connection refused".into()))
        }
    }

    /// Forward resolution works, everything else hangs.
    struct SlowEns;

    #[async_trait]
    impl EnsLookup for SlowEns {
        async fn resolve_address_to_name(&self, _: &str) -> Result<Option<String>> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(None)
        }

        async fn resolve_name_to_address(&self, _: &str) -> Result<Option<String>> {
            Ok(Some(VITALIK.into()))
        }

        async fn avatar_url(&self, _: &str) -> Result<Option<String>> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Some("https://never.example".into()))
        }

        async fn content_hash(&self, _: &str) -> Result<Option<String>> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(None)
        }

        async fn text_record(&self, _: &str, _: &str) -> Result<Option<String>> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(None)
        }
    }

    #[derive(Default)]
    struct MockIndex {
        names: HashMap<String, Vec<String>>,
        fail: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl DomainIndex for MockIndex {
        async fn names_owned_by(&self, address: &str, _network: Network) -> Result<Vec<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(EnsApiError::UnexpectedResponse("missing data.domains".into()));
            }
            Ok(self.names.get(address).cloned().unwrap_or_default())
        }
    }

    fn resolver_with(ens: impl EnsLookup + 'static, index: Arc<MockIndex>) -> IdentityResolver {
        IdentityResolver::new(Arc::new(ens), index, ResolverConfig::default())
    }

    fn fixtures() -> (IdentityResolver, Arc<MockIndex>) {
        let mut index = MockIndex::default();
        index.names.insert(
            VITALIK.into(),
            vec!["vitalik.eth".into(), "vbuterin.eth".into()],
        );
        let index = Arc::new(index);
        (resolver_with(MockEns::fixtures(), index.clone()), index)
    }

    #[tokio::test]
    async fn test_resolve_name() {
        let (resolver, _) = fixtures();
        let result = resolver.resolve("vitalik.eth").await;

        assert_eq!(result.address.as_deref(), Some(VITALIK));
        assert_eq!(result.name.as_deref(), Some("vitalik.eth"));
        assert_eq!(result.display_name.as_deref(), Some("vitalik.eth"));
        assert_eq!(
            result.avatar.as_deref(),
            Some("https://ipfs.io/ipfs/QmAvatar")
        );
        assert_eq!(result.content_hash.as_deref(), Some("ipfs://QmSite"));
        assert!(result.domain_list.is_empty());
    }

    #[tokio::test]
    async fn test_resolve_name_is_case_insensitive() {
        let (resolver, _) = fixtures();
        let result = resolver.resolve("  Vitalik.ETH ").await;
        assert_eq!(result.name.as_deref(), Some("vitalik.eth"));
        assert!(result.address.unwrap().contains("6045"));
    }

    #[tokio::test]
    async fn test_resolve_custom_project_id() {
        let (resolver, _) = fixtures();
        let result = resolver.resolve("jango.eth").await;
        assert_eq!(result.custom_project_id.as_deref(), Some("55"));
        assert_eq!(result.address.as_deref(), Some(JANGO));
    }

    #[tokio::test]
    async fn test_resolve_address() {
        let (resolver, _) = fixtures();
        let result = resolver.resolve(JANGO).await;

        assert_eq!(result.address.as_deref(), Some(JANGO));
        assert_eq!(result.name.as_deref(), Some("jango.eth"));
        assert_eq!(result.custom_project_id.as_deref(), Some("55"));
    }

    #[tokio::test]
    async fn test_reverse_name_is_normalized() {
        let resolver = resolver_with(
            UntidyReverseEns(MockEns::fixtures()),
            Arc::new(MockIndex::default()),
        );

        let result = resolver.resolve(JANGO).await;
        assert_eq!(result.name.as_deref(), Some("jango.eth"));
        assert_eq!(result.display_name.as_deref(), Some("jango.eth"));
        assert_eq!(result.custom_project_id.as_deref(), Some("55"));

        let result = resolver.resolve(VITALIK).await;
        assert!(result.name.is_none());
        assert!(!result.has_records());
    }

    #[tokio::test]
    async fn test_resolve_address_without_name() {
        let (resolver, _) = fixtures();
        let address = "0x1111111111111111111111111111111111111111";
        let result = resolver.resolve(address).await;

        assert_eq!(result.address.as_deref(), Some(address));
        assert!(result.name.is_none());
        assert_eq!(result.display_name.as_deref(), Some("0x111…1111"));
        assert!(!result.has_records());
    }

    #[tokio::test]
    async fn test_round_trip() {
        let (resolver, _) = fixtures();
        let forward = resolver.resolve("vitalik.eth").await;
        let reverse = resolver.resolve(forward.address.as_deref().unwrap()).await;
        let again = resolver.resolve(reverse.name.as_deref().unwrap()).await;

        assert_eq!(reverse.name.as_deref(), Some("vitalik.eth"));
        assert_eq!(again.address, forward.address);
    }

    #[tokio::test]
    async fn test_unknown_query_is_all_null() {
        let (resolver, index) = fixtures();
        let result = resolver
            .resolve_query(
                &Query::parse("hello"),
                ResolveOptions {
                    include_domains: true,
                },
            )
            .await;

        assert_eq!(result, ResolutionResult::new());
        assert_eq!(index.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failures_degrade_to_nulls() {
        let resolver = resolver_with(FailingEns, Arc::new(MockIndex::default()));

        let by_name = resolver.resolve("vitalik.eth").await;
        assert_eq!(by_name.name.as_deref(), Some("vitalik.eth"));
        assert!(by_name.address.is_none());
        assert!(!by_name.has_records());

        let by_address = resolver.resolve(VITALIK).await;
        assert_eq!(by_address.address.as_deref(), Some(VITALIK));
        assert!(by_address.name.is_none());
        assert_eq!(by_address.display_name.as_deref(), Some("0xd8d…6045"));
    }

    #[tokio::test]
    async fn test_slow_calls_time_out() {
        let resolver = IdentityResolver::new(
            Arc::new(SlowEns),
            Arc::new(MockIndex::default()),
            ResolverConfig {
                call_timeout_ms: 50,
                ..Default::default()
            },
        );

        let result = resolver.resolve("vitalik.eth").await;
        assert_eq!(result.address.as_deref(), Some(VITALIK));
        assert!(result.avatar.is_none());

        let result = resolver.resolve(VITALIK).await;
        assert!(result.name.is_none());
    }

    #[tokio::test]
    async fn test_include_domains() {
        let (resolver, _) = fixtures();
        let result = resolver
            .resolve_query(
                &Query::parse("vitalik.eth"),
                ResolveOptions {
                    include_domains: true,
                },
            )
            .await;

        assert_eq!(result.domain_list, vec!["vitalik.eth", "vbuterin.eth"]);
    }

    #[tokio::test]
    async fn test_list_by_address_and_name() {
        let (resolver, _) = fixtures();

        let by_address = resolver.list_owned_names(VITALIK, Network::Mainnet).await;
        assert_eq!(by_address, vec!["vitalik.eth", "vbuterin.eth"]);

        let by_name = resolver
            .list_owned_names("vitalik.eth", Network::Mainnet)
            .await;
        assert_eq!(by_name, by_address);
    }

    #[tokio::test]
    async fn test_list_empty_cases() {
        let (resolver, index) = fixtures();

        assert!(resolver
            .list_owned_names("nobody.eth", Network::Mainnet)
            .await
            .is_empty());
        assert!(resolver
            .list_owned_names("not-a-query", Network::Mainnet)
            .await
            .is_empty());
        assert_eq!(index.calls.load(Ordering::SeqCst), 0);

        assert!(resolver
            .list_owned_names(JANGO, Network::Goerli)
            .await
            .is_empty());
        assert_eq!(index.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_list_index_failure_is_empty() {
        let index = Arc::new(MockIndex {
            fail: true,
            ..Default::default()
        });
        let resolver = resolver_with(MockEns::fixtures(), index);

        assert!(resolver
            .list_owned_names(VITALIK, Network::Mainnet)
            .await
            .is_empty());
    }
}
