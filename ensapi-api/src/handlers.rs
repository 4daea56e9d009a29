//! API route handlers.

use std::sync::{Arc, OnceLock};
use std::time::Instant;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderName, HeaderValue},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use ensapi_core::constants::CDN_CACHE_CONTROL_VALUE;
use ensapi_core::types::{Network, Query as EnsQuery};
use ensapi_ens::ResolveOptions;

use crate::error::ApiError;
use crate::state::AppState;

type Result<T> = std::result::Result<T, ApiError>;

static START_TIME: OnceLock<Instant> = OnceLock::new();

const CDN_CACHE_CONTROL: HeaderName = HeaderName::from_static("cdn-cache-control");

const INDEX_HTML: &str = "ENS API maintained by <a href='https://planetable.xyz'>Planetable</a>";

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status
    pub status: String,
    /// Version
    pub version: String,
    /// Uptime in seconds
    pub uptime_seconds: u64,
}

/// Query string of `/ens/resolve/:query`.
#[derive(Debug, Default, Deserialize)]
pub struct ResolveParams {
    /// Also list the names owned by the resolved address
    #[serde(default)]
    pub domains: bool,
}

/// GET /
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    let start = START_TIME.get_or_init(Instant::now);

    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        uptime_seconds: start.elapsed().as_secs(),
    })
}

/// GET /ens/resolve/:query
///
/// Always answers 200 with a best-effort record, unless strict not-found is
/// enabled and neither an address nor any record was found. A malformed
/// `domains` flag reads as off. Only a successful record carries the CDN
/// cache hint.
pub async fn resolve(
    State(state): State<Arc<AppState>>,
    Path(raw): Path<String>,
    params: Option<Query<ResolveParams>>,
) -> Result<Response> {
    let query = EnsQuery::parse(&raw);
    let options = ResolveOptions {
        include_domains: params.is_some_and(|Query(p)| p.domains),
    };

    let result = state.resolver.resolve_query(&query, options).await;

    if state.config.strict_not_found && result.address.is_none() && !result.has_records() {
        debug!(query = %query, "Nothing resolved");
        return Err(ApiError::not_found(format!(
            "nothing resolves for '{}'",
            query.normalized()
        )));
    }

    let body = result.to_pretty_json()?;
    let headers = [
        (header::CONTENT_TYPE, HeaderValue::from_static("application/json")),
        (CDN_CACHE_CONTROL, HeaderValue::from_static(CDN_CACHE_CONTROL_VALUE)),
    ];
    Ok((headers, body).into_response())
}

/// GET /ens/list/:addr
pub async fn list_mainnet(
    State(state): State<Arc<AppState>>,
    Path(raw): Path<String>,
) -> Json<Vec<String>> {
    Json(state.resolver.list_owned_names(&raw, Network::Mainnet).await)
}

/// GET /ens/list-goerli/:addr
pub async fn list_goerli(
    State(state): State<Arc<AppState>>,
    Path(raw): Path<String>,
) -> Json<Vec<String>> {
    Json(state.resolver.list_owned_names(&raw, Network::Goerli).await)
}

/// GET /ens/list/:network/:addr
///
/// An unknown network selector yields an empty list without querying anything.
pub async fn list_on_network(
    State(state): State<Arc<AppState>>,
    Path((network, raw)): Path<(String, String)>,
) -> Json<Vec<String>> {
    match network.parse::<Network>() {
        Ok(network) => Json(state.resolver.list_owned_names(&raw, network).await),
        Err(e) => {
            warn!(error = %e, "Rejected list request");
            Json(Vec::new())
        }
    }
}
