//! # ENS API Server
//!
//! Read-only HTTP API resolving ENS names and Ethereum addresses into a
//! merged identity record.
//!
//! ## Endpoints
//!
//! - `GET /` - Landing page
//! - `GET /health` - Liveness and version
//! - `GET /ens/resolve/:query` - Resolve a name or address (`?domains=true` adds owned names)
//! - `GET /ens/list/:addr` - Names owned on mainnet
//! - `GET /ens/list-goerli/:addr` - Names owned on Goerli
//! - `GET /ens/list/:network/:addr` - Names owned on a selected network
//!
//! ## Example
//!
//! ```rust,ignore
//! use ensapi_api::{ApiConfig, ApiServer};
//!
//! let config = ApiConfig::from_env()?;
//! let server = ApiServer::new(config)?;
//! server.run("0.0.0.0:8721".parse()?).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod error;
mod handlers;
mod routes;
mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::{ApiConfig, AppState};

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use ensapi_core::error::Result;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// API server for ENS identity resolution.
pub struct ApiServer {
    state: Arc<AppState>,
}

impl ApiServer {
    /// Creates a server backed by the live JSON-RPC and subgraph clients.
    pub fn new(config: ApiConfig) -> Result<Self> {
        Ok(Self::with_state(AppState::new(config)?))
    }

    /// Creates a server over a prepared state.
    pub fn with_state(state: AppState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }

    /// Creates the router with all routes and middleware configured.
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        create_router(self.state.clone())
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }

    /// Runs the server on the given address.
    pub async fn run(self, addr: SocketAddr) -> std::io::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;

        info!(%addr, "ENS API server listening");

        axum::serve(listener, self.router()).await
    }
}
