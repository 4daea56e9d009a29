//! API route configuration.

use std::sync::Arc;

use axum::{routing::get, Router};

use crate::handlers;
use crate::state::AppState;

/// Creates the API router with all routes configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health_check))
        // Resolution
        .route("/ens/resolve/:query", get(handlers::resolve))
        // Ownership listing
        .route("/ens/list/:addr", get(handlers::list_mainnet))
        .route("/ens/list-goerli/:addr", get(handlers::list_goerli))
        .route("/ens/list/:network/:addr", get(handlers::list_on_network))
        .with_state(state)
}
