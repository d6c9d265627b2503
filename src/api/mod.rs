//! HTTP surface: GraphQL endpoints plus a health probe

pub mod graphql;
pub mod health;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::AppState;

/// Build the application router with CORS and request tracing
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(graphql::router())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
