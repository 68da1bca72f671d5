pub mod admin;
pub mod public;
pub mod webhooks;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::db::AppState;

/// The full HTTP surface with request tracing.
pub fn router(state: AppState) -> Router {
    Router::new()
        // Storefront reads and checkout (no auth)
        .merge(public::router())
        // Stripe webhooks (signature auth)
        .merge(webhooks::router())
        // Admin API (cookie auth)
        .merge(admin::router(state.clone()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
