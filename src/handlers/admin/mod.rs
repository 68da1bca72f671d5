mod auth;
mod catalog;
mod orders;

pub use auth::*;
pub use catalog::*;
pub use orders::*;

use axum::{
    Router, middleware,
    routing::{get, patch, post},
};

use crate::db::AppState;
use crate::middleware::admin_auth;
use crate::models::{Category, Deal, Product};

pub fn router(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route(
            "/api/admin/products",
            get(list_records::<Product>).post(create_record::<Product>),
        )
        .route(
            "/api/admin/products/{id}",
            patch(update_record::<Product>).delete(delete_record::<Product>),
        )
        .route(
            "/api/admin/categories",
            get(list_records::<Category>).post(create_record::<Category>),
        )
        .route(
            "/api/admin/categories/{id}",
            patch(update_record::<Category>).delete(delete_record::<Category>),
        )
        .route(
            "/api/admin/deals",
            get(list_records::<Deal>).post(create_record::<Deal>),
        )
        .route(
            "/api/admin/deals/{id}",
            patch(update_record::<Deal>).delete(delete_record::<Deal>),
        )
        .route("/api/admin/orders", get(list_orders))
        .layer(middleware::from_fn_with_state(state, admin_auth));

    Router::new()
        .route("/api/admin/login", post(login))
        .merge(protected)
}
