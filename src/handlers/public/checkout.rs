use axum::extract::State;

use crate::checkout::{CheckoutRequest, CheckoutResponse, initiate_checkout};
use crate::db::AppState;
use crate::error::Result;
use crate::extractors::Json;
use crate::payments::StripeClient;

/// `POST /api/checkout/session`: returns the hosted checkout URL to redirect to.
pub async fn create_checkout_session(
    State(state): State<AppState>,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>> {
    let gateway = StripeClient::new(state.http_client.clone(), &state.stripe)?;
    let outcome = initiate_checkout(&gateway, &state.backend(), &state.base_url, &request).await?;
    Ok(Json(CheckoutResponse { url: outcome.url }))
}
