use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use subtle::ConstantTimeEq;

use crate::db::AppState;
use crate::error::AppError;

pub const ADMIN_COOKIE: &str = "admin_token";
/// Seven days.
pub const ADMIN_COOKIE_MAX_AGE_SECS: i64 = 7 * 24 * 60 * 60;

/// Constant-time comparison against the configured admin token.
/// Always false when no token is configured.
pub fn token_matches(expected: Option<&str>, provided: &str) -> bool {
    let Some(expected) = expected else {
        return false;
    };
    let (expected, provided) = (expected.as_bytes(), provided.as_bytes());
    expected.len() == provided.len() && bool::from(expected.ct_eq(provided))
}

/// Admit requests carrying a valid `admin_token` cookie.
pub async fn admin_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let provided = jar.get(ADMIN_COOKIE).map(|c| c.value()).unwrap_or_default();

    if !token_matches(state.admin_token.as_deref(), provided) {
        tracing::debug!("Rejected admin request to {}", request.uri().path());
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(request).await)
}
