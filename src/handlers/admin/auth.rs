use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::{Deserialize, Serialize};

use crate::db::AppState;
use crate::error::msg;
use crate::extractors::Json;
use crate::middleware::{ADMIN_COOKIE, ADMIN_COOKIE_MAX_AGE_SECS, token_matches};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
}

/// Exchange the admin token for an `HttpOnly` session cookie.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(input): Json<LoginRequest>,
) -> Response {
    if !token_matches(state.admin_token.as_deref(), &input.token) {
        tracing::warn!("Admin login rejected");
        let body = LoginResponse {
            ok: false,
            error: Some(msg::INVALID_TOKEN),
        };
        return (StatusCode::UNAUTHORIZED, Json(body)).into_response();
    }

    let cookie = Cookie::build((ADMIN_COOKIE, input.token))
        .http_only(true)
        .path("/")
        .max_age(time::Duration::seconds(ADMIN_COOKIE_MAX_AGE_SECS));

    (
        jar.add(cookie),
        Json(LoginResponse {
            ok: true,
            error: None,
        }),
    )
        .into_response()
}
