//! Catalogue CRUD shared by products, categories and deals.

use axum::{extract::State, http::StatusCode};
use serde_json::{Value, json};

use crate::db::AppState;
use crate::error::{AppError, OptionExt, Result};
use crate::extractors::{Json, Path};
use crate::store::Entity;

/// Newest first.
pub async fn list_records<E: Entity>(State(state): State<AppState>) -> Result<Json<Vec<E>>> {
    let mut records = state.backend().repo::<E>().list()?;
    records.reverse();
    Ok(Json(records))
}

pub async fn create_record<E: Entity>(
    State(state): State<AppState>,
    Json(input): Json<E::Create>,
) -> Result<(StatusCode, Json<E>)> {
    let record = state.backend().repo::<E>().create(input)?;
    tracing::info!("Created {:?} {}", E::KIND, record.id());
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn update_record<E: Entity>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<E::Update>,
) -> Result<Json<E>> {
    let record = state
        .backend()
        .repo::<E>()
        .update(&id, patch)?
        .or_not_found(E::NOT_FOUND)?;
    Ok(Json(record))
}

pub async fn delete_record<E: Entity>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    if !state.backend().repo::<E>().remove(&id)? {
        return Err(AppError::NotFound(E::NOT_FOUND.into()));
    }
    tracing::info!("Deleted {:?} {}", E::KIND, id);
    Ok(Json(json!({ "ok": true })))
}
