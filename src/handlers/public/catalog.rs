use axum::extract::State;

use crate::db::AppState;
use crate::error::{OptionExt, Result, msg};
use crate::extractors::{Json, Path, Query};
use crate::models::{Category, Deal, Product, ProductFilter};

pub async fn list_products(
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> Result<Json<Vec<Product>>> {
    let mut products = state.backend().repo::<Product>().list()?;
    products.reverse();
    Ok(Json(filter.apply(products)))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>> {
    let product = state
        .backend()
        .repo::<Product>()
        .get(&id)?
        .or_not_found(msg::PRODUCT_NOT_FOUND)?;
    Ok(Json(product))
}

/// Categories sorted by label for navigation menus.
pub async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    let mut categories = state.backend().repo::<Category>().list()?;
    categories.sort_by(|a, b| a.label.cmp(&b.label));
    Ok(Json(categories))
}

pub async fn list_deals(State(state): State<AppState>) -> Result<Json<Vec<Deal>>> {
    Ok(Json(state.backend().repo::<Deal>().list()?))
}
