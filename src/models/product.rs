use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::id::random_slug;

use super::{deserialize_optional_nullable, non_blank};

/// Slug products fall under when created without a category.
pub const UNCATEGORIZED: &str = "uncategorized";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub slug: String,
    /// Soft reference to `Category::slug`. A dangling value is valid and
    /// displays as uncategorized.
    pub category_slug: String,
    /// Price in major currency units.
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub featured: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProduct {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub category_slug: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub featured: Option<bool>,
}

impl CreateProduct {
    pub fn validate(&self) -> Result<()> {
        validate_price(self.price)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub category_slug: Option<String>,
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_nullable")]
    pub image_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_optional_nullable")]
    pub description: Option<Option<String>>,
    pub featured: Option<bool>,
}

impl UpdateProduct {
    pub fn validate(&self) -> Result<()> {
        if let Some(ref name) = self.name
            && name.trim().is_empty()
        {
            return Err(AppError::BadRequest("Name cannot be empty".into()));
        }
        if let Some(ref slug) = self.slug
            && slug.trim().is_empty()
        {
            return Err(AppError::BadRequest("Slug cannot be empty".into()));
        }
        validate_price(self.price)
    }
}

fn validate_price(price: Option<f64>) -> Result<()> {
    match price {
        Some(p) if !p.is_finite() || p < 0.0 => Err(AppError::BadRequest(
            "Price must be a non-negative number".into(),
        )),
        _ => Ok(()),
    }
}

impl Product {
    pub fn new(id: String, input: CreateProduct, now: i64) -> Self {
        Self {
            id,
            name: non_blank(input.name).unwrap_or_else(|| "New Product".to_string()),
            slug: non_blank(input.slug).unwrap_or_else(|| random_slug("prod")),
            category_slug: non_blank(input.category_slug)
                .unwrap_or_else(|| UNCATEGORIZED.to_string()),
            price: input.price.unwrap_or(0.0),
            image_url: non_blank(input.image_url),
            description: non_blank(input.description),
            featured: input.featured.unwrap_or(false),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, patch: UpdateProduct, now: i64) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(slug) = patch.slug {
            self.slug = slug;
        }
        if let Some(category_slug) = patch.category_slug {
            self.category_slug = category_slug;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(image_url) = patch.image_url {
            self.image_url = image_url;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(featured) = patch.featured {
            self.featured = featured;
        }
        self.updated_at = now;
    }

    /// Case-insensitive substring match on name or description.
    pub fn matches_text(&self, needle_lower: &str) -> bool {
        self.name.to_lowercase().contains(needle_lower)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(needle_lower))
    }
}

/// Storefront listing filters for `GET /api/products`.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub q: Option<String>,
    pub featured: Option<String>,
    pub limit: Option<i64>,
}

impl ProductFilter {
    const MAX_LIMIT: i64 = 50;

    /// Only `featured=1` and `featured=true` restrict the listing.
    pub fn featured_only(&self) -> bool {
        matches!(self.featured.as_deref(), Some("1") | Some("true"))
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit.map(|l| l.clamp(1, Self::MAX_LIMIT) as usize)
    }

    /// Apply the filters to a newest-first product list.
    pub fn apply(&self, products: Vec<Product>) -> Vec<Product> {
        let needle = self
            .q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase);
        let featured_only = self.featured_only();

        let filtered = products.into_iter().filter(|p| {
            self.category
                .as_deref()
                .is_none_or(|c| p.category_slug == c)
                && (!featured_only || p.featured)
                && needle.as_deref().is_none_or(|n| p.matches_text(n))
        });

        match self.limit() {
            Some(limit) => filtered.take(limit).collect(),
            None => filtered.collect(),
        }
    }
}
