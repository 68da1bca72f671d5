use crate::error::Result;
use crate::models::{Category, CreateCategory};
use crate::store::Backend;

pub const DEFAULT_CATEGORIES: &[&str] = &[
    "Clothing",
    "Luggage",
    "Bath & Linen",
    "Household Appliances",
    "Utensils",
    "Bath Mats Rugs & Carpets",
];

/// Create the default storefront categories when none exist.
/// Returns how many were created.
pub fn seed_default_categories(backend: &Backend) -> Result<usize> {
    let repo = backend.repo::<Category>();
    if !repo.list()?.is_empty() {
        tracing::info!("Categories already exist, skipping seed");
        return Ok(0);
    }

    for label in DEFAULT_CATEGORIES {
        let category = repo.create(CreateCategory {
            slug: Some(slugify(label)),
            ..CreateCategory::labelled(label)
        })?;
        tracing::info!("Seeded category {} ({})", category.label, category.slug);
    }
    Ok(DEFAULT_CATEGORIES.len())
}

/// Lowercase ASCII alphanumerics joined by single hyphens.
pub fn slugify(label: &str) -> String {
    label
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}
