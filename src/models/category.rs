use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::id::random_slug;

use super::{deserialize_optional_nullable, non_blank};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: String,
    pub label: String,
    /// URL-safe identifier. Uniqueness is not enforced.
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Partial input for creating a category. Any `_id` or timestamps in the body
/// are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategory {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl CreateCategory {
    pub fn labelled(label: &str) -> Self {
        Self {
            label: Some(label.to_string()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategory {
    pub label: Option<String>,
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_nullable")]
    pub image_url: Option<Option<String>>,
}

impl UpdateCategory {
    pub fn validate(&self) -> Result<()> {
        if let Some(ref label) = self.label
            && label.trim().is_empty()
        {
            return Err(AppError::BadRequest("Label cannot be empty".into()));
        }
        if let Some(ref slug) = self.slug
            && slug.trim().is_empty()
        {
            return Err(AppError::BadRequest("Slug cannot be empty".into()));
        }
        Ok(())
    }
}

impl Category {
    pub fn new(id: String, input: CreateCategory, now: i64) -> Self {
        Self {
            id,
            label: non_blank(input.label).unwrap_or_else(|| "Untitled".to_string()),
            slug: non_blank(input.slug).unwrap_or_else(|| random_slug("cat")),
            image_url: non_blank(input.image_url),
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge a patch over this record; absent fields are preserved.
    pub fn apply(&mut self, patch: UpdateCategory, now: i64) {
        if let Some(label) = patch.label {
            self.label = label;
        }
        if let Some(slug) = patch.slug {
            self.slug = slug;
        }
        if let Some(image_url) = patch.image_url {
            self.image_url = image_url;
        }
        self.updated_at = now;
    }
}
