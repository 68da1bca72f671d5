use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

use super::{deserialize_optional_nullable, non_blank};

/// Promotional banner shown on the deals page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Display label, not a category reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Free-form expiry text as entered by the admin.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeal {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub expires: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDeal {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_nullable")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_optional_nullable")]
    pub category: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_optional_nullable")]
    pub expires: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_optional_nullable")]
    pub image_url: Option<Option<String>>,
}

impl UpdateDeal {
    pub fn validate(&self) -> Result<()> {
        if let Some(ref title) = self.title
            && title.trim().is_empty()
        {
            return Err(AppError::BadRequest("Title cannot be empty".into()));
        }
        Ok(())
    }
}

impl Deal {
    pub fn new(id: String, input: CreateDeal, now: i64) -> Self {
        Self {
            id,
            title: non_blank(input.title).unwrap_or_else(|| "New Deal".to_string()),
            description: non_blank(input.description),
            category: non_blank(input.category),
            expires: non_blank(input.expires),
            image_url: non_blank(input.image_url),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, patch: UpdateDeal, now: i64) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(expires) = patch.expires {
            self.expires = expires;
        }
        if let Some(image_url) = patch.image_url {
            self.image_url = image_url;
        }
        self.updated_at = now;
    }
}
