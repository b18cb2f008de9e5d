//! Data structures for DashStash

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ValidationError;

/// A persisted bookmark as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub url: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_id: String,
    #[serde(rename = "imageUrl", default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub site_name: Option<String>,
    #[serde(default)]
    pub publisher: Option<String>,
}

/// An unsaved, partially filled article.
///
/// Drafts have no id, owner or timestamps; those belong to the backend and
/// the persistence gateway.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleDraft {
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(rename = "imageUrl", default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
}

impl ArticleDraft {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> ArticleDraft {
        ArticleDraft {
            url: url.into(),
            title: title.into(),
            ..ArticleDraft::default()
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_url(&self.url)
    }
}

impl From<&Article> for ArticleDraft {
    fn from(article: &Article) -> ArticleDraft {
        ArticleDraft {
            url: article.url.clone(),
            title: article.title.clone(),
            description: article.description.clone(),
            tags: article.tags.clone(),
            image_url: article.image_url.clone(),
            site_name: article.site_name.clone(),
            publisher: article.publisher.clone(),
        }
    }
}

impl From<&TabHandle> for ArticleDraft {
    /// Only `url` and `title` carry over from a tab.
    fn from(tab: &TabHandle) -> ArticleDraft {
        ArticleDraft::new(tab.url.clone(), tab.title.clone())
    }
}

/// Row sent to the `articles` table on insert.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewArticle {
    pub url: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub tags: Vec<String>,
    #[serde(rename = "imageUrl", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewArticle {
    pub fn from_draft(draft: ArticleDraft, user_id: &str, now: DateTime<Utc>) -> NewArticle {
        NewArticle {
            url: draft.url,
            title: draft.title,
            description: draft.description,
            tags: draft.tags,
            image_url: draft.image_url,
            site_name: draft.site_name,
            publisher: draft.publisher,
            user_id: user_id.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// A browser tab as reported by the tab source; any field may be missing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTab {
    pub id: Option<i32>,
    pub title: Option<String>,
    pub url: Option<String>,
}

/// Information about a browser tab, with absent fields defaulted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabHandle {
    pub id: i32,
    pub title: String,
    pub url: String,
}

impl TabHandle {
    pub fn new(id: i32, title: impl Into<String>, url: impl Into<String>) -> TabHandle {
        TabHandle {
            id,
            title: title.into(),
            url: url.into(),
        }
    }
}

impl From<RawTab> for TabHandle {
    fn from(raw: RawTab) -> TabHandle {
        TabHandle {
            id: raw.id.unwrap_or(0),
            title: raw.title.unwrap_or_default(),
            url: raw.url.unwrap_or_default(),
        }
    }
}

/// Check that `url` is non-empty and parses as an absolute URL.
pub fn validate_url(url: &str) -> Result<(), ValidationError> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyUrl);
    }
    Url::parse(trimmed)
        .map(|_| ())
        .map_err(|_| ValidationError::InvalidUrl {
            url: trimmed.to_string(),
        })
}

pub fn is_valid_url(url: &str) -> bool {
    validate_url(url).is_ok()
}
