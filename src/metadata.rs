//! Link-preview enrichment for the article form

use serde::Deserialize;

use crate::error::MetadataError;
use crate::form::ArticleFields;

/// Text the preview service returns in place of a description when the
/// target site refused the request.
pub const BLOCKED_SENTINEL: &str = "Access Denied";

pub const BLOCKED_PLACEHOLDER: &str = "No description available for this page.";

/// Wire shape of the preview service's answer.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PreviewResponse {
    pub status: String,
    #[serde(default)]
    pub data: Option<PreviewData>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PreviewData {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<PreviewImage>,
    #[serde(default)]
    pub publisher: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PreviewImage {
    #[serde(default)]
    pub url: Option<String>,
}

/// Metadata extracted from a successful preview.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkPreview {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub site_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataOutcome {
    Applied,
    Blocked,
}

impl LinkPreview {
    pub fn from_response(response: PreviewResponse) -> Result<LinkPreview, MetadataError> {
        if response.status != "success" {
            let detail = response.message.unwrap_or(response.status);
            return Err(MetadataError::Unsuccessful(detail));
        }
        let data = response.data.ok_or_else(|| {
            MetadataError::UnrecognizedResponse("success without data".to_string())
        })?;

        Ok(LinkPreview {
            title: present(data.title),
            description: present(data.description),
            image_url: present(data.image.and_then(|img| img.url)),
            site_name: present(data.publisher),
        })
    }

    pub fn is_blocked(&self) -> bool {
        let blocked = |v: &Option<String>| {
            v.as_deref()
                .is_some_and(|s| s.eq_ignore_ascii_case(BLOCKED_SENTINEL))
        };
        blocked(&self.description) || blocked(&self.title)
    }

    /// Overwrite the form fields the preview returned; leave the rest.
    pub fn apply_to(&self, fields: &mut ArticleFields) -> MetadataOutcome {
        if self.is_blocked() {
            fields.description = BLOCKED_PLACEHOLDER.to_string();
            return MetadataOutcome::Blocked;
        }

        if let Some(title) = &self.title {
            fields.title = title.clone();
        }
        if let Some(description) = &self.description {
            fields.description = description.clone();
        }
        if let Some(image_url) = &self.image_url {
            fields.image_url = image_url.clone();
        }
        if let Some(site_name) = &self.site_name {
            fields.site_name = site_name.clone();
        }
        MetadataOutcome::Applied
    }
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// The third-party preview service.
#[allow(async_fn_in_trait)]
pub trait MetadataFetcher {
    /// One lookup for `url`.
    async fn fetch(&self, url: &str) -> Result<LinkPreview, MetadataError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<LinkPreview, MetadataError> {
        let response: PreviewResponse = serde_json::from_str(json).unwrap();
        LinkPreview::from_response(response)
    }

    #[test]
    fn test_success_response() {
        let preview = parse(
            r#"{
                "status": "success",
                "data": {
                    "title": "The Rust Programming Language",
                    "description": "A language empowering everyone",
                    "image": {"url": "https://www.rust-lang.org/og.png"},
                    "publisher": "Rust"
                }
            }"#,
        )
        .unwrap();

        assert_eq!(preview.title.as_deref(), Some("The Rust Programming Language"));
        assert_eq!(preview.image_url.as_deref(), Some("https://www.rust-lang.org/og.png"));
        assert_eq!(preview.site_name.as_deref(), Some("Rust"));
    }

    #[test]
    fn test_failed_status() {
        let err = parse(r#"{"status":"fail","message":"invalid url"}"#).unwrap_err();
        assert_eq!(err, MetadataError::Unsuccessful("invalid url".to_string()));

        let err = parse(r#"{"status":"error"}"#).unwrap_err();
        assert_eq!(err, MetadataError::Unsuccessful("error".to_string()));
    }

    #[test]
    fn test_success_without_data() {
        assert!(matches!(
            parse(r#"{"status":"success"}"#),
            Err(MetadataError::UnrecognizedResponse(_))
        ));
    }

    #[test]
    fn test_apply_keeps_fields_not_returned() {
        let mut fields = ArticleFields {
            url: "https://example.com".to_string(),
            title: "My title".to_string(),
            description: "My notes".to_string(),
            site_name: "Mine".to_string(),
            ..ArticleFields::default()
        };
        let preview = LinkPreview {
            description: Some("Fetched description".to_string()),
            image_url: Some("https://example.com/img.png".to_string()),
            ..LinkPreview::default()
        };

        assert_eq!(preview.apply_to(&mut fields), MetadataOutcome::Applied);
        assert_eq!(fields.title, "My title");
        assert_eq!(fields.site_name, "Mine");
        assert_eq!(fields.description, "Fetched description");
        assert_eq!(fields.image_url, "https://example.com/img.png");
    }

    #[test]
    fn test_blank_values_count_as_missing() {
        let preview = parse(r#"{"status":"success","data":{"title":"  ","image":{}}}"#).unwrap();
        assert_eq!(preview, LinkPreview::default());
    }

    #[test]
    fn test_blocked_sentinel_uses_placeholder() {
        let mut fields = ArticleFields {
            title: "Keep me".to_string(),
            ..ArticleFields::default()
        };
        let preview = LinkPreview {
            title: Some("Access Denied".to_string()),
            description: Some("access denied".to_string()),
            ..LinkPreview::default()
        };

        assert_eq!(preview.apply_to(&mut fields), MetadataOutcome::Blocked);
        assert_eq!(fields.description, BLOCKED_PLACEHOLDER);
        assert_eq!(fields.title, "Keep me");
    }
}
