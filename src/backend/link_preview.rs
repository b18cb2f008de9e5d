//! HTTP link-preview service

use reqwest::Client;
use url::Url;

use crate::error::MetadataError;
use crate::metadata::{LinkPreview, MetadataFetcher, PreviewResponse};

pub struct LinkPreviewClient {
    http: Client,
    endpoint: String,
}

impl LinkPreviewClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        LinkPreviewClient {
            http: Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

/// `endpoint?url=<target>`.
fn lookup_url(endpoint: &str, target: &str) -> Result<Url, MetadataError> {
    let mut url = Url::parse(endpoint)
        .map_err(|e| MetadataError::Transport(format!("invalid endpoint {endpoint}: {e}")))?;
    url.query_pairs_mut().append_pair("url", target);
    Ok(url)
}

impl MetadataFetcher for LinkPreviewClient {
    async fn fetch(&self, url: &str) -> Result<LinkPreview, MetadataError> {
        log::debug!("Fetching metadata for {}", url);
        let request_url = lookup_url(&self.endpoint, url)?;
        let response = self
            .http
            .get(request_url)
            .send()
            .await
            .map_err(|e| MetadataError::Transport(e.to_string()))?;

        // The service reports failures in the body, often with a non-2xx status.
        let body = response
            .text()
            .await
            .map_err(|e| MetadataError::Transport(e.to_string()))?;
        let parsed: PreviewResponse = serde_json::from_str(&body)
            .map_err(|e| MetadataError::UnrecognizedResponse(e.to_string()))?;

        LinkPreview::from_response(parsed)
    }
}
