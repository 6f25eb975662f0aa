//! HTTP Gateway Content Resolver
//!
//! Implements `ContentResolver` with `GET <gateway>/<content id>`.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;

use crate::domain::{ContentId, MetadataRecord, ResolveError};
use crate::ports::outbound::ContentResolver;

/// Resolves content ids through an HTTP content gateway.
pub struct HttpGatewayResolver {
    client: Client,
    base_url: String,
    timeout_ms: u64,
}

impl HttpGatewayResolver {
    /// Create a resolver for `base_url` (e.g. "https://ipfs.io/ipfs/").
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ResolveError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(2)))
            .build()
            .map_err(|e| ResolveError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        })
    }

    /// URL requested for a content id.
    pub fn url_for(&self, content_id: &ContentId) -> String {
        format!("{}/{}", self.base_url, content_id)
    }

    fn classify(&self, content_id: &ContentId, err: reqwest::Error) -> ResolveError {
        if err.is_timeout() {
            ResolveError::Timeout {
                pointer: content_id.to_string(),
                timeout_ms: self.timeout_ms,
            }
        } else if err.is_decode() {
            ResolveError::Malformed {
                pointer: content_id.to_string(),
                reason: err.to_string(),
            }
        } else {
            ResolveError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl ContentResolver for HttpGatewayResolver {
    async fn resolve(&self, content_id: &ContentId) -> Result<MetadataRecord, ResolveError> {
        let url = self.url_for(content_id);
        debug!("[feed] GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.classify(content_id, e))?;

        match response.status() {
            StatusCode::NOT_FOUND => return Err(ResolveError::NotFound(content_id.to_string())),
            status if !status.is_success() => {
                return Err(ResolveError::Transport(format!("{url}: HTTP {status}")))
            }
            _ => {}
        }

        response
            .json::<MetadataRecord>()
            .await
            .map_err(|e| self.classify(content_id, e))
    }
}
