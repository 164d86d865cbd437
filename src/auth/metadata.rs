use async_trait::async_trait;

use super::{AccessToken, TokenSource, read_token_response};
use crate::consts;
use crate::errors::GatewayError;

/// Token from the GCE/GKE metadata server (workload identity).
pub struct MetadataServerSource {
    http: reqwest::Client,
    base_url: String,
}

impl MetadataServerSource {
    /// `host` may be a bare host (`GCE_METADATA_HOST` style) or a full URL.
    pub fn new(http: reqwest::Client, host: Option<&str>) -> Self {
        let host = host.unwrap_or(consts::DEFAULT_METADATA_HOST);
        let base_url = if host.starts_with("http://") || host.starts_with("https://") {
            host.trim_end_matches('/').to_string()
        } else {
            format!("http://{}", host.trim_end_matches('/'))
        };
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl TokenSource for MetadataServerSource {
    fn name(&self) -> &'static str {
        "metadata server"
    }

    async fn fetch_token(&self) -> Result<AccessToken, GatewayError> {
        let response = self
            .http
            .get(format!("{}{}", self.base_url, consts::METADATA_TOKEN_PATH))
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| GatewayError::AuthError(format!("metadata server unreachable: {}", e)))?;

        read_token_response(response, "metadata server").await
    }
}
