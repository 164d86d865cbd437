use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::auth::TokenProvider;
use crate::config::Config;
use crate::endpoint;
use crate::errors::GatewayError;
use crate::models::ChatMessage;
use crate::models::request::SamplingParams;
use crate::models::upstream::PredictionObject;
use crate::translate;

/// Anything that can turn a conversation into a prediction object.
#[async_trait]
pub trait PredictionClient: Send + Sync {
    async fn generate(
        &self,
        messages: &[ChatMessage],
        params: &SamplingParams,
    ) -> Result<PredictionObject, GatewayError>;
}

/// HTTP client for upstream predictions. With `verify_upstream_tls` off the
/// client accepts any certificate, which private endpoints with self-signed
/// certificates need.
pub fn build_http_client(config: &Config) -> Result<reqwest::Client, GatewayError> {
    if !config.verify_upstream_tls {
        log::warn!("TLS certificate verification towards the upstream endpoint is disabled");
    }
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.upstream_timeout_secs))
        .danger_accept_invalid_certs(!config.verify_upstream_tls)
        .build()
        .map_err(|e| GatewayError::ConfigError(format!("cannot build upstream HTTP client: {}", e)))
}

pub struct VertexClient {
    client: reqwest::Client,
    endpoint_url: String,
    tokens: Arc<dyn TokenProvider>,
}

impl VertexClient {
    pub fn new(client: reqwest::Client, endpoint_url: &str, tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            client,
            endpoint_url: endpoint_url.to_string(),
            tokens,
        }
    }

    pub fn from_config(config: &Config, tokens: Arc<dyn TokenProvider>) -> Result<Self, GatewayError> {
        let endpoint_url = endpoint::resolve_endpoint(&config.vertex)?;
        let client = build_http_client(config)?;
        Ok(Self::new(client, &endpoint_url, tokens))
    }

    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }
}

#[async_trait]
impl PredictionClient for VertexClient {
    /// One attempt, no retry: token, payload, POST, unwrap.
    async fn generate(
        &self,
        messages: &[ChatMessage],
        params: &SamplingParams,
    ) -> Result<PredictionObject, GatewayError> {
        let payload = translate::to_upstream_payload(messages, params);

        log::debug!("authenticating upstream request");
        let token = self.tokens.get_token().await?;

        log::debug!("sending prediction request to {}", self.endpoint_url);
        let response = self
            .client
            .post(&self.endpoint_url)
            .bearer_auth(token)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        log::debug!("awaiting prediction response, status {}", status);
        let text = response.text().await?;

        if !status.is_success() {
            log::error!("upstream returned status {}: {}", status, text);
            return Err(GatewayError::UpstreamHttpError {
                status: status.as_u16(),
                body: text,
            });
        }

        let raw: Value = serde_json::from_str(&text).map_err(|e| {
            GatewayError::upstream_format(format!("invalid JSON: {}", e), text.clone())
        })?;
        let prediction = translate::unwrap_predictions(raw).inspect_err(|e| {
            log::error!("cannot unwrap upstream prediction: {}", e);
        })?;
        log::debug!("prediction parsed");

        Ok(prediction)
    }
}
