pub mod metadata;
pub mod service_account;

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::config::CredentialsConfig;
use crate::consts;
use crate::errors::GatewayError;

pub use metadata::MetadataServerSource;
pub use service_account::ServiceAccountSource;

#[derive(Debug, Clone, PartialEq)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: SystemTime,
}

impl AccessToken {
    pub fn expires_in(token: String, lifetime: Duration) -> Self {
        AccessToken {
            token,
            expires_at: SystemTime::now() + lifetime,
        }
    }

    fn is_valid_for(&self, margin: Duration) -> bool {
        SystemTime::now() + margin < self.expires_at
    }
}

/// Produces a bearer token for the upstream endpoint.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn get_token(&self) -> Result<String, GatewayError>;
}

/// One round-trip to a credential backend.
#[async_trait]
pub trait TokenSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch_token(&self) -> Result<AccessToken, GatewayError>;
}

/// A fixed token, mostly useful for local runs with a token from `gcloud`.
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn get_token(&self) -> Result<String, GatewayError> {
        Ok(self.token.clone())
    }
}

/// Wraps a [`TokenSource`] and reuses its token until it comes within
/// `margin` of expiry. Refreshes are serialized by the mutex, so concurrent
/// callers racing on an expired token trigger a single fetch.
pub struct CachingTokenProvider<S> {
    source: S,
    margin: Duration,
    cached: Mutex<Option<AccessToken>>,
}

impl<S: TokenSource> CachingTokenProvider<S> {
    pub fn new(source: S) -> Self {
        Self::with_margin(source, Duration::from_secs(consts::TOKEN_EXPIRY_MARGIN_SECS))
    }

    pub fn with_margin(source: S, margin: Duration) -> Self {
        Self {
            source,
            margin,
            cached: Mutex::new(None),
        }
    }
}

#[async_trait]
impl<S: TokenSource> TokenProvider for CachingTokenProvider<S> {
    async fn get_token(&self) -> Result<String, GatewayError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| t.is_valid_for(self.margin)) {
            return Ok(token.token.clone());
        }

        log::debug!("refreshing upstream access token from {}", self.source.name());
        let fresh = self.source.fetch_token().await.inspect_err(|e| {
            log::error!("token refresh via {} failed: {}", self.source.name(), e);
        })?;
        if !fresh.is_valid_for(Duration::ZERO) {
            return Err(GatewayError::AuthError(format!(
                "{} returned an already expired token",
                self.source.name()
            )));
        }
        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(token)
    }
}

/// OAuth2 token endpoint response, shared by the service-account grant and the
/// metadata server.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

pub(crate) async fn read_token_response(
    response: reqwest::Response,
    source: &str,
) -> Result<AccessToken, GatewayError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| GatewayError::AuthError(format!("{}: {}", source, e)))?;
    if !status.is_success() {
        return Err(GatewayError::AuthError(format!(
            "{} returned status {}: {}",
            source, status, body
        )));
    }

    let parsed: TokenResponse = serde_json::from_str(&body)
        .map_err(|e| GatewayError::AuthError(format!("{} returned invalid JSON: {}", source, e)))?;
    if parsed.access_token.trim().is_empty() {
        return Err(GatewayError::AuthError(format!(
            "{} returned an empty access token",
            source
        )));
    }

    let lifetime = parsed.expires_in.unwrap_or(consts::TOKEN_LIFETIME_SECS);
    Ok(AccessToken::expires_in(
        parsed.access_token.trim().to_string(),
        Duration::from_secs(lifetime),
    ))
}

fn token_http_client() -> Result<reqwest::Client, GatewayError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(consts::TOKEN_REQUEST_TIMEOUT_SECS))
        .build()
        .map_err(|e| GatewayError::ConfigError(format!("cannot build token HTTP client: {}", e)))
}

/// Picks the credential source the way Application Default Credentials do:
/// explicit token, then key file, then the metadata server.
pub fn token_provider_from_config(
    credentials: &CredentialsConfig,
) -> Result<Arc<dyn TokenProvider>, GatewayError> {
    if let Some(token) = &credentials.access_token {
        log::info!("using static upstream access token");
        return Ok(Arc::new(StaticTokenProvider::new(token.clone())));
    }

    let http = token_http_client()?;

    if let Some(path) = &credentials.credentials_file {
        let source = ServiceAccountSource::from_file(http, path)?;
        log::info!("using service account {} for upstream tokens", source.client_email());
        return Ok(Arc::new(CachingTokenProvider::new(source)));
    }

    let source = MetadataServerSource::new(http, credentials.metadata_host.as_deref());
    log::info!("using metadata server {} for upstream tokens", source.base_url());
    Ok(Arc::new(CachingTokenProvider::new(source)))
}
