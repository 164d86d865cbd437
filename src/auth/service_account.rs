use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use super::{AccessToken, TokenSource, read_token_response};
use crate::consts;
use crate::errors::GatewayError;

/// The fields of a Google service-account JSON key this gateway needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(rename = "type")]
    pub key_type: String,
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default)]
    pub token_uri: Option<String>,
}

#[derive(Debug, Serialize)]
struct JwtClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    exp: u64,
    iat: u64,
}

/// OAuth2 JWT-bearer grant signed with a service-account private key.
pub struct ServiceAccountSource {
    http: reqwest::Client,
    client_email: String,
    private_key_id: Option<String>,
    signing_key: EncodingKey,
    token_uri: String,
}

impl ServiceAccountSource {
    pub fn new(http: reqwest::Client, key: ServiceAccountKey) -> Result<Self, GatewayError> {
        if key.key_type != "service_account" {
            return Err(GatewayError::AuthError(format!(
                "unsupported credentials type {:?}, expected service_account",
                key.key_type
            )));
        }
        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| GatewayError::AuthError(format!("invalid service account key: {}", e)))?;

        Ok(Self {
            http,
            client_email: key.client_email,
            private_key_id: key.private_key_id.filter(|id| !id.trim().is_empty()),
            signing_key,
            token_uri: key
                .token_uri
                .unwrap_or_else(|| consts::DEFAULT_TOKEN_URI.to_string()),
        })
    }

    pub fn from_file(http: reqwest::Client, path: &Path) -> Result<Self, GatewayError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            GatewayError::AuthError(format!("cannot read {}: {}", path.display(), e))
        })?;
        let key: ServiceAccountKey = serde_json::from_str(&contents).map_err(|e| {
            GatewayError::AuthError(format!("cannot parse {}: {}", path.display(), e))
        })?;
        Self::new(http, key)
    }

    pub fn client_email(&self) -> &str {
        &self.client_email
    }

    fn signed_assertion(&self) -> Result<String, GatewayError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| GatewayError::AuthError(e.to_string()))?
            .as_secs();
        let claims = JwtClaims {
            iss: &self.client_email,
            scope: consts::CLOUD_PLATFORM_SCOPE,
            aud: &self.token_uri,
            exp: now + consts::TOKEN_LIFETIME_SECS,
            iat: now,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.private_key_id.clone();

        jsonwebtoken::encode(&header, &claims, &self.signing_key)
            .map_err(|e| GatewayError::AuthError(format!("cannot sign token request: {}", e)))
    }
}

#[async_trait]
impl TokenSource for ServiceAccountSource {
    fn name(&self) -> &'static str {
        "service account"
    }

    async fn fetch_token(&self) -> Result<AccessToken, GatewayError> {
        let assertion = self.signed_assertion()?;
        let response = self
            .http
            .post(&self.token_uri)
            .form(&[
                ("grant_type", consts::JWT_BEARER_GRANT_TYPE),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .map_err(|e| GatewayError::AuthError(format!("token request failed: {}", e)))?;

        read_token_response(response, "token endpoint").await
    }
}
