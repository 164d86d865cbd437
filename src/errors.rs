use std::fmt;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub enum GatewayError {
    ConfigError(String),
    AuthError(String),
    TransportError { message: String, timeout: bool },
    UpstreamHttpError { status: u16, body: String },
    UpstreamFormatError { message: String, body: String },
    ModelNotFound(String),
    ValidationError(String),
    Unsupported(String),
    Unauthorized(String),
}

/// Body of every error response produced by the gateway.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl GatewayError {
    pub fn transport(message: impl Into<String>) -> Self {
        GatewayError::TransportError {
            message: message.into(),
            timeout: false,
        }
    }

    pub fn upstream_format(message: impl Into<String>, body: impl Into<String>) -> Self {
        GatewayError::UpstreamFormatError {
            message: message.into(),
            body: body.into(),
        }
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::ConfigError(msg) => write!(f, "Config error: {}", msg),
            GatewayError::AuthError(msg) => write!(f, "Failed to obtain upstream credentials: {}", msg),
            GatewayError::TransportError { message, .. } => write!(f, "Request failed: {}", message),
            GatewayError::UpstreamHttpError { status, body } => {
                write!(f, "Vertex AI API error: status {}, body {}", status, body)
            }
            GatewayError::UpstreamFormatError { message, body } => write!(
                f,
                "Error parsing Vertex AI response: {}. Full response: {}",
                message, body
            ),
            GatewayError::ModelNotFound(model) => write!(f, "Model {} not found", model),
            GatewayError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            GatewayError::Unsupported(msg) => write!(f, "Unsupported: {}", msg),
            GatewayError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
        }
    }
}

impl std::error::Error for GatewayError {}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::TransportError {
            message: err.to_string(),
            timeout: err.is_timeout(),
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::ConfigError(err.to_string())
    }
}

impl From<std::io::Error> for GatewayError {
    fn from(err: std::io::Error) -> Self {
        GatewayError::ConfigError(err.to_string())
    }
}

impl ResponseError for GatewayError {
    // Upstream non-2xx answers are reported as 502 rather than forwarded: an
    // upstream 401/404 concerns the gateway's credentials or endpoint, not the
    // client's request. The real status stays in the detail string.
    fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::AuthError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::TransportError { timeout: true, .. } => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::TransportError { .. } => StatusCode::BAD_GATEWAY,
            GatewayError::UpstreamHttpError { .. } => StatusCode::BAD_GATEWAY,
            GatewayError::UpstreamFormatError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::ModelNotFound(_) => StatusCode::BAD_REQUEST,
            GatewayError::ValidationError(_) => StatusCode::BAD_REQUEST,
            GatewayError::Unsupported(_) => StatusCode::BAD_REQUEST,
            GatewayError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = HttpResponse::build(self.status_code());
        if let GatewayError::Unauthorized(_) = self {
            response.insert_header(("WWW-Authenticate", "Bearer"));
        }
        response.json(ErrorBody {
            detail: self.to_string(),
        })
    }
}
