pub(crate) const REQUEST_FORMAT_CHAT: &str = "chatCompletions";

pub const DEFAULT_MAX_TOKENS: u32 = 150;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
// The chat path and the legacy completion path disagree on top_p; the latter
// carries its own request-level default of 1.0.
pub const DEFAULT_CHAT_TOP_P: f32 = 0.9;
pub const DEFAULT_COMPLETION_TOP_P: f32 = 1.0;
pub const DEFAULT_TOP_K: u32 = 40;

pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 120;
pub(crate) const TOKEN_REQUEST_TIMEOUT_SECS: u64 = 30;

pub(crate) const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";
pub(crate) const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
pub(crate) const JWT_BEARER_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
pub(crate) const DEFAULT_METADATA_HOST: &str = "metadata.google.internal";
pub(crate) const METADATA_TOKEN_PATH: &str =
    "/computeMetadata/v1/instance/service-accounts/default/token";
pub(crate) const TOKEN_LIFETIME_SECS: u64 = 3600;
pub(crate) const TOKEN_EXPIRY_MARGIN_SECS: u64 = 60;

pub const DEFAULT_MODEL: &str = "google/vertexai/gemma3";
pub const DEFAULT_MODEL_OWNER: &str = "AI Team";
pub(crate) const MODEL_CREATED_TIMESTAMP: i64 = 1677610602;
pub const DEFAULT_LOCATION: &str = "europe-west1";
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";
pub const DEFAULT_SERVER_PORT: u16 = 8000;

pub(crate) const SERVICE_NAME: &str = "OpenAI-Compatible API for Vertex AI";
pub(crate) const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");
