use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts;
use crate::errors::GatewayError;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConnectivityMode {
    Private,
    Public,
}

impl FromStr for ConnectivityMode {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PRIVATE" => Ok(ConnectivityMode::Private),
            "PUBLIC" => Ok(ConnectivityMode::Public),
            other => Err(GatewayError::ConfigError(format!(
                "unknown endpoint type {:?}, expected PRIVATE or PUBLIC",
                other
            ))),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct VertexConfig {
    pub project_id: String,
    #[serde(default = "default_location")]
    pub location: String,
    pub endpoint_id: String,
    #[serde(default = "default_connectivity_mode")]
    pub connectivity_mode: ConnectivityMode,
    #[serde(default)]
    pub private_host: Option<String>,
    #[serde(default = "default_private_protocol")]
    pub private_protocol: String,
}

/// Where upstream bearer tokens come from. Resolution order: a static token,
/// then a service-account key file, then the metadata server.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct CredentialsConfig {
    #[serde(default, skip_serializing)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub credentials_file: Option<PathBuf>,
    #[serde(default)]
    pub metadata_host: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: default_server_host(),
            port: default_server_port(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    pub vertex: VertexConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default = "default_models")]
    pub models: Vec<String>,
    #[serde(default = "default_model_owner")]
    pub model_owner: String,
    /// Off by default: clients are accepted without a bearer key unless this
    /// is switched on together with `client_api_key`.
    #[serde(default)]
    pub require_client_auth: bool,
    #[serde(default, skip_serializing)]
    pub client_api_key: Option<String>,
    /// Off by default so private endpoints with self-signed certificates work.
    #[serde(default)]
    pub verify_upstream_tls: bool,
    #[serde(default = "default_upstream_timeout_secs")]
    pub upstream_timeout_secs: u64,
    #[serde(default)]
    pub credentials: CredentialsConfig,
}

fn default_location() -> String {
    consts::DEFAULT_LOCATION.to_string()
}

fn default_connectivity_mode() -> ConnectivityMode {
    ConnectivityMode::Private
}

fn default_private_protocol() -> String {
    "https".to_string()
}

fn default_server_host() -> String {
    consts::DEFAULT_SERVER_HOST.to_string()
}

fn default_server_port() -> u16 {
    consts::DEFAULT_SERVER_PORT
}

fn default_models() -> Vec<String> {
    vec![consts::DEFAULT_MODEL.to_string()]
}

fn default_model_owner() -> String {
    consts::DEFAULT_MODEL_OWNER.to_string()
}

fn default_upstream_timeout_secs() -> u64 {
    consts::DEFAULT_UPSTREAM_TIMEOUT_SECS
}

impl Config {
    pub fn is_model_allowed(&self, model: &str) -> bool {
        self.models.iter().any(|allowed| allowed == model)
    }

    pub fn validate(&self) -> Result<(), GatewayError> {
        let required = [
            ("project id", &self.vertex.project_id),
            ("location", &self.vertex.location),
            ("endpoint id", &self.vertex.endpoint_id),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(GatewayError::ConfigError(format!("missing vertex {}", name)));
            }
        }

        if self.vertex.connectivity_mode == ConnectivityMode::Private
            && self
                .vertex
                .private_host
                .as_deref()
                .is_none_or(|host| host.trim().is_empty())
        {
            return Err(GatewayError::ConfigError(
                "private endpoint mode requires an endpoint host".to_string(),
            ));
        }

        if self.models.is_empty() {
            return Err(GatewayError::ConfigError(
                "at least one model must be configured".to_string(),
            ));
        }
        if self.models.iter().any(|model| model.trim().is_empty()) {
            return Err(GatewayError::ConfigError(
                "model names must not be blank".to_string(),
            ));
        }

        if self.require_client_auth
            && self
                .client_api_key
                .as_deref()
                .is_none_or(|key| key.is_empty())
        {
            return Err(GatewayError::ConfigError(
                "client authentication is required but no API key is configured".to_string(),
            ));
        }

        if self.upstream_timeout_secs == 0 {
            return Err(GatewayError::ConfigError(
                "upstream timeout must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

pub trait ConfigLoader: Send + Sync {
    fn load_config(&self) -> Result<Config, GatewayError>;
}

type EnvLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Builds the configuration from environment variables.
pub struct EnvConfigLoader {
    lookup: EnvLookup,
}

impl EnvConfigLoader {
    pub fn new() -> Self {
        Self::with_lookup(|key| std::env::var(key).ok())
    }

    pub fn with_lookup(lookup: impl Fn(&str) -> Option<String> + Send + Sync + 'static) -> Self {
        Self {
            lookup: Box::new(lookup),
        }
    }

    fn var(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn var_or(&self, key: &str, default: &str) -> String {
        self.var(key).unwrap_or_else(|| default.to_string())
    }

    fn bool_var(&self, key: &str, default: bool) -> Result<bool, GatewayError> {
        match self.var(key) {
            None => Ok(default),
            Some(value) => parse_bool(&value).ok_or_else(|| {
                GatewayError::ConfigError(format!("{} must be a boolean, got {:?}", key, value))
            }),
        }
    }

    fn parsed_var<T: FromStr>(&self, key: &str, default: T) -> Result<T, GatewayError> {
        match self.var(key) {
            None => Ok(default),
            Some(value) => value.parse().map_err(|_| {
                GatewayError::ConfigError(format!("{} has an invalid value {:?}", key, value))
            }),
        }
    }
}

impl Default for EnvConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl ConfigLoader for EnvConfigLoader {
    fn load_config(&self) -> Result<Config, GatewayError> {
        let connectivity_mode = match self.var("ENDPOINT_TYPE") {
            Some(mode) => mode.parse()?,
            None => default_connectivity_mode(),
        };

        let vertex = VertexConfig {
            project_id: self.var_or("VERTEX_PROJECT_ID", ""),
            location: self.var_or("VERTEX_LOCATION", consts::DEFAULT_LOCATION),
            endpoint_id: self.var_or("VERTEX_ENDPOINT_ID", ""),
            connectivity_mode,
            private_host: self.var("ENDPOINT_HOST"),
            private_protocol: self.var_or("ENDPOINT_PROTOCOL", "https"),
        };

        let models = match self.var("AVAILABLE_MODELS") {
            Some(models) => models
                .split(',')
                .map(str::trim)
                .filter(|model| !model.is_empty())
                .map(str::to_string)
                .collect(),
            None => default_models(),
        };

        Ok(Config {
            vertex,
            server: ServerConfig {
                host: self.var_or("HOST", consts::DEFAULT_SERVER_HOST),
                port: self.parsed_var("PORT", consts::DEFAULT_SERVER_PORT)?,
            },
            models,
            model_owner: self.var_or("MODEL_OWNER", consts::DEFAULT_MODEL_OWNER),
            require_client_auth: self.bool_var("REQUIRE_CLIENT_AUTH", false)?,
            client_api_key: self.var("GATEWAY_API_KEY"),
            verify_upstream_tls: self.bool_var("VERIFY_UPSTREAM_TLS", false)?,
            upstream_timeout_secs: self.parsed_var(
                "UPSTREAM_TIMEOUT_SECS",
                consts::DEFAULT_UPSTREAM_TIMEOUT_SECS,
            )?,
            credentials: CredentialsConfig {
                access_token: self.var("VERTEX_ACCESS_TOKEN"),
                credentials_file: self.var("GOOGLE_APPLICATION_CREDENTIALS").map(PathBuf::from),
                metadata_host: self.var("GCE_METADATA_HOST"),
            },
        })
    }
}

/// Reads the configuration from a JSON file. Secrets never live in the file:
/// the client API key and static access token come from `GATEWAY_API_KEY` and
/// `VERTEX_ACCESS_TOKEN`.
pub struct FileConfigLoader {
    path: PathBuf,
}

impl FileConfigLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn parse(config_str: &str) -> Result<Config, GatewayError> {
        let mut config: Config = serde_json::from_str(config_str)?;
        config.client_api_key = std::env::var("GATEWAY_API_KEY").ok().filter(|k| !k.is_empty());
        config.credentials.access_token = std::env::var("VERTEX_ACCESS_TOKEN")
            .ok()
            .filter(|t| !t.is_empty());
        Ok(config)
    }
}

impl ConfigLoader for FileConfigLoader {
    fn load_config(&self) -> Result<Config, GatewayError> {
        let config_str = std::fs::read_to_string(&self.path)?;
        Self::parse(&config_str)
    }
}

/// Loads and validates the process configuration. `GATEWAY_CONFIG_FILE`
/// selects a JSON file, otherwise everything comes from the environment.
pub fn load_config() -> Result<Config, GatewayError> {
    let loader: Box<dyn ConfigLoader> = match std::env::var("GATEWAY_CONFIG_FILE") {
        Ok(path) if !path.is_empty() => Box::new(FileConfigLoader::new(path)),
        _ => Box::new(EnvConfigLoader::new()),
    };
    let config = loader.load_config()?;
    config.validate()?;
    Ok(config)
}
