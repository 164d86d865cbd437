use std::sync::Arc;

use wiremock::MockServer;

use vertex_gateway::auth::{StaticTokenProvider, TokenProvider};
use vertex_gateway::config::{
    Config, ConnectivityMode, CredentialsConfig, ServerConfig, VertexConfig,
};
use vertex_gateway::service::GatewayService;
use vertex_gateway::vertex_client::VertexClient;

pub const TEST_TOKEN: &str = "test-token";

/// Private-mode config whose endpoint host is the given address over plain HTTP.
pub fn create_test_config_for_host(host: &str) -> Config {
    Config {
        vertex: VertexConfig {
            project_id: "test-project".to_string(),
            location: "europe-west1".to_string(),
            endpoint_id: "1234".to_string(),
            connectivity_mode: ConnectivityMode::Private,
            private_host: Some(host.to_string()),
            private_protocol: "http".to_string(),
        },
        server: ServerConfig::default(),
        models: vec!["google/vertexai/gemma3".to_string()],
        model_owner: "AI Team".to_string(),
        require_client_auth: false,
        client_api_key: None,
        verify_upstream_tls: false,
        upstream_timeout_secs: 120,
        credentials: CredentialsConfig::default(),
    }
}

pub fn create_test_config(upstream: &MockServer) -> Config {
    create_test_config_for_host(&upstream.address().to_string())
}

pub fn create_vertex_client(config: &Config, tokens: Arc<dyn TokenProvider>) -> VertexClient {
    VertexClient::from_config(config, tokens).unwrap()
}

pub fn create_test_app_components(config: Config) -> (Arc<Config>, Arc<GatewayService>) {
    let config = Arc::new(config);
    let tokens: Arc<dyn TokenProvider> = Arc::new(StaticTokenProvider::new(TEST_TOKEN));
    let client = create_vertex_client(&config, tokens);
    let gateway_service = Arc::new(GatewayService::new(Arc::new(client), config.clone()));

    (config, gateway_service)
}
