use std::sync::Arc;

use vertex_gateway::app::create_app;
use vertex_gateway::auth;
use vertex_gateway::config::{self, ConnectivityMode};
use vertex_gateway::service::GatewayService;
use vertex_gateway::vertex_client::VertexClient;

fn log_startup(config: &config::Config, endpoint_url: &str) {
    let mode = match config.vertex.connectivity_mode {
        ConnectivityMode::Private => "PRIVATE",
        ConnectivityMode::Public => "PUBLIC",
    };
    log::info!("Project ID: {}", config.vertex.project_id);
    log::info!("Location: {}", config.vertex.location);
    log::info!("Endpoint ID: {} ({})", config.vertex.endpoint_id, mode);
    log::info!("Endpoint URL: {}", endpoint_url);
    log::info!("Models: {}", config.models.join(", "));
    log::info!(
        "API base: http://{}:{}/v1",
        config.server.host, config.server.port
    );
    if !config.require_client_auth {
        log::warn!("client authentication is disabled, every caller is accepted");
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    log::info!("Initializing Vertex AI gateway...");

    let config = match config::load_config() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };

    let vertex_client = auth::token_provider_from_config(&config.credentials)
        .and_then(|tokens| VertexClient::from_config(&config, tokens));
    let vertex_client = match vertex_client {
        Ok(client) => client,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };
    log_startup(&config, vertex_client.endpoint_url());

    let bind_addr = (config.server.host.clone(), config.server.port);
    let config = Arc::new(config);
    let gateway_service = Arc::new(GatewayService::new(Arc::new(vertex_client), config.clone()));

    let app_factory = move || create_app(gateway_service.clone(), config.clone());

    actix_web::HttpServer::new(app_factory)
        .bind(bind_addr)?
        .run()
        .await
}
