use crate::config::{ConnectivityMode, VertexConfig};
use crate::errors::GatewayError;

fn require<'a>(value: &'a str, name: &str) -> Result<&'a str, GatewayError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(GatewayError::ConfigError(format!("missing vertex {}", name)));
    }
    Ok(value)
}

/// Builds the absolute `:predict` URL for the configured endpoint.
pub fn resolve_endpoint(vertex: &VertexConfig) -> Result<String, GatewayError> {
    let project_id = require(&vertex.project_id, "project id")?;
    let location = require(&vertex.location, "location")?;
    let endpoint_id = require(&vertex.endpoint_id, "endpoint id")?;

    let root = match vertex.connectivity_mode {
        ConnectivityMode::Private => {
            let host = require(vertex.private_host.as_deref().unwrap_or_default(), "endpoint host")?;
            let protocol = require(&vertex.private_protocol, "endpoint protocol")?;
            format!("{}://{}", protocol, host.trim_end_matches('/'))
        }
        ConnectivityMode::Public => format!(
            "https://{}.{}-{}.prediction.vertexai.goog",
            endpoint_id, location, project_id
        ),
    };

    Ok(format!(
        "{}/v1/projects/{}/locations/{}/endpoints/{}:predict",
        root, project_id, location, endpoint_id
    ))
}
