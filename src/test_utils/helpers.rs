use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::{Config, ConnectivityMode, CredentialsConfig, ServerConfig, VertexConfig};
use crate::errors::GatewayError;
use crate::models::ChatMessage;
use crate::models::request::{ChatCompletionCreate, SamplingParams};
use crate::models::upstream::PredictionObject;
use crate::vertex_client::PredictionClient;

pub fn create_test_chat_request(model: &str, user_message: &str) -> ChatCompletionCreate {
    ChatCompletionCreate {
        model: model.to_string(),
        messages: vec![ChatMessage::user(user_message)],
        max_tokens: Some(150),
        temperature: None,
        top_p: None,
        top_k: None,
        stream: None,
        stop: None,
    }
}

pub fn create_test_config() -> Config {
    Config {
        vertex: VertexConfig {
            project_id: "test-project".to_string(),
            location: "europe-west1".to_string(),
            endpoint_id: "1234".to_string(),
            connectivity_mode: ConnectivityMode::Private,
            private_host: Some("127.0.0.1".to_string()),
            private_protocol: "https".to_string(),
        },
        server: ServerConfig::default(),
        models: vec!["test-model".to_string()],
        model_owner: "AI Team".to_string(),
        require_client_auth: false,
        client_api_key: None,
        verify_upstream_tls: false,
        upstream_timeout_secs: 120,
        credentials: CredentialsConfig::default(),
    }
}

type RecordedCall = (Vec<ChatMessage>, SamplingParams);

/// Prediction client that records its calls and replies with a canned result.
pub struct RecordingClient {
    reply: Result<Value, GatewayError>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl RecordingClient {
    pub fn replying(prediction: Value) -> Self {
        Self {
            reply: Ok(prediction),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: GatewayError) -> Self {
        Self {
            reply: Err(error),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl PredictionClient for RecordingClient {
    async fn generate(
        &self,
        messages: &[ChatMessage],
        params: &SamplingParams,
    ) -> Result<PredictionObject, GatewayError> {
        self.calls
            .lock()
            .unwrap()
            .push((messages.to_vec(), params.clone()));
        match &self.reply {
            Ok(Value::Object(prediction)) => Ok(prediction.clone()),
            Ok(other) => panic!("canned prediction must be an object, got {}", other),
            Err(e) => Err(e.clone()),
        }
    }
}
