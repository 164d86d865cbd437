use serde::{self, Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ChatMessage;
use super::request::StopSequences;

/// The inner, already OpenAI-shaped object returned by the model server.
pub type PredictionObject = Map<String, Value>;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PredictionInstance {
    #[serde(rename = "@requestFormat")]
    pub request_format: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    // Absence, not null, tells the model server there are no stop sequences.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub stop_sequences: Option<StopSequences>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PredictRequest {
    pub instances: Vec<PredictionInstance>,
}
