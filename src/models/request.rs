use serde::{self, Deserialize, Serialize};

use super::ChatMessage;
use crate::consts;

/// `stop` accepts either a single string or a list, as in the OpenAI API.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum StopSequences {
    Single(String),
    Many(Vec<String>),
}

impl StopSequences {
    pub fn is_empty(&self) -> bool {
        match self {
            StopSequences::Single(stop) => stop.is_empty(),
            StopSequences::Many(stops) => stops.is_empty(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum Prompt {
    Single(String),
    Many(Vec<String>),
}

impl Prompt {
    /// Only the first prompt of a list is ever sent upstream.
    pub fn first(&self) -> Option<&str> {
        match self {
            Prompt::Single(prompt) => Some(prompt),
            Prompt::Many(prompts) => prompts.first().map(String::as_str),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChatCompletionCreate {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub stream: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub stop: Option<StopSequences>,
}

impl ChatCompletionCreate {
    pub fn sampling_params(&self) -> SamplingParams {
        SamplingParams {
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            top_p: self.top_p,
            top_k: self.top_k,
            stop: self.stop.clone(),
        }
    }
}

fn default_max_tokens() -> Option<u32> {
    Some(consts::DEFAULT_MAX_TOKENS)
}

fn default_temperature() -> Option<f32> {
    Some(consts::DEFAULT_TEMPERATURE)
}

fn default_completion_top_p() -> Option<f32> {
    Some(consts::DEFAULT_COMPLETION_TOP_P)
}

/// Legacy `/v1/completions` request. Unlike the chat request, its sampling
/// defaults are applied at deserialization time.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CompletionCreate {
    pub model: String,
    pub prompt: Prompt,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: Option<u32>,
    #[serde(default = "default_temperature")]
    pub temperature: Option<f32>,
    #[serde(default = "default_completion_top_p")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub stream: Option<bool>,
}

impl CompletionCreate {
    pub fn sampling_params(&self) -> SamplingParams {
        SamplingParams {
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            top_p: self.top_p.or(Some(consts::DEFAULT_COMPLETION_TOP_P)),
            top_k: None,
            stop: None,
        }
    }
}

/// Sampling knobs handed to the request translator; `None` means "use the
/// upstream default".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SamplingParams {
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub top_k: Option<u32>,
    pub stop: Option<StopSequences>,
}
