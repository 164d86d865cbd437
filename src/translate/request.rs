use crate::consts;
use crate::models::ChatMessage;
use crate::models::request::SamplingParams;
use crate::models::upstream::{PredictRequest, PredictionInstance};

/// Maps one conversation onto the model server's `instances` payload.
/// Never batches: the result always holds exactly one instance.
pub fn to_upstream_payload(messages: &[ChatMessage], params: &SamplingParams) -> PredictRequest {
    let stop_sequences = params.stop.clone().filter(|stop| !stop.is_empty());

    let instance = PredictionInstance {
        request_format: consts::REQUEST_FORMAT_CHAT.to_string(),
        messages: messages.to_vec(),
        max_tokens: params.max_tokens.unwrap_or(consts::DEFAULT_MAX_TOKENS),
        temperature: params.temperature.unwrap_or(consts::DEFAULT_TEMPERATURE),
        top_p: params.top_p.unwrap_or(consts::DEFAULT_CHAT_TOP_P),
        top_k: params.top_k.unwrap_or(consts::DEFAULT_TOP_K),
        stop_sequences,
    };

    PredictRequest {
        instances: vec![instance],
    }
}
