use std::time::{SystemTime, UNIX_EPOCH};

use serde::Deserialize;
use serde_json::Value;

use crate::errors::GatewayError;
use crate::models::response::{ChatChoice, ChatCompletion, Completion, CompletionChoice};
use crate::models::upstream::PredictionObject;
use crate::models::{ChatMessage, Usage};

const DEFAULT_FINISH_REASON: &str = "stop";

#[derive(Debug, Deserialize, Default)]
struct PredictedUsage {
    #[serde(default)]
    prompt_tokens: Option<u32>,
    #[serde(default)]
    completion_tokens: Option<u32>,
    #[serde(default)]
    total_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct PredictedChoice {
    #[serde(default)]
    index: Option<u32>,
    message: ChatMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PredictedCompletion {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    object: Option<String>,
    #[serde(default)]
    created: Option<i64>,
    choices: Vec<PredictedChoice>,
    #[serde(default)]
    usage: Option<PredictedUsage>,
}

pub(crate) fn unix_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() as i64)
        .unwrap_or_default()
}

/// Rough token count: the number of whitespace-delimited words.
pub fn estimate_tokens(text: &str) -> u32 {
    text.split_whitespace().count() as u32
}

/// Pulls the prediction object out of a `{"predictions": ...}` envelope.
/// The object itself is returned untouched.
pub fn unwrap_predictions(raw: Value) -> Result<PredictionObject, GatewayError> {
    let fail = |message: &str, raw: &Value| GatewayError::upstream_format(message, raw.to_string());

    let predictions = match raw.get("predictions") {
        None | Some(Value::Null) => {
            return Err(fail("No 'predictions' field in Vertex AI response", &raw));
        }
        Some(predictions) => predictions,
    };

    let prediction = match predictions {
        Value::Array(items) => match items.first() {
            Some(first) => first,
            None => return Err(fail("Empty 'predictions' list in Vertex AI response", &raw)),
        },
        Value::Object(object) if object.is_empty() => {
            return Err(fail("Empty 'predictions' object in Vertex AI response", &raw));
        }
        Value::Object(_) => predictions,
        _ => {
            return Err(fail(
                "'predictions' field is not an object or a list",
                &raw,
            ));
        }
    };

    match prediction {
        Value::Object(object) => Ok(object.clone()),
        _ => Err(fail("Prediction is not an object", &raw)),
    }
}

fn parse_prediction(prediction: PredictionObject) -> Result<PredictedCompletion, GatewayError> {
    let raw = Value::Object(prediction);
    serde_json::from_value::<PredictedCompletion>(raw.clone())
        .map_err(|err| GatewayError::upstream_format(err.to_string(), raw.to_string()))
}

fn resolve_usage(
    usage: Option<PredictedUsage>,
    prompt_text: &str,
    output_text: &str,
    raw: &Value,
) -> Result<Usage, GatewayError> {
    let usage = usage.unwrap_or_default();
    let prompt_tokens = usage
        .prompt_tokens
        .unwrap_or_else(|| estimate_tokens(prompt_text));
    let completion_tokens = usage
        .completion_tokens
        .unwrap_or_else(|| estimate_tokens(output_text));
    let total_tokens = prompt_tokens.checked_add(completion_tokens).ok_or_else(|| {
        GatewayError::upstream_format("usage token counts overflow", raw.to_string())
    })?;
    Ok(Usage {
        prompt_tokens,
        completion_tokens,
        total_tokens,
    })
}

/// Adapts a prediction produced for a chat call into the chat response,
/// echoing the requested model name. Complete upstream usage is passed
/// through; anything missing is estimated from the conversation.
pub fn chat_completion_from_prediction(
    prediction: PredictionObject,
    model: &str,
    messages: &[ChatMessage],
) -> Result<ChatCompletion, GatewayError> {
    let raw = Value::Object(prediction.clone());
    let predicted = parse_prediction(prediction)?;

    let usage = match predicted.usage {
        Some(PredictedUsage {
            prompt_tokens: Some(prompt_tokens),
            completion_tokens: Some(completion_tokens),
            total_tokens: Some(total_tokens),
        }) => Usage {
            prompt_tokens,
            completion_tokens,
            total_tokens,
        },
        partial => {
            let prompt_text = messages
                .iter()
                .map(|message| message.content.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            let output_text = predicted
                .choices
                .first()
                .map(|choice| choice.message.content.as_str())
                .unwrap_or_default();
            resolve_usage(partial, &prompt_text, output_text, &raw)?
        }
    };

    let choices = predicted
        .choices
        .into_iter()
        .enumerate()
        .map(|(position, choice)| ChatChoice {
            index: choice.index.unwrap_or(position as u32),
            message: choice.message,
            finish_reason: choice
                .finish_reason
                .unwrap_or_else(|| DEFAULT_FINISH_REASON.to_string()),
        })
        .collect();

    Ok(ChatCompletion {
        id: predicted
            .id
            .unwrap_or_else(|| format!("chatcmpl-{}", uuid::Uuid::new_v4())),
        object: predicted
            .object
            .unwrap_or_else(|| "chat.completion".to_string()),
        created: predicted.created.unwrap_or_else(unix_timestamp),
        model: model.to_string(),
        choices,
        usage,
    })
}

/// Derives a legacy text completion from a chat-shaped prediction.
/// `total_tokens` is always recomputed, never taken from upstream.
pub fn completion_from_prediction(
    prediction: PredictionObject,
    model: &str,
    prompt: &str,
) -> Result<Completion, GatewayError> {
    let raw = Value::Object(prediction.clone());
    let predicted = parse_prediction(prediction)?;

    let first = match predicted.choices.into_iter().next() {
        Some(choice) => choice,
        None => {
            return Err(GatewayError::upstream_format(
                "prediction has no choices",
                raw.to_string(),
            ));
        }
    };

    let text = first.message.content;
    let usage = resolve_usage(predicted.usage, prompt, &text, &raw)?;

    let id = predicted.id.unwrap_or_else(|| {
        let mut hex = uuid::Uuid::new_v4().simple().to_string();
        hex.truncate(10);
        format!("cmpl-{}", hex)
    });

    Ok(Completion {
        id,
        object: "text_completion".to_string(),
        created: predicted.created.unwrap_or_else(unix_timestamp),
        model: model.to_string(),
        choices: vec![CompletionChoice {
            index: 0,
            text,
            finish_reason: first
                .finish_reason
                .unwrap_or_else(|| DEFAULT_FINISH_REASON.to_string()),
        }],
        usage,
    })
}
