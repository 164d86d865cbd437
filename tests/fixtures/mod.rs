#![allow(dead_code)]

use serde_json::{Value, json};

pub const TEST_MODEL: &str = "google/vertexai/gemma3";

pub fn sample_prediction() -> Value {
    json!({
        "id": "x",
        "created": 1,
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": "Hi"},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 1, "completion_tokens": 1, "total_tokens": 2}
    })
}

pub fn sample_prediction_without_usage(content: &str) -> Value {
    json!({
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content}
        }]
    })
}

pub fn sample_envelope() -> Value {
    json!({"predictions": [sample_prediction()]})
}

pub fn sample_chat_request() -> Value {
    json!({
        "model": TEST_MODEL,
        "messages": [{"role": "user", "content": "Hello!"}],
        "max_tokens": 150
    })
}

pub fn sample_completion_request() -> Value {
    json!({
        "model": TEST_MODEL,
        "prompt": "x y"
    })
}
