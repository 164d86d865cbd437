use std::sync::Arc;

use crate::config::Config;
use crate::errors::GatewayError;
use crate::models::ChatMessage;
use crate::models::request::{ChatCompletionCreate, CompletionCreate, SamplingParams};
use crate::models::response::{ChatCompletion, Completion};
use crate::translate;
use crate::vertex_client::PredictionClient;

pub struct GatewayService {
    client: Arc<dyn PredictionClient>,
    config: Arc<Config>,
}

fn check_stream(stream: Option<bool>) -> Result<(), GatewayError> {
    if stream.unwrap_or(false) {
        return Err(GatewayError::Unsupported(
            "streaming responses are not supported, send stream=false".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn validate_sampling(params: &SamplingParams) -> Result<(), GatewayError> {
    if let Some(temperature) = params.temperature
        && !(0.0..=2.0).contains(&temperature)
    {
        return Err(GatewayError::ValidationError(format!(
            "temperature must be between 0 and 2, got {}",
            temperature
        )));
    }
    if let Some(top_p) = params.top_p
        && !(0.0..=1.0).contains(&top_p)
    {
        return Err(GatewayError::ValidationError(format!(
            "top_p must be between 0 and 1, got {}",
            top_p
        )));
    }
    if params.max_tokens == Some(0) {
        return Err(GatewayError::ValidationError(
            "max_tokens must be greater than 0".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn validate_chat_request(request: &ChatCompletionCreate) -> Result<(), GatewayError> {
    if request.messages.is_empty() {
        return Err(GatewayError::ValidationError(
            "messages must not be empty".to_string(),
        ));
    }
    validate_sampling(&request.sampling_params())
}

impl GatewayService {
    pub fn new(client: Arc<dyn PredictionClient>, config: Arc<Config>) -> Self {
        Self { client, config }
    }

    fn check_model(&self, model: &str) -> Result<(), GatewayError> {
        if !self.config.is_model_allowed(model) {
            log::info!("error: model not found: {:?}", model);
            return Err(GatewayError::ModelNotFound(model.to_string()));
        }
        Ok(())
    }

    pub async fn create_chat_completion(
        &self,
        request: ChatCompletionCreate,
    ) -> Result<ChatCompletion, GatewayError> {
        self.check_model(&request.model)?;
        check_stream(request.stream)?;
        validate_chat_request(&request)?;

        let prediction = self
            .client
            .generate(&request.messages, &request.sampling_params())
            .await?;

        translate::chat_completion_from_prediction(prediction, &request.model, &request.messages)
    }

    pub async fn create_completion(
        &self,
        request: CompletionCreate,
    ) -> Result<Completion, GatewayError> {
        self.check_model(&request.model)?;
        check_stream(request.stream)?;

        let prompt = request.prompt.first().ok_or_else(|| {
            GatewayError::ValidationError("prompt must not be an empty list".to_string())
        })?;
        let params = request.sampling_params();
        validate_sampling(&params)?;

        let messages = [ChatMessage::user(prompt)];
        let prediction = self.client.generate(&messages, &params).await?;

        translate::completion_from_prediction(prediction, &request.model, prompt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::helpers::{RecordingClient, create_test_chat_request, create_test_config};
    use rstest::rstest;
    use serde_json::json;

    fn service(client: Arc<RecordingClient>) -> GatewayService {
        GatewayService::new(client, Arc::new(create_test_config()))
    }

    #[tokio::test]
    async fn test_unknown_model_never_reaches_upstream() {
        let client = Arc::new(RecordingClient::replying(json!({})));
        let result = service(client.clone())
            .create_chat_completion(create_test_chat_request("not-a-model", "Hello!"))
            .await;

        assert_eq!(result.unwrap_err(), GatewayError::ModelNotFound("not-a-model".to_string()));
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_streaming_is_rejected() {
        let client = Arc::new(RecordingClient::replying(json!({})));
        let mut request = create_test_chat_request("test-model", "Hello!");
        request.stream = Some(true);

        let result = service(client.clone()).create_chat_completion(request).await;
        assert!(matches!(result, Err(GatewayError::Unsupported(_))));
        assert_eq!(client.call_count(), 0);
    }

    #[rstest]
    #[case(Some(2.5), None, None)]
    #[case(Some(-0.1), None, None)]
    #[case(None, Some(1.5), None)]
    #[case(None, None, Some(0))]
    fn test_sampling_validation(
        #[case] temperature: Option<f32>,
        #[case] top_p: Option<f32>,
        #[case] max_tokens: Option<u32>,
    ) {
        let params = SamplingParams {
            temperature,
            top_p,
            max_tokens,
            ..Default::default()
        };
        assert!(matches!(
            validate_sampling(&params),
            Err(GatewayError::ValidationError(_))
        ));
    }

    #[test]
    fn test_empty_messages_rejected() {
        let mut request = create_test_chat_request("test-model", "Hello!");
        request.messages.clear();
        assert!(matches!(
            validate_chat_request(&request),
            Err(GatewayError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_chat_completion_passes_messages_and_params() {
        let client = Arc::new(RecordingClient::replying(json!({
            "choices": [{"message": {"role": "assistant", "content": "Hi"}}]
        })));
        let completion = service(client.clone())
            .create_chat_completion(create_test_chat_request("test-model", "Hello!"))
            .await
            .unwrap();

        assert_eq!(completion.model, "test-model");
        assert_eq!(completion.choices[0].message.content, "Hi");

        let calls = client.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, vec![ChatMessage::user("Hello!")]);
        assert_eq!(calls[0].1.max_tokens, Some(150));
    }

    #[tokio::test]
    async fn test_completion_uses_first_prompt() {
        let client = Arc::new(RecordingClient::replying(json!({
            "choices": [{"message": {"role": "assistant", "content": "a b c"}}]
        })));
        let request: CompletionCreate = serde_json::from_value(json!({
            "model": "test-model",
            "prompt": ["x y", "ignored"]
        }))
        .unwrap();

        let completion = service(client.clone()).create_completion(request).await.unwrap();
        assert_eq!(completion.choices[0].text, "a b c");
        assert_eq!(completion.usage.prompt_tokens, 2);
        assert_eq!(completion.usage.completion_tokens, 3);
        assert_eq!(completion.usage.total_tokens, 5);

        let calls = client.calls();
        assert_eq!(calls[0].0, vec![ChatMessage::user("x y")]);
        assert_eq!(calls[0].1.top_p, Some(1.0));
        assert_eq!(calls[0].1.top_k, None);
        assert_eq!(calls[0].1.stop, None);
    }

    #[tokio::test]
    async fn test_completion_empty_prompt_list() {
        let client = Arc::new(RecordingClient::replying(json!({})));
        let request: CompletionCreate =
            serde_json::from_value(json!({"model": "test-model", "prompt": []})).unwrap();

        let result = service(client.clone()).create_completion(request).await;
        assert!(matches!(result, Err(GatewayError::ValidationError(_))));
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_upstream_errors_propagate_unchanged() {
        let error = GatewayError::UpstreamHttpError {
            status: 503,
            body: "down".to_string(),
        };
        let client = Arc::new(RecordingClient::failing(error.clone()));
        let result = service(client)
            .create_chat_completion(create_test_chat_request("test-model", "Hello!"))
            .await;
        assert_eq!(result.unwrap_err(), error);
    }
}
