use serde_json::Value;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

pub const PREDICT_PATH: &str =
    "/v1/projects/test-project/locations/europe-west1/endpoints/1234:predict";

pub async fn setup_prediction_mock(status: u16, body: impl Into<Value>) -> MockServer {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(PREDICT_PATH))
        .respond_with(ResponseTemplate::new(status).set_body_json(body.into()))
        .mount(&mock_server)
        .await;

    mock_server
}

pub async fn setup_raw_mock(status: u16, body: &str) -> MockServer {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(PREDICT_PATH))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(&mock_server)
        .await;

    mock_server
}

/// A mock server that fails the test on drop if it receives any request.
pub async fn setup_untouched_mock() -> MockServer {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&mock_server)
        .await;

    mock_server
}
