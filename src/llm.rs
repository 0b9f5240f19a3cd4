//! Upstream LLM gateway
//!
//! The assistant capability is a hosted Langflow workflow consumed as an
//! opaque HTTP JSON service. The response shape has drifted across upstream
//! versions, so reply extraction probes an ordered list of candidate paths
//! and falls back to the literal payload rather than ever failing a turn.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::error::{AppError, AppResult};

/// Chat turn forwarded to the workflow endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnPayload {
    pub input_value: String,
    pub output_type: String,
    pub input_type: String,
    pub session_id: String,
}

impl TurnPayload {
    /// Build a chat-mode payload for the given upstream conversation id
    pub fn chat(input: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            input_value: input.into(),
            output_type: "chat".to_string(),
            input_type: "chat".to_string(),
            session_id: session_id.into(),
        }
    }
}

/// Seam between the chat orchestrator and the upstream endpoint. Tests drive
/// the orchestrator with a stub implementation.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Forward a turn and return the provider's raw JSON response
    async fn process(&self, payload: &TurnPayload) -> AppResult<Value>;
}

/// HTTP client for the hosted Langflow run endpoint
pub struct LangflowClient {
    client: reqwest::Client,
    endpoint: String,
}

impl LangflowClient {
    pub fn new(endpoint: impl Into<String>, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// Override the endpoint (useful for tests)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl LlmGateway for LangflowClient {
    async fn process(&self, payload: &TurnPayload) -> AppResult<Value> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Upstream(status.as_u16()));
        }

        let body = response.json::<Value>().await?;
        Ok(body)
    }
}

type Extractor = fn(&Value) -> Option<String>;

fn string_at<'a>(value: &'a Value, pointer: &str) -> Option<&'a str> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// Candidate reply locations under `outputs[0].outputs[0]`, probed in order,
/// first present wins. The order tracks observed upstream shapes and must be
/// kept stable.
const OUTPUT_EXTRACTORS: &[Extractor] = &[
    |o| string_at(o, "/results/message/data/text").map(str::to_owned),
    |o| string_at(o, "/results/message/text").map(str::to_owned),
    |o| string_at(o, "/outputs/message/message").map(str::to_owned),
    |o| string_at(o, "/artifacts/message").map(str::to_owned),
    |o| string_at(o, "/messages/0/message").map(str::to_owned),
];

/// Extract a human-readable reply from a provider response. Never fails and
/// never returns an empty string: unknown shapes degrade to the top-level
/// `output`/`message` fields and finally to the serialized payload itself.
pub fn extract_reply(data: &Value) -> String {
    if let Some(first_output) = data.pointer("/outputs/0/outputs/0") {
        for extract in OUTPUT_EXTRACTORS {
            if let Some(text) = extract(first_output) {
                return text;
            }
        }
    }

    if let Some(text) = string_at(data, "/output") {
        return text.to_string();
    }
    if let Some(text) = string_at(data, "/message") {
        return text.to_string();
    }

    data.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn nested(inner: Value) -> Value {
        json!({ "outputs": [ { "outputs": [ inner ] } ] })
    }

    #[test]
    fn test_extract_primary_shape() {
        let data = nested(json!({ "results": { "message": { "data": { "text": "hi" } } } }));
        assert_eq!(extract_reply(&data), "hi");
    }

    #[test]
    fn test_extract_each_candidate_shape() {
        let cases = [
            (json!({ "results": { "message": { "text": "a" } } }), "a"),
            (json!({ "outputs": { "message": { "message": "b" } } }), "b"),
            (json!({ "artifacts": { "message": "c" } }), "c"),
            (json!({ "messages": [ { "message": "d" } ] }), "d"),
        ];
        for (inner, expected) in cases {
            assert_eq!(extract_reply(&nested(inner)), expected);
        }
    }

    #[test]
    fn test_precedence_first_match_wins() {
        let data = nested(json!({
            "results": { "message": { "data": { "text": "primary" }, "text": "secondary" } },
            "artifacts": { "message": "tertiary" }
        }));
        assert_eq!(extract_reply(&data), "primary");
    }

    #[test]
    fn test_top_level_fallbacks() {
        assert_eq!(extract_reply(&json!({ "output": "plain" })), "plain");
        assert_eq!(extract_reply(&json!({ "message": "note" })), "note");
    }

    #[test]
    fn test_unknown_shape_serializes_whole_payload() {
        let data = json!({ "weird": true });
        let reply = extract_reply(&data);
        assert!(!reply.is_empty());
        assert!(reply.contains("weird"));
    }

    #[test]
    fn test_empty_candidate_falls_through() {
        // An empty text must not be taken as the reply
        let data = nested(json!({
            "results": { "message": { "data": { "text": "" }, "text": "real" } }
        }));
        assert_eq!(extract_reply(&data), "real");
    }

    #[tokio::test]
    async fn test_client_forwards_payload_and_returns_raw_json() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/run")
                    .json_body(json!({
                        "input_value": "hello",
                        "output_type": "chat",
                        "input_type": "chat",
                        "session_id": "session_1"
                    }));
                then.status(200)
                    .json_body(json!({ "output": "world" }));
            })
            .await;

        let client =
            LangflowClient::new("https://example.invalid/run", 5).with_endpoint(server.url("/run"));
        let payload = TurnPayload::chat("hello", "session_1");
        let body = client.process(&payload).await.unwrap();

        mock.assert_async().await;
        assert_eq!(body, json!({ "output": "world" }));
    }

    #[tokio::test]
    async fn test_client_maps_non_success_to_upstream_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/run");
                then.status(503).body("overloaded");
            })
            .await;

        let client = LangflowClient::new(server.url("/run"), 5);
        let payload = TurnPayload::chat("hello", "session_1");
        let err = client.process(&payload).await.unwrap_err();
        assert!(matches!(err, AppError::Upstream(503)));
    }
}
