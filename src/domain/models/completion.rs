use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Turn;

/// Token budget sent with every request. Not configurable.
pub const MAX_TOKENS: u32 = 1000;
/// Sampling temperature sent with every request. Not configurable.
pub const TEMPERATURE: f32 = 0.7;

/// Body of one chat-completions call. Built fresh per call from a snapshot of
/// the transcript and never retained.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Turn],
    max_tokens: u32,
    temperature: f32,
}

impl<'a> CompletionRequest<'a> {
    pub fn new(model: &'a str, messages: &'a [Turn]) -> Self {
        Self {
            model,
            messages,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        }
    }
}

/// Raw JSON returned by the gateway with a 200 status.
///
/// The shape is not checked on arrival: callers use [`assistant_text`] and
/// decide what to do when the expected path is missing.
///
/// [`assistant_text`]: CompletionResponse::assistant_text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletionResponse(Value);

impl CompletionResponse {
    pub fn new(raw: Value) -> Self {
        Self(raw)
    }

    /// `choices[0].message.content`, when present and a string.
    pub fn assistant_text(&self) -> Option<&str> {
        self.0
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
    }

    pub fn raw(&self) -> &Value {
        &self.0
    }
}

impl fmt::Display for CompletionResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_request_body_shape() {
        let turns = vec![Turn::user("Olá")];
        let request = CompletionRequest::new("gpt-4.1-mini", &turns);
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body["model"], "gpt-4.1-mini");
        assert_eq!(body["messages"], json!([{"role": "user", "content": "Olá"}]));
        assert_eq!(body["max_tokens"], 1000);
        assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_assistant_text_extracted() {
        let response = CompletionResponse::new(json!({
            "id": "chatcmpl-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "Oi!"}}]
        }));
        assert_eq!(response.assistant_text(), Some("Oi!"));
    }

    #[test]
    fn test_malformed_shapes_yield_none() {
        let shapes = [
            json!({}),
            json!({"choices": []}),
            json!({"choices": [{}]}),
            json!({"choices": [{"message": {}}]}),
            json!({"choices": [{"message": {"content": null}}]}),
            json!({"choices": [{"message": {"content": 42}}]}),
            json!([1, 2, 3]),
        ];
        for raw in shapes {
            let response = CompletionResponse::new(raw.clone());
            assert_eq!(response.assistant_text(), None, "shape {raw} should not extract");
        }
    }

    #[test]
    fn test_display_is_compact_json() {
        let response = CompletionResponse::new(json!({}));
        assert_eq!(response.to_string(), "{}");
    }
}
