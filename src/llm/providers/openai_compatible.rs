//! Chat-completions backend for the diagnosis assistant.
//!
//! Works against OpenAI and any server speaking the same `/v1/chat/completions`
//! dialect (Ollama, LM Studio, vLLM). Each diagnosis is one request carrying
//! the assistant instructions as the system message and the rendered
//! questionnaire as the user message. Wire structs stay in this file.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace, warn};

use crate::llm::{LlmResponse, LlmUsage, ProviderError};

/// Model families that reject an explicit `temperature`.
const FIXED_TEMPERATURE_PREFIXES: &[&str] = &["gpt-5"];

#[derive(Debug, Clone)]
pub struct OpenAiCompatibleProvider {
    client: Client,
    api_base_url: String,
    model: String,
    temperature: f32,
    api_key: Option<String>,
}

impl OpenAiCompatibleProvider {
    /// `timeout_seconds` bounds the whole HTTP exchange. A present `api_key`
    /// is sent as a bearer token; local servers usually need none.
    pub fn new(
        api_base_url: String,
        model: String,
        temperature: f32,
        timeout_seconds: u64,
        api_key: Option<String>,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| ProviderError::Request(format!("cannot build HTTP client: {e}")))?;

        Ok(Self { client, api_base_url, model, temperature, api_key })
    }

    fn temperature(&self) -> Option<f32> {
        let fixed = FIXED_TEMPERATURE_PREFIXES
            .iter()
            .any(|prefix| self.model.starts_with(prefix));
        (!fixed).then_some(self.temperature)
    }

    /// One round-trip: `content` as the user turn, `system` as the optional
    /// instruction turn.
    pub async fn complete(&self, content: &str, system: Option<&str>) -> Result<LlmResponse, ProviderError> {
        let request = ChatRequest {
            model: &self.model,
            messages: system
                .map(|text| ChatMessage { role: "system", content: text })
                .into_iter()
                .chain([ChatMessage { role: "user", content }])
                .collect(),
            temperature: self.temperature(),
        };

        debug!(model = %self.model, prompt_chars = content.len(), "requesting diagnosis suggestion");
        trace_json("chat request", &request);

        let mut builder = self.client.post(&self.api_base_url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            error!(url = %self.api_base_url, timeout = e.is_timeout(), "assistant unreachable: {e}");
            ProviderError::Request(e.to_string())
        })?;

        let body: ChatResponse = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::Request(format!("unreadable chat response: {e}")))?;

        trace_json("chat response", &body);
        body.into_reply()
    }
}

fn trace_json<T: Serialize>(what: &str, value: &T) {
    if tracing::enabled!(tracing::Level::TRACE) {
        match serde_json::to_string_pretty(value) {
            Ok(json) => trace!(%json, "{what}"),
            Err(e) => trace!("{what}: not serializable ({e})"),
        }
    }
}

/// Pass 2xx responses through; turn anything else into a readable error.
async fn ensure_success(response: Response) -> Result<Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = describe_failure(status, &body);
    error!(%status, "assistant returned an error: {message}");
    Err(ProviderError::Request(message))
}

fn describe_failure(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => envelope.error.describe(status),
        Err(_) => format!("HTTP {status}: {body}"),
    }
}

// ── Wire format ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<TokenCounts>,
}

impl ChatResponse {
    /// First choice's text. A filtered run or blank text is `Incomplete`.
    fn into_reply(self) -> Result<LlmResponse, ProviderError> {
        let usage = self.usage.map(|u| LlmUsage {
            input_tokens: u.prompt_tokens,
            output_tokens: u.completion_tokens,
        });

        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Incomplete("response has no choices".into()))?;

        if choice.finish_reason.as_deref() == Some("content_filter") {
            warn!("assistant reply withheld by content filter");
            return Err(ProviderError::Incomplete("finish_reason=content_filter".into()));
        }

        let text = choice.message.content.as_deref().map(str::trim).unwrap_or_default();
        if text.is_empty() {
            return Err(ProviderError::Incomplete("reply has no text".into()));
        }
        Ok(LlmResponse { text: text.to_string(), usage })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct TokenCounts {
    prompt_tokens: u64,
    completion_tokens: u64,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatChoice {
    message: ReplyMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

impl ApiError {
    fn describe(self, status: StatusCode) -> String {
        match self.code {
            Some(serde_json::Value::String(code)) => format!("HTTP {status} [code={code}]: {}", self.message),
            Some(code) if !code.is_null() => format!("HTTP {status} [code={code}]: {}", self.message),
            _ => format!("HTTP {status}: {}", self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(model: &str) -> OpenAiCompatibleProvider {
        OpenAiCompatibleProvider::new(
            "http://127.0.0.1:11434/v1/chat/completions".to_string(),
            model.to_string(),
            0.2,
            5,
            None,
        )
        .unwrap()
    }

    fn reply(json: &str) -> Result<LlmResponse, ProviderError> {
        serde_json::from_str::<ChatResponse>(json).unwrap().into_reply()
    }

    #[test]
    fn gpt5_models_send_no_temperature() {
        assert_eq!(provider("llama3.1").temperature(), Some(0.2));
        assert_eq!(provider("gpt-5-mini").temperature(), None);

        let request = ChatRequest {
            model: "gpt-5-mini",
            messages: vec![ChatMessage { role: "user", content: "P0300?" }],
            temperature: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("temperature").is_none());
        assert_eq!(json["messages"][0]["role"], "user");
    }

    #[test]
    fn reply_without_usage() {
        let response = reply(r#"{"choices":[{"message":{"content":"  Check the plugs.\n"},"finish_reason":"stop"}]}"#).unwrap();
        assert_eq!(response.text, "Check the plugs.");
        assert!(response.usage.is_none());
    }

    #[test]
    fn reply_with_usage() {
        let response = reply(
            r#"{"choices":[{"message":{"content":"ok"}}],"usage":{"prompt_tokens":12,"completion_tokens":3}}"#,
        )
        .unwrap();
        assert_eq!(response.usage, Some(LlmUsage { input_tokens: 12, output_tokens: 3 }));
    }

    #[test]
    fn blank_or_missing_reply_is_incomplete() {
        for json in [
            r#"{"choices":[]}"#,
            r#"{"choices":[{"message":{"content":null}}]}"#,
            r#"{"choices":[{"message":{"content":"   "}}]}"#,
            r#"{"choices":[{"message":{"content":"x"},"finish_reason":"content_filter"}]}"#,
        ] {
            assert!(matches!(reply(json), Err(ProviderError::Incomplete(_))), "{json}");
        }
    }

    #[test]
    fn error_envelope_with_code() {
        let msg = describe_failure(
            StatusCode::UNAUTHORIZED,
            r#"{"error":{"message":"Incorrect API key provided","code":"invalid_api_key"}}"#,
        );
        assert_eq!(msg, "HTTP 401 Unauthorized [code=invalid_api_key]: Incorrect API key provided");
    }

    #[test]
    fn error_envelope_without_code() {
        let msg = describe_failure(StatusCode::TOO_MANY_REQUESTS, r#"{"error":{"message":"slow down","code":null}}"#);
        assert_eq!(msg, "HTTP 429 Too Many Requests: slow down");
    }

    #[test]
    fn error_body_not_json() {
        let msg = describe_failure(StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(msg, "HTTP 502 Bad Gateway: upstream down");
    }
}
