//! Public configuration types.
//!
//! These are the resolved, ready-to-use structs the service consumes.
//! Raw TOML deserialization types live in `raw.rs`.

use std::path::PathBuf;

/// Reference table location (`[catalog]`).
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// CSV file with `Code` and `Description` columns (already expanded, no `~`).
    pub path: PathBuf,
}

/// Web front-end configuration (`[http]`).
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Socket address to bind the listener to.
    pub bind: String,
    /// Upper bound on a single request, LLM round-trip included.
    pub request_timeout_seconds: u64,
}

/// Reasoning assistant configuration (`[assistant]`).
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    /// System prompt sent along with every diagnosis.
    pub instructions: String,
}

/// OpenAI / OpenAI-compatible provider configuration.
/// Populated from `[llm.openai]` in the TOML.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Full chat completions endpoint URL.
    pub api_base_url: String,
    /// Model name passed in the request body.
    pub model: String,
    /// Sampling temperature (ignored for models that forbid it).
    pub temperature: f32,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
}

/// LLM configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Which provider is active (`"dummy"`, `"openai"`, `"openai-compatible"`).
    /// Maps to `default` in `[llm]`.
    pub provider: String,
    pub openai: OpenAiConfig,
}

/// Fully-resolved service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub service_name: String,
    pub log_level: String,
    pub catalog: CatalogConfig,
    pub http: HttpConfig,
    pub assistant: AssistantConfig,
    pub llm: LlmConfig,
    /// API key from `LLM_API_KEY` env var; `None` for keyless local models.
    /// Never sourced from TOML.
    pub llm_api_key: Option<String>,
}
