//! Raw TOML deserialization types.
//!
//! These structs mirror the TOML file shape and use `serde` defaults, so an
//! empty document is a valid configuration.

use serde::Deserialize;

// ── Top-level ────────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub(super) struct RawConfig {
    #[serde(default)]
    pub service: RawService,
    #[serde(default)]
    pub catalog: RawCatalog,
    #[serde(default)]
    pub http: RawHttp,
    #[serde(default)]
    pub assistant: RawAssistant,
    #[serde(default)]
    pub llm: RawLlm,
}

#[derive(Deserialize)]
pub(super) struct RawService {
    #[serde(default = "default_service_name")]
    pub name: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for RawService {
    fn default() -> Self {
        Self { name: default_service_name(), log_level: default_log_level() }
    }
}

// ── Catalog / HTTP / assistant ───────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct RawCatalog {
    #[serde(default = "default_catalog_path")]
    pub path: String,
}

impl Default for RawCatalog {
    fn default() -> Self {
        Self { path: default_catalog_path() }
    }
}

#[derive(Deserialize)]
pub(super) struct RawHttp {
    #[serde(default = "default_http_bind")]
    pub bind: String,
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
}

impl Default for RawHttp {
    fn default() -> Self {
        Self {
            bind: default_http_bind(),
            request_timeout_seconds: default_request_timeout_seconds(),
        }
    }
}

#[derive(Deserialize)]
pub(super) struct RawAssistant {
    #[serde(default = "default_instructions")]
    pub instructions: String,
}

impl Default for RawAssistant {
    fn default() -> Self {
        Self { instructions: default_instructions() }
    }
}

// ── LLM ──────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct RawLlm {
    /// Maps to `default = "..."` in `[llm]`.
    #[serde(rename = "default", default = "default_llm_provider")]
    pub provider: String,
    #[serde(default)]
    pub openai: RawOpenAiConfig,
}

impl Default for RawLlm {
    fn default() -> Self {
        Self { provider: default_llm_provider(), openai: RawOpenAiConfig::default() }
    }
}

#[derive(Deserialize)]
pub(super) struct RawOpenAiConfig {
    #[serde(default = "default_openai_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_openai_model")]
    pub model: String,
    #[serde(default = "default_openai_temperature")]
    pub temperature: f32,
    #[serde(default = "default_openai_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for RawOpenAiConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_openai_api_base_url(),
            model: default_openai_model(),
            temperature: default_openai_temperature(),
            timeout_seconds: default_openai_timeout_seconds(),
        }
    }
}

// ── Defaults ─────────────────────────────────────────────────────────────────

pub(super) fn default_service_name() -> String { "dtc-assist".to_string() }
pub(super) fn default_log_level() -> String { "info".to_string() }
pub(super) fn default_catalog_path() -> String { "data/OBD.csv".to_string() }
pub(super) fn default_http_bind() -> String { "127.0.0.1:8080".to_string() }
pub(super) fn default_request_timeout_seconds() -> u64 { 120 }
pub(super) fn default_llm_provider() -> String { "dummy".to_string() }
pub(super) fn default_openai_api_base_url() -> String { "https://api.openai.com/v1/chat/completions".to_string() }
pub(super) fn default_openai_model() -> String { "gpt-4o-mini".to_string() }
pub(super) fn default_openai_temperature() -> f32 { 0.2 }
pub(super) fn default_openai_timeout_seconds() -> u64 { 90 }

pub(super) fn default_instructions() -> String {
    crate::diagnosis::prompt::DEFAULT_INSTRUCTIONS.to_string()
}
