//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` relative to the current working directory
//! (or the file passed with `-f`), then applies `DTC_ASSIST_LOG_LEVEL`,
//! `DTC_ASSIST_CATALOG` and `DTC_ASSIST_BIND` env overrides.
//!
//! # Module layout
//!
//! - **types**: Public configuration structs (`Config`, `LlmConfig`, …).
//! - **raw**: Raw TOML deserialization types. These mirror the file shape
//!   and use serde defaults; kept private.
//! - **load**: `merge_toml`, `load`, `load_from`, `expand_home`.

mod load;
mod raw;
mod types;

pub use load::{expand_home, load, load_from, Overrides};
pub use types::*;

impl Config {
    /// Safe `Config` for tests: dummy LLM, no API key, ephemeral port.
    pub fn test_default(catalog_path: &std::path::Path) -> Self {
        Self {
            service_name: "test".into(),
            log_level: "info".into(),
            catalog: CatalogConfig {
                path: catalog_path.to_path_buf(),
            },
            http: HttpConfig {
                bind: "127.0.0.1:0".into(),
                request_timeout_seconds: 5,
            },
            assistant: AssistantConfig {
                instructions: raw::default_instructions(),
            },
            llm: LlmConfig {
                provider: "dummy".into(),
                openai: OpenAiConfig {
                    api_base_url: "http://localhost:0/v1/chat/completions".into(),
                    model: "test-model".into(),
                    temperature: 0.0,
                    timeout_seconds: 1,
                },
            },
            llm_api_key: None,
        }
    }
}
