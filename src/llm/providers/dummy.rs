//! Dummy LLM provider: echoes input back prefixed with `[echo]`.
//! Lets the service run end to end without an API key.

use crate::llm::{LlmResponse, ProviderError};

#[derive(Debug, Clone)]
pub struct DummyProvider;

impl DummyProvider {
    pub async fn complete(&self, content: &str, _system: Option<&str>) -> Result<LlmResponse, ProviderError> {
        Ok(LlmResponse {
            text: format!("[echo] {content}"),
            usage: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn complete_prefixes_echo() {
        let p = DummyProvider;
        assert_eq!(p.complete("hello", None).await.unwrap().text, "[echo] hello");
    }

    #[tokio::test]
    async fn complete_ignores_system_prompt() {
        let p = DummyProvider;
        let out = p.complete("idle", Some("address the user as Mechanic")).await.unwrap();
        assert_eq!(out.text, "[echo] idle");
        assert!(out.usage.is_none());
    }
}
