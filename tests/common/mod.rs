//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;

use dtc_assist::catalog::CodeCatalog;
use dtc_assist::diagnosis::{prompt, DiagnosticHistory, DiagnosticRecorder};
use dtc_assist::llm::providers::dummy::DummyProvider;
use dtc_assist::llm::providers::openai_compatible::OpenAiCompatibleProvider;
use dtc_assist::llm::LlmProvider;
use dtc_assist::web::WebState;

pub const MISFIRE: &str = "Random/Multiple Cylinder Misfire Detected";

pub fn catalog() -> Arc<CodeCatalog> {
    Arc::new(CodeCatalog::from_entries([
        ("P0300", MISFIRE),
        ("P0420", "Catalyst System Efficiency Below Threshold (Bank 1)"),
    ]))
}

pub fn recorder(provider: LlmProvider) -> Arc<DiagnosticRecorder> {
    Arc::new(DiagnosticRecorder::new(
        catalog(),
        Arc::new(DiagnosticHistory::new()),
        provider,
        prompt::DEFAULT_INSTRUCTIONS,
    ))
}

pub fn dummy_state() -> WebState {
    WebState::new("dtc-assist", recorder(LlmProvider::Dummy(DummyProvider)), Duration::from_secs(5))
}

pub fn openai_provider(url: &str, timeout_seconds: u64, api_key: Option<&str>) -> LlmProvider {
    LlmProvider::OpenAiCompatible(
        OpenAiCompatibleProvider::new(
            url.to_string(),
            "gpt-4o-mini".to_string(),
            0.2,
            timeout_seconds,
            api_key.map(str::to_string),
        )
        .unwrap(),
    )
}

/// Serve `router` on an ephemeral loopback port; returns the completions URL.
pub async fn spawn_stub(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/v1/chat/completions")
}
