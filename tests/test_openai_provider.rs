//! OpenAI-compatible provider against a stub `/v1/chat/completions` server.

mod common;

use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};

use dtc_assist::diagnosis::DiagnosisInput;
use dtc_assist::diagnosis::prompt::FALLBACK_SUGGESTION;
use dtc_assist::llm::ProviderError;

use common::MISFIRE;

/// Stub that answers with a summary of what it received.
fn echo_stub() -> Router {
    Router::new().route(
        "/v1/chat/completions",
        post(|headers: HeaderMap, Json(body): Json<Value>| async move {
            let auth = headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("none")
                .to_string();
            let messages = body["messages"].as_array().cloned().unwrap_or_default();
            let roles: Vec<_> = messages.iter().filter_map(|m| m["role"].as_str()).collect();
            let user = messages.last().and_then(|m| m["content"].as_str()).unwrap_or("");
            Json(json!({
                "choices": [{
                    "message": {
                        "content": format!(
                            "  auth={auth} roles={} model={} user_lines={}  ",
                            roles.join(","),
                            body["model"].as_str().unwrap_or(""),
                            user.lines().count(),
                        )
                    },
                    "finish_reason": "stop"
                }],
                "usage": { "prompt_tokens": 120, "completion_tokens": 40 }
            }))
        }),
    )
}

fn input() -> DiagnosisInput {
    DiagnosisInput {
        customer_complaint: "engine shakes".into(),
        method_choice: 1,
        dtc_code: Some("p0300".into()),
        related_symptoms: "rough idle".into(),
        problem_area: "engine".into(),
    }
}

#[tokio::test]
async fn completion_text_is_trimmed_and_usage_parsed() {
    let url = common::spawn_stub(echo_stub()).await;
    let provider = common::openai_provider(&url, 5, Some("sk-test"));

    let response = provider.complete("hello", Some("be brief")).await.unwrap();
    assert_eq!(
        response.text,
        "auth=Bearer sk-test roles=system,user model=gpt-4o-mini user_lines=1"
    );
    let usage = response.usage.unwrap();
    assert_eq!(usage.input_tokens, 120);
    assert_eq!(usage.output_tokens, 40);
}

#[tokio::test]
async fn keyless_provider_sends_no_auth() {
    let url = common::spawn_stub(echo_stub()).await;
    let provider = common::openai_provider(&url, 5, None);
    let response = provider.complete("hello", None).await.unwrap();
    assert!(response.text.starts_with("auth=none roles=user "));
}

#[tokio::test]
async fn recorder_sends_instructions_and_full_questionnaire() {
    let url = common::spawn_stub(echo_stub()).await;
    let recorder = common::recorder(common::openai_provider(&url, 5, None));

    let diagnosis = recorder.diagnose(input()).await.unwrap();
    assert!(diagnosis.completed);
    // six fields (the description spans two lines) plus the closing question
    assert!(diagnosis.suggestion.ends_with("roles=system,user model=gpt-4o-mini user_lines=8"));
    assert_eq!(
        diagnosis.record.dtc_description,
        format!("Código: P0300\nDescrição: {MISFIRE}")
    );
}

#[tokio::test]
async fn http_error_is_reported_with_envelope() {
    let stub = Router::new().route(
        "/v1/chat/completions",
        post(|| async {
            (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({ "error": { "message": "Rate limit reached", "code": "rate_limit_exceeded" } })),
            )
        }),
    );
    let url = common::spawn_stub(stub).await;
    let provider = common::openai_provider(&url, 5, None);

    let err = provider.complete("hello", None).await.unwrap_err();
    match err {
        ProviderError::Request(msg) => {
            assert!(msg.contains("429"), "{msg}");
            assert!(msg.contains("[code=rate_limit_exceeded]"), "{msg}");
            assert!(msg.contains("Rate limit reached"), "{msg}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn empty_content_is_incomplete() {
    let stub = Router::new().route(
        "/v1/chat/completions",
        post(|| async { Json(json!({ "choices": [{ "message": { "content": null } }] })) }),
    );
    let url = common::spawn_stub(stub).await;
    let provider = common::openai_provider(&url, 5, None);

    let err = provider.complete("hello", None).await.unwrap_err();
    assert!(matches!(err, ProviderError::Incomplete(_)));
}

#[tokio::test]
async fn filtered_run_is_incomplete() {
    let stub = Router::new().route(
        "/v1/chat/completions",
        post(|| async {
            Json(json!({ "choices": [{ "message": { "content": "partial" }, "finish_reason": "content_filter" }] }))
        }),
    );
    let url = common::spawn_stub(stub).await;
    let provider = common::openai_provider(&url, 5, None);

    let err = provider.complete("hello", None).await.unwrap_err();
    assert!(matches!(err, ProviderError::Incomplete(ref m) if m.contains("content_filter")));
}

#[tokio::test]
async fn failed_run_falls_back_and_keeps_record() {
    let stub = Router::new().route(
        "/v1/chat/completions",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let url = common::spawn_stub(stub).await;
    let recorder = common::recorder(common::openai_provider(&url, 5, None));

    let diagnosis = recorder.diagnose(input()).await.unwrap();
    assert_eq!(diagnosis.suggestion, FALLBACK_SUGGESTION);
    assert!(!diagnosis.completed);

    let records = recorder.history().snapshot().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0], diagnosis.record);
    assert!(records[0].dtc_description.ends_with(MISFIRE));
}
