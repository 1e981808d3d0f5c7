//! HTML questionnaire and result pages.
//!
//! Pages are rendered from `format!` templates; every user-supplied value
//! goes through [`escape_html`] first.

use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use tracing::warn;

use crate::diagnosis::{DiagnoseError, Diagnosis, DiagnosisInput, DiagnosticMethod};

use super::WebState;

// ── Page shell ────────────────────────────────────────────────────────────────

const STYLE: &str = r#"
    *, *::before, *::after { box-sizing: border-box; margin: 0; padding: 0; }
    body {
      font-family: system-ui, -apple-system, sans-serif;
      background: #0f0f0f; color: #e0e0e0;
      display: flex; justify-content: center;
      padding: 3rem 1rem;
    }
    .card {
      width: 100%; max-width: 42rem; padding: 2rem 2.5rem;
      border: 1px solid #333; border-radius: 12px;
      background: #1a1a1a;
    }
    h1 { font-size: 1.5rem; margin-bottom: 1.25rem; }
    h2 { font-size: 1rem; color: #aaa; margin: 1.5rem 0 0.5rem; }
    label { display: block; font-size: 0.85rem; color: #888; margin: 0.9rem 0 0.3rem; }
    input, select, textarea {
      width: 100%; padding: 0.5rem 0.7rem;
      border: 1px solid #333; border-radius: 8px;
      background: #111; color: #e0e0e0; font: inherit;
    }
    textarea { min-height: 4.5rem; resize: vertical; }
    button, a.button {
      display: inline-block; margin-top: 1.5rem; padding: 0.5rem 1.5rem;
      border: none; border-radius: 8px; background: #2a2a3a; color: #c0c0e0;
      text-decoration: none; font: inherit; font-size: 0.9rem; cursor: pointer;
      transition: background 0.15s;
    }
    button:hover, a.button:hover { background: #3a3a5a; }
    pre { white-space: pre-wrap; line-height: 1.45; }
    dl { display: grid; grid-template-columns: max-content 1fr; gap: 0.35rem 1rem; font-size: 0.9rem; }
    dt { color: #888; }
    dd { white-space: pre-wrap; }
    .error { color: #e08080; }
"#;

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>{title}</title>
  <style>{STYLE}</style>
</head>
<body>
  <div class="card">
{body}
  </div>
</body>
</html>
"#,
        title = escape_html(title),
    )
}

// ── Form ──────────────────────────────────────────────────────────────────────

/// Form fields as posted by the questionnaire. Everything arrives as text.
#[derive(Debug, Default, Deserialize)]
pub(super) struct DiagnosisForm {
    #[serde(default)]
    customer_complaint: String,
    #[serde(default)]
    method_choice: String,
    #[serde(default)]
    dtc_code: String,
    #[serde(default)]
    related_symptoms: String,
    #[serde(default)]
    problem_area: String,
}

impl DiagnosisForm {
    fn into_input(self) -> Result<DiagnosisInput, String> {
        let method_choice = self
            .method_choice
            .trim()
            .parse::<usize>()
            .map_err(|_| format!("method choice '{}' is not a number between 1 and 6", self.method_choice))?;
        Ok(DiagnosisInput {
            customer_complaint: self.customer_complaint,
            method_choice,
            dtc_code: Some(self.dtc_code),
            related_symptoms: self.related_symptoms,
            problem_area: self.problem_area,
        })
    }
}

fn method_options() -> String {
    DiagnosticMethod::ALL
        .iter()
        .map(|m| format!(r#"        <option value="{}">{}. {}</option>"#, m.index(), m.index(), m.label()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn index_page(service_name: &str) -> String {
    let body = format!(
        r#"    <h1>Vehicle diagnosis</h1>
    <form method="post" action="/">
      <label for="customer_complaint">Customer complaint</label>
      <textarea id="customer_complaint" name="customer_complaint" required></textarea>
      <label for="method_choice">Diagnostic method</label>
      <select id="method_choice" name="method_choice">
{options}
      </select>
      <label for="dtc_code">Trouble code (optional)</label>
      <input id="dtc_code" name="dtc_code" placeholder="P0300" />
      <label for="related_symptoms">Related symptoms</label>
      <textarea id="related_symptoms" name="related_symptoms"></textarea>
      <label for="problem_area">Problem area</label>
      <input id="problem_area" name="problem_area" />
      <button type="submit">Diagnose</button>
    </form>"#,
        options = method_options(),
    );
    page(service_name, &body)
}

fn result_page(service_name: &str, diagnosis: &Diagnosis) -> String {
    let record = &diagnosis.record;
    let body = format!(
        r#"    <h1>Suggested diagnosis</h1>
    <pre>{suggestion}</pre>
    <h2>Submitted</h2>
    <dl>
      <dt>Customer complaint</dt><dd>{complaint}</dd>
      <dt>Diagnostic method</dt><dd>{method}</dd>
      <dt>Trouble code</dt><dd>{code}</dd>
      <dt>Code description</dt><dd>{description}</dd>
      <dt>Related symptoms</dt><dd>{symptoms}</dd>
      <dt>Problem area</dt><dd>{area}</dd>
    </dl>
    <a class="button" href="/">New diagnosis</a>"#,
        suggestion = escape_html(&diagnosis.suggestion),
        complaint = escape_html(&record.customer_complaint),
        method = record.diagnostic_method,
        code = escape_html(record.dtc_code.as_deref().unwrap_or("-")),
        description = escape_html(&record.dtc_description),
        symptoms = escape_html(&record.related_symptoms),
        area = escape_html(&record.problem_area),
    );
    page(service_name, &body)
}

fn error_page(service_name: &str, status: StatusCode, message: &str) -> Response {
    let body = format!(
        r#"    <h1>Cannot diagnose</h1>
    <p class="error">{}</p>
    <a class="button" href="/">Back</a>"#,
        escape_html(message),
    );
    (status, Html(page(service_name, &body))).into_response()
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// GET /: questionnaire form.
pub(super) async fn index(State(state): State<WebState>) -> Html<String> {
    Html(index_page(&state.service_name))
}

/// POST /: run the diagnosis and render the result.
pub(super) async fn submit(State(state): State<WebState>, Form(form): Form<DiagnosisForm>) -> Response {
    let input = match form.into_input() {
        Ok(input) => input,
        Err(message) => return error_page(&state.service_name, StatusCode::BAD_REQUEST, &message),
    };

    match tokio::time::timeout(state.request_timeout, state.recorder.diagnose(input)).await {
        Ok(Ok(diagnosis)) => Html(result_page(&state.service_name, &diagnosis)).into_response(),
        Ok(Err(e @ DiagnoseError::InvalidMethodIndex(_))) => {
            error_page(&state.service_name, StatusCode::BAD_REQUEST, &e.to_string())
        }
        Ok(Err(e)) => {
            warn!("diagnosis failed: {e}");
            error_page(&state.service_name, StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
        Err(_) => error_page(
            &state.service_name,
            StatusCode::GATEWAY_TIMEOUT,
            "The diagnosis took too long. Please try again.",
        ),
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Escape the five HTML-significant characters.
fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_html_specials() {
        assert_eq!(
            escape_html(r#"<b>"O'Reilly" & co</b>"#),
            "&lt;b&gt;&quot;O&#39;Reilly&quot; &amp; co&lt;/b&gt;"
        );
        assert_eq!(escape_html("Descrição: ok"), "Descrição: ok");
    }

    #[test]
    fn index_lists_six_methods_in_order() {
        let html = index_page("dtc-assist");
        assert_eq!(html.matches("<option").count(), 6);
        let first = html.find("1. Verify the Complaint").unwrap();
        let last = html.find("6. Confirm Proper Operation").unwrap();
        assert!(first < last);
    }

    #[test]
    fn form_method_must_be_numeric() {
        let form = DiagnosisForm { method_choice: "two".into(), ..Default::default() };
        assert!(form.into_input().unwrap_err().contains("'two'"));

        let form = DiagnosisForm { method_choice: " 3 ".into(), ..Default::default() };
        assert_eq!(form.into_input().unwrap().method_choice, 3);
    }
}
