//! Diagnostic questionnaire: records, history and the recorder pipeline.
//!
//! ```text
//! DiagnosisInput ─► validate method ─► resolve code ─► DiagnosticRecord
//!                                                        │
//!                         DiagnosticHistory ◄─ append ───┤
//!                                                        ▼
//!                      LlmProvider ◄─ prompt::render(record)
//!                           │
//!                           ▼
//!                    suggestion (or FALLBACK_SUGGESTION)
//! ```

pub mod history;
pub mod method;
pub mod prompt;
mod recorder;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use history::DiagnosticHistory;
pub use method::DiagnosticMethod;
pub use recorder::DiagnosticRecorder;

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum DiagnoseError {
    #[error("method index {0} is out of range (expected 1 to 6)")]
    InvalidMethodIndex(usize),
    #[error("history unavailable: {0}")]
    History(String),
}

// ── Types ─────────────────────────────────────────────────────────────────────

/// Raw questionnaire fields as submitted by the front-end.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiagnosisInput {
    #[serde(default)]
    pub customer_complaint: String,
    pub method_choice: usize,
    #[serde(default)]
    pub dtc_code: Option<String>,
    #[serde(default)]
    pub related_symptoms: String,
    #[serde(default)]
    pub problem_area: String,
}

/// One questionnaire submission with its resolved code description.
/// Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosticRecord {
    pub id: Uuid,
    pub recorded_at: DateTime<Utc>,
    pub customer_complaint: String,
    pub diagnostic_method: DiagnosticMethod,
    pub dtc_code: Option<String>,
    pub dtc_description: String,
    pub related_symptoms: String,
    pub problem_area: String,
}

impl DiagnosticRecord {
    pub fn new(
        customer_complaint: String,
        diagnostic_method: DiagnosticMethod,
        dtc_code: Option<String>,
        dtc_description: String,
        related_symptoms: String,
        problem_area: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            recorded_at: Utc::now(),
            customer_complaint,
            diagnostic_method,
            dtc_code,
            dtc_description,
            related_symptoms,
            problem_area,
        }
    }
}

/// Result of [`DiagnosticRecorder::diagnose`].
#[derive(Debug, Clone, Serialize)]
pub struct Diagnosis {
    /// Assistant answer, or [`prompt::FALLBACK_SUGGESTION`].
    pub suggestion: String,
    /// `false` when the suggestion is the fallback text.
    pub completed: bool,
    pub record: DiagnosticRecord,
}
