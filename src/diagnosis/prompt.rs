//! Natural-language rendering of a diagnostic record.

use super::DiagnosticRecord;

/// Default system prompt for the reasoning assistant.
pub const DEFAULT_INSTRUCTIONS: &str = "You are a vehicle diagnostic assistant. \
Provide the most accurate vehicle problem diagnosis and solutions. \
Please address the user as 'Mechanic'.";

/// Returned in place of a suggestion when the assistant does not complete.
pub const FALLBACK_SUGGESTION: &str =
    "An error occurred while processing the request. Please try again.";

/// Stored as the code description when no code was supplied.
pub const NO_CODE_DESCRIPTION: &str = "N/A";

const CLOSING_QUESTION: &str =
    "Based on this information, what could be causing the problem and how can it be fixed?";

/// Render every field of `record`, one per line, followed by the closing question.
pub fn render(record: &DiagnosticRecord) -> String {
    format!(
        "Customer complaint: {}\n\
         Diagnostic method: {}\n\
         Trouble code: {}\n\
         Code description: {}\n\
         Related symptoms: {}\n\
         Problem area: {}\n\
         {CLOSING_QUESTION}",
        record.customer_complaint,
        record.diagnostic_method,
        record.dtc_code.as_deref().unwrap_or_default(),
        record.dtc_description,
        record.related_symptoms,
        record.problem_area,
    )
}
