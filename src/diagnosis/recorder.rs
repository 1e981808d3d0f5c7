use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::catalog::CodeCatalog;
use crate::llm::LlmProvider;

use super::prompt::{self, FALLBACK_SUGGESTION, NO_CODE_DESCRIPTION};
use super::{DiagnoseError, Diagnosis, DiagnosisInput, DiagnosticHistory, DiagnosticMethod, DiagnosticRecord};

/// Builds diagnostic records, keeps them in history and asks the reasoning
/// assistant for a repair suggestion.
///
/// Cheap to share behind an `Arc`: the catalog is immutable and the history
/// guards itself.
#[derive(Debug)]
pub struct DiagnosticRecorder {
    catalog: Arc<CodeCatalog>,
    history: Arc<DiagnosticHistory>,
    provider: LlmProvider,
    instructions: String,
}

impl DiagnosticRecorder {
    pub fn new(
        catalog: Arc<CodeCatalog>,
        history: Arc<DiagnosticHistory>,
        provider: LlmProvider,
        instructions: impl Into<String>,
    ) -> Self {
        Self { catalog, history, provider, instructions: instructions.into() }
    }

    pub fn catalog(&self) -> &CodeCatalog {
        &self.catalog
    }

    pub fn history(&self) -> &DiagnosticHistory {
        &self.history
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Validate `input`, resolve its code and append the record to history.
    ///
    /// An invalid method index is rejected before history is touched.
    pub fn record(&self, input: DiagnosisInput) -> Result<DiagnosticRecord, DiagnoseError> {
        let method = DiagnosticMethod::from_index(input.method_choice)?;

        let dtc_code = input.dtc_code.filter(|code| !code.trim().is_empty());
        let dtc_description = match dtc_code.as_deref() {
            Some(code) => self.catalog.lookup(code),
            None => NO_CODE_DESCRIPTION.to_string(),
        };

        let record = DiagnosticRecord::new(
            input.customer_complaint,
            method,
            dtc_code,
            dtc_description,
            input.related_symptoms,
            input.problem_area,
        );

        let history_len = self.history.append(record.clone())?;
        debug!(record_id = %record.id, method = %method, history_len, "diagnostic record stored");
        Ok(record)
    }

    /// Record the submission, then ask the assistant about it.
    ///
    /// Assistant failures never surface as errors: the suggestion becomes
    /// [`FALLBACK_SUGGESTION`] and the stored record is unaffected.
    pub async fn diagnose(&self, input: DiagnosisInput) -> Result<Diagnosis, DiagnoseError> {
        let record = self.record(input)?;
        let submission = prompt::render(&record);

        let (suggestion, completed) = match self
            .provider
            .complete(&submission, Some(&self.instructions))
            .await
        {
            Ok(response) => {
                info!(
                    record_id = %record.id,
                    provider = self.provider.name(),
                    input_tokens = response.usage.map(|u| u.input_tokens),
                    output_tokens = response.usage.map(|u| u.output_tokens),
                    "diagnosis completed"
                );
                (response.text, true)
            }
            Err(e) => {
                warn!(record_id = %record.id, provider = self.provider.name(), error = %e, "assistant did not complete");
                (FALLBACK_SUGGESTION.to_string(), false)
            }
        };

        Ok(Diagnosis { suggestion, completed, record })
    }
}
