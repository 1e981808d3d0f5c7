//! The fixed six-step diagnostic methodology.

use std::fmt;

use serde::{Serialize, Serializer};

use super::DiagnoseError;

/// One step of the diagnostic methodology, selected by a 1-based index.
///
/// Order and labels are part of the external contract: form options, prompts
/// and stored records all use them verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticMethod {
    VerifyComplaint,
    DetermineRelatedSymptoms,
    AnalyzeRelatedSymptoms,
    IsolateProblemArea,
    RepairProblemArea,
    ConfirmProperOperation,
}

impl DiagnosticMethod {
    pub const ALL: [DiagnosticMethod; 6] = [
        DiagnosticMethod::VerifyComplaint,
        DiagnosticMethod::DetermineRelatedSymptoms,
        DiagnosticMethod::AnalyzeRelatedSymptoms,
        DiagnosticMethod::IsolateProblemArea,
        DiagnosticMethod::RepairProblemArea,
        DiagnosticMethod::ConfirmProperOperation,
    ];

    /// Map a 1-based index to its step. Anything outside `1..=6` is rejected.
    pub fn from_index(index: usize) -> Result<Self, DiagnoseError> {
        index
            .checked_sub(1)
            .and_then(|i| Self::ALL.get(i).copied())
            .ok_or(DiagnoseError::InvalidMethodIndex(index))
    }

    /// 1-based position in [`ALL`](Self::ALL).
    pub fn index(self) -> usize {
        self as usize + 1
    }

    pub fn label(self) -> &'static str {
        match self {
            DiagnosticMethod::VerifyComplaint => "Verify the Complaint",
            DiagnosticMethod::DetermineRelatedSymptoms => "Determine Related Symptoms",
            DiagnosticMethod::AnalyzeRelatedSymptoms => "Analyze Related Symptoms",
            DiagnosticMethod::IsolateProblemArea => "Isolate the Problem Area",
            DiagnosticMethod::RepairProblemArea => "Repair the Problem Area",
            DiagnosticMethod::ConfirmProperOperation => "Confirm Proper Operation",
        }
    }
}

impl fmt::Display for DiagnosticMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for DiagnosticMethod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_index_maps_to_its_label() {
        let expected = [
            "Verify the Complaint",
            "Determine Related Symptoms",
            "Analyze Related Symptoms",
            "Isolate the Problem Area",
            "Repair the Problem Area",
            "Confirm Proper Operation",
        ];
        for (i, label) in expected.iter().enumerate() {
            let method = DiagnosticMethod::from_index(i + 1).unwrap();
            assert_eq!(method.label(), *label);
            assert_eq!(method.index(), i + 1);
        }
    }

    #[test]
    fn out_of_range_rejected() {
        for bad in [0, 7, 100, usize::MAX] {
            assert!(matches!(
                DiagnosticMethod::from_index(bad),
                Err(DiagnoseError::InvalidMethodIndex(i)) if i == bad
            ));
        }
    }

    #[test]
    fn serializes_as_label() {
        let json = serde_json::to_string(&DiagnosticMethod::IsolateProblemArea).unwrap();
        assert_eq!(json, "\"Isolate the Problem Area\"");
    }
}
