//! Append-only, process-lifetime log of diagnostic records.
//!
//! Owned by the service and shared as `Arc<DiagnosticHistory>`. The mutex is
//! only held for a push or a clone, never across an `.await`.

use std::sync::{Mutex, MutexGuard};

use super::{DiagnoseError, DiagnosticRecord};

#[derive(Debug, Default)]
pub struct DiagnosticHistory {
    records: Mutex<Vec<DiagnosticRecord>>,
}

impl DiagnosticHistory {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<DiagnosticRecord>>, DiagnoseError> {
        self.records
            .lock()
            .map_err(|_| DiagnoseError::History("history lock poisoned".into()))
    }

    /// Append `record`; returns the history length afterwards.
    pub fn append(&self, record: DiagnosticRecord) -> Result<usize, DiagnoseError> {
        let mut records = self.lock()?;
        records.push(record);
        Ok(records.len())
    }

    pub fn len(&self) -> Result<usize, DiagnoseError> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, DiagnoseError> {
        Ok(self.lock()?.is_empty())
    }

    /// Copy of every record, in insertion order.
    pub fn snapshot(&self) -> Result<Vec<DiagnosticRecord>, DiagnoseError> {
        Ok(self.lock()?.clone())
    }
}
