//! Diagnostic trouble-code catalog.
//!
//! Loaded once at startup from a CSV file with a header row naming at least
//! the `Code` and `Description` columns. Immutable afterwards, so it is shared
//! as `Arc<CodeCatalog>` and read without locking.
//!
//! Keys are stored uppercased and every query is uppercased before matching,
//! which makes codes case-insensitively unique.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const CODE_COLUMN: &str = "Code";
pub const DESCRIPTION_COLUMN: &str = "Description";

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum CatalogError {
    /// The reference file does not exist. Recoverable: see [`CodeCatalog::load_or_empty`].
    #[error("catalog file {} not found", .path.display())]
    Missing { path: PathBuf },

    /// The header row lacks a required column.
    #[error("catalog {} has no '{column}' column", .path.display())]
    MissingColumn { path: PathBuf, column: &'static str },

    /// The file could not be read or is not valid CSV.
    #[error("cannot read catalog {}: {message}", .path.display())]
    Read { path: PathBuf, message: String },
}

// ── Types ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeEntry {
    pub code: String,
    pub description: String,
}

#[derive(Debug, Clone, Default)]
pub struct CodeCatalog {
    entries: HashMap<String, CodeEntry>,
}

impl CodeCatalog {
    /// Catalog with no entries; every lookup misses.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from in-memory pairs. Later pairs overwrite earlier ones.
    pub fn from_entries<I, C, D>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (C, D)>,
        C: Into<String>,
        D: Into<String>,
    {
        let mut catalog = Self::empty();
        for (code, description) in pairs {
            catalog.insert(code.into(), description.into());
        }
        catalog
    }

    /// Load the catalog from a CSV file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => CatalogError::Missing { path: path.to_path_buf() },
            _ => CatalogError::Read { path: path.to_path_buf(), message: e.to_string() },
        })?;
        let catalog = Self::from_reader(file, path)?;
        info!(path = %path.display(), codes = catalog.len(), "code catalog loaded");
        Ok(catalog)
    }

    /// Like [`load`](Self::load), but a missing file yields an empty catalog.
    ///
    /// Schema and read errors still propagate.
    pub fn load_or_empty(path: &Path) -> Result<Self, CatalogError> {
        match Self::load(path) {
            Err(CatalogError::Missing { path }) => {
                warn!(path = %path.display(), "code catalog not found, starting with an empty catalog");
                Ok(Self::empty())
            }
            other => other,
        }
    }

    /// Parse CSV from any reader. `origin` is only used in errors and logs.
    pub fn from_reader<R: Read>(reader: R, origin: &Path) -> Result<Self, CatalogError> {
        let read_err = |e: csv::Error| CatalogError::Read {
            path: origin.to_path_buf(),
            message: e.to_string(),
        };

        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr.headers().map_err(read_err)?.clone();
        let column = |name: &'static str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| CatalogError::MissingColumn { path: origin.to_path_buf(), column: name })
        };
        let code_idx = column(CODE_COLUMN)?;
        let description_idx = column(DESCRIPTION_COLUMN)?;

        let mut catalog = Self::empty();
        for (row, record) in rdr.records().enumerate() {
            let record = record.map_err(read_err)?;
            let code = record.get(code_idx).unwrap_or_default();
            let description = record.get(description_idx).unwrap_or_default();
            if code.is_empty() || description.is_empty() {
                debug!(row = row + 1, "skipping catalog row with empty code or description");
                continue;
            }
            catalog.insert(code.to_string(), description.to_string());
        }
        Ok(catalog)
    }

    fn insert(&mut self, code: String, description: String) {
        let key = normalize(&code);
        let entry = CodeEntry { code: key.clone(), description };
        if let Some(previous) = self.entries.insert(key, entry) {
            warn!(code = %previous.code, "duplicate code in catalog, later row wins");
        }
    }

    /// Exact, case-insensitive match.
    pub fn get(&self, code: &str) -> Option<&CodeEntry> {
        self.entries.get(&normalize(code))
    }

    /// Human-readable lookup result. A miss is a message, never an error.
    pub fn lookup(&self, code: &str) -> String {
        let code = normalize(code);
        match self.entries.get(&code) {
            Some(entry) => format!("Código: {}\nDescrição: {}", entry.code, entry.description),
            None => not_found_message(&code),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Catalog key for `code`: surrounding whitespace removed, then uppercased.
///
/// Unlike a bare uppercase compare, `" p0300 "` still matches
/// `P0300`. Inner whitespace is kept.
pub fn normalize(code: &str) -> String {
    code.trim().to_uppercase()
}

pub(crate) fn not_found_message(normalized_code: &str) -> String {
    format!("Código {normalized_code} não encontrado.")
}
