//! Indexing run statistics and mode.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How an indexing run treats a collection that already holds documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexMode {
    /// Populate an empty collection from scratch.
    #[default]
    Full,
    /// Add or update records in an already-populated collection.
    Incremental,
}

impl fmt::Display for IndexMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexMode::Full => f.write_str("full"),
            IndexMode::Incremental => f.write_str("incremental"),
        }
    }
}

/// Returned when a mode name is not recognized.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown index mode '{0}', expected 'full' or 'incremental'")]
pub struct ParseModeError(pub String);

impl FromStr for IndexMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(IndexMode::Full),
            "incremental" => Ok(IndexMode::Incremental),
            _ => Err(ParseModeError(s.to_string())),
        }
    }
}

/// Counters accumulated over one indexing run.
///
/// `skipped` is only set when a full run refuses to touch a populated
/// collection, so a skip can never be mistaken for an empty input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IndexingStats {
    /// Records that normalized successfully.
    pub total_processed: usize,
    /// Documents confirmed by the engine.
    pub total_indexed: usize,
    /// Normalization failures plus per-document import failures.
    pub errors: usize,
    pub skipped: bool,
}

impl IndexingStats {
    /// Statistics for a run that was skipped before touching any record.
    pub fn skipped() -> Self {
        Self {
            skipped: true,
            ..Default::default()
        }
    }
}
