//! Error types for the news indexer pipeline.

use news_indexer_repository::SearchError;
use news_indexer_shared::IndexingStats;
use thiserror::Error;

/// A source row could not be turned into a document.
///
/// Raised per row; the batch indexer counts it and moves on.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizeError {
    /// A column holds a value of the wrong type.
    #[error("Row {position}: column '{column}' expected {expected}, found {found}")]
    InvalidType {
        position: usize,
        column: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    /// A numeric column does not fit the schema's integer type.
    #[error("Row {position}: column '{column}' value {value} is out of range")]
    OutOfRange {
        position: usize,
        column: &'static str,
        value: String,
    },
}

/// Errors that can occur in the news indexer pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Error from the search engine outside of a batch submission.
    #[error("Search error: {0}")]
    SearchError(#[from] SearchError),

    /// A batch submission failed at the transport level. The run stopped and
    /// `stats` holds what was accumulated up to the last completed batch.
    #[error("Indexing aborted after {} indexed documents: {source}", .stats.total_indexed)]
    Aborted {
        stats: IndexingStats,
        source: SearchError,
    },

    /// Invalid pipeline arguments.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Failed to read the delete confirmation.
    #[error("Prompt error: {0}")]
    PromptError(String),
}

impl PipelineError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Create a prompt error.
    pub fn prompt(msg: impl Into<String>) -> Self {
        Self::PromptError(msg.into())
    }

    /// Statistics accumulated before the run was aborted, if any.
    pub fn partial_stats(&self) -> Option<&IndexingStats> {
        match self {
            Self::Aborted { stats, .. } => Some(stats),
            _ => None,
        }
    }
}
