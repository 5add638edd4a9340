//! Error types for the news indexer repository.

mod search_error;

pub use search_error::SearchError;
