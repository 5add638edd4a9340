//! Search error types.
//!
//! This module defines the error types that can occur during search engine
//! operations.

use thiserror::Error;

/// Errors that can occur during search engine operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    /// Failed to reach the search engine (connection refused, timeout, ...).
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The requested collection does not exist.
    #[error("Collection not found: {0}")]
    NotFound(String),

    /// Failed to create, retrieve or delete a collection.
    #[error("Collection error: {0}")]
    CollectionError(String),

    /// The import request was rejected as a whole.
    #[error("Import error: {0}")]
    ImportError(String),

    /// The collection schema is not valid.
    #[error("Schema error: {0}")]
    SchemaError(String),

    /// Failed to parse response from search engine.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Failed to serialize data for the search engine.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Invalid client configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl SearchError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a not found error for a collection.
    pub fn not_found(collection: impl Into<String>) -> Self {
        Self::NotFound(collection.into())
    }

    /// Create a collection error.
    pub fn collection(msg: impl Into<String>) -> Self {
        Self::CollectionError(msg.into())
    }

    /// Create an import error.
    pub fn import(msg: impl Into<String>) -> Self {
        Self::ImportError(msg.into())
    }

    /// Create a schema error.
    pub fn schema(msg: impl Into<String>) -> Self {
        Self::SchemaError(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Whether the error reports a missing collection.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
