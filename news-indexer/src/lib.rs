//! # News Indexer
//!
//! Main library for the government news indexer.
//!
//! This crate provides the configuration, dependency wiring and dataset
//! reader used by the `news-indexer` command line tool.

pub mod config;
pub mod dataset;

pub use config::Dependencies;

use thiserror::Error;

/// Errors that can occur during indexer initialization or execution.
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The input dataset could not be read.
    #[error("Dataset error: {0}")]
    DatasetError(String),

    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    PipelineError(#[from] news_indexer_pipeline::PipelineError),

    /// Search error.
    #[error("Search error: {0}")]
    SearchError(#[from] news_indexer_repository::SearchError),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl IndexingError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Create a dataset error.
    pub fn dataset(msg: impl Into<String>) -> Self {
        Self::DatasetError(msg.into())
    }
}
