//! # News Indexer Pipeline
//!
//! This crate provides the pipeline components for turning tabular news
//! records into search documents and writing them into a Typesense
//! collection.
//!
//! ## Architecture
//!
//! The pipeline follows the Processor-Loader pattern, with the collection
//! lifecycle handled alongside:
//!
//! 1. **Lifecycle**: Ensures, deletes and lists collections
//! 2. **Processor**: Normalizes source records into news documents
//! 3. **Loader**: Upserts documents in batches and accounts for failures
//! 4. **Orchestrator**: Ensures the collection, then runs the loader
//! 5. **Verifier**: Runs read-only queries against the indexed collection

pub mod errors;
pub mod lifecycle;
pub mod loader;
pub mod orchestrator;
pub mod processor;
pub mod verifier;

#[cfg(test)]
mod testing;

pub use errors::{NormalizeError, PipelineError};
