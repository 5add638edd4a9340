//! Processor module for the news indexer pipeline.
//!
//! Transforms tabular source records into search documents.

mod document_normalizer;

pub use document_normalizer::{DocumentNormalizer, OPTIONAL_STRING_FIELDS, SYNTHETIC_ID_PREFIX};
