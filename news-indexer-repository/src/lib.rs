//! # News Indexer Repository
//!
//! This crate provides the collection schema, the traits for interacting with
//! the search engine and a concrete implementation for Typesense. It includes
//! definitions for errors, interfaces and the request/response types shared
//! by every backend.

pub mod config;
pub mod errors;
pub mod interfaces;
pub mod schema;
pub mod types;
pub mod typesense;

pub use config::TypesenseConfig;
pub use errors::SearchError;
pub use interfaces::SearchEngineClient;
pub use schema::{CollectionSchema, FieldType, SchemaField, COLLECTION_NAME};
pub use types::{
    CollectionInfo, FacetCount, FacetCounts, ImportResult, ImportSummary, SearchParams,
    SearchResult,
};
pub use typesense::TypesenseClient;
