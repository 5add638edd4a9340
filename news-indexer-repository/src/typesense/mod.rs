//! Typesense implementation of the search engine client.
//!
//! This module provides a concrete implementation of `SearchEngineClient`
//! using the Typesense HTTP API as the backend.

mod client;

pub use client::TypesenseClient;
