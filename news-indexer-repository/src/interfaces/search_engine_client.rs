//! Search engine client trait definition.
//!
//! This module defines the abstract interface for search engine operations,
//! allowing for different backend implementations (Typesense, in-memory fakes
//! for testing, etc.).

use async_trait::async_trait;

use crate::errors::SearchError;
use crate::schema::CollectionSchema;
use crate::types::{CollectionInfo, ImportResult, SearchParams, SearchResult};
use news_indexer_shared::NewsDocument;

/// Abstract interface for search engine operations.
///
/// This trait defines all the operations required to manage the news
/// collection and write documents into it. Implementations can be swapped for
/// different backends enabling easy testing.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` to allow use across async tasks.
///
/// # Error Handling
///
/// All methods return `Result<T, SearchError>`. A missing collection is always
/// reported as `SearchError::NotFound`, so callers can tell it apart from
/// transport failures.
#[async_trait]
pub trait SearchEngineClient: Send + Sync {
    /// Fetch the metadata of a collection.
    ///
    /// # Returns
    ///
    /// * `Ok(CollectionInfo)` - Name, document count and fields
    /// * `Err(SearchError::NotFound)` - If the collection does not exist
    /// * `Err(SearchError)` - If the request fails
    async fn retrieve_collection(&self, name: &str) -> Result<CollectionInfo, SearchError>;

    /// List every collection on the server.
    async fn list_collections(&self) -> Result<Vec<CollectionInfo>, SearchError>;

    /// Create a collection from the given schema.
    ///
    /// The collection name is taken from `schema.name`.
    async fn create_collection(
        &self,
        schema: &CollectionSchema,
    ) -> Result<CollectionInfo, SearchError>;

    /// Drop a collection and all its documents.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the delete request was accepted
    /// * `Err(SearchError::NotFound)` - If the collection does not exist
    /// * `Err(SearchError)` - If the request fails
    async fn delete_collection(&self, name: &str) -> Result<(), SearchError>;

    /// Upsert a batch of documents in a single request.
    ///
    /// Documents are keyed by `id`; an existing document with the same id is
    /// replaced.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<ImportResult>)` - One result per document, in request order.
    ///   Per-document failures are reported here, not as an error.
    /// * `Err(SearchError)` - If the request as a whole could not be executed
    async fn import_documents(
        &self,
        collection: &str,
        documents: &[NewsDocument],
    ) -> Result<Vec<ImportResult>, SearchError>;

    /// Run a full-text search, optionally with facet counts.
    ///
    /// # Returns
    ///
    /// * `Ok(SearchResult)` - Match count, hits and requested facets
    /// * `Err(SearchError::NotFound)` - If the collection does not exist
    /// * `Err(SearchError)` - If the request fails
    async fn search_documents(
        &self,
        collection: &str,
        params: &SearchParams,
    ) -> Result<SearchResult, SearchError>;

    /// Check if the search engine is healthy and reachable.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If the search engine is healthy
    /// * `Ok(false)` - If the search engine answered but is not ready
    /// * `Err(SearchError)` - If the health check fails to execute
    async fn health_check(&self) -> Result<bool, SearchError>;
}
