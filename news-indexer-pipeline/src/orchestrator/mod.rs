//! Orchestrator module for the news indexer pipeline.
//!
//! Coordinates the lifecycle manager and the batch indexer.

use tracing::{info, instrument};

use crate::errors::PipelineError;
use crate::lifecycle::{CollectionManager, EnsureOutcome};
use crate::loader::BatchIndexer;
use news_indexer_repository::CollectionSchema;
use news_indexer_shared::{IndexingStats, SourceRecord};

/// Orchestrator that runs one indexing pass.
///
/// The orchestrator:
/// - Creates the target collection from the schema when it is missing
/// - Hands the records to the batch indexer
pub struct Orchestrator {
    manager: CollectionManager,
    indexer: BatchIndexer,
    schema: CollectionSchema,
}

impl Orchestrator {
    /// Create a new orchestrator using the news schema.
    pub fn new(manager: CollectionManager, indexer: BatchIndexer) -> Self {
        Self {
            manager,
            indexer,
            schema: CollectionSchema::news(),
        }
    }

    /// Ensure `collection` exists, then index `records` into it.
    #[instrument(skip(self, records), fields(record_count = records.len()))]
    pub async fn run(
        &self,
        collection: &str,
        records: &[SourceRecord],
    ) -> Result<IndexingStats, PipelineError> {
        info!(collection = %collection, "Starting news indexer run");

        if let EnsureOutcome::Created(_) = self.manager.ensure(collection, &self.schema).await? {
            info!(collection = %collection, "Indexing into a new collection");
        }

        let stats = self.indexer.index(collection, records).await?;

        info!(
            collection = %collection,
            processed = stats.total_processed,
            indexed = stats.total_indexed,
            errors = stats.errors,
            skipped = stats.skipped,
            "Indexing run complete"
        );
        Ok(stats)
    }
}
