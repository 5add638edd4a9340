//! Loader module for the news indexer pipeline.
//!
//! Normalizes source records and upserts them into the search collection in
//! fixed-size batches.

use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::errors::PipelineError;
use crate::processor::DocumentNormalizer;
use news_indexer_repository::{ImportSummary, SearchEngineClient};
use news_indexer_shared::{IndexMode, IndexingStats, NewsDocument, SourceRecord};

/// Number of per-document import failures logged for each batch.
const MAX_LOGGED_FAILURES: usize = 5;

/// Configuration for the batch indexer.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Number of documents submitted per import request.
    pub batch_size: usize,
    /// Whether the run populates from scratch or updates in place.
    pub mode: IndexMode,
    /// Allow a full run over a collection that already holds documents.
    pub force: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            mode: IndexMode::Full,
            force: false,
        }
    }
}

/// What a run does given the collection's current contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunDecision {
    /// Index normally.
    Proceed,
    /// Index over existing documents (full mode with force).
    Overwrite,
    /// Do not touch the collection.
    Skip,
}

impl RunDecision {
    /// Decide from the existing document count, the mode and the force flag.
    pub fn plan(existing_documents: u64, mode: IndexMode, force: bool) -> Self {
        match (existing_documents, mode, force) {
            (0, _, _) => RunDecision::Proceed,
            (_, IndexMode::Incremental, _) => RunDecision::Proceed,
            (_, IndexMode::Full, true) => RunDecision::Overwrite,
            (_, IndexMode::Full, false) => RunDecision::Skip,
        }
    }
}

/// Indexer that writes source records into the search collection.
///
/// The indexer is responsible for:
/// - Guarding populated collections against accidental full runs
/// - Normalizing records, counting rows that fail without stopping
/// - Batching documents and accounting for per-document import failures
///
/// Batches are submitted one at a time; a transport failure stops the run.
pub struct BatchIndexer {
    client: Arc<dyn SearchEngineClient>,
    normalizer: DocumentNormalizer,
    config: LoaderConfig,
}

impl BatchIndexer {
    /// Create a new batch indexer with custom configuration.
    pub fn with_config(client: Arc<dyn SearchEngineClient>, config: LoaderConfig) -> Self {
        Self {
            client,
            normalizer: DocumentNormalizer::new(),
            config,
        }
    }

    /// Index records into `collection`.
    ///
    /// # Returns
    ///
    /// * `Ok(IndexingStats)` - Counters for the run; `skipped` is set when a
    ///   full run met a populated collection without `force`
    /// * `Err(PipelineError::Aborted)` - A batch submission failed at the
    ///   transport level; the error carries the statistics so far
    /// * `Err(PipelineError)` - The collection could not be inspected or the
    ///   configuration is invalid
    #[instrument(
        skip(self, records),
        fields(record_count = records.len(), mode = %self.config.mode, force = self.config.force)
    )]
    pub async fn index(
        &self,
        collection: &str,
        records: &[SourceRecord],
    ) -> Result<IndexingStats, PipelineError> {
        let batch_size = self.config.batch_size;
        if batch_size == 0 {
            return Err(PipelineError::validation("batch_size must be greater than zero"));
        }

        info!("Indexing documents");

        let existing = self.client.retrieve_collection(collection).await?.num_documents;
        if existing > 0 {
            info!(existing_documents = existing, "Collection already contains documents");
        }

        match RunDecision::plan(existing, self.config.mode, self.config.force) {
            RunDecision::Skip => {
                info!("Full mode on a non-empty collection. Use incremental mode to update it");
                info!("Or use force to overwrite existing data");
                info!("Skipping indexing to avoid duplicates");
                return Ok(IndexingStats::skipped());
            }
            RunDecision::Overwrite => {
                warn!("Force mode enabled: existing documents will be overwritten");
                warn!(existing_documents = existing, "Existing documents will be replaced");
            }
            RunDecision::Proceed if existing > 0 => {
                info!(
                    documents = records.len(),
                    "Incremental mode: documents will be updated"
                );
            }
            RunDecision::Proceed => {}
        }

        let mut stats = IndexingStats::default();

        if records.is_empty() {
            info!("No documents to index");
            return Ok(stats);
        }

        let mut pending: Vec<NewsDocument> = Vec::with_capacity(batch_size.min(records.len()));

        for record in records {
            match self.normalizer.normalize(record) {
                Ok(doc) => {
                    pending.push(doc);
                    stats.total_processed += 1;
                }
                Err(e) => {
                    warn!(position = record.position, error = %e, "Failed to prepare document");
                    stats.errors += 1;
                    continue;
                }
            }

            if pending.len() >= batch_size {
                info!(
                    batch_size = pending.len(),
                    total_processed = stats.total_processed,
                    "Indexing batch"
                );
                self.submit(collection, &mut pending, &mut stats).await?;
            }
        }

        if !pending.is_empty() {
            info!(batch_size = pending.len(), "Indexing final batch");
            self.submit(collection, &mut pending, &mut stats).await?;
        }

        self.report(collection, &stats).await;
        Ok(stats)
    }

    /// Upsert the pending batch and fold the outcome into `stats`.
    async fn submit(
        &self,
        collection: &str,
        pending: &mut Vec<NewsDocument>,
        stats: &mut IndexingStats,
    ) -> Result<(), PipelineError> {
        let results = match self.client.import_documents(collection, pending).await {
            Ok(results) => results,
            Err(source) => {
                error!(error = %source, batch_size = pending.len(), "Batch submission failed");
                return Err(PipelineError::Aborted {
                    stats: *stats,
                    source,
                });
            }
        };

        let summary = ImportSummary::from_results(pending.len(), results);
        if summary.has_failures() {
            stats.errors += summary.failed;
            warn!(failed = summary.failed, "Found errors in batch");
            for failure in summary.failures.iter().take(MAX_LOGGED_FAILURES) {
                warn!(
                    error = failure.error.as_deref().unwrap_or("unknown"),
                    "Document import failed"
                );
            }
        } else {
            stats.total_indexed += pending.len();
        }

        pending.clear();
        Ok(())
    }

    /// Log collection statistics after a run. Informational only.
    async fn report(&self, collection: &str, stats: &IndexingStats) {
        match self.client.retrieve_collection(collection).await {
            Ok(info) => {
                info!(
                    collection = %info.name,
                    total_documents = info.num_documents,
                    schema_fields = info.fields.len(),
                    processed = stats.total_processed,
                    indexed = stats.total_indexed,
                    errors = stats.errors,
                    "Documents indexed"
                );
            }
            Err(e) => {
                warn!(error = %e, "Could not read collection statistics after indexing");
            }
        }
    }
}
