//! Verifier module for the news indexer pipeline.
//!
//! Runs a few read-only queries against an indexed collection and logs what
//! they return. Every check is informational: failures become warnings and
//! never fail the run.

use std::sync::Arc;
use tracing::{info, instrument, warn};

use news_indexer_repository::{FacetCount, SearchEngineClient, SearchParams};

/// Query text of the sample search.
pub const SAMPLE_QUERY: &str = "saúde";

/// Number of agencies reported by the facet check.
pub const TOP_AGENCIES: u32 = 5;

const SAMPLE_HITS: u32 = 3;

/// What the verification queries returned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerificationReport {
    /// Documents in the collection, when it could be read.
    pub documents: Option<u64>,
    /// Matches for the sample query, when the search succeeded.
    pub sample_matches: Option<u64>,
    /// Agencies with the most documents, most frequent first.
    pub top_agencies: Vec<FacetCount>,
    /// Number of checks that failed.
    pub warnings: usize,
}

impl VerificationReport {
    pub fn passed(&self) -> bool {
        self.warnings == 0
    }
}

/// Read-only checks run after indexing.
pub struct CollectionVerifier {
    client: Arc<dyn SearchEngineClient>,
}

impl CollectionVerifier {
    pub fn new(client: Arc<dyn SearchEngineClient>) -> Self {
        Self { client }
    }

    /// Run every check against `collection`.
    ///
    /// Each check runs even when an earlier one failed.
    #[instrument(skip(self))]
    pub async fn verify(&self, collection: &str) -> VerificationReport {
        info!("Running verification queries");
        let mut report = VerificationReport::default();

        match self.client.retrieve_collection(collection).await {
            Ok(info) => {
                info!(documents = info.num_documents, "Collection document count");
                report.documents = Some(info.num_documents);
            }
            Err(e) => {
                warn!(error = %e, "Verification could not read the collection");
                report.warnings += 1;
            }
        }

        let sample = SearchParams::new(SAMPLE_QUERY, &["title", "content"]).per_page(SAMPLE_HITS);
        match self.client.search_documents(collection, &sample).await {
            Ok(result) => {
                info!(query = SAMPLE_QUERY, found = result.found, "Sample search");
                report.sample_matches = Some(result.found);
            }
            Err(e) => {
                warn!(query = SAMPLE_QUERY, error = %e, "Sample search failed");
                report.warnings += 1;
            }
        }

        let facets = SearchParams::new("*", &["title"])
            .facet_by("agency", TOP_AGENCIES)
            .per_page(0);
        match self.client.search_documents(collection, &facets).await {
            Ok(result) => {
                if let Some(agencies) = result.facet("agency") {
                    info!("Top agencies by document count");
                    report.top_agencies = agencies
                        .counts
                        .iter()
                        .take(TOP_AGENCIES as usize)
                        .cloned()
                        .collect();
                    for facet in &report.top_agencies {
                        info!(agency = %facet.value, documents = facet.count, "Agency");
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "Agency facet query failed");
                report.warnings += 1;
            }
        }

        report
    }
}
