//! In-memory search engine used by the pipeline tests.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use serde_json::json;

use news_indexer_repository::{
    CollectionInfo, CollectionSchema, FacetCount, FacetCounts, ImportResult, SearchEngineClient,
    SearchError, SearchParams, SearchResult,
};
use news_indexer_shared::NewsDocument;

/// Mock engine keeping collections as maps of id to document.
#[derive(Default)]
pub(crate) struct InMemoryEngine {
    collections: Mutex<BTreeMap<String, HashMap<String, NewsDocument>>>,
    /// Sizes of every import request, in order.
    pub import_batches: Mutex<Vec<usize>>,
    /// Documents with these ids are rejected by imports.
    rejected_ids: HashSet<String>,
    /// Import call (1-based) that fails with a connection error.
    fail_import_call: Option<usize>,
    /// Delete calls that are accepted but leave the collection in place.
    stubborn_deletes: AtomicU32,
    /// Delete calls that fail with a connection error.
    failing_deletes: AtomicU32,
    /// Health checks that fail before the engine becomes ready.
    unready_checks: AtomicU32,
    fail_list: bool,
    fail_search: bool,
    pub delete_calls: AtomicU32,
    pub health_calls: AtomicU32,
    pub create_calls: AtomicU32,
}

impl InMemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a collection holding `count` placeholder documents.
    pub fn with_collection(self, name: &str, count: usize) -> Self {
        let documents = (0..count)
            .map(|i| {
                let id = format!("existing_{}", i);
                (id.clone(), NewsDocument::new(id, 0))
            })
            .collect();
        self.collections
            .try_lock()
            .expect("engine not shared yet")
            .insert(name.to_string(), documents);
        self
    }

    pub fn rejecting(mut self, ids: &[&str]) -> Self {
        self.rejected_ids = ids.iter().map(|id| id.to_string()).collect();
        self
    }

    pub fn failing_import_call(mut self, call: usize) -> Self {
        self.fail_import_call = Some(call);
        self
    }

    pub fn with_stubborn_deletes(self, count: u32) -> Self {
        self.stubborn_deletes.store(count, Ordering::SeqCst);
        self
    }

    pub fn with_failing_deletes(self, count: u32) -> Self {
        self.failing_deletes.store(count, Ordering::SeqCst);
        self
    }

    pub fn with_unready_checks(self, count: u32) -> Self {
        self.unready_checks.store(count, Ordering::SeqCst);
        self
    }

    pub fn failing_list(mut self) -> Self {
        self.fail_list = true;
        self
    }

    pub fn failing_search(mut self) -> Self {
        self.fail_search = true;
        self
    }

    /// Insert documents directly, bypassing import accounting.
    pub async fn insert(&self, collection: &str, documents: Vec<NewsDocument>) {
        let mut collections = self.collections.lock().await;
        let docs = collections.entry(collection.to_string()).or_default();
        for doc in documents {
            docs.insert(doc.id.clone(), doc);
        }
    }

    pub async fn document_count(&self, name: &str) -> Option<usize> {
        self.collections.lock().await.get(name).map(HashMap::len)
    }

    pub async fn document(&self, collection: &str, id: &str) -> Option<NewsDocument> {
        self.collections
            .lock()
            .await
            .get(collection)
            .and_then(|docs| docs.get(id).cloned())
    }

    fn take_one(counter: &AtomicU32) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl SearchEngineClient for InMemoryEngine {
    async fn retrieve_collection(&self, name: &str) -> Result<CollectionInfo, SearchError> {
        self.collections
            .lock()
            .await
            .get(name)
            .map(|docs| CollectionInfo::new(name, docs.len() as u64))
            .ok_or_else(|| SearchError::not_found(name))
    }

    async fn list_collections(&self) -> Result<Vec<CollectionInfo>, SearchError> {
        if self.fail_list {
            return Err(SearchError::connection("connection refused"));
        }
        Ok(self
            .collections
            .lock()
            .await
            .iter()
            .map(|(name, docs)| CollectionInfo::new(name.clone(), docs.len() as u64))
            .collect())
    }

    async fn create_collection(
        &self,
        schema: &CollectionSchema,
    ) -> Result<CollectionInfo, SearchError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let mut collections = self.collections.lock().await;
        if collections.contains_key(&schema.name) {
            return Err(SearchError::collection("already exists"));
        }
        collections.insert(schema.name.clone(), HashMap::new());
        Ok(CollectionInfo::new(schema.name.clone(), 0))
    }

    async fn delete_collection(&self, name: &str) -> Result<(), SearchError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if Self::take_one(&self.failing_deletes) {
            return Err(SearchError::connection("connection reset"));
        }
        let mut collections = self.collections.lock().await;
        if !collections.contains_key(name) {
            return Err(SearchError::not_found(name));
        }
        if !Self::take_one(&self.stubborn_deletes) {
            collections.remove(name);
        }
        Ok(())
    }

    async fn import_documents(
        &self,
        collection: &str,
        documents: &[NewsDocument],
    ) -> Result<Vec<ImportResult>, SearchError> {
        let call = {
            let mut batches = self.import_batches.lock().await;
            batches.push(documents.len());
            batches.len()
        };
        if self.fail_import_call == Some(call) {
            return Err(SearchError::connection("connection lost"));
        }

        let mut collections = self.collections.lock().await;
        let docs = collections
            .get_mut(collection)
            .ok_or_else(|| SearchError::not_found(collection))?;

        Ok(documents
            .iter()
            .map(|doc| {
                if self.rejected_ids.contains(&doc.id) {
                    ImportResult::failed(format!("rejected {}", doc.id))
                } else {
                    docs.insert(doc.id.clone(), doc.clone());
                    ImportResult::ok()
                }
            })
            .collect())
    }

    async fn search_documents(
        &self,
        collection: &str,
        params: &SearchParams,
    ) -> Result<SearchResult, SearchError> {
        if self.fail_search {
            return Err(SearchError::connection("search unavailable"));
        }

        let collections = self.collections.lock().await;
        let docs = collections
            .get(collection)
            .ok_or_else(|| SearchError::not_found(collection))?;

        let needle = params.q.to_lowercase();
        let mut matches: Vec<&NewsDocument> = docs
            .values()
            .filter(|doc| {
                params.q == "*"
                    || params.query_by.iter().any(|field| {
                        text_field(doc, field)
                            .is_some_and(|text| text.to_lowercase().contains(&needle))
                    })
            })
            .collect();
        matches.sort_by(|a, b| a.id.cmp(&b.id));

        let mut facet_counts = Vec::new();
        if let Some(field) = &params.facet_by {
            let mut tally: BTreeMap<&str, u64> = BTreeMap::new();
            for doc in &matches {
                if let Some(value) = text_field(doc, field) {
                    *tally.entry(value).or_default() += 1;
                }
            }
            let mut counts: Vec<FacetCount> = tally
                .into_iter()
                .map(|(value, count)| FacetCount::new(value, count))
                .collect();
            counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));
            counts.truncate(params.max_facet_values.unwrap_or(10) as usize);
            facet_counts.push(FacetCounts {
                field_name: field.clone(),
                counts,
            });
        }

        Ok(SearchResult {
            found: matches.len() as u64,
            hits: matches
                .iter()
                .take(params.per_page as usize)
                .map(|doc| json!({"document": {"id": doc.id}}))
                .collect(),
            facet_counts,
        })
    }

    async fn health_check(&self) -> Result<bool, SearchError> {
        self.health_calls.fetch_add(1, Ordering::SeqCst);
        if Self::take_one(&self.unready_checks) {
            return Err(SearchError::connection("connection refused"));
        }
        Ok(true)
    }
}

fn text_field<'a>(doc: &'a NewsDocument, field: &str) -> Option<&'a str> {
    match field {
        "title" => doc.title.as_deref(),
        "content" => doc.content.as_deref(),
        "agency" => doc.agency.as_deref(),
        "category" => doc.category.as_deref(),
        _ => None,
    }
}
