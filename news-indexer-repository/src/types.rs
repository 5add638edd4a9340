//! Request and response types for search engine operations.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Metadata of a collection as reported by the search engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub name: String,
    #[serde(default)]
    pub num_documents: u64,
    /// Raw field descriptors. Kept untyped because the engine reports field
    /// types and attributes beyond what this crate declares.
    #[serde(default)]
    pub fields: Vec<Value>,
}

impl CollectionInfo {
    pub fn new(name: impl Into<String>, num_documents: u64) -> Self {
        Self {
            name: name.into(),
            num_documents,
            fields: Vec::new(),
        }
    }
}

/// Per-document result of an import request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// The rejected document, echoed back by the engine on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
}

impl ImportResult {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
            document: None,
            code: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            document: None,
            code: None,
        }
    }
}

/// Summary of an import request containing aggregate counts and the
/// individual failures.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImportSummary {
    /// Total number of documents in the request.
    pub total: usize,
    /// Number of documents the engine accepted.
    pub succeeded: usize,
    /// Number of documents the engine rejected.
    pub failed: usize,
    /// Results of the rejected documents, in request order.
    pub failures: Vec<ImportResult>,
}

impl ImportSummary {
    /// Summarize the per-document results of one import request.
    ///
    /// Documents without a reported failure count as indexed.
    pub fn from_results(total: usize, results: Vec<ImportResult>) -> Self {
        let failures: Vec<ImportResult> = results.into_iter().filter(|r| !r.success).collect();
        let failed = failures.len();

        Self {
            total,
            succeeded: total.saturating_sub(failed),
            failed,
            failures,
        }
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// Parameters of a document search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    /// Query text, `*` matches every document.
    pub q: String,
    pub query_by: Vec<String>,
    pub facet_by: Option<String>,
    pub max_facet_values: Option<u32>,
    /// Hits to return; zero asks for counts and facets only.
    pub per_page: u32,
}

impl SearchParams {
    pub fn new(q: impl Into<String>, query_by: &[&str]) -> Self {
        Self {
            q: q.into(),
            query_by: query_by.iter().map(|field| field.to_string()).collect(),
            facet_by: None,
            max_facet_values: None,
            per_page: 10,
        }
    }

    pub fn facet_by(mut self, field: impl Into<String>, max_values: u32) -> Self {
        self.facet_by = Some(field.into());
        self.max_facet_values = Some(max_values);
        self
    }

    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    /// Query string pairs in the form the engine expects.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("q", self.q.clone()),
            ("query_by", self.query_by.join(",")),
            ("per_page", self.per_page.to_string()),
        ];
        if let Some(field) = &self.facet_by {
            query.push(("facet_by", field.clone()));
        }
        if let Some(max) = self.max_facet_values {
            query.push(("max_facet_values", max.to_string()));
        }
        query
    }
}

/// One value of a facet with its document count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetCount {
    pub value: String,
    pub count: u64,
}

impl FacetCount {
    pub fn new(value: impl Into<String>, count: u64) -> Self {
        Self {
            value: value.into(),
            count,
        }
    }
}

/// Facet values of a single field, most frequent first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetCounts {
    pub field_name: String,
    #[serde(default)]
    pub counts: Vec<FacetCount>,
}

/// Response of a document search.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchResult {
    /// Total number of matching documents.
    #[serde(default)]
    pub found: u64,
    #[serde(default)]
    pub hits: Vec<Value>,
    #[serde(default)]
    pub facet_counts: Vec<FacetCounts>,
}

impl SearchResult {
    /// Facet counts reported for `field`.
    pub fn facet(&self, field: &str) -> Option<&FacetCounts> {
        self.facet_counts.iter().find(|facet| facet.field_name == field)
    }
}
