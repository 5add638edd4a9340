//! Typesense client implementation.
//!
//! This module provides the concrete implementation of `SearchEngineClient`
//! on top of the Typesense HTTP API.

use async_trait::async_trait;
use reqwest::{header, Client, Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, error, info, instrument};
use url::Url;

use crate::config::TypesenseConfig;
use crate::errors::SearchError;
use crate::interfaces::SearchEngineClient;
use crate::schema::CollectionSchema;
use crate::types::{CollectionInfo, ImportResult, SearchParams, SearchResult};
use news_indexer_shared::NewsDocument;

const API_KEY_HEADER: &str = "x-typesense-api-key";

/// Imports always replace documents with the same id.
const IMPORT_ACTION: &str = "upsert";

#[derive(Debug, Deserialize)]
struct HealthResponse {
    #[serde(default)]
    ok: bool,
}

/// Typesense client implementation.
///
/// # Example
///
/// ```ignore
/// let config = TypesenseConfig::from_env()?;
/// let client = TypesenseClient::new(&config)?;
///
/// let info = client.retrieve_collection("news").await?;
/// println!("{} documents", info.num_documents);
/// ```
pub struct TypesenseClient {
    http: Client,
    base_url: Url,
}

impl TypesenseClient {
    /// Create a new client for the configured server.
    ///
    /// No request is made; use `health_check` to verify the server is up.
    pub fn new(config: &TypesenseConfig) -> Result<Self, SearchError> {
        config.validate()?;

        let base_url =
            Url::parse(&config.base_url()).map_err(|e| SearchError::config(e.to_string()))?;

        let mut api_key = header::HeaderValue::from_str(&config.api_key)
            .map_err(|e| SearchError::config(format!("invalid API key: {}", e)))?;
        api_key.set_sensitive(true);

        let mut headers = header::HeaderMap::new();
        headers.insert(API_KEY_HEADER, api_key);

        let http = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| SearchError::connection(e.to_string()))?;

        info!(
            url = %base_url,
            timeout_secs = config.timeout.as_secs(),
            "Created Typesense client"
        );

        Ok(Self { http, base_url })
    }

    /// Build an endpoint URL from path segments. Segments are percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, SearchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SearchError::config(format!("invalid base URL: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Map a non-success response to an error. 404 means the collection is
    /// missing.
    async fn check_status(
        response: Response,
        collection: &str,
        context: &str,
    ) -> Result<Response, SearchError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(SearchError::not_found(collection));
        }

        let error_body = response.text().await.unwrap_or_default();
        error!(status = %status, body = %error_body, context, "Typesense request failed");
        Err(SearchError::collection(format!(
            "{} failed with status {}: {}",
            context, status, error_body
        )))
    }

    /// Serialize documents as JSON Lines, the import body format.
    fn encode_documents(documents: &[NewsDocument]) -> Result<String, SearchError> {
        let mut body = String::new();
        for document in documents {
            let line = serde_json::to_string(document)
                .map_err(|e| SearchError::SerializationError(e.to_string()))?;
            body.push_str(&line);
            body.push('\n');
        }
        Ok(body)
    }

    /// Parse the JSON Lines import response, one result per document.
    fn parse_import_response(body: &str) -> Result<Vec<ImportResult>, SearchError> {
        body.lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                serde_json::from_str(line).map_err(|e| {
                    SearchError::parse(format!("invalid import result '{}': {}", line, e))
                })
            })
            .collect()
    }
}

#[async_trait]
impl SearchEngineClient for TypesenseClient {
    #[instrument(skip(self))]
    async fn retrieve_collection(&self, name: &str) -> Result<CollectionInfo, SearchError> {
        let url = self.endpoint(&["collections", name])?;

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;
        let response = Self::check_status(response, name, "Retrieve collection").await?;

        response
            .json::<CollectionInfo>()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))
    }

    #[instrument(skip(self))]
    async fn list_collections(&self) -> Result<Vec<CollectionInfo>, SearchError> {
        let url = self.endpoint(&["collections"])?;

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;
        let response = Self::check_status(response, "*", "List collections").await?;

        response
            .json::<Vec<CollectionInfo>>()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))
    }

    #[instrument(skip(self, schema), fields(collection = %schema.name))]
    async fn create_collection(
        &self,
        schema: &CollectionSchema,
    ) -> Result<CollectionInfo, SearchError> {
        let url = self.endpoint(&["collections"])?;

        let response = self
            .http
            .post(url)
            .json(schema)
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;
        let response = Self::check_status(response, &schema.name, "Create collection").await?;

        debug!(collection = %schema.name, "Collection created");
        response
            .json::<CollectionInfo>()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))
    }

    #[instrument(skip(self))]
    async fn delete_collection(&self, name: &str) -> Result<(), SearchError> {
        let url = self.endpoint(&["collections", name])?;

        let response = self
            .http
            .delete(url)
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;
        Self::check_status(response, name, "Delete collection").await?;

        debug!(collection = %name, "Collection delete accepted");
        Ok(())
    }

    #[instrument(skip(self, documents), fields(count = documents.len()))]
    async fn import_documents(
        &self,
        collection: &str,
        documents: &[NewsDocument],
    ) -> Result<Vec<ImportResult>, SearchError> {
        let url = self.endpoint(&["collections", collection, "documents", "import"])?;
        let body = Self::encode_documents(documents)?;

        let response = self
            .http
            .post(url)
            .query(&[("action", IMPORT_ACTION)])
            .header(header::CONTENT_TYPE, "text/plain")
            .body(body)
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(SearchError::not_found(collection));
        }
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Import request failed");
            return Err(SearchError::import(format!(
                "Import failed with status {}: {}",
                status, error_body
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;
        Self::parse_import_response(&text)
    }

    #[instrument(skip(self, params), fields(q = %params.q))]
    async fn search_documents(
        &self,
        collection: &str,
        params: &SearchParams,
    ) -> Result<SearchResult, SearchError> {
        let url = self.endpoint(&["collections", collection, "documents", "search"])?;

        let response = self
            .http
            .get(url)
            .query(&params.to_query())
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;
        let response = Self::check_status(response, collection, "Search documents").await?;

        response
            .json::<SearchResult>()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))
    }

    async fn health_check(&self) -> Result<bool, SearchError> {
        let url = self.endpoint(&["health"])?;

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        if !response.status().is_success() {
            debug!(status = %response.status(), "Health check returned non-success status");
            return Ok(false);
        }

        let health = response
            .json::<HealthResponse>()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))?;
        Ok(health.ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_API_KEY;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> TypesenseClient {
        TypesenseClient::new(&TypesenseConfig::default()).unwrap()
    }

    /// Client pointed at a mock Typesense server.
    fn client_for(server: &MockServer) -> TypesenseClient {
        let address = server.address();
        let config = TypesenseConfig {
            host: address.ip().to_string(),
            port: address.port(),
            ..Default::default()
        };
        TypesenseClient::new(&config).unwrap()
    }

    #[test]
    fn test_endpoint() {
        let client = client();

        let url = client
            .endpoint(&["collections", "news", "documents", "import"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8108/collections/news/documents/import"
        );

        let url = client.endpoint(&["health"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8108/health");
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let url = client().endpoint(&["collections", "news/2024"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8108/collections/news%2F2024");
    }

    #[test]
    fn test_encode_documents() {
        let mut second = NewsDocument::new("b", 10);
        second.title = Some("Título".to_string());

        let body =
            TypesenseClient::encode_documents(&[NewsDocument::new("a", 0), second]).unwrap();
        let lines: Vec<&str> = body.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], r#"{"id":"a","unique_id":"a","published_at":0}"#);
        assert!(lines[1].contains(r#""title":"Título""#));
    }

    #[test]
    fn test_parse_import_response() {
        let body = concat!(
            "{\"success\":true}\n",
            "{\"success\":false,\"error\":\"Field `published_at` must be an int64.\",",
            "\"document\":\"{}\"}\n",
            "\n",
            "{\"success\":true}"
        );

        let results = TypesenseClient::parse_import_response(body).unwrap();

        assert_eq!(results.len(), 3);
        assert!(results[0].success);
        assert!(!results[1].success);
        assert_eq!(
            results[1].error.as_deref(),
            Some("Field `published_at` must be an int64.")
        );
        assert!(results[2].success);
    }

    #[test]
    fn test_parse_import_response_invalid() {
        let result = TypesenseClient::parse_import_response("not json");
        assert!(matches!(result, Err(SearchError::ParseError(_))));
    }

    #[test]
    fn test_new_rejects_empty_api_key() {
        let config = TypesenseConfig {
            api_key: String::new(),
            ..Default::default()
        };
        assert!(TypesenseClient::new(&config).is_err());
    }

    #[tokio::test]
    async fn test_unreachable_server_is_a_connection_error() {
        let config = TypesenseConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            ..Default::default()
        };
        let client = TypesenseClient::new(&config).unwrap();

        assert!(matches!(
            client.retrieve_collection("news").await,
            Err(SearchError::ConnectionError(_))
        ));
        assert!(matches!(
            client.health_check().await,
            Err(SearchError::ConnectionError(_))
        ));
    }

    #[tokio::test]
    async fn test_retrieve_collection() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/collections/news"))
            .and(header(API_KEY_HEADER, DEFAULT_API_KEY))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "news",
                "num_documents": 12,
                "fields": [{"name": "title", "type": "string"}]
            })))
            .mount(&server)
            .await;

        let info = client_for(&server).retrieve_collection("news").await.unwrap();

        assert_eq!(info.name, "news");
        assert_eq!(info.num_documents, 12);
    }

    #[tokio::test]
    async fn test_retrieve_missing_collection_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/collections/news"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})),
            )
            .mount(&server)
            .await;

        let result = client_for(&server).retrieve_collection("news").await;

        assert_eq!(result, Err(SearchError::not_found("news")));
    }

    #[tokio::test]
    async fn test_delete_missing_collection_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/collections/news"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let result = client_for(&server).delete_collection("news").await;

        assert!(result.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_create_collection_conflict_is_collection_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/collections"))
            .and(body_string_contains("\"default_sorting_field\":\"published_at\""))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "message": "A collection with name `news` already exists."
            })))
            .mount(&server)
            .await;

        let result = client_for(&server)
            .create_collection(&CollectionSchema::news())
            .await;

        match result {
            Err(SearchError::CollectionError(msg)) => assert!(msg.contains("already exists")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_import_reports_per_document_failures() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/collections/news/documents/import"))
            .and(query_param("action", "upsert"))
            .and(body_string_contains("\"id\":\"b\""))
            .respond_with(ResponseTemplate::new(200).set_body_string(concat!(
                "{\"success\":true}\n",
                "{\"success\":false,\"error\":\"Field `published_at` must be an int64.\"}"
            )))
            .expect(1)
            .mount(&server)
            .await;

        let results = client_for(&server)
            .import_documents("news", &[NewsDocument::new("a", 1), NewsDocument::new("b", 2)])
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert!(results[0].success);
        assert!(!results[1].success);
    }

    #[tokio::test]
    async fn test_import_rejected_request_is_import_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/collections/news/documents/import"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"message": "Bad JSON."})),
            )
            .mount(&server)
            .await;

        let result = client_for(&server)
            .import_documents("news", &[NewsDocument::new("a", 1)])
            .await;

        match result {
            Err(SearchError::ImportError(msg)) => assert!(msg.contains("Bad JSON.")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_import_into_missing_collection_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/collections/news/documents/import"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let result = client_for(&server)
            .import_documents("news", &[NewsDocument::new("a", 1)])
            .await;

        assert_eq!(result, Err(SearchError::not_found("news")));
    }

    #[tokio::test]
    async fn test_health_check() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": false})))
            .mount(&server)
            .await;

        assert_eq!(client_for(&server).health_check().await, Ok(false));
    }

    #[tokio::test]
    async fn test_health_check_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        assert_eq!(client_for(&server).health_check().await, Ok(false));
    }

    #[tokio::test]
    async fn test_search_documents() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/collections/news/documents/search"))
            .and(query_param("q", "*"))
            .and(query_param("facet_by", "agency"))
            .and(query_param("per_page", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "found": 20,
                "hits": [],
                "facet_counts": [{
                    "field_name": "agency",
                    "counts": [{"value": "Casa Civil", "count": 20, "highlighted": "Casa Civil"}]
                }]
            })))
            .mount(&server)
            .await;

        let params = SearchParams::new("*", &["title"])
            .facet_by("agency", 5)
            .per_page(0);
        let result = client_for(&server)
            .search_documents("news", &params)
            .await
            .unwrap();

        assert_eq!(result.found, 20);
        assert_eq!(result.facet("agency").unwrap().counts[0].count, 20);
    }
}
