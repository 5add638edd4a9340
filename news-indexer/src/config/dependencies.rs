//! Dependency initialization and wiring for the news indexer.

use std::sync::Arc;
use tracing::info;

use crate::IndexingError;
use news_indexer_pipeline::{
    lifecycle::{CollectionManager, RetryPolicy},
    loader::{BatchIndexer, LoaderConfig},
    orchestrator::Orchestrator,
    verifier::CollectionVerifier,
};
use news_indexer_repository::{SearchEngineClient, TypesenseClient, TypesenseConfig};

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// Shared search engine client.
    pub client: Arc<dyn SearchEngineClient>,
    /// Connection settings the client was built from.
    pub config: TypesenseConfig,
}

impl Dependencies {
    /// Initialize dependencies from environment variables.
    ///
    /// A `.env` file in the working directory is loaded first when present.
    ///
    /// # Environment Variables
    ///
    /// - `TYPESENSE_HOST`: Server host (default: localhost)
    /// - `TYPESENSE_PORT`: Server port (default: 8108)
    /// - `TYPESENSE_PROTOCOL`: `http` or `https` (default: http)
    /// - `TYPESENSE_API_KEY`: API key sent with every request
    /// - `TYPESENSE_TIMEOUT`: Request timeout in seconds (default: 10)
    ///
    /// No request is made here; call `wait_for_engine` to verify connectivity.
    pub fn from_env() -> Result<Self, IndexingError> {
        dotenv::dotenv().ok();

        let config = TypesenseConfig::from_env()
            .map_err(|e| IndexingError::config(format!("Invalid Typesense settings: {}", e)))?;
        Self::with_config(config)
    }

    /// Initialize dependencies from an explicit configuration.
    pub fn with_config(config: TypesenseConfig) -> Result<Self, IndexingError> {
        info!(
            host = %config.host,
            port = config.port,
            protocol = %config.protocol,
            "Initializing dependencies"
        );

        let client = TypesenseClient::new(&config).map_err(|e| {
            IndexingError::config(format!("Failed to create Typesense client: {}", e))
        })?;

        Ok(Self {
            client: Arc::new(client),
            config,
        })
    }

    /// Collection manager with the default delete retry policy.
    pub fn manager(&self) -> CollectionManager {
        CollectionManager::new(self.client.clone())
    }

    /// Poll the engine until it is healthy.
    pub async fn wait_for_engine(&self) -> Result<(), IndexingError> {
        if self
            .manager()
            .wait_until_ready(&RetryPolicy::connectivity())
            .await
        {
            info!("Typesense connection verified");
            Ok(())
        } else {
            Err(IndexingError::config(format!(
                "Typesense at {} did not become ready",
                self.config.base_url()
            )))
        }
    }

    /// Orchestrator wired with a batch indexer using `loader`.
    pub fn orchestrator(&self, loader: LoaderConfig) -> Orchestrator {
        let indexer = BatchIndexer::with_config(self.client.clone(), loader);
        Orchestrator::new(self.manager(), indexer)
    }

    /// Read-only checks run against an indexed collection.
    pub fn verifier(&self) -> CollectionVerifier {
        CollectionVerifier::new(self.client.clone())
    }
}
