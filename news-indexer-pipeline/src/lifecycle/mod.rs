//! Collection lifecycle for the news indexer pipeline.
//!
//! Creates, deletes and lists collections on the search engine, and waits for
//! the engine to become reachable.

mod retry;

pub use retry::RetryPolicy;

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use crate::errors::PipelineError;
use news_indexer_repository::{CollectionInfo, CollectionSchema, SearchEngineClient, SearchError};

/// Literal the operator must type to confirm a delete.
pub const CONFIRMATION_TOKEN: &str = "DELETE";

/// Source of the operator's answer to the delete confirmation.
pub trait ConfirmationPrompt: Send + Sync {
    /// Show `message` and return the raw answer.
    fn ask(&self, message: &str) -> io::Result<String>;
}

/// Prompt that reads one line from standard input.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinPrompt;

impl ConfirmationPrompt for StdinPrompt {
    fn ask(&self, message: &str) -> io::Result<String> {
        let mut stdout = io::stdout();
        write!(stdout, "{}", message)?;
        stdout.flush()?;

        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        Ok(answer.trim_end_matches(['\r', '\n']).to_string())
    }
}

/// Result of `CollectionManager::ensure`.
#[derive(Debug, Clone, PartialEq)]
pub enum EnsureOutcome {
    /// The collection was already there and was left untouched.
    Existing(CollectionInfo),
    /// The collection was created from the schema.
    Created(CollectionInfo),
}

impl EnsureOutcome {
    pub fn created(&self) -> bool {
        matches!(self, EnsureOutcome::Created(_))
    }

    pub fn info(&self) -> &CollectionInfo {
        match self {
            EnsureOutcome::Existing(info) | EnsureOutcome::Created(info) => info,
        }
    }
}

/// Result of `CollectionManager::delete`.
///
/// `deleted` is only true once the collection is confirmed gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeleteOutcome {
    pub deleted: bool,
    /// Delete attempts made. Zero when the collection was missing or the
    /// operator refused.
    pub attempts: u32,
    /// The operator did not confirm.
    pub cancelled: bool,
    /// The collection existed when the call started.
    pub existed: bool,
}

/// Manager for the collections on the search engine.
///
/// The manager is responsible for:
/// - Creating the collection when it is missing, and nothing else
/// - Deleting with confirmation, verifying the delete took effect
/// - Listing collections with their document counts
/// - Polling the engine until it answers health checks
pub struct CollectionManager {
    client: Arc<dyn SearchEngineClient>,
    retry: RetryPolicy,
}

impl CollectionManager {
    /// Create a new manager with the default retry policy.
    pub fn new(client: Arc<dyn SearchEngineClient>) -> Self {
        Self::with_retry(client, RetryPolicy::default())
    }

    /// Create a new manager with a custom retry policy.
    pub fn with_retry(client: Arc<dyn SearchEngineClient>, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }

    /// Create `name` from `schema` unless it already exists.
    ///
    /// The schema is renamed to `name` and validated before creation.
    #[instrument(skip(self, schema))]
    pub async fn ensure(
        &self,
        name: &str,
        schema: &CollectionSchema,
    ) -> Result<EnsureOutcome, PipelineError> {
        match self.client.retrieve_collection(name).await {
            Ok(info) => {
                info!(
                    collection = %name,
                    documents = info.num_documents,
                    "Collection already exists"
                );
                Ok(EnsureOutcome::Existing(info))
            }
            Err(e) if e.is_not_found() => {
                let schema = schema.with_name(name);
                schema.validate()?;

                info!(collection = %name, fields = schema.fields.len(), "Creating collection");
                let info = self.client.create_collection(&schema).await?;
                info!(collection = %name, "Collection created");
                Ok(EnsureOutcome::Created(info))
            }
            Err(e) => {
                error!(collection = %name, error = %e, "Failed to look up collection");
                Err(e.into())
            }
        }
    }

    /// Delete `name`, asking `prompt` for the confirmation token unless
    /// `skip_confirmation` is set.
    ///
    /// # Returns
    ///
    /// * `Ok(DeleteOutcome)` - With `deleted` set only when the collection is
    ///   confirmed gone; a missing collection or a refusal is not an error
    /// * `Err(PipelineError)` - If the lookup fails, the prompt cannot be read,
    ///   or the last delete attempt fails with something other than not-found
    #[instrument(skip(self, prompt))]
    pub async fn delete(
        &self,
        name: &str,
        skip_confirmation: bool,
        prompt: &dyn ConfirmationPrompt,
    ) -> Result<DeleteOutcome, PipelineError> {
        let info = match self.client.retrieve_collection(name).await {
            Ok(info) => info,
            Err(e) if e.is_not_found() => {
                info!(collection = %name, "Collection does not exist");
                return Ok(DeleteOutcome::default());
            }
            Err(e) => return Err(e.into()),
        };

        warn!(
            collection = %name,
            documents = info.num_documents,
            "About to delete collection. This cannot be undone"
        );

        if !skip_confirmation {
            let message = format!(
                "Type '{}' to delete collection '{}' ({} documents): ",
                CONFIRMATION_TOKEN, name, info.num_documents
            );
            let answer = prompt
                .ask(&message)
                .map_err(|e| PipelineError::prompt(e.to_string()))?;
            if answer != CONFIRMATION_TOKEN {
                info!(collection = %name, "Deletion cancelled");
                return Ok(DeleteOutcome {
                    cancelled: true,
                    existed: true,
                    ..Default::default()
                });
            }
        }

        let max_attempts = self.retry.attempts();
        for attempt in 1..=max_attempts {
            match self.delete_once(name).await {
                Ok(true) => {
                    info!(collection = %name, attempt, "Collection deleted");
                    return Ok(DeleteOutcome {
                        deleted: true,
                        attempts: attempt,
                        cancelled: false,
                        existed: true,
                    });
                }
                Ok(false) => {
                    warn!(
                        collection = %name,
                        attempt,
                        max_attempts,
                        "Collection still exists after delete"
                    );
                }
                Err(e) if self.retry.is_last(attempt) => {
                    error!(collection = %name, attempt, error = %e, "Failed to delete collection");
                    return Err(e.into());
                }
                Err(e) => {
                    warn!(
                        collection = %name,
                        attempt,
                        max_attempts,
                        error = %e,
                        "Delete attempt failed, retrying"
                    );
                }
            }

            if !self.retry.is_last(attempt) {
                self.retry.pause().await;
            }
        }

        error!(
            collection = %name,
            attempts = max_attempts,
            "Collection still exists after all delete attempts"
        );
        Ok(DeleteOutcome {
            deleted: false,
            attempts: max_attempts,
            cancelled: false,
            existed: true,
        })
    }

    /// One delete request followed by a verification lookup.
    ///
    /// `Ok(true)` when the collection is gone, `Ok(false)` when it survived.
    async fn delete_once(&self, name: &str) -> Result<bool, SearchError> {
        match self.client.delete_collection(name).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => return Ok(true),
            Err(e) => return Err(e),
        }

        tokio::time::sleep(self.retry.verify_delay).await;

        match self.client.retrieve_collection(name).await {
            Ok(_) => Ok(false),
            Err(e) if e.is_not_found() => Ok(true),
            Err(e) => Err(e),
        }
    }

    /// List all collections. Failures are logged and yield an empty list.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Vec<CollectionInfo> {
        match self.client.list_collections().await {
            Ok(collections) => {
                if collections.is_empty() {
                    info!("No collections found");
                }
                for collection in &collections {
                    info!(
                        collection = %collection.name,
                        documents = collection.num_documents,
                        "Collection"
                    );
                }
                collections
            }
            Err(e) => {
                error!(error = %e, "Failed to list collections");
                Vec::new()
            }
        }
    }

    /// Poll the engine's health endpoint until it answers, at most
    /// `policy.max_attempts` times.
    ///
    /// Returns `false` once the attempts are exhausted; the caller decides
    /// whether to abort.
    #[instrument(skip(self, policy), fields(max_attempts = policy.attempts()))]
    pub async fn wait_until_ready(&self, policy: &RetryPolicy) -> bool {
        let max_attempts = policy.attempts();
        for attempt in 1..=max_attempts {
            match self.client.health_check().await {
                Ok(true) => {
                    info!(attempt, "Search engine is ready");
                    return true;
                }
                Ok(false) => {
                    debug!(attempt, max_attempts, "Search engine not healthy yet");
                }
                Err(e) => {
                    debug!(attempt, max_attempts, error = %e, "Search engine not reachable yet");
                }
            }

            if !policy.is_last(attempt) {
                info!(attempt, max_attempts, "Waiting for search engine");
                policy.pause().await;
            }
        }

        error!(attempts = max_attempts, "Search engine did not become ready");
        false
    }
}
