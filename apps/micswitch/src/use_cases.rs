// Listing and switching use cases
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::client::{AudioSystemClient, ClientError};
use crate::source::AudioSourceList;

#[derive(Error, Debug)]
pub enum UseCaseError {
    #[error("limit must be greater than 0, got {0}")]
    InvalidLimit(i64),

    #[error("Source name cannot be empty")]
    EmptySourceName,

    #[error(transparent)]
    Switch(#[from] ClientError),
}

/// Lists input sources, filtered by a query and capped at a limit.
pub struct ListSourcesUseCase {
    client: Arc<dyn AudioSystemClient>,
}

impl ListSourcesUseCase {
    pub const DEFAULT_LIMIT: i64 = 10;

    pub fn new(client: Arc<dyn AudioSystemClient>) -> Self {
        Self { client }
    }

    /// Sources whose name or description contains `query`, in listing
    /// order, at most `limit` of them. `limit` is validated before the
    /// audio system is touched.
    pub async fn execute(&self, query: &str, limit: i64) -> Result<AudioSourceList, UseCaseError> {
        if limit < 1 {
            return Err(UseCaseError::InvalidLimit(limit));
        }
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);

        let sources = self.client.list_sources().await;
        Ok(sources.filter_by_query(query).limit(limit))
    }
}

/// Makes a source the default input, then moves running capture streams
/// onto it.
///
/// The two steps are not transactional. When moving streams fails part way
/// the default has still changed; running the switch again moves the rest.
pub struct SwitchSourceUseCase {
    client: Arc<dyn AudioSystemClient>,
}

impl SwitchSourceUseCase {
    pub fn new(client: Arc<dyn AudioSystemClient>) -> Self {
        Self { client }
    }

    pub async fn execute(&self, source_name: &str) -> Result<(), UseCaseError> {
        if source_name.trim().is_empty() {
            return Err(UseCaseError::EmptySourceName);
        }

        info!("Switching to audio source: {}", source_name);
        self.client.set_default_source(source_name).await?;

        if let Err(e) = self.client.move_streams_to_source(source_name).await {
            warn!("Could not move streams to '{}': {}", source_name, e);
        }
        Ok(())
    }
}
