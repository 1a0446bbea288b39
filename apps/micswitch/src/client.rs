// Audio system capability interface shared by the platform clients
use async_trait::async_trait;
use micswitch_utils::UtilError;
use thiserror::Error;

use crate::source::AudioSourceList;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("{tool} not found. {hint}")]
    ToolNotFound {
        tool: &'static str,
        hint: &'static str,
    },

    #[error("Failed to switch audio source: {message}")]
    SwitchFailed { message: String },

    #[error(transparent)]
    Process(#[from] UtilError),
}

/// Operations the use cases need from the platform audio subsystem.
///
/// Listing is fail-open: tool failures and timeouts produce an empty list.
/// Whether the mutating calls report failures depends on the implementation.
#[async_trait]
pub trait AudioSystemClient: Send + Sync {
    /// All input sources, monitors excluded.
    async fn list_sources(&self) -> AudioSourceList;

    async fn set_default_source(&self, source_name: &str) -> Result<(), ClientError>;

    /// Relocate active capture streams to `source_name`. Individual stream
    /// failures are not reported.
    async fn move_streams_to_source(&self, source_name: &str) -> Result<(), ClientError>;

    /// Name of the current default source, when the platform can tell.
    async fn default_source(&self) -> Option<String> {
        None
    }
}
