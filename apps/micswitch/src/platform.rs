// Choose the audio client for the running OS
use micswitch_config::Config;
use std::sync::Arc;

use crate::client::{AudioSystemClient, ClientError};
use crate::pactl::PactlClient;
use crate::switch_audio_source::SwitchAudioSourceClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    MacOs,
    Unsupported,
}

impl Platform {
    pub fn detect() -> Self {
        if cfg!(target_os = "linux") {
            Platform::Linux
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Unsupported
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("Unsupported platform: {0}")]
    Unsupported(&'static str),

    #[error(transparent)]
    Client(#[from] ClientError),
}

pub async fn create_client(config: &Config) -> Result<Arc<dyn AudioSystemClient>, PlatformError> {
    match Platform::detect() {
        Platform::Linux => Ok(Arc::new(PactlClient::new(config))),
        Platform::MacOs => Ok(Arc::new(SwitchAudioSourceClient::locate(config).await?)),
        Platform::Unsupported => Err(PlatformError::Unsupported(std::env::consts::OS)),
    }
}
