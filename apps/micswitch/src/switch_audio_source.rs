// macOS client driving the `SwitchAudioSource` tool (switchaudio-osx)
use async_trait::async_trait;
use micswitch_config::Config;
use micswitch_utils::{CommandRunner, ProcessRunner, ProcessUtils, UtilError};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::client::{AudioSystemClient, ClientError};
use crate::parser::SourceFormat;
use crate::source::AudioSourceList;

const TOOL: &str = "SwitchAudioSource";
const INSTALL_HINT: &str = "Install via: brew install switchaudio-osx";
const KNOWN_LOCATIONS: [&str; 2] = [
    "/usr/local/bin/SwitchAudioSource",
    "/opt/homebrew/bin/SwitchAudioSource",
];

/// Switching is the action the user asked for, so a failed
/// `set_default_source` is reported rather than logged away.
pub struct SwitchAudioSourceClient<R = ProcessRunner> {
    runner: R,
    tool_path: String,
    list_timeout: Duration,
    set_source_timeout: Duration,
}

impl SwitchAudioSourceClient<ProcessRunner> {
    /// Locate the tool: the configured path, the Homebrew locations, then PATH.
    pub async fn locate(config: &Config) -> Result<Self, ClientError> {
        let mut candidates: Vec<&str> = Vec::new();
        if let Some(path) = config.switch_audio_source_path.as_deref() {
            candidates.push(path);
        }
        candidates.extend(KNOWN_LOCATIONS);
        candidates.push(TOOL);

        let tool_path = ProcessUtils::find_executable(&candidates)
            .await
            .ok_or(ClientError::ToolNotFound {
                tool: TOOL,
                hint: INSTALL_HINT,
            })?;
        debug!("Using {} at {}", TOOL, tool_path);
        Ok(Self::with_runner(ProcessRunner, tool_path, config))
    }
}

impl<R: CommandRunner> SwitchAudioSourceClient<R> {
    pub fn with_runner(runner: R, tool_path: impl Into<String>, config: &Config) -> Self {
        Self {
            runner,
            tool_path: tool_path.into(),
            list_timeout: config.list_timeout(),
            set_source_timeout: config.set_source_timeout(),
        }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }
}

#[async_trait]
impl<R: CommandRunner> AudioSystemClient for SwitchAudioSourceClient<R> {
    async fn list_sources(&self) -> AudioSourceList {
        let output = match self
            .runner
            .run(&self.tool_path, &["-a", "-t", "input"], self.list_timeout)
            .await
        {
            Ok(output) => output,
            Err(UtilError::Timeout { .. }) => {
                warn!("Timeout while listing audio sources");
                return AudioSourceList::empty();
            }
            Err(e) => {
                error!("Error listing audio sources: {}", e);
                return AudioSourceList::empty();
            }
        };

        if !output.success() {
            warn!(
                "{} list failed with exit code {:?}: {}",
                TOOL,
                output.code,
                output.stderr.trim()
            );
            return AudioSourceList::empty();
        }
        if output.stdout.trim().is_empty() {
            debug!("No audio sources found");
            return AudioSourceList::empty();
        }

        SourceFormat::NameList.parse(&output.stdout)
    }

    async fn set_default_source(&self, source_name: &str) -> Result<(), ClientError> {
        let output = self
            .runner
            .run(
                &self.tool_path,
                &["-s", source_name, "-t", "input"],
                self.set_source_timeout,
            )
            .await
            .map_err(|e| {
                error!("Error setting default source '{}': {}", source_name, e);
                ClientError::from(e)
            })?;

        if !output.success() {
            warn!(
                "Failed to set default source '{}': {}",
                source_name,
                output.stderr.trim()
            );
            let message = match output.stderr.trim() {
                "" => "Unknown error".to_string(),
                stderr => stderr.to_string(),
            };
            return Err(ClientError::SwitchFailed { message });
        }

        info!("Default source set to '{}'", source_name);
        Ok(())
    }

    /// CoreAudio has no relocatable capture streams; applications follow the
    /// default device themselves, so there is nothing to move.
    async fn move_streams_to_source(&self, source_name: &str) -> Result<(), ClientError> {
        debug!("No streams to move to '{}' on this platform", source_name);
        Ok(())
    }

    async fn default_source(&self) -> Option<String> {
        match self
            .runner
            .run(&self.tool_path, &["-c", "-t", "input"], self.list_timeout)
            .await
        {
            Ok(output) if output.success() => {
                let name = output.stdout.trim();
                (!name.is_empty()).then(|| name.to_string())
            }
            _ => None,
        }
    }
}
