// PulseAudio / PipeWire client driving the `pactl` command line tool
//
// Mutating calls are best-effort: failures are logged and the call still
// returns Ok. A default-source change that did not take is visible in the
// next listing.
use async_trait::async_trait;
use micswitch_config::Config;
use micswitch_utils::{CommandRunner, ProcessRunner, UtilError};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::client::{AudioSystemClient, ClientError};
use crate::parser::{parse_stream_ids, SourceFormat};
use crate::source::AudioSourceList;

pub struct PactlClient<R = ProcessRunner> {
    runner: R,
    pactl: String,
    format: SourceFormat,
    list_timeout: Duration,
    set_source_timeout: Duration,
    move_stream_timeout: Duration,
}

impl PactlClient<ProcessRunner> {
    pub fn new(config: &Config) -> Self {
        Self::with_runner(ProcessRunner, config)
    }
}

impl<R: CommandRunner> PactlClient<R> {
    pub fn with_runner(runner: R, config: &Config) -> Self {
        let format = if config.pactl_detailed_listing {
            SourceFormat::Blocks
        } else {
            SourceFormat::LineTable
        };
        Self {
            runner,
            pactl: config.pactl_path.clone(),
            format,
            list_timeout: config.list_timeout(),
            set_source_timeout: config.set_source_timeout(),
            move_stream_timeout: config.move_stream_timeout(),
        }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    fn listing_args(&self) -> &'static [&'static str] {
        match self.format {
            SourceFormat::Blocks => &["list", "sources"],
            _ => &["list", "short", "sources"],
        }
    }

    async fn move_stream(&self, stream_id: u32, source_name: &str) -> bool {
        let id = stream_id.to_string();
        match self
            .runner
            .run(
                &self.pactl,
                &["move-source-output", id.as_str(), source_name],
                self.move_stream_timeout,
            )
            .await
        {
            Ok(output) if output.success() => true,
            Ok(output) => {
                debug!("Failed to move stream {}: {}", stream_id, output.stderr.trim());
                false
            }
            Err(e) => {
                debug!("Failed to move stream {}: {}", stream_id, e);
                false
            }
        }
    }
}

#[async_trait]
impl<R: CommandRunner> AudioSystemClient for PactlClient<R> {
    async fn list_sources(&self) -> AudioSourceList {
        let output = match self
            .runner
            .run(&self.pactl, self.listing_args(), self.list_timeout)
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
                "pactl list sources failed with exit code {:?}: {}",
                output.code,
                output.stderr.trim()
            );
            return AudioSourceList::empty();
        }
        if output.stdout.trim().is_empty() {
            debug!("No audio sources found");
            return AudioSourceList::empty();
        }

        let sources = self.format.parse(&output.stdout);
        debug!("Found {} audio sources", sources.len());
        sources
    }

    async fn set_default_source(&self, source_name: &str) -> Result<(), ClientError> {
        match self
            .runner
            .run(
                &self.pactl,
                &["set-default-source", source_name],
                self.set_source_timeout,
            )
            .await
        {
            Ok(output) if output.success() => {
                info!("Default source set to '{}'", source_name);
            }
            Ok(output) => warn!(
                "Failed to set default source '{}': {}",
                source_name,
                output.stderr.trim()
            ),
            Err(UtilError::Timeout { .. }) => {
                error!("Timeout setting default source '{}'", source_name)
            }
            Err(e) => error!("Error setting default source '{}': {}", source_name, e),
        }
        Ok(())
    }

    async fn move_streams_to_source(&self, source_name: &str) -> Result<(), ClientError> {
        let output = match self
            .runner
            .run(
                &self.pactl,
                &["list", "short", "source-outputs"],
                self.move_stream_timeout,
            )
            .await
        {
            Ok(output) => output,
            Err(e) => {
                warn!("Could not list source outputs for '{}': {}", source_name, e);
                return Ok(());
            }
        };

        if !output.success() {
            debug!("No source outputs to move (exit code {:?})", output.code);
            return Ok(());
        }

        let stream_ids = parse_stream_ids(&output.stdout);
        if stream_ids.is_empty() {
            debug!("No active source outputs found");
            return Ok(());
        }

        let mut moved = 0;
        for stream_id in &stream_ids {
            if self.move_stream(*stream_id, source_name).await {
                moved += 1;
            }
        }
        debug!(
            "Moved {}/{} stream(s) to source '{}'",
            moved,
            stream_ids.len(),
            source_name
        );
        Ok(())
    }

    async fn default_source(&self) -> Option<String> {
        match self
            .runner
            .run(&self.pactl, &["get-default-source"], self.list_timeout)
            .await
        {
            Ok(output) if output.success() => {
                let name = output.stdout.trim();
                (!name.is_empty()).then(|| name.to_string())
            }
            Ok(output) => {
                debug!("pactl get-default-source failed: {}", output.stderr.trim());
                None
            }
            Err(e) => {
                debug!("pactl get-default-source failed: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Reply, ScriptedRunner};

    const SHORT_SOURCES: &str = "\
0\talsa_output.pci.analog-stereo.monitor\tPipeWire\ts32le 2ch 48000Hz\tSUSPENDED
1\talsa_input.pci.analog-stereo\tPipeWire\ts32le 2ch 48000Hz\tRUNNING
2\talsa_input.usb-Yeti.analog-stereo\tPipeWire\ts16le 2ch 48000Hz\tIDLE
";

    fn short_config() -> Config {
        Config {
            pactl_detailed_listing: false,
            ..Config::default()
        }
    }

    fn client(runner: ScriptedRunner, config: &Config) -> PactlClient<ScriptedRunner> {
        PactlClient::with_runner(runner, config)
    }

    #[tokio::test]
    async fn test_list_short_sources() {
        let runner = ScriptedRunner::new().on("pactl list short sources", Reply::ok(SHORT_SOURCES));
        let client = client(runner, &short_config());

        let sources = client.list_sources().await;
        let names: Vec<&str> = sources.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["alsa_input.pci.analog-stereo", "alsa_input.usb-Yeti.analog-stereo"]
        );
        assert_eq!(
            client.runner().timeout_of("pactl list short sources"),
            Some(Duration::from_secs_f64(0.15))
        );
    }

    #[tokio::test]
    async fn test_list_detailed_sources() {
        let raw = "Source #3\n\tName: mic\n\tDescription: Desk Mic\nSource #4\n\tName: mic.monitor\n";
        let runner = ScriptedRunner::new().on("pactl list sources", Reply::ok(raw));
        let client = client(runner, &Config::default());

        let sources = client.list_sources().await;
        assert_eq!(sources.len(), 1);
        assert_eq!(sources.sources()[0].display_name(), "Desk Mic");
    }

    #[tokio::test]
    async fn test_list_fails_open() {
        for reply in [
            Reply::fail(1, "Connection failure: Connection refused"),
            Reply::ok(""),
            Reply::Timeout,
            Reply::Missing,
        ] {
            let runner = ScriptedRunner::new().on("pactl list short sources", reply);
            let client = client(runner, &short_config());
            assert!(client.list_sources().await.is_empty());
        }
    }

    #[tokio::test]
    async fn test_set_default_source_is_best_effort() {
        for reply in [Reply::ok(""), Reply::fail(1, "No such entity"), Reply::Timeout, Reply::Missing] {
            let runner = ScriptedRunner::new().on("pactl set-default-source mic", reply);
            let client = client(runner, &Config::default());
            assert!(client.set_default_source("mic").await.is_ok());
            assert_eq!(client.runner().calls(), vec!["pactl set-default-source mic"]);
        }
    }

    #[tokio::test]
    async fn test_move_streams_in_listing_order_past_failures() {
        let runner = ScriptedRunner::new()
            .on(
                "pactl list short source-outputs",
                Reply::ok("12\t1\tprotocol-native.c\n\tjunk\n7\t1\tprotocol-native.c\n30\t2\tx\n"),
            )
            .on("pactl move-source-output 12 usb mic", Reply::fail(1, "No such entity"))
            .on("pactl move-source-output 7 usb mic", Reply::Timeout);
        let client = client(runner, &Config::default());

        client.move_streams_to_source("usb mic").await.unwrap();
        assert_eq!(
            client.runner().calls(),
            vec![
                "pactl list short source-outputs",
                "pactl move-source-output 12 usb mic",
                "pactl move-source-output 7 usb mic",
                "pactl move-source-output 30 usb mic",
            ]
        );
    }

    #[tokio::test]
    async fn test_move_streams_without_streams() {
        for reply in [Reply::ok(""), Reply::fail(1, ""), Reply::Timeout] {
            let runner = ScriptedRunner::new().on("pactl list short source-outputs", reply);
            let client = client(runner, &Config::default());
            client.move_streams_to_source("mic").await.unwrap();
            assert_eq!(client.runner().calls().len(), 1);
        }
    }

    #[tokio::test]
    async fn test_default_source() {
        let runner = ScriptedRunner::new().on("pactl get-default-source", Reply::ok("mic-a\n"));
        assert_eq!(
            client(runner, &Config::default()).default_source().await.as_deref(),
            Some("mic-a")
        );

        let runner = ScriptedRunner::new().on("pactl get-default-source", Reply::fail(1, "unknown command"));
        assert_eq!(client(runner, &Config::default()).default_source().await, None);
    }
}
