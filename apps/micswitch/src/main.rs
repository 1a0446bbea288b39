use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use micswitch::notifications;
use micswitch::platform;
use micswitch::{ListSourcesUseCase, SwitchCommandBuilder, SwitchSourceUseCase};
use micswitch_config::Config;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file (default: <config dir>/micswitch/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand, Debug)]
enum Action {
    /// List input sources as JSON
    List {
        /// Only sources whose name or description contains this text
        #[arg(long, default_value = "")]
        query: String,

        /// Maximum number of sources (default: max_sources_display)
        #[arg(long, allow_negative_numbers = true)]
        limit: Option<i64>,
    },
    /// Make a source the default input and move active streams to it
    Switch {
        #[arg(long)]
        name: String,

        /// Show a desktop notification afterwards
        #[arg(long)]
        notify: bool,
    },
    /// Print a shell command that performs the switch when run
    Command {
        #[arg(long)]
        name: String,

        /// Label used in the notification (default: the source name)
        #[arg(long)]
        display_name: Option<String>,
    },
    /// Print the effective configuration
    Config,
}

#[derive(Serialize)]
struct SourceEntry<'a> {
    name: &'a str,
    index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    default: bool,
}

#[derive(Serialize)]
struct ListResponse<'a> {
    sources: Vec<SourceEntry<'a>>,
}

#[derive(Serialize)]
struct SwitchResponse {
    success: bool,
    message: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load(path),
        None => Config::load_default(),
    };
    config.context("Failed to load configuration")
}

async fn run(args: Args) -> Result<()> {
    let config = load_config(args.config.as_ref())?;

    match args.action {
        Action::List { query, limit } => {
            let client = platform::create_client(&config).await?;
            let limit = limit.unwrap_or_else(|| i64::from(config.max_sources_display));

            let sources = ListSourcesUseCase::new(client.clone())
                .execute(&query, limit)
                .await?;
            let default = client.default_source().await;

            let response = ListResponse {
                sources: sources
                    .iter()
                    .map(|source| SourceEntry {
                        name: &source.name,
                        index: source.index,
                        description: source.description.as_deref(),
                        default: default.as_deref() == Some(source.name.as_str()),
                    })
                    .collect(),
            };
            print_json(&response)
        }
        Action::Switch { name, notify } => {
            let client = platform::create_client(&config).await?;
            SwitchSourceUseCase::new(client).execute(&name).await?;

            if notify || config.notify_on_switch {
                if let Err(e) =
                    notifications::show_device_notification(&name, config.notification_expire())
                        .await
                {
                    warn!("{}", e);
                }
            }

            info!("Switched to {}", name);
            print_json(&SwitchResponse {
                success: true,
                message: format!("Switched to {}", name),
            })
        }
        Action::Command { name, display_name } => {
            let command = SwitchCommandBuilder::new(config.pactl_path.clone())
                .with_notification(config.notification_expire())
                .build(&name, display_name.as_deref().unwrap_or(&name));
            println!("{}", command);
            Ok(())
        }
        Action::Config => {
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    // stdout carries JSON; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        let error = ErrorResponse {
            error: format!("{:#}", e),
        };
        if let Ok(json) = serde_json::to_string(&error) {
            println!("{}", json);
        }
        std::process::exit(1);
    }
}
