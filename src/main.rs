use anyhow::Context;
use clap::{Parser, Subcommand};
use sns_forwarder::app::handler::{prepare, Handler};
use sns_forwarder::config::{ForwarderConfig, LoggingConfig};
use sns_forwarder::logging;
use sns_forwarder::normalize::normalize_batch;
use sns_forwarder::types::SnsEvent;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "sns_forwarder")]
#[command(about = "Forward SNS notification batches to a Scalyr/DataSet addEvents endpoint")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize an SNS event and deliver it as one batch
    Forward {
        /// SNS event JSON file (reads stdin when omitted)
        #[arg(long)]
        event: Option<PathBuf>,
        /// TOML config file (uses environment variables when omitted)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Print the outbound document instead of sending it
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the normalized events of an SNS event, one JSON object per line
    Normalize {
        /// SNS event JSON file (reads stdin when omitted)
        #[arg(long)]
        event: Option<PathBuf>,
    },
}

fn read_event(path: Option<&Path>) -> anyhow::Result<SnsEvent> {
    let content = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read event file '{}'", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read event from stdin")?;
            buf
        }
    };
    serde_json::from_str(&content).context("Input is not a valid SNS event")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Forward {
            event,
            config,
            dry_run,
        } => {
            if dry_run {
                let _guard = logging::init_logging(&LoggingConfig::default());
                let event = read_event(event.as_deref())?;
                match prepare(&event)? {
                    Some(batch) => println!("{}", serde_json::to_string_pretty(&batch)?),
                    None => println!("No events to send."),
                }
                return Ok(());
            }

            let config = match config {
                Some(path) => ForwarderConfig::load(&path)?,
                None => ForwarderConfig::from_env()?,
            };
            let _guard = logging::init_logging(&config.logging);
            info!("Forwarding to {}", config.endpoint);

            let event = read_event(event.as_deref())?;
            let handler = Handler::from_config(&config)?;
            let outcome = handler
                .handle(&event)
                .await
                .context("SNS batch was not forwarded")?;
            println!("{}", serde_json::to_string(&outcome)?);
        }
        Commands::Normalize { event } => {
            let _guard = logging::init_logging(&LoggingConfig::default());
            let event = read_event(event.as_deref())?;
            for normalized in normalize_batch(event.decode_records()?)? {
                println!("{}", serde_json::to_string(&normalized)?);
            }
        }
    }
    Ok(())
}
