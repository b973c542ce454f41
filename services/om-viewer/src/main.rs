//! OM file inspection tool.
//!
//! Resolves an input (local path, HTTP(S) URL or `s3://` URL) to the same
//! backend the viewer controller would use, then reports its size and OM
//! header as JSON on stdout. Logs go to stderr.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use om_reader::{default_progress, probe_header, select_backend, LocalFile, ViewerInput};
use serde::Serialize;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use viewer_state::ViewerConfig;

#[derive(Parser, Debug)]
#[command(name = "om-viewer")]
#[command(about = "Inspect OM files through the viewer backends")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// YAML configuration file (default: environment variables)
    #[arg(long, env = "OM_VIEWER_CONFIG")]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve a backend and report byte count and header
    Probe {
        /// Local path, http(s):// URL or s3:// URL
        input: String,
    },
}

#[derive(Debug, Serialize)]
struct ProbeReport {
    input: String,
    backend: &'static str,
    size: u64,
    magic: bool,
    version: Option<u8>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config = load_config(args.config.as_ref())?;

    match args.command {
        Command::Probe { input } => {
            let report = probe(&input, &config).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> Result<ViewerConfig> {
    match path {
        Some(path) => ViewerConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => {
            let config = ViewerConfig::from_env();
            config
                .validate()
                .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;
            Ok(config)
        }
    }
}

/// Anything with a scheme is a URL; everything else is a local path.
async fn resolve_input(input: &str) -> Result<ViewerInput> {
    if input.contains("://") {
        return Ok(ViewerInput::url(input));
    }
    let file = LocalFile::open(input)
        .await
        .with_context(|| format!("Failed to open {}", input))?;
    Ok(ViewerInput::from(file))
}

async fn probe(input: &str, config: &ViewerConfig) -> Result<ProbeReport> {
    let viewer_input = resolve_input(input).await?;
    let backend = select_backend(viewer_input, &config.backend, default_progress()).await?;
    let header = probe_header(&backend).await?;

    info!(
        backend = backend.kind(),
        size = header.size,
        magic = header.magic,
        "Probed input"
    );

    Ok(ProbeReport {
        input: input.to_string(),
        backend: backend.kind(),
        size: header.size,
        magic: header.magic,
        version: header.version,
    })
}
