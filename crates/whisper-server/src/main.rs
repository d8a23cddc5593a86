//! # whisper-server
//!
//! Whisper tool server binary: loads settings, initializes logging, builds
//! the tool router, and serves JSON-RPC over stdin/stdout.

#![deny(unsafe_code)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::BufReader;
use tracing::info;
use whisper_core::logging::init_subscriber;
use whisper_server::{RpcServer, serve};
use whisper_settings::{load_settings, load_settings_from_path, settings_path};
use whisper_tools::ToolRouter;

/// Audio transcription, chat, conversion and speech tools over stdio.
#[derive(Parser, Debug)]
#[command(name = "whisper-server", version, about = "Whisper audio tool server (stdio JSON-RPC)")]
struct Cli {
    /// Settings file (defaults to `~/.whisper-mcp/settings.json`).
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Log level or filter directive (overrides settings).
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = match &cli.settings {
        Some(path) => load_settings_from_path(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => load_settings()
            .with_context(|| format!("Failed to load settings from {}", settings_path().display()))?,
    };

    let level = cli.log_level.as_deref().unwrap_or(&settings.logging.level);
    init_subscriber(level);

    let router = ToolRouter::from_settings(&settings).context("Failed to build tool router")?;
    info!(
        tools = router.registry().len(),
        base_dir = ?settings.files.base_dir,
        output_dir = %settings.files.effective_output_dir().display(),
        "whisper server ready on stdio"
    );

    let server = Arc::new(RpcServer::new(router));
    serve(server, BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await
        .context("stdio transport failed")?;

    info!("whisper server stopped");
    Ok(())
}
