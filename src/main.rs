//! well-schematic - Well structure schematic orchestrator
//!
//! Stages well data for the external plotting tool, supervises it, and
//! archives its outputs into timestamped folders.
//!
//! # Usage
//!
//! ```bash
//! # One run, well data from a file, result JSON on stdout
//! well-schematic generate --input well.json --format path
//!
//! # Well data from stdin
//! cat well.json | well-schematic generate
//!
//! # HTTP server
//! well-schematic serve --addr 0.0.0.0:8090
//!
//! # List archived runs
//! well-schematic archives
//! ```
//!
//! # Environment Variables
//!
//! - `WELL_SCHEMATIC_CONFIG`: Path to the TOML config file
//! - `WELL_SCHEMATIC_CORS_ORIGINS`: Comma-separated origins allowed by CORS
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::info;

use well_schematic::api::{create_app, ApiState};
use well_schematic::config::ConfigError;
use well_schematic::pipeline::{archive, cleanup, failure_result, Orchestrator, PipelineError};
use well_schematic::{OrchestratorConfig, OutputFormat, RunResult};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "well-schematic")]
#[command(about = "Well structure schematic orchestrator")]
#[command(version)]
struct CliArgs {
    /// Path to the TOML config file (skips the default search)
    #[arg(long, global = true, env = "WELL_SCHEMATIC_CONFIG")]
    config: Option<PathBuf>,

    /// Override the workspace directory from the config
    #[arg(long, global = true)]
    workspace: Option<PathBuf>,

    #[command(subcommand)]
    command: SubCommand,
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Generate one schematic and print the result JSON
    Generate {
        /// Well data JSON file, or `-` for stdin
        #[arg(long, default_value = "-")]
        input: String,
        /// `base64` embeds the image in the result, `path` only returns its location
        #[arg(long, default_value = "base64")]
        format: OutputFormat,
    },

    /// Serve the HTTP API
    Serve {
        /// Override the bind address from the config
        #[arg(short, long)]
        addr: Option<String>,
    },

    /// List archive folders, newest first
    Archives,

    /// Remove transient staging files left by an interrupted run
    Cleanup,
}

// ============================================================================
// Configuration
// ============================================================================

fn resolve_config(args: &CliArgs) -> Result<OrchestratorConfig> {
    let mut config = match &args.config {
        Some(path) => OrchestratorConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => OrchestratorConfig::load(),
    };

    if let Some(dir) = &args.workspace {
        config.workspace.dir.clone_from(dir);
    }

    match config.validate() {
        Ok(()) => Ok(config),
        Err(ConfigError::Validation(errors)) => {
            bail!("Invalid configuration:\n  - {}", errors.join("\n  - "))
        }
        Err(e) => Err(e.into()),
    }
}

// ============================================================================
// Subcommands
// ============================================================================

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read well data from stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(input).with_context(|| format!("Failed to read {input}"))
    }
}

async fn run_generate(config: OrchestratorConfig, input: &str, format: OutputFormat) -> Result<ExitCode> {
    let text = read_input(input)?;

    let result = match serde_json::from_str::<serde_json::Value>(&text) {
        Ok(well_data) => Orchestrator::new(config).generate(&well_data, format).await,
        Err(e) => failure_result(&PipelineError::Validation(vec![format!(
            "input is not valid JSON: {e}"
        )])),
    };

    println!(
        "{}",
        serde_json::to_string_pretty(&result).context("Failed to serialize result")?
    );

    Ok(match result {
        RunResult::Success(_) => ExitCode::SUCCESS,
        RunResult::Failure(_) => ExitCode::FAILURE,
    })
}

async fn run_server(config: OrchestratorConfig, addr: Option<String>) -> Result<()> {
    let addr = addr.unwrap_or_else(|| config.server.addr.clone());
    let workspace = config.workspace_dir().to_path_buf();
    let app = create_app(ApiState::new(config));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;
    info!(addr = %addr, workspace = %workspace.display(), "HTTP server listening");

    let cancel_token = CancellationToken::new();
    let shutdown = cancel_token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl-C, shutting down");
            cancel_token.cancel();
        }
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .context("HTTP server error")?;

    info!("HTTP server stopped");
    Ok(())
}

// ============================================================================
// Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Logs go to stderr; stdout carries result JSON.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();
    let config = resolve_config(&args)?;

    match args.command {
        SubCommand::Generate { input, format } => run_generate(config, &input, format).await,
        SubCommand::Serve { addr } => {
            run_server(config, addr).await?;
            Ok(ExitCode::SUCCESS)
        }
        SubCommand::Archives => {
            for name in archive::list_archives(&config)? {
                println!("{name}");
            }
            Ok(ExitCode::SUCCESS)
        }
        SubCommand::Cleanup => {
            cleanup::cleanup_transient_files(&config);
            Ok(ExitCode::SUCCESS)
        }
    }
}
