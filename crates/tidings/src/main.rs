// SPDX-FileCopyrightText: 2026 Tidings Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tidings - a news-ingestion and enrichment pipeline.
//!
//! Per-source schedulers harvest RSS feeds, a SQLite-backed queue carries
//! newly-observed article ids, and the enrichment worker scrapes,
//! analyzes, embeds, and stores each article for semantic search.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod serve;
mod shutdown;

/// Tidings - a news-ingestion and enrichment pipeline.
#[derive(Parser, Debug)]
#[command(name = "tidings", version, about, long_about = None)]
struct Cli {
    /// Path to a config file (defaults to the XDG hierarchy).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the full pipeline: schedulers, dispatcher, admin surface.
    Serve,
    /// Load, validate, and print the resolved configuration.
    Config,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load(&cli) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::FAILURE;
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.pipeline.log_level.clone()));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    match cli.command {
        Commands::Serve => match serve::serve(config).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                tracing::error!(error = %e, "pipeline exited with error");
                ExitCode::FAILURE
            }
        },
        Commands::Config => {
            match serde_json::to_string_pretty(&config) {
                Ok(rendered) => println!("{rendered}"),
                Err(e) => {
                    eprintln!("failed to render config: {e}");
                    return ExitCode::FAILURE;
                }
            }
            ExitCode::SUCCESS
        }
    }
}

fn load(cli: &Cli) -> Result<tidings_config::TidingsConfig, String> {
    let config = match &cli.config {
        Some(path) => tidings_config::load_config_from_path(path),
        None => tidings_config::load_config(),
    }
    .map_err(|e| e.to_string())?;

    tidings_config::validate_config(&config).map_err(|errors| {
        let mut message = String::from("invalid configuration:");
        for error in errors {
            message.push_str(&format!("\n  - {error}"));
        }
        message
    })?;

    Ok(config)
}
