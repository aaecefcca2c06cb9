//! # pagepub CLI interface
//!
//! This module implements the CLI for pagepub: command parsing, argument
//! validation and the user-visible entrypoint.
//!
//! All publishing logic (data model, pipeline, store contract) lives in the
//! `pagepub-core` crate; this module is strictly CLI glue.
//!
//! ## Features
//! - Entry struct [`Cli`] defines all user-facing options and subcommands.
//! - Async entrypoint ([`run`]) for programmatic invocation and integration
//!   testing.
//! - Logging, tracing and structured error output at CLI level.
//!
//! ## How To Use
//! - For command-line users: run the installed `pagepub` binary with
//!   `--help`.
//! - For programmatic/integration use: call [`run`] with a constructed
//!   [`Cli`].

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::github::GitHubClient;
use crate::load_config::load_config;

/// CLI for pagepub: publish built site directories to a remote branch.
#[derive(Parser)]
#[clap(
    name = "pagepub",
    version,
    about = "Publish a built static site directory as the tip of a remote branch"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Publish the built directory described by the given config file
    Publish {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
        /// Local directory to publish, overriding the config file
        #[clap(long)]
        dir: Option<PathBuf>,
        /// Branch to publish to, overriding the config file
        #[clap(long)]
        branch: Option<String>,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Publish {
            config,
            dir,
            branch,
        } => {
            let loaded = load_config(&config)?;
            let local_root = dir.unwrap_or_else(|| loaded.publish.local_root.clone());
            let publish_config = loaded.to_publish_config(branch);
            publish_config.trace_loaded();

            let store = GitHubClient::new_from_env()
                .map_err(|e| anyhow::anyhow!("Failed to construct GitHub client: {e}"))?;

            tracing::info!(
                command = "publish",
                root = %local_root.display(),
                "Starting publish"
            );
            let result = pagepub_core::publish::publish(&publish_config, &store, &local_root).await;
            println!("{}", serde_json::to_string_pretty(&result)?);

            if !result.success {
                anyhow::bail!(
                    "publish failed: {}",
                    result
                        .failure_reason
                        .unwrap_or_else(|| "unknown reason".to_string())
                );
            }
            Ok(())
        }
    }
}
