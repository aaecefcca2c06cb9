//! `load_config` module: loads and adapts a static YAML config into the
//! internal publish configuration.
//!
//! This module is the only place where untrusted YAML is parsed and mapped
//! to the strongly-typed core structs.
//!
//! # Responsibilities
//! - Parse user-supplied YAML configuration files into type-safe structs
//! - Map loosely-typed YAML keys (e.g. the partial upload policy string) to
//!   enums and rich types
//! - Apply defaults for everything the file leaves out: target branch,
//!   commit message, author identity, upload bound
//! - Ensure robust error messages for CLI and tests: any failure in loading
//!   must result in clear diagnostics
//!
//! Secrets never live in the file; `GITHUB_TOKEN` and `GITHUB_REPOSITORY`
//! come from the environment when the store client is constructed.
//!
//! # Errors
//! All errors in this module use `anyhow::Error` for context-rich
//! diagnostics, surfaced at the CLI boundary.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Deserialize;
use tracing::{error, info};

use pagepub_core::config::{PartialUploadPolicy, PublishConfig};
use pagepub_core::contract::CommitAuthor;

#[derive(Debug, Deserialize)]
pub struct CliConfig {
    pub publish: PublishSection,
    #[serde(default)]
    pub author: Option<AuthorSection>,
}

#[derive(Debug, Deserialize)]
pub struct PublishSection {
    /// Directory holding the already-built site.
    pub local_root: PathBuf,
    #[serde(default = "default_branch")]
    pub branch: String,
    #[serde(default = "default_message")]
    pub message: String,
    #[serde(default = "default_max_concurrent_uploads")]
    pub max_concurrent_uploads: usize,
    #[serde(default)]
    pub on_partial_upload: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AuthorSection {
    pub name: String,
    pub email: String,
}

fn default_branch() -> String {
    "gh-pages".to_string()
}

fn default_message() -> String {
    "Publish built site".to_string()
}

fn default_max_concurrent_uploads() -> usize {
    8
}

/// Loads a static YAML config file (no secrets) for use by the CLI.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CliConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let config: CliConfig = match serde_yaml::from_str(&config_content) {
        Ok(config) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            config
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    Ok(config)
}

impl CliConfig {
    /// Map the parsed file onto the core publish configuration, with an
    /// optional branch override from the command line.
    pub fn to_publish_config(&self, branch_override: Option<String>) -> PublishConfig {
        let defaults = PublishConfig::default();
        PublishConfig {
            branch: branch_override.unwrap_or_else(|| self.publish.branch.clone()),
            message: self.publish.message.clone(),
            author: self
                .author
                .as_ref()
                .map(|author| CommitAuthor {
                    name: author.name.clone(),
                    email: author.email.clone(),
                })
                .unwrap_or(defaults.author),
            max_concurrent_uploads: self.publish.max_concurrent_uploads,
            on_partial_upload: self
                .publish
                .on_partial_upload
                .as_deref()
                .map(PartialUploadPolicy::from)
                .unwrap_or(defaults.on_partial_upload),
        }
    }
}
