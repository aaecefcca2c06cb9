use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::contract::CommitAuthor;

/// How a publish reacts when some of its file uploads fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartialUploadPolicy {
    /// Fail the publish before any tree is built; the remote branch is left
    /// untouched.
    Abort,
    /// Publish whatever uploaded successfully; the gaps are reported in the
    /// result, never hidden.
    Continue,
}

impl From<&str> for PartialUploadPolicy {
    fn from(s: &str) -> Self {
        match s {
            "abort" | "Abort" => PartialUploadPolicy::Abort,
            "continue" | "Continue" => PartialUploadPolicy::Continue,
            other => {
                warn!(
                    policy = other,
                    "Unknown partial upload policy, defaulting to Abort"
                );
                PartialUploadPolicy::Abort
            }
        }
    }
}

/// Publish destination, identity and tuning knobs.
///
/// All values are opaque to the pipeline: the branch and author are passed
/// through to the store, never interpreted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    /// Branch the built site is published to.
    pub branch: String,
    /// Commit message recorded on every published commit.
    pub message: String,
    /// Author identity recorded on every published commit.
    pub author: CommitAuthor,
    /// Upper bound on concurrently in-flight blob uploads.
    pub max_concurrent_uploads: usize,
    /// Reaction to per-file upload failures.
    pub on_partial_upload: PartialUploadPolicy,
}

impl Default for PublishConfig {
    fn default() -> Self {
        PublishConfig {
            branch: "gh-pages".to_string(),
            message: "Publish built site".to_string(),
            author: CommitAuthor {
                name: "github-actions[bot]".to_string(),
                email: "github-actions[bot]@users.noreply.github.com".to_string(),
            },
            max_concurrent_uploads: 8,
            on_partial_upload: PartialUploadPolicy::Abort,
        }
    }
}

impl PublishConfig {
    pub fn trace_loaded(&self) {
        info!(
            branch = %self.branch,
            max_concurrent_uploads = self.max_concurrent_uploads,
            "Loaded PublishConfig"
        );
        debug!(?self, "PublishConfig loaded (full debug)");
    }
}
