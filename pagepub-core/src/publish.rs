//! High-level pipeline: walk → bootstrap → upload → tree → commit → ref update.
//!
//! This module provides the top-level orchestration for publishing a locally
//! built directory as the new tip of a remote branch. It implements a
//! coordinated pipeline that:
//!   - Enumerates every regular file under the local build root
//!   - Resolves (or bootstraps) the target branch's current tip
//!   - Uploads file contents as blobs, concurrently and bounded
//!   - Builds a tree layered on the branch's current tree
//!   - Creates a commit whose sole parent is the observed tip
//!   - Force-updates the branch ref to the new commit
//!
//! # Major Types
//! - [`PublishResult`]: outcome report for one publish attempt
//!
//! # Responsibilities
//! - One logical task per publish invocation; only the blob upload step
//!   fans out, and no later step starts before it fully resolves
//! - Never raises past its own boundary: every failure is folded into the
//!   returned [`PublishResult`]
//! - No rollback on failure: blobs, trees and commits already written but
//!   never referenced by a branch are harmless, garbage-collectable orphans
//!
//! # Shared state
//! The branch ref is the only externally mutable resource. It is written
//! last-writer-wins via a forced update; two publishers racing on one
//! branch leave the loser's commit stored but unreferenced. Single
//! publisher per branch is the assumed deployment model.
//!
//! # Cancellation
//! Dropping the returned future cancels at the next store call. The ref
//! update is the final step, so a publish cancelled before it leaves the
//! remote branch untouched.
//!
//! # Navigation
//! - Main entrypoint: [`publish`]

use std::path::Path;

use tracing::{debug, error, info, warn};

use crate::bootstrap;
use crate::config::{PartialUploadPolicy, PublishConfig};
use crate::contract::{NewCommit, ObjectStore};
use crate::error::{PublishError, StoreError};
use crate::uploader;
use crate::walker;

/// Outcome of one publish attempt. Failures are reported here, never
/// raised.
#[derive(Debug, serde::Serialize)]
pub struct PublishResult {
    pub success: bool,
    pub new_commit_id: Option<String>,
    pub files_walked: usize,
    pub files_uploaded: usize,
    /// Relative paths that failed to upload; empty on a full batch.
    pub failed_paths: Vec<String>,
    pub failure_reason: Option<String>,
}

impl PublishResult {
    fn failed(
        files_walked: usize,
        files_uploaded: usize,
        failed_paths: Vec<String>,
        reason: &PublishError,
    ) -> Self {
        PublishResult {
            success: false,
            new_commit_id: None,
            files_walked,
            files_uploaded,
            failed_paths,
            failure_reason: Some(reason.to_string()),
        }
    }
}

/// Publish the contents of `local_root` as the new tip of the configured
/// branch.
///
/// The directory is only read, never written. An empty directory is not an
/// error; it produces a commit whose tree carries the base tree forward
/// unchanged. Files present in the branch's current tree but absent
/// locally are carried forward, not deleted.
pub async fn publish<S>(config: &PublishConfig, store: &S, local_root: &Path) -> PublishResult
where
    S: ObjectStore,
{
    info!(
        root = %local_root.display(),
        branch = %config.branch,
        "[PUBLISH] Starting publish pipeline"
    );

    // --- Walking ---
    let entries = match walker::walk(local_root) {
        Ok(entries) => entries,
        Err(e) => {
            error!(error = %e, "[PUBLISH][ERROR] Walking local root failed");
            return PublishResult::failed(0, 0, Vec::new(), &PublishError::Walk(e));
        }
    };
    let files_walked = entries.len();

    // --- Bootstrapping ---
    let branch_state = match bootstrap::ensure_branch(store, &config.branch).await {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "[PUBLISH][ERROR] Branch bootstrap failed");
            let e = PublishError::store("bootstrapping branch", e);
            return PublishResult::failed(files_walked, 0, Vec::new(), &e);
        }
    };

    // --- Uploading ---
    let report = uploader::upload_all(store, &entries, config.max_concurrent_uploads).await;
    let files_uploaded = report.uploaded.len();
    let failed_paths: Vec<String> = report.failed.iter().map(|f| f.path.clone()).collect();
    if !failed_paths.is_empty() {
        match config.on_partial_upload {
            PartialUploadPolicy::Abort => {
                let e = PublishError::PartialUpload {
                    walked: files_walked,
                    failed: failed_paths.len(),
                };
                error!(
                    failed = failed_paths.len(),
                    walked = files_walked,
                    "[PUBLISH][ERROR] Aborting publish on partial upload; branch left untouched"
                );
                return PublishResult::failed(files_walked, files_uploaded, failed_paths, &e);
            }
            PartialUploadPolicy::Continue => {
                warn!(
                    failed = failed_paths.len(),
                    walked = files_walked,
                    "[PUBLISH] Continuing with a partial batch; failed paths are reported"
                );
            }
        }
    }

    // --- TreeBuilding ---
    let base_tree_id = match &branch_state.tip_commit_id {
        Some(tip) => match store.get_commit(tip).await {
            Ok(commit) => Some(commit.tree_id),
            Err(e) => {
                error!(error = %e, tip = %tip, "[PUBLISH][ERROR] Resolving base tree failed");
                let e = PublishError::store("resolving base tree", e);
                return PublishResult::failed(files_walked, files_uploaded, failed_paths, &e);
            }
        },
        None => None,
    };

    // Stable tree payload: unchanged content yields an identical request.
    let mut blobs = report.uploaded;
    blobs.sort_by(|a, b| a.path.cmp(&b.path));

    let tree_id = match store.create_tree(base_tree_id.as_deref(), &blobs).await {
        Ok(tree_id) => {
            info!(tree_id = %tree_id, entries = blobs.len(), "[PUBLISH] Tree created");
            tree_id
        }
        Err(e) => {
            error!(error = %e, "[PUBLISH][ERROR] Tree creation failed");
            let e = PublishError::store("creating tree", e);
            return PublishResult::failed(files_walked, files_uploaded, failed_paths, &e);
        }
    };

    // --- Committing ---
    // The parent is exactly the tip observed at bootstrap; a stale tip is
    // never silently substituted.
    let parent_ids: Vec<String> = branch_state.tip_commit_id.iter().cloned().collect();
    let new_commit = NewCommit {
        tree_id: &tree_id,
        parent_ids: &parent_ids,
        message: &config.message,
        author: &config.author,
    };
    let commit_id = match store.create_commit(new_commit).await {
        Ok(commit_id) => {
            info!(commit_id = %commit_id, "[PUBLISH] Commit created");
            commit_id
        }
        Err(e) => {
            error!(error = %e, "[PUBLISH][ERROR] Commit creation failed");
            let e = PublishError::store("creating commit", e);
            return PublishResult::failed(files_walked, files_uploaded, failed_paths, &e);
        }
    };

    // --- RefUpdating ---
    if let Err(e) = point_branch(store, &branch_state, &commit_id).await {
        error!(error = %e, "[PUBLISH][ERROR] Ref update failed");
        let e = PublishError::store("updating ref", e);
        return PublishResult::failed(files_walked, files_uploaded, failed_paths, &e);
    }

    // --- Done ---
    let result = PublishResult {
        success: true,
        new_commit_id: Some(commit_id),
        files_walked,
        files_uploaded,
        failed_paths,
        failure_reason: None,
    };
    info!(
        commit_id = result.new_commit_id.as_deref().unwrap_or(""),
        files_walked = result.files_walked,
        files_uploaded = result.files_uploaded,
        "[PUBLISH] Publish complete"
    );
    match serde_json::to_string_pretty(&result) {
        Ok(json) => debug!(json = %json, "[PUBLISH][DEBUG] Publish result as JSON"),
        Err(e) => error!(error = ?e, "[PUBLISH][DEBUG] Failed to serialize publish result"),
    }
    result
}

/// Point the branch ref at the new commit.
///
/// An existing branch is force-updated. A branch that could not be
/// bootstrapped (empty repository) is created here instead; losing a
/// creation race at this point falls back to the forced update.
async fn point_branch<S>(
    store: &S,
    branch_state: &bootstrap::BranchState,
    commit_id: &str,
) -> Result<(), StoreError>
where
    S: ObjectStore,
{
    if branch_state.tip_commit_id.is_some() {
        store.update_ref(&branch_state.name, commit_id, true).await
    } else {
        match store.create_ref(&branch_state.name, commit_id).await {
            Ok(()) => Ok(()),
            Err(StoreError::RefAlreadyExists(_)) => {
                warn!(
                    branch = %branch_state.name,
                    "Branch appeared concurrently, forcing ref update"
                );
                store.update_ref(&branch_state.name, commit_id, true).await
            }
            Err(e) => Err(e),
        }
    }
}
