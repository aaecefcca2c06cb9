//! Branch resolution and one-time branch creation.

use tracing::{info, warn};

use crate::contract::ObjectStore;
use crate::error::StoreError;

/// A branch name resolved to its current tip.
///
/// The tip is `None` only when the branch could not be seeded because the
/// whole repository has no commits yet; the first publish then creates the
/// ref itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchState {
    pub name: String,
    pub tip_commit_id: Option<String>,
}

/// Resolve `branch` to its tip commit, creating the branch from the default
/// branch's tip when it does not exist yet.
///
/// A concurrent publisher may create the branch between our `get_ref` and
/// `create_ref`. Losing that race is not an error: the ref that won is
/// re-read and its tip treated as authoritative.
pub async fn ensure_branch<S>(store: &S, branch: &str) -> Result<BranchState, StoreError>
where
    S: ObjectStore,
{
    match store.get_ref(branch).await {
        Ok(tip) => {
            info!(branch, tip = %tip, "Branch exists, using its tip");
            Ok(BranchState {
                name: branch.to_string(),
                tip_commit_id: Some(tip),
            })
        }
        Err(StoreError::RefNotFound(_)) => {
            info!(branch, "Branch not found, bootstrapping from default branch");
            let Some(base_tip) = store.get_default_branch_tip().await? else {
                warn!(
                    branch,
                    "Repository has no commits; the first publish will create the branch"
                );
                return Ok(BranchState {
                    name: branch.to_string(),
                    tip_commit_id: None,
                });
            };
            match store.create_ref(branch, &base_tip).await {
                Ok(()) => {
                    info!(branch, tip = %base_tip, "Created branch from default branch tip");
                    Ok(BranchState {
                        name: branch.to_string(),
                        tip_commit_id: Some(base_tip),
                    })
                }
                Err(StoreError::RefAlreadyExists(_)) => {
                    // Lost the creation race; whoever won holds the tip.
                    let tip = store.get_ref(branch).await?;
                    info!(branch, tip = %tip, "Branch was created concurrently, using its tip");
                    Ok(BranchState {
                        name: branch.to_string(),
                        tip_commit_id: Some(tip),
                    })
                }
                Err(e) => Err(e),
            }
        }
        Err(e) => Err(e),
    }
}
