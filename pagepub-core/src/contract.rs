//! # contract: capability interface over a remote content-addressable store
//!
//! This module defines a single trait ([`ObjectStore`]) and the plain data
//! types the publish pipeline exchanges with it: blobs, trees, commits and
//! refs, addressed by opaque object ids.
//!
//! ## Interface & Extensibility
//! - Implement the [`ObjectStore`] trait to create new store clients (a
//!   hosted git data API, a local fixture, a mock).
//! - All methods are async network calls returning typed [`StoreError`]s.
//! - The trait is agnostic of authentication and transport details; the
//!   implementor owns those.
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall` so consumers can generate
//!   deterministic mocks for unit/integration tests.
//!
//! ## Layered trees
//! `create_tree` layers its entries on an optional base tree: the result
//! contains every path from the base except where an entry overrides it,
//! and paths not mentioned are carried forward unchanged. There is no
//! deletion primitive in this contract; an absent local file leaves the
//! remote path in place.

use std::path::PathBuf;

use async_trait::async_trait;

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

use crate::error::StoreError;

/// A regular file discovered under the local build root.
///
/// Immutable once produced by the walker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Path relative to the walked root, forward-slash separated regardless
    /// of host path conventions.
    pub relative_path: String,
    /// Absolute path on the local filesystem; read just before upload.
    pub absolute_path: PathBuf,
}

/// File mode recorded on a tree entry.
///
/// Every published entry is a regular file; the publisher never emits
/// executable or symlink modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
    Regular,
}

impl FileMode {
    /// The mode string the wire format expects.
    pub fn as_octal(&self) -> &'static str {
        match self {
            FileMode::Regular => "100644",
        }
    }
}

/// A file's uploaded blob, ready to be placed into a tree.
///
/// Created once per file per publish attempt; never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobRef {
    pub path: String,
    pub mode: FileMode,
    pub object_id: String,
}

/// Commit author identity. Opaque configuration as far as the publisher is
/// concerned.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CommitAuthor {
    pub name: String,
    pub email: String,
}

/// Request payload for a new commit.
pub struct NewCommit<'a> {
    /// The tree the commit points at.
    pub tree_id: &'a str,
    /// Zero or one parent ids; the publisher keeps history linear and never
    /// merges.
    pub parent_ids: &'a [String],
    pub message: &'a str,
    pub author: &'a CommitAuthor,
}

/// A commit as read back from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCommit {
    pub object_id: String,
    pub tree_id: String,
}

/// Capability interface over a remote content-addressable store with named
/// refs. Every method is a network call that may fail.
///
/// Implemented by real clients and by test mocks; the trait is `Send` +
/// `Sync` and intended for async/await usage.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store raw file bytes as a new blob, returning its object id.
    async fn create_blob(&self, bytes: &[u8]) -> Result<String, StoreError>;

    /// Create a tree from `entries`, layered on `base_tree_id` when present.
    ///
    /// The result tree contains every path from the base except where an
    /// entry specifies the same path, which overrides it; base paths not
    /// mentioned in `entries` are carried forward unchanged.
    async fn create_tree<'a>(
        &self,
        base_tree_id: Option<&'a str>,
        entries: &[BlobRef],
    ) -> Result<String, StoreError>;

    /// Create a commit object, returning its object id.
    async fn create_commit<'a>(&self, commit: NewCommit<'a>) -> Result<String, StoreError>;

    /// Read a commit back, primarily to resolve its tree id.
    async fn get_commit(&self, commit_id: &str) -> Result<RemoteCommit, StoreError>;

    /// Resolve a branch name to its tip commit id.
    ///
    /// Signals [`StoreError::RefNotFound`] when the branch does not exist.
    async fn get_ref(&self, branch: &str) -> Result<String, StoreError>;

    /// Create a branch ref pointing at `commit_id`.
    ///
    /// Fails with [`StoreError::RefAlreadyExists`] if a concurrent
    /// bootstrap raced ahead.
    async fn create_ref(&self, branch: &str, commit_id: &str) -> Result<(), StoreError>;

    /// Move a branch ref to `commit_id`. `force = true` overwrites
    /// unconditionally.
    async fn update_ref(
        &self,
        branch: &str,
        commit_id: &str,
        force: bool,
    ) -> Result<(), StoreError>;

    /// Tip of the repository's default branch, used only when
    /// bootstrapping. `None` when the repository has no commits at all.
    async fn get_default_branch_tip(&self) -> Result<Option<String>, StoreError>;
}
