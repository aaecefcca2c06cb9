//! Enumerates the regular files of a built site directory.

use std::path::Path;

use tracing::{info, warn};
use walkdir::WalkDir;

use crate::contract::FileEntry;
use crate::error::WalkError;

/// List every regular file under `root` as root-relative entries.
///
/// Directories and non-file entries are skipped, not erred. An unreadable
/// subdirectory is logged and skipped rather than failing the whole walk; a
/// missing or non-directory `root` is an error. Relative paths use forward
/// slashes regardless of host path conventions.
///
/// The traversal is iterative (an explicit worklist inside `walkdir`, no
/// recursion) and entries are sorted by file name per directory, so a
/// single walk yields a deterministic, finite sequence.
pub fn walk(root: &Path) -> Result<Vec<FileEntry>, WalkError> {
    if !root.exists() {
        return Err(WalkError::NotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(WalkError::NotADirectory(root.to_path_buf()));
    }

    let mut entries = Vec::new();
    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Skipping unreadable entry during walk");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        // walkdir only yields paths under the root it was given.
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let relative_path = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        entries.push(FileEntry {
            relative_path,
            absolute_path: entry.into_path(),
        });
    }

    info!(
        root = %root.display(),
        files = entries.len(),
        "Enumerated local build root"
    );
    Ok(entries)
}
