//! Concurrent upload of walked files as remote blobs.

use futures::stream::{self, StreamExt};
use tracing::{debug, error, info};

use crate::contract::{BlobRef, FileEntry, FileMode, ObjectStore};

/// A file that could not be uploaded, with the reason it failed.
#[derive(Debug)]
pub struct FailedUpload {
    pub path: String,
    pub reason: String,
}

/// Outcome of uploading one batch of files.
///
/// The uploader never decides whether a partial batch is acceptable; both
/// halves are handed to the caller.
#[derive(Debug, Default)]
pub struct UploadReport {
    pub uploaded: Vec<BlobRef>,
    pub failed: Vec<FailedUpload>,
}

/// Upload every entry as a blob, with at most `max_in_flight` uploads in
/// flight at once.
///
/// File bytes are read immediately before each upload. A per-file failure
/// does not abort the batch: the file lands in `failed` and the rest keep
/// going. Completion order between files is unspecified; the report is
/// complete once this returns.
pub async fn upload_all<S>(store: &S, entries: &[FileEntry], max_in_flight: usize) -> UploadReport
where
    S: ObjectStore,
{
    let max_in_flight = max_in_flight.max(1);
    debug!(
        files = entries.len(),
        max_in_flight, "Starting blob upload batch"
    );

    let results: Vec<Result<BlobRef, FailedUpload>> = stream::iter(entries.iter())
        .map(|entry| async move {
            upload_one(store, entry).await.map_err(|reason| FailedUpload {
                path: entry.relative_path.clone(),
                reason,
            })
        })
        .buffer_unordered(max_in_flight)
        .collect()
        .await;

    let mut report = UploadReport::default();
    for result in results {
        match result {
            Ok(blob) => report.uploaded.push(blob),
            Err(failed) => {
                error!(path = %failed.path, reason = %failed.reason, "Blob upload failed");
                report.failed.push(failed);
            }
        }
    }

    info!(
        uploaded = report.uploaded.len(),
        failed = report.failed.len(),
        "Blob upload batch complete"
    );
    report
}

async fn upload_one<S>(store: &S, entry: &FileEntry) -> Result<BlobRef, String>
where
    S: ObjectStore,
{
    let bytes = tokio::fs::read(&entry.absolute_path)
        .await
        .map_err(|e| format!("reading {}: {e}", entry.absolute_path.display()))?;
    let object_id = store
        .create_blob(&bytes)
        .await
        .map_err(|e| e.to_string())?;
    debug!(path = %entry.relative_path, object_id = %object_id, "Uploaded blob");
    Ok(BlobRef {
        path: entry.relative_path.clone(),
        mode: FileMode::Regular,
        object_id,
    })
}
