use std::fs;

use tempfile::tempdir;

use pagepub_core::contract::{FileMode, MockObjectStore};
use pagepub_core::error::StoreError;
use pagepub_core::uploader::upload_all;
use pagepub_core::walker::walk;

#[tokio::test]
async fn upload_all_maps_every_file_to_a_blob_ref() {
    let root = tempdir().unwrap();
    fs::write(root.path().join("index.html"), "home").unwrap();
    fs::create_dir_all(root.path().join("assets")).unwrap();
    fs::write(root.path().join("assets/app.js"), "app").unwrap();
    let entries = walk(root.path()).unwrap();

    let mut store = MockObjectStore::new();
    store
        .expect_create_blob()
        .times(2)
        .returning(|bytes| Ok(format!("blob-{}", String::from_utf8_lossy(bytes))));

    let report = upload_all(&store, &entries, 8).await;

    assert!(report.failed.is_empty(), "No upload should fail");
    let mut uploaded: Vec<(String, String)> = report
        .uploaded
        .iter()
        .map(|b| (b.path.clone(), b.object_id.clone()))
        .collect();
    uploaded.sort();
    assert_eq!(
        uploaded,
        vec![
            ("assets/app.js".to_string(), "blob-app".to_string()),
            ("index.html".to_string(), "blob-home".to_string()),
        ],
        "Each file's bytes should be read from disk and mapped to its blob id"
    );
    assert!(
        report.uploaded.iter().all(|b| b.mode == FileMode::Regular),
        "Every entry is published as a regular file"
    );
}

#[tokio::test]
async fn upload_all_collects_per_file_failures_without_aborting() {
    let root = tempdir().unwrap();
    fs::write(root.path().join("good.txt"), "good").unwrap();
    fs::write(root.path().join("bad.txt"), "bad").unwrap();
    fs::write(root.path().join("fine.txt"), "fine").unwrap();
    let entries = walk(root.path()).unwrap();

    let mut store = MockObjectStore::new();
    store.expect_create_blob().times(3).returning(|bytes| {
        if bytes == b"bad" {
            Err(StoreError::Api {
                status: 502,
                message: "bad gateway".to_string(),
            })
        } else {
            Ok(format!("blob-{}", String::from_utf8_lossy(bytes)))
        }
    });

    let report = upload_all(&store, &entries, 8).await;

    assert_eq!(report.uploaded.len(), 2, "Healthy files must still upload");
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].path, "bad.txt");
    assert!(
        report.failed[0].reason.contains("502"),
        "The per-file reason should carry the store's rejection: {}",
        report.failed[0].reason
    );
}

#[tokio::test]
async fn upload_all_reports_unreadable_files_as_failures() {
    let root = tempdir().unwrap();
    fs::write(root.path().join("present.txt"), "present").unwrap();
    let mut entries = walk(root.path()).unwrap();
    // Simulate a file deleted between walk and upload.
    entries.push(pagepub_core::contract::FileEntry {
        relative_path: "vanished.txt".to_string(),
        absolute_path: root.path().join("vanished.txt"),
    });

    let mut store = MockObjectStore::new();
    store
        .expect_create_blob()
        .times(1)
        .returning(|_| Ok("blob-1".to_string()));

    let report = upload_all(&store, &entries, 8).await;

    assert_eq!(report.uploaded.len(), 1);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].path, "vanished.txt");
}

#[tokio::test]
async fn upload_all_treats_a_zero_bound_as_serial() {
    let root = tempdir().unwrap();
    fs::write(root.path().join("one.txt"), "one").unwrap();
    fs::write(root.path().join("two.txt"), "two").unwrap();
    let entries = walk(root.path()).unwrap();

    let mut store = MockObjectStore::new();
    store
        .expect_create_blob()
        .times(2)
        .returning(|bytes| Ok(format!("blob-{}", String::from_utf8_lossy(bytes))));

    let report = upload_all(&store, &entries, 0).await;

    assert_eq!(report.uploaded.len(), 2);
    assert!(report.failed.is_empty());
}
