use std::fs::write;
use std::path::PathBuf;

use tempfile::NamedTempFile;

use pagepub::load_config::load_config;
use pagepub_core::config::PartialUploadPolicy;

#[test]
fn test_load_config_full() {
    let config_yaml = r#"
publish:
  local_root: ./dist
  branch: pages
  message: "Deploy site"
  max_concurrent_uploads: 4
  on_partial_upload: continue
author:
  name: Release Bot
  email: release-bot@example.com
"#;
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();

    let config = load_config(config_file.path()).expect("Config should load");

    assert_eq!(config.publish.local_root, PathBuf::from("./dist"));
    assert_eq!(config.publish.branch, "pages");
    assert_eq!(config.publish.message, "Deploy site");
    assert_eq!(config.publish.max_concurrent_uploads, 4);

    let publish_config = config.to_publish_config(None);
    assert_eq!(publish_config.branch, "pages");
    assert_eq!(
        publish_config.on_partial_upload,
        PartialUploadPolicy::Continue
    );
    assert_eq!(publish_config.author.name, "Release Bot");
    assert_eq!(publish_config.author.email, "release-bot@example.com");
}

#[test]
fn test_load_config_applies_defaults() {
    let config_yaml = "publish:\n  local_root: ./dist\n";
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();

    let config = load_config(config_file.path()).expect("Config should load");
    let publish_config = config.to_publish_config(None);

    assert_eq!(publish_config.branch, "gh-pages");
    assert_eq!(publish_config.message, "Publish built site");
    assert_eq!(publish_config.max_concurrent_uploads, 8);
    assert_eq!(publish_config.on_partial_upload, PartialUploadPolicy::Abort);
    assert_eq!(publish_config.author.name, "github-actions[bot]");
    assert_eq!(
        publish_config.author.email,
        "github-actions[bot]@users.noreply.github.com"
    );
}

#[test]
fn test_branch_override_wins_over_config_file() {
    let config_yaml = "publish:\n  local_root: ./dist\n  branch: pages\n";
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();

    let config = load_config(config_file.path()).expect("Config should load");
    let publish_config = config.to_publish_config(Some("preview".to_string()));

    assert_eq!(publish_config.branch, "preview");
}

#[test]
fn test_unknown_policy_string_falls_back_to_abort() {
    let config_yaml =
        "publish:\n  local_root: ./dist\n  on_partial_upload: shrug\n";
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();

    let config = load_config(config_file.path()).expect("Config should load");
    let publish_config = config.to_publish_config(None);

    assert_eq!(publish_config.on_partial_upload, PartialUploadPolicy::Abort);
}

#[test]
fn test_load_config_rejects_malformed_yaml() {
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), b"publish: [not: a, mapping").unwrap();

    let err = load_config(config_file.path()).expect_err("Malformed YAML must not load");

    assert!(
        err.to_string().contains("parse"),
        "Error should point at parsing: {err}"
    );
}

#[test]
fn test_load_config_rejects_missing_file() {
    let err = load_config("definitely-not-here.yaml").expect_err("Missing file must not load");

    assert!(
        err.to_string().contains("read"),
        "Error should point at reading: {err}"
    );
}
