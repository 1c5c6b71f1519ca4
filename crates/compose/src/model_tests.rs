// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for parsing, validation, and materialization.

use super::*;
use crate::GENERATED_SUFFIX;
use indexmap::IndexMap;
use serde_yaml::Value;
use std::path::PathBuf;

fn write_manifest(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

const BASIC: &str = "version: '2.1'\nservices:\n  web:\n    image: nginx\n";

#[test]
fn parse_keeps_document_order() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_manifest(&dir, "a.yml", BASIC);
    let b = write_manifest(&dir, "b.yml", "services:\n  db:\n    image: postgres\n");
    let set = ManifestSet::parse(&[a.clone(), b.clone()]).unwrap();
    assert_eq!(set.files(), vec![a, b]);
    assert_eq!(set.all_services(), vec!["web".to_string(), "db".to_string()]);
}

#[test]
fn parse_rejects_non_mapping() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_manifest(&dir, "bad.yml", "- just\n- a\n- list\n");
    assert!(matches!(
        ManifestSet::parse(&[path]),
        Err(ManifestError::NotAMapping(_))
    ));
}

#[test]
fn parse_missing_file_errors() {
    assert!(matches!(
        ManifestSet::parse(&[PathBuf::from("/nonexistent/x.yml")]),
        Err(ManifestError::Read { .. })
    ));
}

#[test]
fn unknown_keys_survive_parse_and_serialize() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_manifest(
        &dir,
        "a.yml",
        "version: '2.2'\nx-custom: keepme\nservices:\n  web:\n    image: nginx\n    mem_limit: 256m\n    unknown_knob:\n      nested: true\n",
    );
    let mut set = ManifestSet::parse(&[path]).unwrap();
    let files = set.materialize().unwrap();
    let round: Value =
        serde_yaml::from_str(&std::fs::read_to_string(&files[0]).unwrap()).unwrap();
    assert_eq!(round.get("x-custom").and_then(Value::as_str), Some("keepme"));
    let web = &round["services"]["web"];
    assert_eq!(web.get("mem_limit").and_then(Value::as_str), Some("256m"));
    assert_eq!(
        web["unknown_knob"].get("nested").and_then(Value::as_bool),
        Some(true)
    );
}

#[test]
fn validate_accepts_basic_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_manifest(&dir, "a.yml", BASIC);
    let set = ManifestSet::parse(&[path]).unwrap();
    assert!(set.validate().is_ok());
}

#[test]
fn validate_rejects_missing_services() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_manifest(&dir, "a.yml", "version: '2.1'\n");
    let set = ManifestSet::parse(&[path]).unwrap();
    assert!(matches!(set.validate(), Err(ManifestError::Validation(_))));
}

#[test]
fn validate_rejects_scalar_service() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_manifest(&dir, "a.yml", "services:\n  web: nope\n");
    let set = ManifestSet::parse(&[path]).unwrap();
    assert!(matches!(set.validate(), Err(ManifestError::Validation(_))));
}

#[test]
fn materialize_appends_suffix_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_manifest(&dir, "a.yml", BASIC);
    let mut set = ManifestSet::parse(&[path.clone()]).unwrap();
    let files = set.materialize().unwrap();
    assert_eq!(files.len(), 1);
    let generated = files[0].to_string_lossy().to_string();
    assert!(generated.ends_with(GENERATED_SUFFIX));
    assert!(files[0].exists());

    // a second pass rewrites in place without stacking suffixes
    let again = set.materialize().unwrap();
    assert_eq!(again, files);
}

#[test]
fn materialize_drops_removed_infra_document() {
    let dir = tempfile::tempdir().unwrap();
    let app = write_manifest(&dir, "app.yml", BASIC);
    let infra = write_manifest(
        &dir,
        INFRA_FILE,
        "services:\n  networkproxy:\n    image: busybox\n",
    );
    let mut set = ManifestSet::parse(&[app, infra.clone()]).unwrap();
    set.set_infra_file(infra.clone());
    set.set_infra_removed(true);
    let files = set.materialize().unwrap();
    assert_eq!(files.len(), 1);
    assert!(set.infra_file().is_none());
    assert!(!files[0].to_string_lossy().contains(INFRA_FILE));
}

#[test]
fn trace_dump_writes_snapshots() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_manifest(&dir, "a.yml", BASIC);
    let set = ManifestSet::parse(&[path]).unwrap();
    set.trace_dump(dir.path(), "general", 0);
    let snapshot = dir.path().join(TRACE_FOLDER).join("a.yml-general-0.yml");
    assert!(snapshot.exists());
}

#[test]
fn from_serialized_detail_label() {
    let set = ManifestSet::from_serialized(
        "a.yml:\n  services:\n    w:\n      image: busybox\n",
    )
    .unwrap();
    assert_eq!(set.files(), vec![PathBuf::from("a.yml")]);
    assert_eq!(set.all_services(), vec!["w".to_string()]);
}

#[test]
fn from_serialized_rejects_non_mapping() {
    assert!(matches!(
        ManifestSet::from_serialized("- a\n"),
        Err(ManifestError::NotAMapping(_))
    ));
}

#[test]
fn from_documents_builds_set() {
    let mut docs = IndexMap::new();
    docs.insert(
        PathBuf::from("mem.yml"),
        serde_yaml::from_str("services:\n  w:\n    image: busybox\n").unwrap(),
    );
    let set = ManifestSet::from_documents(docs);
    assert_eq!(set.all_services(), vec!["w".to_string()]);
}
