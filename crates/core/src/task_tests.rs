// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for label lookup, file lists, and port flattening.

use super::*;

fn task_with(labels: &[(&str, &str)]) -> TaskSpec {
    let mut task = TaskSpec::new("task-1", "exec-1");
    for (k, v) in labels {
        task.labels.insert(k.to_string(), v.to_string());
    }
    task
}

#[test]
fn label_exact_match_wins() {
    let task = task_with(&[("requuid", "abc"), ("monitoring.requuid", "xyz")]);
    assert_eq!(task.label("requuid"), Some("abc"));
}

#[test]
fn label_dotted_suffix_match() {
    let task = task_with(&[("monitoring.requuid", "xyz")]);
    assert_eq!(task.label("requuid"), Some("xyz"));
}

#[test]
fn label_missing_is_none() {
    let task = task_with(&[]);
    assert_eq!(task.label("requuid"), None);
}

#[test]
fn manifest_files_splits_and_trims() {
    let task = task_with(&[("fileName", "a.yml, b.yml ,c.yml")]);
    let files = task.manifest_files().unwrap();
    assert_eq!(
        files,
        vec![PathBuf::from("a.yml"), PathBuf::from("b.yml"), PathBuf::from("c.yml")]
    );
}

#[test]
fn manifest_files_missing_label_errors() {
    let task = task_with(&[]);
    assert!(matches!(task.manifest_files(), Err(TaskError::MissingFileList)));
}

#[test]
fn manifest_files_empty_value_errors() {
    let task = task_with(&[("fileName", " , ")]);
    assert!(matches!(task.manifest_files(), Err(TaskError::EmptyFileList)));
}

#[test]
fn plugin_order_parses() {
    let task = task_with(&[("pluginorder", "general,metrics")]);
    assert_eq!(task.plugin_order(), Some(vec!["general".to_string(), "metrics".to_string()]));
    assert_eq!(task_with(&[]).plugin_order(), None);
}

#[test]
fn ports_flatten_ranges_in_order() {
    let mut task = task_with(&[]);
    task.port_ranges = vec![PortRange { begin: 30000, end: 30002 }, PortRange { begin: 40000, end: 40000 }];
    assert_eq!(task.ports(), vec![30000, 30001, 30002, 40000]);
}

#[test]
fn container_labels_exclude_control_and_config_keys() {
    let task = task_with(&[
        ("fileName", "a.yml"),
        ("pluginorder", "general"),
        ("config.launchtask.timeout", "1000"),
        ("requuid", "abc"),
        ("team", "payments"),
        ("tier", "gold"),
    ]);
    let labels = task.container_labels();
    assert_eq!(labels.len(), 2);
    assert_eq!(labels.get("team").map(String::as_str), Some("payments"));
    assert_eq!(labels.get("tier").map(String::as_str), Some("gold"));
}

#[test]
fn tags_default_to_empty() {
    let task = task_with(&[("tenant", "t1")]);
    let tags = task.tags();
    assert_eq!(tags.tenant, "t1");
    assert_eq!(tags.requuid, "");
}
