// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the rewrite invariants.

use super::*;
use crate::model::{ManifestSet, SinglePort};
use indexmap::IndexMap;
use serde_yaml::Value;
use std::path::{Path, PathBuf};
use yare::parameterized;

fn set_from(docs: &[(&str, &str)]) -> ManifestSet {
    let mut map = IndexMap::new();
    for (name, yaml) in docs {
        map.insert(PathBuf::from(name), serde_yaml::from_str(yaml).unwrap());
    }
    ManifestSet::from_documents(map)
}

fn spec() -> RewriteSpec {
    RewriteSpec {
        task_id: "t100".to_string(),
        executor_id: "exec-1".to_string(),
        cgroup_root: "workdir".to_string(),
        assigned_ports: vec![30000, 30001, 30002],
        infra_service: "networkproxy".to_string(),
        folder_name: "pod_data".to_string(),
        extra_labels: IndexMap::new(),
    }
}

fn service<'a>(set: &'a ManifestSet, file: &str, name: &str) -> &'a Value {
    &set.document(Path::new(file)).unwrap()["services"][name]
}

const INFRA_DOC: &str = "services:\n  networkproxy:\n    container_name: networkproxy\n    image: busybox\n";

#[test]
fn non_infra_services_join_infra_namespace() {
    let mut set = set_from(&[
        ("a.yml", "services:\n  web:\n    image: nginx\n"),
        ("infra.yml", INFRA_DOC),
    ]);
    let outcome = rewrite(&mut set, &spec()).unwrap();
    assert!(outcome.infra_required);
    let web = service(&set, "a.yml", "web");
    assert_eq!(
        web["network_mode"].as_str(),
        Some("service:networkproxy")
    );
    // the infra service itself never points at itself
    let infra = service(&set, "infra.yml", "networkproxy");
    assert!(infra.get("network_mode").is_none());
}

#[parameterized(
    host = { "host" },
    none = { "none" },
)]
fn declared_host_or_none_mode_is_kept_and_drops_infra(mode: &str) {
    let doc = format!("services:\n  web:\n    image: nginx\n    network_mode: {mode}\n");
    let mut set = set_from(&[("a.yml", &doc), ("infra.yml", INFRA_DOC)]);
    let outcome = rewrite(&mut set, &spec()).unwrap();
    assert!(!outcome.infra_required);
    assert!(set.infra_removed());
    assert_eq!(service(&set, "a.yml", "web")["network_mode"].as_str(), Some(mode));
    // the infra service is no longer expected
    assert!(!outcome.service_names.contains_key("networkproxy"));
    assert!(outcome.infra_container_name.is_none());
}

#[test]
fn restart_and_links_are_stripped() {
    let mut set = set_from(&[(
        "a.yml",
        "services:\n  web:\n    image: nginx\n    restart: always\n    links:\n      - db\n  db:\n    image: postgres\n",
    )]);
    rewrite(&mut set, &spec()).unwrap();
    let web = service(&set, "a.yml", "web");
    assert!(web.get("restart").is_none());
    assert!(web.get("links").is_none());
}

#[test]
fn every_service_is_tagged_with_task_and_executor() {
    let mut set = set_from(&[(
        "a.yml",
        "services:\n  web:\n    image: nginx\n    labels:\n      team: payments\n  worker:\n    image: app\n    labels:\n      - color=blue\n  plain:\n    image: app\n",
    )]);
    rewrite(&mut set, &spec()).unwrap();

    let web = service(&set, "a.yml", "web");
    assert_eq!(web["labels"]["taskId"].as_str(), Some("t100"));
    assert_eq!(web["labels"]["executorId"].as_str(), Some("exec-1"));
    assert_eq!(web["labels"]["team"].as_str(), Some("payments"));

    let worker_labels = service(&set, "a.yml", "worker")["labels"]
        .as_sequence()
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .map(String::from)
        .collect::<Vec<_>>();
    assert!(worker_labels.contains(&"color=blue".to_string()));
    assert!(worker_labels.contains(&"taskId=t100".to_string()));
    assert!(worker_labels.contains(&"executorId=exec-1".to_string()));

    let plain = service(&set, "a.yml", "plain");
    assert_eq!(plain["labels"]["taskId"].as_str(), Some("t100"));
}

#[test]
fn user_labels_propagate_to_all_services() {
    let mut rw = spec();
    rw.extra_labels.insert("tier".to_string(), "gold".to_string());
    let mut set = set_from(&[("a.yml", "services:\n  web:\n    image: nginx\n")]);
    rewrite(&mut set, &rw).unwrap();
    assert_eq!(service(&set, "a.yml", "web")["labels"]["tier"].as_str(), Some("gold"));
}

#[test]
fn mapped_ports_consume_assigned_range_in_order() {
    let mut set = set_from(&[(
        "a.yml",
        "services:\n  web:\n    image: nginx\n    ports:\n      - \"8080:80\"\n      - \"8443:443\"\n  db:\n    image: postgres\n    ports:\n      - \"5432:5432\"\n",
    )]);
    let outcome = rewrite(&mut set, &spec()).unwrap();
    assert_eq!(outcome.ports_consumed, 3);

    let web_ports: Vec<&str> = service(&set, "a.yml", "web")["ports"]
        .as_sequence()
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert_eq!(web_ports, vec!["30000:80", "30001:443"]);
    let db_ports: Vec<&str> = service(&set, "a.yml", "db")["ports"]
        .as_sequence()
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert_eq!(db_ports, vec!["30002:5432"]);
}

#[test]
fn exhausted_port_range_is_an_error() {
    let mut rw = spec();
    rw.assigned_ports = vec![30000];
    let mut set = set_from(&[(
        "a.yml",
        "services:\n  web:\n    image: nginx\n    ports:\n      - \"8080:80\"\n      - \"8443:443\"\n",
    )]);
    assert!(matches!(
        rewrite(&mut set, &rw),
        Err(ManifestError::PortsExhausted { .. })
    ));
}

#[test]
fn single_ports_are_recorded_not_assigned() {
    let mut set = set_from(&[(
        "a.yml",
        "services:\n  web:\n    image: nginx\n    ports:\n      - \"80\"\n      - 9090\n",
    )]);
    let outcome = rewrite(&mut set, &spec()).unwrap();
    assert_eq!(outcome.ports_consumed, 0);
    assert_eq!(
        set.single_ports(),
        &[
            SinglePort { service: "web".to_string(), container_port: "80".to_string() },
            SinglePort { service: "web".to_string(), container_port: "9090".to_string() },
        ]
    );
}

#[test]
fn host_mode_services_keep_ports_verbatim() {
    let mut set = set_from(&[(
        "a.yml",
        "services:\n  web:\n    image: nginx\n    network_mode: host\n    ports:\n      - \"8080:80\"\n",
    )]);
    let outcome = rewrite(&mut set, &spec()).unwrap();
    assert_eq!(outcome.ports_consumed, 0);
    let ports: Vec<&str> = service(&set, "a.yml", "web")["ports"]
        .as_sequence()
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert_eq!(ports, vec!["8080:80"]);
}

#[test]
fn extra_hosts_hoist_onto_infra_and_dedup() {
    let mut set = set_from(&[
        (
            "a.yml",
            "services:\n  web:\n    image: nginx\n    extra_hosts:\n      - \"db:10.0.0.2\"\n      - \"cache:10.0.0.3\"\n  worker:\n    image: app\n    extra_hosts:\n      - \"db:10.0.0.2\"\n",
        ),
        ("infra.yml", INFRA_DOC),
    ]);
    rewrite(&mut set, &spec()).unwrap();

    assert!(service(&set, "a.yml", "web").get("extra_hosts").is_none());
    assert!(service(&set, "a.yml", "worker").get("extra_hosts").is_none());
    let infra_hosts: Vec<&str> = service(&set, "infra.yml", "networkproxy")["extra_hosts"]
        .as_sequence()
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert_eq!(infra_hosts, vec!["db:10.0.0.2", "cache:10.0.0.3"]);
}

#[test]
fn container_names_are_prefixed_with_task_id() {
    let mut set = set_from(&[
        (
            "a.yml",
            "services:\n  web:\n    image: nginx\n    container_name: webapp\n  bare:\n    image: app\n",
        ),
        ("infra.yml", INFRA_DOC),
    ]);
    let outcome = rewrite(&mut set, &spec()).unwrap();

    assert_eq!(
        service(&set, "a.yml", "web")["container_name"].as_str(),
        Some("t100_webapp")
    );
    assert_eq!(outcome.service_names.get("web").map(String::as_str), Some("t100_webapp"));
    // no declared name: the engine-style fallback, folder separators removed
    assert_eq!(outcome.service_names.get("bare").map(String::as_str), Some("poddata_bare"));
    assert_eq!(outcome.infra_container_name.as_deref(), Some("t100_networkproxy"));
}

#[test]
fn already_prefixed_container_name_is_untouched() {
    let mut set = set_from(&[(
        "a.yml",
        "services:\n  web:\n    image: nginx\n    container_name: t100_webapp\n",
    )]);
    rewrite(&mut set, &spec()).unwrap();
    assert_eq!(
        service(&set, "a.yml", "web")["container_name"].as_str(),
        Some("t100_webapp")
    );
}

#[test]
fn unbuffered_env_is_ensured_in_both_forms() {
    let mut set = set_from(&[(
        "a.yml",
        "services:\n  seq:\n    image: a\n    environment:\n      - FOO=bar\n  map:\n    image: b\n    environment:\n      FOO: bar\n  bare:\n    image: c\n  preset:\n    image: d\n    environment:\n      - PYTHONUNBUFFERED=0\n",
    )]);
    rewrite(&mut set, &spec()).unwrap();

    let seq_env: Vec<&str> = service(&set, "a.yml", "seq")["environment"]
        .as_sequence()
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert_eq!(seq_env, vec!["FOO=bar", "PYTHONUNBUFFERED=1"]);

    assert_eq!(
        service(&set, "a.yml", "map")["environment"]["PYTHONUNBUFFERED"].as_str(),
        Some("1")
    );
    let bare_env: Vec<&str> = service(&set, "a.yml", "bare")["environment"]
        .as_sequence()
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert_eq!(bare_env, vec!["PYTHONUNBUFFERED=1"]);

    // an explicit setting is left alone
    let preset_env: Vec<&str> = service(&set, "a.yml", "preset")["environment"]
        .as_sequence()
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert_eq!(preset_env, vec!["PYTHONUNBUFFERED=0"]);
}

#[test]
fn cgroup_parent_is_set_from_working_dir() {
    let mut set = set_from(&[("a.yml", "services:\n  web:\n    image: nginx\n")]);
    rewrite(&mut set, &spec()).unwrap();
    assert_eq!(
        service(&set, "a.yml", "web")["cgroup_parent"].as_str(),
        Some("/mesos/workdir")
    );
}

#[parameterized(
    in_band_string = { "'2.4'", "2.4" },
    in_band_number = { "2.5", "2.5" },
    at_lower_bound = { "'2.1'", "2.1" },
    above_band = { "'3.2'", "2.1" },
    below_band = { "'2.0'", "2.1" },
    garbage = { "latest", "2.1" },
)]
fn version_is_coerced_into_supported_band(version: &str, expected: &str) {
    let doc = format!("version: {version}\nservices:\n  web:\n    image: nginx\n");
    let mut set = set_from(&[("a.yml", &doc)]);
    rewrite(&mut set, &spec()).unwrap();
    let value = set.document(Path::new("a.yml")).unwrap()["version"].clone();
    let rendered = match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        other => panic!("unexpected version value {other:?}"),
    };
    assert_eq!(rendered, expected);
}

#[test]
fn missing_version_normalizes() {
    let mut set = set_from(&[("a.yml", "services:\n  web:\n    image: nginx\n")]);
    rewrite(&mut set, &spec()).unwrap();
    assert_eq!(
        set.document(Path::new("a.yml")).unwrap()["version"].as_str(),
        Some("2.1")
    );
}
