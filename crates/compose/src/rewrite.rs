// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Service rewriting.
//!
//! Applies the pod-level invariants to every service in the set: network
//! mode pointing at the infra container, task/executor labels, container
//! name prefixing, cgroup parent, port assignment from the task's range,
//! `extra_hosts` hoisting, and stripping of `restart`/`links`.

use crate::error::ManifestError;
use crate::model::{services_mut, ManifestSet};
use crate::{
    CGROUP_PARENT, CONTAINER_NAME, ENVIRONMENT, EXECUTOR_ID_LABEL, EXTRA_HOSTS, HOST_MODE,
    LABELS, LINKS, NETWORK_MODE, NONE_MODE, PORTS, RESTART, TASK_ID_LABEL, VERSION,
};
use indexmap::IndexMap;
use serde_yaml::{Mapping, Value};

/// Inputs for one rewrite pass.
#[derive(Debug, Clone, Default)]
pub struct RewriteSpec {
    pub task_id: String,
    pub executor_id: String,
    /// Basename of the executor's working directory, used for the cgroup
    /// parent `/mesos/<basename>`.
    pub cgroup_root: String,
    /// Host ports assigned by the scheduler, consumed in iteration order.
    pub assigned_ports: Vec<u64>,
    /// Service name of the infra container.
    pub infra_service: String,
    /// App folder name, used for the container-name fallback.
    pub folder_name: String,
    /// User labels propagated onto every container.
    pub extra_labels: IndexMap<String, String>,
}

/// What a rewrite pass produced.
#[derive(Debug, Clone)]
pub struct RewriteOutcome {
    /// service name → container name, in declaration order.
    pub service_names: IndexMap<String, String>,
    /// The infra container's (prefixed) name, when it has one.
    pub infra_container_name: Option<String>,
    /// False when some service requested host/none networking; the infra
    /// document is dropped at materialize time.
    pub infra_required: bool,
    /// How many assigned host ports were consumed.
    pub ports_consumed: usize,
}

/// Rewrite every service in the set per the pod invariants.
pub fn rewrite(set: &mut ManifestSet, spec: &RewriteSpec) -> Result<RewriteOutcome, ManifestError> {
    let mut next_port = 0usize;
    let mut service_names: IndexMap<String, String> = IndexMap::new();
    let mut infra_container_name = None;
    let mut infra_required = true;
    let mut hoisted_hosts: Vec<Value> = Vec::new();
    let mut singles: Vec<(String, String)> = Vec::new();

    let files = set.files();
    for file in &files {
        let Some(doc) = set.document_mut(file) else {
            continue;
        };
        coerce_version(doc);
        let Some(services) = services_mut(doc) else {
            continue;
        };
        let names: Vec<String> = services
            .keys()
            .filter_map(|k| k.as_str().map(String::from))
            .collect();

        for name in names {
            let Some(details) = services
                .get_mut(name.as_str())
                .and_then(Value::as_mapping_mut)
            else {
                continue;
            };
            let is_infra = name == spec.infra_service;

            details.remove(RESTART);
            details.remove(LINKS);

            if !is_infra {
                let declared = details
                    .get(NETWORK_MODE)
                    .and_then(Value::as_str)
                    .map(String::from);
                match declared.as_deref() {
                    Some(HOST_MODE) | Some(NONE_MODE) => {
                        infra_required = false;
                    }
                    _ => {
                        details.insert(
                            Value::from(NETWORK_MODE),
                            Value::from(format!("service:{}", spec.infra_service)),
                        );
                    }
                }
            }

            let declared_name = details
                .get(CONTAINER_NAME)
                .and_then(Value::as_str)
                .map(String::from);
            let container_name = match declared_name {
                Some(current) => {
                    let prefixed = prefix_task_id(&spec.task_id, &current);
                    details.insert(Value::from(CONTAINER_NAME), Value::from(prefixed.clone()));
                    if is_infra {
                        infra_container_name = Some(prefixed.clone());
                    }
                    prefixed
                }
                None => default_container_name(&spec.folder_name, &name),
            };
            service_names.entry(name.clone()).or_insert(container_name);

            tag_labels(details, spec);
            ensure_unbuffered_env(details);
            details.insert(
                Value::from(CGROUP_PARENT),
                Value::from(format!("/mesos/{}", spec.cgroup_root)),
            );

            let mode = details
                .get(NETWORK_MODE)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            if mode != HOST_MODE && mode != NONE_MODE {
                next_port =
                    assign_ports(details, &name, &spec.assigned_ports, next_port, &mut singles)?;
            }

            if !is_infra {
                if let Some(hosts) = details.remove(EXTRA_HOSTS) {
                    match hosts {
                        Value::Sequence(seq) => hoisted_hosts.extend(seq),
                        other => hoisted_hosts.push(other),
                    }
                }
            }
        }
    }

    if infra_required {
        hoist_extra_hosts(set, &spec.infra_service, hoisted_hosts);
    } else {
        service_names.shift_remove(&spec.infra_service);
        infra_container_name = None;
    }
    set.set_infra_removed(!infra_required);

    for (service, container_port) in singles {
        set.record_single_port(&service, &container_port);
    }

    Ok(RewriteOutcome {
        service_names,
        infra_container_name,
        infra_required,
        ports_consumed: next_port,
    })
}

/// `H:C` consumes the next assigned host port; a bare `C` is recorded for
/// dynamic resolution after launch.
fn assign_ports(
    details: &mut Mapping,
    service: &str,
    assigned: &[u64],
    mut next: usize,
    singles: &mut Vec<(String, String)>,
) -> Result<usize, ManifestError> {
    let Some(Value::Sequence(ports)) = details.get_mut(PORTS) else {
        return Ok(next);
    };
    for entry in ports.iter_mut() {
        let text = match entry {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => continue,
        };
        if let Some((_, container)) = text.split_once(':') {
            let Some(port) = assigned.get(next) else {
                return Err(ManifestError::PortsExhausted {
                    service: service.to_string(),
                });
            };
            *entry = Value::from(format!("{port}:{container}"));
            next += 1;
        } else {
            singles.push((service.to_string(), text));
        }
    }
    Ok(next)
}

/// Append collected `extra_hosts` onto the infra service, dropping
/// duplicates while preserving order.
fn hoist_extra_hosts(set: &mut ManifestSet, infra_service: &str, hosts: Vec<Value>) {
    if hosts.is_empty() {
        return;
    }
    let files = set.files();
    for file in &files {
        let Some(doc) = set.document_mut(file) else {
            continue;
        };
        let Some(services) = services_mut(doc) else {
            continue;
        };
        let Some(details) = services
            .get_mut(infra_service)
            .and_then(Value::as_mapping_mut)
        else {
            continue;
        };
        let entry = details
            .entry(Value::from(EXTRA_HOSTS))
            .or_insert_with(|| Value::Sequence(Vec::new()));
        if let Value::Sequence(seq) = entry {
            for host in &hosts {
                if !seq.contains(host) {
                    seq.push(host.clone());
                }
            }
        }
        return;
    }
    tracing::warn!("collected extra_hosts but found no infra service to carry them");
}

/// Add `taskId`/`executorId` plus user labels, supporting both the mapping
/// and `K=V` sequence label forms.
fn tag_labels(details: &mut Mapping, spec: &RewriteSpec) {
    let entry = details
        .entry(Value::from(LABELS))
        .or_insert_with(|| Value::Mapping(Mapping::new()));
    match entry {
        Value::Sequence(seq) => {
            upsert_kv(seq, TASK_ID_LABEL, &spec.task_id);
            upsert_kv(seq, EXECUTOR_ID_LABEL, &spec.executor_id);
            for (k, v) in &spec.extra_labels {
                upsert_kv(seq, k, v);
            }
        }
        other => {
            if !other.is_mapping() {
                *other = Value::Mapping(Mapping::new());
            }
            if let Some(labels) = other.as_mapping_mut() {
                labels.insert(Value::from(TASK_ID_LABEL), Value::from(spec.task_id.clone()));
                labels.insert(
                    Value::from(EXECUTOR_ID_LABEL),
                    Value::from(spec.executor_id.clone()),
                );
                for (k, v) in &spec.extra_labels {
                    labels.insert(Value::from(k.clone()), Value::from(v.clone()));
                }
            }
        }
    }
}

fn upsert_kv(seq: &mut Vec<Value>, key: &str, value: &str) {
    let prefix = format!("{key}=");
    let rendered = Value::from(format!("{key}={value}"));
    if let Some(existing) = seq
        .iter_mut()
        .find(|e| e.as_str().is_some_and(|s| s.starts_with(&prefix)))
    {
        *existing = rendered;
    } else {
        seq.push(rendered);
    }
}

/// Container stdio must flush promptly for log streaming.
fn ensure_unbuffered_env(details: &mut Mapping) {
    const UNBUFFERED: &str = "PYTHONUNBUFFERED";
    let entry = details
        .entry(Value::from(ENVIRONMENT))
        .or_insert_with(|| Value::Sequence(Vec::new()));
    match entry {
        Value::Sequence(seq) => {
            let prefix = format!("{UNBUFFERED}=");
            if !seq
                .iter()
                .any(|e| e.as_str().is_some_and(|s| s.starts_with(&prefix)))
            {
                seq.push(Value::from(format!("{UNBUFFERED}=1")));
            }
        }
        Value::Mapping(env) => {
            if env.get(UNBUFFERED).is_none() {
                env.insert(Value::from(UNBUFFERED), Value::from("1"));
            }
        }
        other => {
            *other = Value::Sequence(vec![Value::from(format!("{UNBUFFERED}=1"))]);
        }
    }
}

fn prefix_task_id(task_id: &str, name: &str) -> String {
    if name.starts_with(task_id) {
        name.to_string()
    } else {
        format!("{task_id}_{name}")
    }
}

/// Fallback container name the engine derives when none is declared.
fn default_container_name(folder_name: &str, service: &str) -> String {
    let sanitized: String = folder_name.chars().filter(|c| *c != '_' && *c != '-').collect();
    format!("{sanitized}_{service}")
}

/// Keep the document's version inside the supported band, else normalize.
fn coerce_version(doc: &mut Value) {
    let keep = doc
        .get(VERSION)
        .and_then(version_number)
        .is_some_and(|v| v > 2.1 && v < 3.0);
    if !keep {
        if let Some(mapping) = doc.as_mapping_mut() {
            mapping.insert(Value::from(VERSION), Value::from("2.1"));
        }
    }
}

fn version_number(value: &Value) -> Option<f64> {
    match value {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

#[cfg(test)]
#[path = "rewrite_tests.rs"]
mod tests;
