// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task description delivered by the host framework.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Label keys the executor itself consumes; these are not propagated onto
/// containers.
const CONTROL_LABELS: &[&str] = &[
    "fileName",
    "pluginorder",
    "serviceDetail",
    "isService",
    "requuid",
    "tenant",
    "namespace",
    "pool",
];

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("missing label fileName")]
    MissingFileList,
    #[error("no manifest files in fileName label")]
    EmptyFileList,
}

/// An inclusive host-port range assigned to the task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRange {
    pub begin: u64,
    pub end: u64,
}

/// The task description the host hands to `LaunchTask`.
///
/// Mirrors the subset of the host framework's task info the executor
/// consumes: identifiers, labels, the assigned port ranges, and an opaque
/// payload interpreted by a [`crate::PayloadDecoder`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskSpec {
    pub task_id: String,
    pub executor_id: String,
    #[serde(default)]
    pub labels: IndexMap<String, String>,
    #[serde(default)]
    pub port_ranges: Vec<PortRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Vec<u8>>,
}

impl TaskSpec {
    pub fn new(task_id: impl Into<String>, executor_id: impl Into<String>) -> Self {
        Self { task_id: task_id.into(), executor_id: executor_id.into(), ..Default::default() }
    }

    /// Look up a label value by key.
    ///
    /// Matches the exact key first; otherwise a dotted key whose last
    /// segment equals `key` (so `config.launchtask.timeout` is found under
    /// `timeout` only via its full key, but `monitoring.requuid` matches
    /// `requuid`).
    pub fn label(&self, key: &str) -> Option<&str> {
        if let Some(v) = self.labels.get(key) {
            return Some(v.as_str());
        }
        self.labels
            .iter()
            .find(|(k, _)| k.contains('.') && k.rsplit('.').next() == Some(key))
            .map(|(_, v)| v.as_str())
    }

    /// The comma-separated manifest file list from the `fileName` label.
    pub fn manifest_files(&self) -> Result<Vec<PathBuf>, TaskError> {
        let list = self.label("fileName").ok_or(TaskError::MissingFileList)?;
        let files: Vec<PathBuf> =
            list.split(',').map(str::trim).filter(|f| !f.is_empty()).map(PathBuf::from).collect();
        if files.is_empty() {
            return Err(TaskError::EmptyFileList);
        }
        Ok(files)
    }

    /// Plugin order from the `pluginorder` label, if present.
    pub fn plugin_order(&self) -> Option<Vec<String>> {
        let list = self.label("pluginorder")?;
        let order: Vec<String> =
            list.split(',').map(str::trim).filter(|p| !p.is_empty()).map(String::from).collect();
        if order.is_empty() {
            None
        } else {
            Some(order)
        }
    }

    /// All assigned host ports, flattened in range order.
    pub fn ports(&self) -> Vec<u64> {
        self.port_ranges.iter().flat_map(|r| r.begin..=r.end).collect()
    }

    /// User labels propagated onto every container in the pod.
    ///
    /// Excludes executor control labels and `config.` overrides.
    pub fn container_labels(&self) -> IndexMap<String, String> {
        self.labels
            .iter()
            .filter(|(k, _)| !CONTROL_LABELS.contains(&k.as_str()) && !k.contains("config."))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Logging tags carried on every transition log line.
    pub fn tags(&self) -> TaskTags {
        TaskTags {
            requuid: self.label("requuid").unwrap_or_default().to_string(),
            tenant: self.label("tenant").unwrap_or_default().to_string(),
            namespace: self.label("namespace").unwrap_or_default().to_string(),
            pool: self.label("pool").unwrap_or_default().to_string(),
        }
    }
}

/// Request-tracing tags extracted from task labels.
#[derive(Debug, Clone, Default)]
pub struct TaskTags {
    pub requuid: String,
    pub tenant: String,
    pub namespace: String,
    pub pool: String,
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
