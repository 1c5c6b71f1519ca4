// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task-scoped pod state shared between the state machine and its helpers.

use crate::status::PodStatus;
use crate::task::TaskSpec;
use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

/// The pod owned by one launch.
///
/// Status is single-writer (the state machine) behind a reader/writer lock;
/// the remaining fields are handed between launch phases under mutexes.
/// Constructed on `LaunchTask`, dropped when the task reaches a terminal
/// state and the executor shuts down.
pub struct Pod {
    pub task: TaskSpec,
    pub is_service: bool,
    plugin_order: Vec<String>,
    status: RwLock<PodStatus>,
    files: Mutex<Vec<PathBuf>>,
    /// service name → container name, filled during manifest rewrite.
    service_names: Mutex<IndexMap<String, String>>,
    /// Containers under periodic monitoring, owned by the monitor after the
    /// initial health check.
    monitor_containers: Mutex<Vec<String>>,
    /// container id → whether the container exposes a health probe.
    health_probes: Mutex<HashMap<String, bool>>,
    /// Name of the infra container, once known.
    infra_container: Mutex<Option<String>>,
    /// Set when every service requested host/none networking and the infra
    /// document was dropped.
    infra_removed: AtomicBool,
}

impl Pod {
    pub fn new(task: TaskSpec, is_service: bool, plugin_order: Vec<String>) -> Self {
        Self {
            task,
            is_service,
            plugin_order,
            status: RwLock::new(PodStatus::Staging),
            files: Mutex::new(Vec::new()),
            service_names: Mutex::new(IndexMap::new()),
            monitor_containers: Mutex::new(Vec::new()),
            health_probes: Mutex::new(HashMap::new()),
            infra_container: Mutex::new(None),
            infra_removed: AtomicBool::new(false),
        }
    }

    pub fn status(&self) -> PodStatus {
        *self.status.read()
    }

    /// Overwrite the pod status. Callers outside the state machine must not
    /// use this; they report candidate statuses over channels instead.
    pub fn set_status(&self, status: PodStatus) {
        *self.status.write() = status;
        tracing::info!(status = %status, "pod status updated");
    }

    pub fn files(&self) -> Vec<PathBuf> {
        self.files.lock().clone()
    }

    pub fn set_files(&self, files: Vec<PathBuf>) {
        *self.files.lock() = files;
    }

    pub fn plugin_order(&self) -> &[String] {
        &self.plugin_order
    }

    pub fn service_names(&self) -> IndexMap<String, String> {
        self.service_names.lock().clone()
    }

    pub fn set_service_names(&self, names: IndexMap<String, String>) {
        *self.service_names.lock() = names;
    }

    /// Expected service names, in manifest iteration order.
    pub fn expected_services(&self) -> Vec<String> {
        self.service_names.lock().keys().cloned().collect()
    }

    pub fn monitor_containers(&self) -> Vec<String> {
        self.monitor_containers.lock().clone()
    }

    pub fn set_monitor_containers(&self, containers: Vec<String>) {
        *self.monitor_containers.lock() = containers;
    }

    /// Drop one container from the monitor set.
    pub fn prune_monitor_container(&self, id: &str) {
        self.monitor_containers.lock().retain(|c| c != id);
    }

    pub fn has_health_probe(&self, container_id: &str) -> Option<bool> {
        self.health_probes.lock().get(container_id).copied()
    }

    pub fn record_health_probe(&self, container_id: &str, has_probe: bool) {
        self.health_probes.lock().insert(container_id.to_string(), has_probe);
    }

    pub fn infra_container(&self) -> Option<String> {
        self.infra_container.lock().clone()
    }

    pub fn set_infra_container(&self, name: String) {
        *self.infra_container.lock() = Some(name);
    }

    pub fn infra_removed(&self) -> bool {
        self.infra_removed.load(Ordering::Relaxed)
    }

    pub fn set_infra_removed(&self, removed: bool) {
        self.infra_removed.store(removed, Ordering::Relaxed);
    }
}

#[cfg(test)]
#[path = "pod_tests.rs"]
mod tests;
