// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted in-memory runtime for tests.
//!
//! Containers are registered with a sequence of inspect states; each
//! inspect pops the next state and the final one repeats. A call log
//! records operation order for assertions.

use crate::error::RuntimeError;
use crate::ContainerRuntime;
use async_trait::async_trait;
use parking_lot::Mutex;
use podx_core::{ContainerStatus, HealthStatus};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Default)]
struct FakeContainer {
    service: String,
    id: String,
    has_probe: bool,
    /// Lookups by service that must happen before the container "exists".
    visible_after: usize,
    states: VecDeque<ContainerStatus>,
}

#[derive(Default)]
struct FakeState {
    calls: Vec<String>,
    pull_failures: usize,
    fail_pull: bool,
    fail_start: bool,
    containers: Vec<FakeContainer>,
}

/// In-memory [`ContainerRuntime`] double.
#[derive(Clone, Default)]
pub struct FakeRuntime {
    inner: Arc<Mutex<FakeState>>,
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a container with its scripted inspect states.
    pub fn add_container(
        &self,
        service: &str,
        id: &str,
        has_probe: bool,
        states: Vec<ContainerStatus>,
    ) {
        self.inner.lock().containers.push(FakeContainer {
            service: service.to_string(),
            id: id.to_string(),
            has_probe,
            visible_after: 0,
            states: states.into_iter().collect(),
        });
    }

    /// Make a service invisible for the first `lookups` id queries.
    pub fn set_visible_after(&self, service: &str, lookups: usize) {
        let mut state = self.inner.lock();
        if let Some(c) = state.containers.iter_mut().find(|c| c.service == service) {
            c.visible_after = lookups;
        }
    }

    /// Append another scripted inspect state.
    pub fn push_state(&self, id: &str, status: ContainerStatus) {
        let mut state = self.inner.lock();
        if let Some(c) = state.containers.iter_mut().find(|c| c.id == id) {
            c.states.push_back(status);
        }
    }

    /// Every pull fails.
    pub fn set_fail_pull(&self, fail: bool) {
        self.inner.lock().fail_pull = fail;
    }

    /// The first `n` pulls fail, then pulls succeed.
    pub fn set_pull_failures(&self, n: usize) {
        self.inner.lock().pull_failures = n;
    }

    pub fn set_fail_start(&self, fail: bool) {
        self.inner.lock().fail_start = fail;
    }

    /// The recorded operation log.
    pub fn calls(&self) -> Vec<String> {
        self.inner.lock().calls.clone()
    }

    pub fn call_count(&self, prefix: &str) -> usize {
        self.inner
            .lock()
            .calls
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn record(&self, call: impl Into<String>) {
        self.inner.lock().calls.push(call.into());
    }
}

/// A running container record.
pub fn running(name: &str) -> ContainerStatus {
    ContainerStatus {
        running: true,
        exit_code: 0,
        health: HealthStatus::Unknown,
        name: format!("/{name}"),
        ..Default::default()
    }
}

/// A running container with the given probe health.
pub fn running_with_health(name: &str, health: HealthStatus) -> ContainerStatus {
    ContainerStatus {
        health,
        ..running(name)
    }
}

/// An exited container record.
pub fn exited(name: &str, exit_code: i32) -> ContainerStatus {
    ContainerStatus {
        running: false,
        exit_code,
        health: HealthStatus::Unknown,
        name: format!("/{name}"),
        ..Default::default()
    }
}

#[async_trait]
impl ContainerRuntime for FakeRuntime {
    async fn pull_images(&self, _files: &[PathBuf]) -> Result<(), RuntimeError> {
        self.record("pull");
        let mut state = self.inner.lock();
        if state.fail_pull {
            return Err(RuntimeError::Pull(podx_wait::WaitError::Timeout));
        }
        if state.pull_failures > 0 {
            state.pull_failures -= 1;
            return Err(RuntimeError::Pull(podx_wait::WaitError::Timeout));
        }
        Ok(())
    }

    async fn start_pod(&self, _files: &[PathBuf]) -> Result<(), RuntimeError> {
        self.record("start");
        if self.inner.lock().fail_start {
            return Err(RuntimeError::Start("scripted start failure".to_string()));
        }
        Ok(())
    }

    async fn stop_pod(&self, _files: &[PathBuf], timeout_secs: u64) -> Result<(), RuntimeError> {
        self.record(format!("stop:{timeout_secs}"));
        Ok(())
    }

    async fn kill_pod(&self, _files: &[PathBuf]) -> Result<(), RuntimeError> {
        self.record("kill");
        Ok(())
    }

    async fn remove_volumes(&self, _files: &[PathBuf]) -> Result<(), RuntimeError> {
        self.record("remove-volumes");
        Ok(())
    }

    async fn remove_images(&self, _files: &[PathBuf]) -> Result<(), RuntimeError> {
        self.record("remove-images");
        Ok(())
    }

    async fn pod_container_ids(&self, _files: &[PathBuf]) -> Result<Vec<String>, RuntimeError> {
        self.record("ps");
        let state = self.inner.lock();
        Ok(state
            .containers
            .iter()
            .filter(|c| c.visible_after == 0)
            .map(|c| c.id.clone())
            .collect())
    }

    async fn container_id_by_service(
        &self,
        _files: &[PathBuf],
        service: &str,
    ) -> Result<String, RuntimeError> {
        let mut state = self.inner.lock();
        let Some(c) = state.containers.iter_mut().find(|c| c.service == service) else {
            return Err(RuntimeError::ServiceNotFound(service.to_string()));
        };
        if c.visible_after > 0 {
            c.visible_after -= 1;
            return Err(RuntimeError::ServiceNotFound(service.to_string()));
        }
        Ok(c.id.clone())
    }

    async fn inspect_container(
        &self,
        id: &str,
        want_health: bool,
    ) -> Result<ContainerStatus, RuntimeError> {
        self.record(format!("inspect:{id}"));
        let mut state = self.inner.lock();
        let Some(c) = state.containers.iter_mut().find(|c| c.id == id) else {
            return Err(RuntimeError::Inspect {
                container: id.to_string(),
                message: "no such container".to_string(),
            });
        };
        let mut record = if c.states.len() > 1 {
            c.states.pop_front().unwrap_or_default()
        } else {
            c.states.front().cloned().unwrap_or_default()
        };
        record.container_id = id.to_string();
        if !want_health {
            record.health = HealthStatus::Unknown;
        }
        Ok(record)
    }

    async fn has_health_check(&self, id: &str) -> bool {
        let state = self.inner.lock();
        state.containers.iter().any(|c| c.id == id && c.has_probe)
    }

    async fn kill_container(&self, id: &str, signal: Option<&str>) -> Result<(), RuntimeError> {
        self.record(format!("kill-container:{id}:{}", signal.unwrap_or("KILL")));
        Ok(())
    }

    async fn container_exit_code(&self, id: &str) -> Result<i32, RuntimeError> {
        let state = self.inner.lock();
        state
            .containers
            .iter()
            .find(|c| c.id == id)
            .and_then(|c| c.states.back())
            .map(|s| s.exit_code)
            .ok_or_else(|| RuntimeError::Inspect {
                container: id.to_string(),
                message: "no such container".to_string(),
            })
    }

    async fn container_network(&self, _id: &str) -> Result<String, RuntimeError> {
        Ok("bridge".to_string())
    }

    async fn remove_network(&self, name: &str) -> Result<(), RuntimeError> {
        self.record(format!("remove-network:{name}"));
        Ok(())
    }

    async fn service_port(
        &self,
        _files: &[PathBuf],
        service: &str,
        container_port: &str,
    ) -> Result<String, RuntimeError> {
        self.record(format!("port:{service}:{container_port}"));
        Ok("0.0.0.0:32768".to_string())
    }

    async fn stream_logs(&self, _files: &[PathBuf], _retry_on_exit: bool) {
        self.record("logs");
    }

    async fn dump_diagnostics(&self, _files: &[PathBuf]) {
        self.record("dump");
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
