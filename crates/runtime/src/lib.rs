// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! podx-runtime: drives the container engine through its CLI surface and
//! parses its output.

mod cli;
mod error;
mod parse;

pub use cli::ComposeCli;
pub use error::RuntimeError;
pub use parse::{parse_exit_code, parse_inspect};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeRuntime;

use async_trait::async_trait;
use podx_core::ContainerStatus;
use std::path::PathBuf;

/// The container-runtime seam.
///
/// One implementation shells out to `docker` / `docker-compose`; tests use
/// [`FakeRuntime`]. Every operation maps to one engine subprocess (or a
/// small fixed sequence) against the pod's generated manifest files.
#[async_trait]
pub trait ContainerRuntime: Send + Sync + 'static {
    /// Pull all images referenced by the manifests. Idempotent.
    async fn pull_images(&self, files: &[PathBuf]) -> Result<(), RuntimeError>;

    /// Bring the pod up detached. Returns once the engine reports launch
    /// complete, regardless of container health. Never retried.
    async fn start_pod(&self, files: &[PathBuf]) -> Result<(), RuntimeError>;

    /// Graceful stop with a per-container timeout; falls back to
    /// [`Self::kill_pod`] on failure.
    async fn stop_pod(&self, files: &[PathBuf], timeout_secs: u64) -> Result<(), RuntimeError>;

    /// Force kill all containers in the pod.
    async fn kill_pod(&self, files: &[PathBuf]) -> Result<(), RuntimeError>;

    /// Best-effort removal of containers and volumes.
    async fn remove_volumes(&self, files: &[PathBuf]) -> Result<(), RuntimeError>;

    /// Best-effort removal of the pod's images.
    async fn remove_images(&self, files: &[PathBuf]) -> Result<(), RuntimeError>;

    /// Current container ids in pod order.
    async fn pod_container_ids(&self, files: &[PathBuf]) -> Result<Vec<String>, RuntimeError>;

    /// The single container id for a service; errors when the service is
    /// absent or ambiguous.
    async fn container_id_by_service(
        &self,
        files: &[PathBuf],
        service: &str,
    ) -> Result<String, RuntimeError>;

    /// Inspect one container; `want_health` requests the health field.
    async fn inspect_container(
        &self,
        id: &str,
        want_health: bool,
    ) -> Result<ContainerStatus, RuntimeError>;

    /// Whether the container exposes a health probe.
    async fn has_health_check(&self, id: &str) -> bool;

    /// Send one signal to a container.
    async fn kill_container(&self, id: &str, signal: Option<&str>) -> Result<(), RuntimeError>;

    /// The container's exit code.
    async fn container_exit_code(&self, id: &str) -> Result<i32, RuntimeError>;

    /// The network mode / network name a container is attached to.
    async fn container_network(&self, id: &str) -> Result<String, RuntimeError>;

    /// Remove a named network.
    async fn remove_network(&self, name: &str) -> Result<(), RuntimeError>;

    /// Resolve the host endpoint of a dynamically published service port.
    async fn service_port(
        &self,
        files: &[PathBuf],
        service: &str,
        container_port: &str,
    ) -> Result<String, RuntimeError>;

    /// Follow the pod's logs into the executor log. Long-running; restarts
    /// the follower on exit when `retry_on_exit` is set. Callers cancel by
    /// dropping the task.
    async fn stream_logs(&self, files: &[PathBuf], retry_on_exit: bool);

    /// Dump engine state (container list plus per-container inspects) into
    /// the executor log for diagnosis.
    async fn dump_diagnostics(&self, files: &[PathBuf]);
}
