// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `docker` / `docker-compose` CLI implementation of [`ContainerRuntime`].
//!
//! Every bounded call goes through the retry helper with the configured
//! budget and `(attempt + 1) * interval` backoff; `start_pod` and the log
//! follower are exempt.

use crate::error::RuntimeError;
use crate::parse::{parse_exit_code, parse_inspect};
use crate::ContainerRuntime;
use async_trait::async_trait;
use podx_config::Settings;
use podx_core::ContainerStatus;
use podx_wait::{retry_cmd, wait_cmd};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};

const INSPECT_WITH_HEALTH: &str = "'{{.State.Pid}},{{.State.Running}},{{.State.ExitCode}},{{.State.Health.Status}},{{.RestartCount}},{{.HostConfig.RestartPolicy.MaximumRetryCount}},{{.Name}}'";
const INSPECT_PLAIN: &str = "'{{.State.Pid}},{{.State.Running}},{{.State.ExitCode}},{{.RestartCount}},{{.HostConfig.RestartPolicy.MaximumRetryCount}},{{.Name}}'";
const INSPECT_EXIT_CODE: &str = "'{{.State.ExitCode}}'";
const INSPECT_HEALTH_ONLY: &str = "'{{.State.Health.Status}}'";
const INSPECT_NETWORK: &str = "'{{.HostConfig.NetworkMode}}'";

/// Engine adapter over the compose CLI.
pub struct ComposeCli {
    settings: Arc<Settings>,
}

impl ComposeCli {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self { settings }
    }

    fn compose_cmd(&self, files: &[PathBuf], args: &[&str]) -> Command {
        let mut cmd = Command::new("docker-compose");
        for file in files {
            cmd.arg("-f").arg(file);
        }
        cmd.args(args);
        cmd.env(
            "COMPOSE_HTTP_TIMEOUT",
            self.settings.compose_http_timeout_secs().to_string(),
        );
        cmd
    }

    async fn retry_compose(
        &self,
        files: &[PathBuf],
        args: &[&str],
    ) -> Result<Vec<u8>, podx_wait::WaitError> {
        let files = files.to_vec();
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        retry_cmd(self.settings.max_retry(), self.settings.retry_interval(), || {
            let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
            self.compose_cmd(&files, &arg_refs)
        })
        .await
    }

    async fn retry_docker(&self, args: &[&str]) -> Result<Vec<u8>, podx_wait::WaitError> {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        retry_cmd(self.settings.max_retry(), self.settings.retry_interval(), || {
            let mut cmd = Command::new("docker");
            cmd.args(args.iter());
            cmd
        })
        .await
    }
}

#[async_trait]
impl ContainerRuntime for ComposeCli {
    async fn pull_images(&self, files: &[PathBuf]) -> Result<(), RuntimeError> {
        let mut cmd = self.compose_cmd(files, &["pull"]);
        cmd.stdout(std::process::Stdio::piped());
        cmd.stderr(std::process::Stdio::piped());
        let mut child = cmd.spawn().map_err(|e| RuntimeError::Pull(e.into()))?;
        forward_engine_output(&mut child);
        let status = wait_cmd(self.settings.launch_timeout(), &mut child)
            .await
            .map_err(RuntimeError::Pull)?;
        if !status.success() {
            return Err(RuntimeError::Pull(podx_wait::WaitError::CommandFailed {
                code: status.code(),
                stderr: "image pull exited non-zero".to_string(),
            }));
        }
        Ok(())
    }

    async fn start_pod(&self, files: &[PathBuf]) -> Result<(), RuntimeError> {
        tracing::info!(files = files.len(), "starting pod");
        let out = self
            .compose_cmd(files, &["up", "-d"])
            .output()
            .await
            .map_err(|e| RuntimeError::Start(e.to_string()))?;
        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr).trim().to_string();
            return Err(RuntimeError::Start(stderr));
        }
        Ok(())
    }

    async fn stop_pod(&self, files: &[PathBuf], timeout_secs: u64) -> Result<(), RuntimeError> {
        let timeout = timeout_secs.to_string();
        match self.retry_compose(files, &["stop", "-t", &timeout]).await {
            Ok(_) => Ok(()),
            Err(err) => {
                tracing::warn!(error = %err, "graceful stop failed, force killing pod");
                self.kill_pod(files)
                    .await
                    .map_err(|e| RuntimeError::Stop(e.to_string()))
            }
        }
    }

    async fn kill_pod(&self, files: &[PathBuf]) -> Result<(), RuntimeError> {
        self.retry_compose(files, &["kill"]).await?;
        Ok(())
    }

    async fn remove_volumes(&self, files: &[PathBuf]) -> Result<(), RuntimeError> {
        self.retry_compose(files, &["down", "-v"]).await?;
        Ok(())
    }

    async fn remove_images(&self, files: &[PathBuf]) -> Result<(), RuntimeError> {
        self.retry_compose(files, &["down", "--rmi", "all"]).await?;
        Ok(())
    }

    async fn pod_container_ids(&self, files: &[PathBuf]) -> Result<Vec<String>, RuntimeError> {
        let out = self.retry_compose(files, &["ps", "-q"]).await?;
        Ok(lines_of(&out))
    }

    async fn container_id_by_service(
        &self,
        files: &[PathBuf],
        service: &str,
    ) -> Result<String, RuntimeError> {
        let out = self.retry_compose(files, &["ps", "-q", service]).await?;
        let mut ids = lines_of(&out);
        match ids.len() {
            0 => Err(RuntimeError::ServiceNotFound(service.to_string())),
            1 => Ok(ids.remove(0)),
            count => Err(RuntimeError::AmbiguousService {
                service: service.to_string(),
                count,
            }),
        }
    }

    async fn inspect_container(
        &self,
        id: &str,
        want_health: bool,
    ) -> Result<ContainerStatus, RuntimeError> {
        let template = if want_health { INSPECT_WITH_HEALTH } else { INSPECT_PLAIN };
        let format = format!("--format={template}");
        let out = self
            .retry_docker(&["inspect", &format, id])
            .await
            .map_err(|e| RuntimeError::Inspect {
                container: id.to_string(),
                message: e.to_string(),
            })?;
        let mut record = parse_inspect(&String::from_utf8_lossy(&out), want_health)?;
        record.container_id = id.to_string();
        if record.exit_code != 0 || record.health == podx_core::HealthStatus::Unhealthy {
            tracing::info!(
                container = id,
                name = %record.name,
                health = %record.health,
                exit_code = record.exit_code,
                running = record.running,
                "inspect"
            );
        }
        Ok(record)
    }

    async fn has_health_check(&self, id: &str) -> bool {
        let format = format!("--format={INSPECT_HEALTH_ONLY}");
        let result = Command::new("docker")
            .args(["inspect", &format, id])
            .output()
            .await;
        matches!(result, Ok(out) if out.status.success())
    }

    async fn kill_container(&self, id: &str, signal: Option<&str>) -> Result<(), RuntimeError> {
        let mut args = vec!["kill"];
        if let Some(signal) = signal {
            args.push("-s");
            args.push(signal);
        }
        args.push(id);
        self.retry_docker(&args).await?;
        Ok(())
    }

    async fn container_exit_code(&self, id: &str) -> Result<i32, RuntimeError> {
        let format = format!("--format={INSPECT_EXIT_CODE}");
        let out = self.retry_docker(&["inspect", &format, id]).await?;
        parse_exit_code(&String::from_utf8_lossy(&out))
    }

    async fn container_network(&self, id: &str) -> Result<String, RuntimeError> {
        let format = format!("--format={INSPECT_NETWORK}");
        let out = self.retry_docker(&["inspect", &format, id]).await?;
        Ok(String::from_utf8_lossy(&out).trim().trim_matches('\'').to_string())
    }

    async fn remove_network(&self, name: &str) -> Result<(), RuntimeError> {
        self.retry_docker(&["network", "rm", name]).await?;
        Ok(())
    }

    async fn service_port(
        &self,
        files: &[PathBuf],
        service: &str,
        container_port: &str,
    ) -> Result<String, RuntimeError> {
        let out = self.retry_compose(files, &["port", service, container_port]).await?;
        let endpoint = String::from_utf8_lossy(&out).trim().to_string();
        if endpoint.is_empty() {
            return Err(RuntimeError::ServiceNotFound(service.to_string()));
        }
        Ok(endpoint)
    }

    async fn stream_logs(&self, files: &[PathBuf], retry_on_exit: bool) {
        loop {
            let mut cmd = self.compose_cmd(files, &["logs", "--follow", "--no-color"]);
            cmd.stdout(std::process::Stdio::piped());
            cmd.stderr(std::process::Stdio::piped());
            match cmd.spawn() {
                Ok(mut child) => {
                    forward_engine_output(&mut child);
                    match child.wait().await {
                        Ok(status) => {
                            tracing::info!(code = ?status.code(), "log follower exited")
                        }
                        Err(err) => tracing::warn!(error = %err, "log follower wait failed"),
                    }
                }
                Err(err) => tracing::warn!(error = %err, "failed to spawn log follower"),
            }
            if !retry_on_exit {
                return;
            }
            tokio::time::sleep(self.settings.retry_interval()).await;
        }
    }

    async fn dump_diagnostics(&self, files: &[PathBuf]) {
        match Command::new("docker").args(["ps", "-a"]).output().await {
            Ok(out) => {
                for line in String::from_utf8_lossy(&out.stdout).lines() {
                    tracing::info!(line, "engine dump");
                }
            }
            Err(err) => tracing::warn!(error = %err, "failed to dump engine state"),
        }
        if let Ok(ids) = self.pod_container_ids(files).await {
            for id in ids {
                match self.inspect_container(&id, false).await {
                    Ok(record) => tracing::info!(
                        container = %id,
                        name = %record.name,
                        running = record.running,
                        exit_code = record.exit_code,
                        "container dump"
                    ),
                    Err(err) => {
                        tracing::warn!(container = %id, error = %err, "failed to inspect")
                    }
                }
            }
        }
    }
}

/// Forward subprocess stdout/stderr into the executor log line by line.
fn forward_engine_output(child: &mut Child) {
    if let Some(stdout) = child.stdout.take() {
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                tracing::info!(line = %line, "container log");
            }
        });
    }
    if let Some(stderr) = child.stderr.take() {
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                tracing::info!(line = %line, "container log");
            }
        });
    }
}

fn lines_of(out: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(out)
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
