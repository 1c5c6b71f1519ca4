// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The launch path of the task state machine.
//!
//! One owning task per launch. The startup phase — manifest work, pull,
//! start, initial health — runs under the launch deadline; afterwards the
//! task hands the pod to the periodic monitor and waits for its verdict.

use crate::driver::HostDriver;
use crate::{health, report};
use podx_core::{PodStatus, TaskError, TaskState};
use podx_plugins::{ExecutorContext, Monitor, Pipeline, PluginError};
use podx_runtime::RuntimeError;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
enum LaunchError {
    #[error(transparent)]
    Task(#[from] TaskError),

    #[error(transparent)]
    Plugin(#[from] PluginError),

    #[error("manifest check failed: {0}")]
    Manifest(podx_compose::ManifestError),

    #[error("image pull failed")]
    Pull,

    #[error("pod start failed: {0}")]
    Start(RuntimeError),
}

/// Drive one task from STARTING to a terminal state.
pub async fn launch_task(
    ctx: ExecutorContext,
    pipeline: Pipeline,
    driver: Arc<dyn HostDriver>,
    monitor: Arc<dyn Monitor>,
) {
    ctx.pod.set_status(PodStatus::Starting);
    report::send_task_state(&ctx, driver.as_ref(), TaskState::Starting).await;

    if let Err(err) = std::fs::create_dir_all(ctx.settings.app_folder()) {
        tracing::error!(error = %err, "failed to create app folder");
    }

    let deadline = ctx.settings.launch_timeout();
    let verdict = tokio::select! {
        _ = ctx.cancel.cancelled() => {
            tracing::info!("launch cancelled before completion");
            return;
        }
        outcome = tokio::time::timeout(deadline, startup(&ctx, &pipeline)) => match outcome {
            Err(_) => {
                tracing::error!(
                    timeout_ms = deadline.as_millis() as u64,
                    "launch deadline exceeded"
                );
                if ctx.settings.dump_on_timeout() {
                    ctx.runtime.dump_diagnostics(&ctx.pod.files()).await;
                }
                report::send_pod_status(&ctx, &pipeline, driver.as_ref(), PodStatus::Failed)
                    .await;
                return;
            }
            Ok(Err(err)) => {
                handle_launch_error(&ctx, &pipeline, driver.as_ref(), err).await;
                return;
            }
            Ok(Ok(verdict)) => verdict,
        }
    };

    match verdict {
        PodStatus::Running => {
            ctx.cancel.cancel();
            report::send_pod_status(&ctx, &pipeline, driver.as_ref(), PodStatus::Running).await;
            run_monitor(&ctx, &pipeline, driver.as_ref(), monitor.as_ref()).await;
        }
        PodStatus::Finished => {
            ctx.cancel.cancel();
            let status = finished_or_failed(&ctx).await;
            report::send_pod_status(&ctx, &pipeline, driver.as_ref(), status).await;
        }
        other => {
            tracing::error!(verdict = %other, "startup did not reach a healthy pod");
            report::send_pod_status(&ctx, &pipeline, driver.as_ref(), PodStatus::Failed).await;
        }
    }
}

/// Everything between STARTING and the initial verdict.
async fn startup(ctx: &ExecutorContext, pipeline: &Pipeline) -> Result<PodStatus, LaunchError> {
    let files = ctx.pod.task.manifest_files()?;
    ctx.pod.set_files(files);

    // A host may ship the parsed manifest model in the serviceDetail label.
    if let Some(raw) = ctx.pod.task.label("serviceDetail") {
        let seeded =
            podx_compose::ManifestSet::from_serialized(raw).map_err(LaunchError::Manifest)?;
        tracing::info!(files = seeded.files().len(), "seeding manifests from serviceDetail");
        ctx.with_manifests(|manifests| *manifests = seeded);
    }

    pipeline.pre_image_pull(ctx).await?;

    ctx.with_manifests(|m| m.validate()).map_err(LaunchError::Manifest)?;

    let files = ctx
        .with_manifests(|m| m.materialize())
        .map_err(LaunchError::Manifest)?;
    ctx.pod.set_files(files.clone());

    if ctx.settings.skip_pull() {
        tracing::info!("skipping image pull per config");
    } else {
        let retries = ctx.settings.pull_retry();
        let interval = ctx.settings.retry_interval();
        podx_wait::poll_retry(retries, interval, || {
            let runtime = ctx.runtime.clone();
            let files = files.clone();
            async move { runtime.pull_images(&files).await }
        })
        .await
        .map_err(|_| LaunchError::Pull)?;
    }

    pipeline.post_image_pull(ctx).await?;
    let files = ctx
        .with_manifests(|m| m.materialize())
        .map_err(LaunchError::Manifest)?;
    ctx.pod.set_files(files.clone());

    ctx.runtime.start_pod(&files).await.map_err(LaunchError::Start)?;

    // follow pod logs for the rest of the task's life
    let runtime = ctx.runtime.clone();
    let log_files = files.clone();
    tokio::spawn(async move { runtime.stream_logs(&log_files, true).await });

    let verdict = health::initial_check(ctx).await;
    if verdict == PodStatus::Running && pipeline.post_launch(ctx).await == PodStatus::Failed {
        return Err(LaunchError::Plugin(PluginError::Other(
            "post-launch hook reported FAILED".to_string(),
        )));
    }
    Ok(verdict)
}

async fn handle_launch_error(
    ctx: &ExecutorContext,
    pipeline: &Pipeline,
    driver: &dyn HostDriver,
    err: LaunchError,
) {
    match err {
        LaunchError::Task(err) => {
            tracing::error!(error = %err, "no manifest to launch");
            report::send_pod_status(ctx, pipeline, driver, PodStatus::Failed).await;
        }
        LaunchError::Plugin(PluginError::Manifest(err)) | LaunchError::Manifest(err) => {
            tracing::error!(error = %err, "manifest check failed");
            report::send_pod_status(ctx, pipeline, driver, PodStatus::ManifestCheckFailed).await;
        }
        LaunchError::Plugin(err) => {
            tracing::error!(error = %err, "launch plugin failed");
            report::send_pod_status(ctx, pipeline, driver, PodStatus::Failed).await;
        }
        LaunchError::Pull => {
            tracing::error!("image pull failed after retries");
            pipeline.post_kill(ctx).await;
            report::send_pod_status(ctx, pipeline, driver, PodStatus::PullFailed).await;
        }
        LaunchError::Start(err) => {
            tracing::error!(error = %err, "pod start failed");
            report::send_pod_status(ctx, pipeline, driver, PodStatus::Failed).await;
        }
    }
}

/// Wait on the periodic monitor's verdict once the pod is RUNNING.
async fn run_monitor(
    ctx: &ExecutorContext,
    pipeline: &Pipeline,
    driver: &dyn HostDriver,
    monitor: &dyn Monitor,
) {
    tracing::info!("starting periodic pod monitor");
    let result = monitor.start(ctx).await;

    let current = ctx.pod.status();
    if current == PodStatus::Killed || current == PodStatus::Failed {
        tracing::info!(status = %current, "monitor stopped, pod already settled");
        return;
    }
    match result {
        Ok(PodStatus::Failed) => {
            report::send_pod_status(ctx, pipeline, driver, PodStatus::Failed).await;
        }
        Ok(PodStatus::Finished) => {
            let status = finished_or_failed(ctx).await;
            report::send_pod_status(ctx, pipeline, driver, status).await;
        }
        Ok(other) => {
            tracing::warn!(verdict = %other, "monitor returned a non-terminal verdict");
        }
        Err(err) => {
            tracing::error!(error = %err, "monitor failed");
            report::send_pod_status(ctx, pipeline, driver, PodStatus::Failed).await;
        }
    }
}

/// Final exit-code sweep before FINISHED: the first non-zero code flips
/// the verdict to FAILED.
async fn finished_or_failed(ctx: &ExecutorContext) -> PodStatus {
    let files = ctx.pod.files();
    let ids = match ctx.runtime.pod_container_ids(&files).await {
        Ok(ids) => ids,
        Err(err) => {
            tracing::warn!(error = %err, "cannot list containers for the exit-code sweep");
            return PodStatus::Finished;
        }
    };
    for id in ids {
        match ctx.runtime.container_exit_code(&id).await {
            Ok(0) => {}
            Ok(code) => {
                tracing::error!(container = %id, exit_code = code, "container failed");
                return PodStatus::Failed;
            }
            Err(err) => {
                tracing::warn!(container = %id, error = %err, "exit-code check failed");
            }
        }
    }
    PodStatus::Finished
}

#[cfg(test)]
#[path = "launch_tests.rs"]
mod tests;
