// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Status reporting to the host.
//!
//! One update per transition, strictly serialized by the state machine.
//! Once a terminal status is set, further reports for the task are
//! suppressed and logged once. Terminal updates stop the driver after a
//! small grace delay that lets the message flush.

use crate::driver::HostDriver;
use crate::teardown;
use crate::DRIVER_STOP_GRACE;
use podx_core::{PodStatus, TaskState};
use podx_plugins::{ExecutorContext, Pipeline};

/// Report a pod-status transition, with its side effects.
///
/// FAILED tears the pod down first (unless `cleanpod.cleanfailtask` says to
/// leave it for debugging); FINISHED stops whatever is still running.
/// Terminal host states stop the driver.
pub async fn send_pod_status(
    ctx: &ExecutorContext,
    pipeline: &Pipeline,
    driver: &dyn HostDriver,
    status: PodStatus,
) {
    let current = ctx.pod.status();
    if current.is_terminal() || current == status {
        tracing::info!(
            current = %current,
            attempted = %status,
            "status already settled, suppressing report"
        );
        return;
    }
    ctx.pod.set_status(status);

    match status {
        PodStatus::Failed => {
            if ctx.settings.clean_fail_task() {
                teardown::stop_pod(ctx).await;
            } else {
                tracing::warn!("leaving failed pod in place per cleanpod.cleanfailtask");
            }
        }
        PodStatus::Finished => {
            teardown::stop_pod(ctx).await;
        }
        _ => {}
    }

    if let Err(err) = pipeline.notify_status(ctx, status).await {
        tracing::error!(error = %err, "pod status hook failed");
    }

    if let Some(state) = status.task_state() {
        send_task_state(ctx, driver, state).await;
        if state.is_terminal() {
            stop_driver_after_grace(ctx, pipeline, driver).await;
        }
    }
}

/// Low-level host update, tagged with the task's tracing labels.
pub async fn send_task_state(ctx: &ExecutorContext, driver: &dyn HostDriver, state: TaskState) {
    let task = &ctx.pod.task;
    let tags = task.tags();
    tracing::info!(
        task_id = %task.task_id,
        state = %state,
        requuid = %tags.requuid,
        tenant = %tags.tenant,
        namespace = %tags.namespace,
        pool = %tags.pool,
        "reporting task state"
    );
    if let Err(err) = driver.send_status_update(&task.task_id, state).await {
        tracing::error!(error = %err, "failed to send status update");
    }
}

/// Let the last update flush, give status hooks their shutdown callback,
/// then stop the driver.
pub async fn stop_driver_after_grace(
    ctx: &ExecutorContext,
    pipeline: &Pipeline,
    driver: &dyn HostDriver,
) {
    tokio::time::sleep(DRIVER_STOP_GRACE).await;
    pipeline.shutdown_status_hooks(ctx, ctx.pod.status()).await;
    tracing::info!("stopping driver");
    driver.stop().await;
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
