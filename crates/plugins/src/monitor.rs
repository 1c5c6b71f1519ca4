// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The default periodic pod monitor.
//!
//! Inspects the monitored containers once per interval. Any non-zero exit
//! code fails the pod; an unhealthy probe fails it unless configured as a
//! warning; containers that exited cleanly are pruned. When nothing but
//! the infra container is left, the verdict follows the task kind:
//! services fail, adhoc jobs finish.

use crate::context::ExecutorContext;
use crate::traits::{Monitor, PluginError};
use async_trait::async_trait;
use podx_config::INFRA_SERVICE;
use podx_core::{HealthStatus, PodStatus};
use podx_runtime::RuntimeError;

pub struct DefaultMonitor;

impl DefaultMonitor {
    pub const NAME: &'static str = "default";
}

#[async_trait]
impl Monitor for DefaultMonitor {
    async fn start(&self, ctx: &ExecutorContext) -> Result<PodStatus, PluginError> {
        let infra_id = if ctx.pod.infra_removed() {
            None
        } else {
            let id = ctx
                .runtime
                .container_id_by_service(&ctx.pod.files(), INFRA_SERVICE)
                .await?;
            tracing::debug!(container = %id, "monitoring with infra container");
            Some(id)
        };

        let interval = ctx.settings.pod_monitor_interval();
        let verdict = podx_wait::poll_forever(interval, None, || {
            let ctx = ctx.clone();
            let infra_id = infra_id.clone();
            async move {
                match monitor_pass(&ctx, infra_id.as_deref()).await {
                    Ok(PodStatus::Empty) => None,
                    Ok(status) => Some(status),
                    Err(err) => {
                        tracing::warn!(error = %err, "monitor pass failed");
                        Some(PodStatus::Failed)
                    }
                }
            }
        })
        .await;

        verdict.map_err(|err| PluginError::Other(err.to_string()))
    }
}

/// One inspection sweep over the monitored containers.
async fn monitor_pass(
    ctx: &ExecutorContext,
    infra_id: Option<&str>,
) -> Result<PodStatus, RuntimeError> {
    for id in ctx.pod.monitor_containers() {
        let want_health = ctx.pod.has_health_probe(&id).unwrap_or(false);
        let record = ctx.runtime.inspect_container(&id, want_health).await?;

        if record.exit_code != 0 {
            tracing::error!(
                container = %id,
                name = %record.name,
                exit_code = record.exit_code,
                "container exited non-zero"
            );
            return Ok(PodStatus::Failed);
        }

        if record.health == HealthStatus::Unhealthy {
            if ctx.settings.unhealthy_fails() {
                tracing::error!(container = %id, name = %record.name, "container unhealthy");
                return Ok(PodStatus::Failed);
            }
            tracing::warn!(
                container = %id,
                name = %record.name,
                "container unhealthy, continuing per cleanpod.unhealthy"
            );
        }

        if record.finished_clean() {
            tracing::info!(container = %id, "container exited cleanly, pruning from monitor");
            ctx.pod.prune_monitor_container(&id);
        }
    }

    let remaining = ctx.pod.monitor_containers();
    let only_infra =
        remaining.len() == 1 && infra_id.is_some_and(|infra| infra == remaining[0]);
    if remaining.is_empty() || only_infra {
        return Ok(if ctx.pod.is_service {
            tracing::error!("service pod has no application containers left");
            PodStatus::Failed
        } else {
            tracing::info!("adhoc pod drained, finishing");
            PodStatus::Finished
        });
    }
    Ok(PodStatus::Empty)
}

#[cfg(test)]
#[path = "monitor_tests.rs"]
mod tests;
