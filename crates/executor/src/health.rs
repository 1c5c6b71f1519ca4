// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The blocking initial health check, run after the pod starts.
//!
//! Waits for every expected service to have a container, discovers which
//! containers carry a health probe, then polls until each remaining
//! container is satisfied: exit code zero and either healthy (probe) or
//! running (no probe). Containers that exit cleanly are pruned and stop
//! counting. The overall launch deadline bounds this check from outside.

use indexmap::IndexMap;
use podx_config::INFRA_SERVICE;
use podx_core::{HealthStatus, PodStatus};
use podx_plugins::ExecutorContext;

/// Run the initial health check and produce the launch verdict:
/// RUNNING, FINISHED, or FAILED.
pub async fn initial_check(ctx: &ExecutorContext) -> PodStatus {
    let interval = ctx.settings.pod_monitor_interval();
    let files = ctx.pod.files();
    let expected = ctx.pod.expected_services();
    tracing::info!(services = expected.len(), "initial health check starting");

    // Wait (unbounded; the launch deadline cancels us) until every expected
    // service has a container.
    let mut ids: IndexMap<String, String> = IndexMap::new();
    loop {
        for service in &expected {
            if ids.contains_key(service) {
                continue;
            }
            match ctx.runtime.container_id_by_service(&files, service).await {
                Ok(id) => {
                    tracing::debug!(service = %service, container = %id, "service is up");
                    ids.insert(service.clone(), id);
                }
                Err(err) => {
                    tracing::debug!(service = %service, error = %err, "service not up yet")
                }
            }
        }
        if ids.len() == expected.len() {
            break;
        }
        tokio::time::sleep(interval).await;
    }

    let containers: Vec<String> = ids.values().cloned().collect();
    ctx.pod.set_monitor_containers(containers.clone());
    tracing::info!(
        expected = expected.len(),
        monitored = containers.len(),
        "all services have containers"
    );

    // Discover health probes once; the flag map is consulted from here on.
    for id in &containers {
        if ctx.pod.has_health_probe(id).is_none() {
            let has_probe = ctx.runtime.has_health_check(id).await;
            ctx.pod.record_health_probe(id, has_probe);
        }
    }

    // Poll the working set until everything is satisfied.
    let mut working = containers;
    loop {
        let mut index = 0;
        while index < working.len() {
            let id = working[index].clone();
            let probe = ctx.pod.has_health_probe(&id).unwrap_or(false);
            let record = match ctx.runtime.inspect_container(&id, probe).await {
                Ok(record) => record,
                Err(err) => {
                    tracing::error!(container = %id, error = %err, "initial check inspect failed");
                    return PodStatus::Failed;
                }
            };

            if record.exit_code != 0 {
                tracing::error!(
                    container = %id,
                    exit_code = record.exit_code,
                    "container failed during initial check"
                );
                return PodStatus::Failed;
            }
            if probe && record.health == HealthStatus::Unhealthy {
                tracing::error!(container = %id, "container unhealthy during initial check");
                return PodStatus::Failed;
            }

            if record.finished_clean() {
                tracing::info!(container = %id, "container exited cleanly during startup");
                ctx.pod.prune_monitor_container(&id);
                working.remove(index);
                continue;
            }
            if record.is_satisfied(probe) {
                tracing::debug!(container = %id, "container satisfied");
                working.remove(index);
                continue;
            }
            index += 1;
        }
        if working.is_empty() {
            break;
        }
        tokio::time::sleep(interval).await;
    }

    // Verdict over what is left under monitoring.
    let remaining = ctx.pod.monitor_containers();
    let infra_id = ids.get(INFRA_SERVICE);
    let only_infra = remaining.len() == 1 && infra_id == Some(&remaining[0]);
    if remaining.is_empty() || only_infra {
        return if ctx.pod.is_service {
            tracing::error!("service pod drained during startup");
            PodStatus::Failed
        } else {
            PodStatus::Finished
        };
    }
    tracing::info!("initial health check passed");
    PodStatus::Running
}

#[cfg(test)]
#[path = "health_tests.rs"]
mod tests;
