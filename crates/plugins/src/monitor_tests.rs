// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the default monitor's verdicts and tie-breaks.
//!
//! Exit-code semantics follow the newer convention: any non-zero exit
//! fails the pod, with no carve-out for -1.

use super::*;
use crate::test_helpers::test_ctx;
use podx_runtime::fake::{exited, running, running_with_health};
use podx_runtime::FakeRuntime;

async fn verdict(ctx: &ExecutorContext) -> PodStatus {
    DefaultMonitor.start(ctx).await.unwrap()
}

#[tokio::test(start_paused = true)]
async fn adhoc_pod_finishes_when_all_containers_exit_clean() {
    let rt = FakeRuntime::new();
    rt.add_container("w", "c1", false, vec![running("w"), exited("w", 0)]);
    let ctx = test_ctx(rt, false);
    ctx.pod.set_infra_removed(true);
    ctx.pod.set_monitor_containers(vec!["c1".to_string()]);

    assert_eq!(verdict(&ctx).await, PodStatus::Finished);
}

#[tokio::test(start_paused = true)]
async fn service_pod_fails_when_drained() {
    let rt = FakeRuntime::new();
    rt.add_container("w", "c1", false, vec![exited("w", 0)]);
    let ctx = test_ctx(rt, true);
    ctx.pod.set_infra_removed(true);
    ctx.pod.set_monitor_containers(vec!["c1".to_string()]);

    assert_eq!(verdict(&ctx).await, PodStatus::Failed);
}

#[tokio::test(start_paused = true)]
async fn non_zero_exit_fails_the_pod() {
    let rt = FakeRuntime::new();
    rt.add_container("w", "c1", false, vec![running("w"), exited("w", 137)]);
    let ctx = test_ctx(rt, true);
    ctx.pod.set_infra_removed(true);
    ctx.pod.set_monitor_containers(vec!["c1".to_string()]);

    assert_eq!(verdict(&ctx).await, PodStatus::Failed);
}

#[tokio::test(start_paused = true)]
async fn unhealthy_probe_fails_by_default() {
    let rt = FakeRuntime::new();
    rt.add_container(
        "w",
        "c1",
        true,
        vec![running_with_health("w", podx_core::HealthStatus::Unhealthy)],
    );
    let ctx = test_ctx(rt, true);
    ctx.pod.set_infra_removed(true);
    ctx.pod.set_monitor_containers(vec!["c1".to_string()]);
    ctx.pod.record_health_probe("c1", true);

    assert_eq!(verdict(&ctx).await, PodStatus::Failed);
}

#[tokio::test(start_paused = true)]
async fn unhealthy_probe_warns_and_continues_when_configured() {
    let rt = FakeRuntime::new();
    rt.add_container(
        "w",
        "c1",
        true,
        vec![
            running_with_health("w", podx_core::HealthStatus::Unhealthy),
            exited("w", 0),
        ],
    );
    let ctx = test_ctx(rt, false);
    ctx.settings
        .set("cleanpod.unhealthy", serde_yaml::Value::from(false));
    ctx.pod.set_infra_removed(true);
    ctx.pod.set_monitor_containers(vec!["c1".to_string()]);
    ctx.pod.record_health_probe("c1", true);

    // survives the unhealthy pass, then drains to FINISHED
    assert_eq!(verdict(&ctx).await, PodStatus::Finished);
}

#[tokio::test(start_paused = true)]
async fn infra_only_adhoc_pod_finishes() {
    let rt = FakeRuntime::new();
    rt.add_container("networkproxy", "infra-1", false, vec![running("networkproxy")]);
    rt.add_container("w", "c1", false, vec![exited("w", 0)]);
    let ctx = test_ctx(rt, false);
    ctx.pod
        .set_monitor_containers(vec!["infra-1".to_string(), "c1".to_string()]);

    assert_eq!(verdict(&ctx).await, PodStatus::Finished);
}

#[tokio::test(start_paused = true)]
async fn infra_only_service_pod_fails() {
    let rt = FakeRuntime::new();
    rt.add_container("networkproxy", "infra-1", false, vec![running("networkproxy")]);
    rt.add_container("w", "c1", false, vec![exited("w", 0)]);
    let ctx = test_ctx(rt, true);
    ctx.pod
        .set_monitor_containers(vec!["infra-1".to_string(), "c1".to_string()]);

    assert_eq!(verdict(&ctx).await, PodStatus::Failed);
}

#[tokio::test(start_paused = true)]
async fn inspect_failure_fails_the_pod() {
    let rt = FakeRuntime::new();
    let ctx = test_ctx(rt, true);
    ctx.pod.set_infra_removed(true);
    ctx.pod.set_monitor_containers(vec!["ghost".to_string()]);

    assert_eq!(verdict(&ctx).await, PodStatus::Failed);
}

#[tokio::test(start_paused = true)]
async fn healthy_service_keeps_polling() {
    let rt = FakeRuntime::new();
    rt.add_container("w", "c1", false, vec![running("w"), running("w"), exited("w", 1)]);
    let ctx = test_ctx(rt.clone(), true);
    ctx.pod.set_infra_removed(true);
    ctx.pod.set_monitor_containers(vec!["c1".to_string()]);

    assert_eq!(verdict(&ctx).await, PodStatus::Failed);
    // three passes: two healthy, then the failure
    assert_eq!(rt.call_count("inspect:c1"), 3);
}
