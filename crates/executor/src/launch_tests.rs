// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the launch path's error transitions.

use super::*;
use crate::driver::FakeDriver;
use crate::test_helpers::{task_for, test_settings, write_manifest, ADHOC_MANIFEST};
use podx_config::Settings;
use podx_core::Pod;
use podx_plugins::{DefaultMonitor, ExecutorContext, GeneralPlugin, PluginRegistry};
use podx_runtime::fake::{exited, running};
use podx_runtime::FakeRuntime;
use std::sync::Arc;

struct LaunchFixture {
    ctx: ExecutorContext,
    pipeline: Pipeline,
    driver: Arc<FakeDriver>,
    rt: FakeRuntime,
}

fn fixture_in(dir: &std::path::Path, manifest: Option<&str>, rt: FakeRuntime) -> LaunchFixture {
    let settings = test_settings(dir);
    let task = match manifest {
        Some(content) => task_for(&write_manifest(dir, content), &[]),
        None => {
            let mut task = task_for(std::path::Path::new("unused"), &[]);
            task.labels.shift_remove("fileName");
            task
        }
    };
    fixture_with(settings, task, rt)
}

fn fixture_with(settings: Arc<Settings>, task: podx_core::TaskSpec, rt: FakeRuntime) -> LaunchFixture {
    let registry = Arc::new(PluginRegistry::new());
    registry.register_plugin(Arc::new(GeneralPlugin));
    let pipeline = Pipeline::new(registry);
    let pod = Pod::new(task, false, vec![GeneralPlugin::NAME.to_string()]);
    let ctx = ExecutorContext::new(Arc::new(pod), settings, Arc::new(rt.clone()));
    LaunchFixture {
        ctx,
        pipeline,
        driver: Arc::new(FakeDriver::new()),
        rt,
    }
}

async fn run(fixture: &LaunchFixture) {
    launch_task(
        fixture.ctx.clone(),
        fixture.pipeline.clone(),
        fixture.driver.clone(),
        Arc::new(DefaultMonitor),
    )
    .await;
}

#[tokio::test(start_paused = true)]
async fn missing_file_label_fails_deterministically() {
    let dir = tempfile::tempdir().unwrap();
    let fixture = fixture_in(dir.path(), None, FakeRuntime::new());

    run(&fixture).await;
    assert_eq!(
        fixture.driver.states(),
        vec![TaskState::Starting, TaskState::Failed]
    );
    // nothing was pulled or started
    assert_eq!(fixture.rt.call_count("pull"), 0);
    assert_eq!(fixture.rt.call_count("start"), 0);
}

#[tokio::test(start_paused = true)]
async fn unparseable_manifest_is_a_manifest_check_failure() {
    let dir = tempfile::tempdir().unwrap();
    let fixture = fixture_in(dir.path(), Some("services: [broken"), FakeRuntime::new());

    run(&fixture).await;
    assert_eq!(fixture.ctx.pod.status(), PodStatus::ManifestCheckFailed);
    assert_eq!(
        fixture.driver.states(),
        vec![TaskState::Starting, TaskState::Failed]
    );
}

#[tokio::test(start_paused = true)]
async fn manifest_without_services_is_a_manifest_check_failure() {
    let dir = tempfile::tempdir().unwrap();
    let fixture = fixture_in(dir.path(), Some("version: '2.1'\n"), FakeRuntime::new());

    run(&fixture).await;
    assert_eq!(fixture.ctx.pod.status(), PodStatus::ManifestCheckFailed);
}

#[tokio::test(start_paused = true)]
async fn start_failure_reports_failed_and_tears_down() {
    let dir = tempfile::tempdir().unwrap();
    let rt = FakeRuntime::new();
    rt.set_fail_start(true);
    let fixture = fixture_in(dir.path(), Some(ADHOC_MANIFEST), rt);

    run(&fixture).await;
    assert_eq!(fixture.ctx.pod.status(), PodStatus::Failed);
    assert_eq!(
        fixture.driver.states(),
        vec![TaskState::Starting, TaskState::Failed]
    );
    assert_eq!(fixture.rt.call_count("stop:"), 1);
}

#[tokio::test(start_paused = true)]
async fn skip_pull_bypasses_the_pull_stage() {
    let dir = tempfile::tempdir().unwrap();
    let rt = FakeRuntime::new();
    rt.add_container("w", "c1", false, vec![exited("w", 0)]);
    rt.add_container("networkproxy", "c-infra", false, vec![running("networkproxy")]);
    let fixture = fixture_in(dir.path(), Some(ADHOC_MANIFEST), rt);
    fixture
        .ctx
        .settings
        .set("launchtask.skippull", serde_yaml::Value::from(true));

    run(&fixture).await;
    assert_eq!(fixture.rt.call_count("pull"), 0);
    assert_eq!(fixture.ctx.pod.status(), PodStatus::Finished);
}

#[tokio::test(start_paused = true)]
async fn pull_retries_respect_the_budget() {
    let dir = tempfile::tempdir().unwrap();
    let rt = FakeRuntime::new();
    rt.set_pull_failures(2);
    rt.add_container("w", "c1", false, vec![exited("w", 0)]);
    rt.add_container("networkproxy", "c-infra", false, vec![running("networkproxy")]);
    let fixture = fixture_in(dir.path(), Some(ADHOC_MANIFEST), rt);

    run(&fixture).await;
    // two failures, then the third attempt succeeds within pullretry=3
    assert_eq!(fixture.rt.call_count("pull"), 3);
    assert_eq!(fixture.ctx.pod.status(), PodStatus::Finished);
}

#[tokio::test(start_paused = true)]
async fn service_detail_label_seeds_the_manifest_model() {
    let dir = tempfile::tempdir().unwrap();
    let rt = FakeRuntime::new();
    rt.add_container("w", "c1", false, vec![exited("w", 0)]);
    rt.add_container("networkproxy", "c-infra", false, vec![running("networkproxy")]);

    // the manifest file never exists on disk; the label carries the model
    let file = dir.path().join("virtual.yml");
    let settings = test_settings(dir.path());
    let mut task = task_for(&file, &[]);
    task.labels.insert(
        "serviceDetail".to_string(),
        format!("{}:\n  services:\n    w:\n      image: busybox\n", file.display()),
    );
    let fixture = fixture_with(settings, task, rt);

    run(&fixture).await;
    assert_eq!(fixture.ctx.pod.status(), PodStatus::Finished);
    let services = fixture.ctx.with_manifests(|m| m.all_services());
    assert!(services.contains(&"w".to_string()));
}

#[tokio::test(start_paused = true)]
async fn finished_verdict_is_rechecked_against_exit_codes() {
    let dir = tempfile::tempdir().unwrap();
    let rt = FakeRuntime::new();
    // the container slips a non-zero exit in after pruning
    rt.add_container("w", "c1", false, vec![exited("w", 0), exited("w", 3)]);
    rt.add_container("networkproxy", "c-infra", false, vec![running("networkproxy")]);
    let fixture = fixture_in(dir.path(), Some(ADHOC_MANIFEST), rt);

    run(&fixture).await;
    assert_eq!(fixture.ctx.pod.status(), PodStatus::Failed);
}

#[tokio::test(start_paused = true)]
async fn launch_timeout_dumps_when_configured() {
    let dir = tempfile::tempdir().unwrap();
    let rt = FakeRuntime::new();
    rt.add_container("w", "c1", false, vec![running("w")]);
    rt.set_visible_after("w", usize::MAX / 2);
    let fixture = fixture_in(dir.path(), Some(ADHOC_MANIFEST), rt);
    fixture
        .ctx
        .settings
        .set("launchtask.timeout", serde_yaml::Value::from(1_000u64));
    fixture
        .ctx
        .settings
        .set("dockerdump.enabled", serde_yaml::Value::from(true));

    run(&fixture).await;
    assert_eq!(fixture.ctx.pod.status(), PodStatus::Failed);
    assert_eq!(
        fixture.driver.states(),
        vec![TaskState::Starting, TaskState::Failed]
    );
    assert_eq!(fixture.rt.call_count("dump"), 1);
    // teardown stopped the half-launched pod
    assert_eq!(fixture.rt.call_count("stop:"), 1);
}
