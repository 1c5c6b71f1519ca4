// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for executor tests.

use crate::driver::FakeDriver;
use crate::executor::PodExecutor;
use async_trait::async_trait;
use parking_lot::Mutex;
use podx_config::Settings;
use podx_core::{LabelPayloadDecoder, Pod, PortRange, TaskSpec};
use podx_plugins::{
    ComposePlugin, DefaultMonitor, ExecutorContext, GeneralPlugin, Pipeline, PluginError,
    PluginRegistry,
};
use podx_runtime::FakeRuntime;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub(crate) const ADHOC_MANIFEST: &str =
    "version: '2.1'\nservices:\n  w:\n    image: busybox\n    command: 'true'\n";

pub(crate) const SERVICE_MANIFEST: &str =
    "version: '2.1'\nservices:\n  web:\n    image: nginx\n    ports:\n      - \"80\"\n  db:\n    image: postgres\n";

pub(crate) fn write_manifest(dir: &Path, content: &str) -> PathBuf {
    let file = dir.join("app.yml");
    std::fs::write(&file, content).unwrap();
    file
}

pub(crate) fn test_settings(dir: &Path) -> Arc<Settings> {
    let settings = Settings::new();
    settings.set(
        "foldername",
        serde_yaml::Value::from(dir.to_string_lossy().to_string()),
    );
    settings.set("launchtask.podmonitorinterval", serde_yaml::Value::from(10u64));
    settings.set("launchtask.retryinterval", serde_yaml::Value::from(10u64));
    Arc::new(settings)
}

pub(crate) fn task_for(file: &Path, extra: &[(&str, &str)]) -> TaskSpec {
    let mut task = TaskSpec::new("t100", "exec-1");
    task.labels
        .insert("fileName".to_string(), file.to_string_lossy().to_string());
    for (k, v) in extra {
        task.labels.insert(k.to_string(), v.to_string());
    }
    task.port_ranges = vec![PortRange { begin: 30000, end: 30005 }];
    task
}

/// A context wired to a fake runtime, for unit tests below the executor.
pub(crate) fn ctx_for(
    settings: Arc<Settings>,
    runtime: FakeRuntime,
    task: TaskSpec,
    is_service: bool,
) -> ExecutorContext {
    let pod = Pod::new(task, is_service, vec![GeneralPlugin::NAME.to_string()]);
    ExecutorContext::new(Arc::new(pod), settings, Arc::new(runtime))
}

pub(crate) fn empty_pipeline() -> Pipeline {
    Pipeline::new(Arc::new(PluginRegistry::new()))
}

/// Counts kill-path hook invocations.
#[derive(Default)]
pub(crate) struct KillRecorder {
    pub pre_kills: Mutex<Vec<String>>,
    pub post_kills: Mutex<usize>,
}

pub(crate) struct RecordingKillPlugin {
    pub name: String,
    pub recorder: Arc<KillRecorder>,
}

#[async_trait]
impl ComposePlugin for RecordingKillPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    async fn pre_kill_task(&self, _ctx: &ExecutorContext) -> Result<(), PluginError> {
        self.recorder.pre_kills.lock().push(self.name.clone());
        Ok(())
    }

    async fn post_kill_task(&self, _ctx: &ExecutorContext) -> Result<(), PluginError> {
        *self.recorder.post_kills.lock() += 1;
        Ok(())
    }
}

pub(crate) struct ExecutorFixture {
    pub executor: Arc<PodExecutor>,
    pub driver: Arc<FakeDriver>,
    pub runtime: FakeRuntime,
    pub recorder: Arc<KillRecorder>,
}

/// A full executor with the general plugin, default monitor, and a
/// kill-recording plugin named `recorder` (not in the default order).
pub(crate) fn executor_fixture(dir: &Path, runtime: FakeRuntime) -> ExecutorFixture {
    let settings = test_settings(dir);
    let registry = Arc::new(PluginRegistry::new());
    registry.register_plugin(Arc::new(GeneralPlugin));
    registry.register_monitor(DefaultMonitor::NAME, Arc::new(DefaultMonitor));
    let recorder = Arc::new(KillRecorder::default());
    registry.register_plugin(Arc::new(RecordingKillPlugin {
        name: "recorder".to_string(),
        recorder: recorder.clone(),
    }));

    let executor = Arc::new(PodExecutor::new(
        settings,
        registry,
        Arc::new(runtime.clone()),
        Arc::new(LabelPayloadDecoder),
    ));
    let driver = Arc::new(FakeDriver::new());
    executor.registered(driver.clone());
    ExecutorFixture {
        executor,
        driver,
        runtime,
        recorder,
    }
}

/// Spin (virtual time) until the driver has seen `n` updates.
pub(crate) async fn wait_for_updates(driver: &FakeDriver, n: usize) {
    for _ in 0..20_000 {
        if driver.updates().len() >= n {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
    panic!(
        "driver never reached {n} updates, saw {:?}",
        driver.updates()
    );
}
