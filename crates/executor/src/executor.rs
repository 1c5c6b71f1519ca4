// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Host-framework callbacks and per-task bookkeeping.
//!
//! The transport invokes these callbacks; each launch runs on its own
//! task, and kill/shutdown are serialized against the active pod's
//! status.

use crate::driver::HostDriver;
use crate::{launch, report, teardown};
use parking_lot::Mutex;
use podx_config::Settings;
use podx_core::{PayloadDecoder, Pod, PodStatus, TaskSpec, TaskState};
use podx_plugins::{
    DefaultMonitor, ExecutorContext, GeneralPlugin, Monitor, Pipeline, PluginRegistry,
};
use podx_runtime::ContainerRuntime;
use std::sync::Arc;
use tokio::task::JoinHandle;

struct ActiveTask {
    ctx: ExecutorContext,
    launch: JoinHandle<()>,
}

/// The executor the host transport drives.
pub struct PodExecutor {
    settings: Arc<Settings>,
    registry: Arc<PluginRegistry>,
    pipeline: Pipeline,
    runtime: Arc<dyn ContainerRuntime>,
    decoder: Arc<dyn PayloadDecoder>,
    driver: Mutex<Option<Arc<dyn HostDriver>>>,
    active: Mutex<Option<ActiveTask>>,
}

impl PodExecutor {
    pub fn new(
        settings: Arc<Settings>,
        registry: Arc<PluginRegistry>,
        runtime: Arc<dyn ContainerRuntime>,
        decoder: Arc<dyn PayloadDecoder>,
    ) -> Self {
        Self {
            settings,
            pipeline: Pipeline::new(registry.clone()),
            registry,
            runtime,
            decoder,
            driver: Mutex::new(None),
            active: Mutex::new(None),
        }
    }

    /// `Registered` / `Reregistered` callbacks stash the driver handle.
    pub fn registered(&self, driver: Arc<dyn HostDriver>) {
        tracing::info!("registered with host framework");
        *self.driver.lock() = Some(driver);
    }

    pub fn reregistered(&self, driver: Arc<dyn HostDriver>) {
        tracing::info!("re-registered with host framework");
        *self.driver.lock() = Some(driver);
    }

    pub fn disconnected(&self) {
        tracing::warn!("disconnected from host framework");
    }

    pub fn framework_message(&self, message: &str) {
        tracing::info!(message, "framework message");
    }

    pub fn error_message(&self, message: &str) {
        tracing::error!(message, "host reported an error");
    }

    /// `LaunchTask`: fire-and-forget entry into the state machine.
    pub fn launch_task(&self, task: TaskSpec) {
        let Some(driver) = self.driver() else {
            tracing::error!("launch before registration, dropping task");
            return;
        };
        if self.active.lock().is_some() {
            tracing::error!(task_id = %task.task_id, "a task is already active, dropping launch");
            return;
        }

        // Ingest config.<key> label overrides before anything reads settings.
        self.settings
            .apply_label_overrides(task.labels.iter().map(|(k, v)| (k.as_str(), v.as_str())));

        let is_service = self.decoder.is_service(&task);
        let order = self.plugin_order(&task);
        tracing::info!(
            task_id = %task.task_id,
            is_service,
            plugin_order = ?order,
            "launching task"
        );

        let pod = Arc::new(Pod::new(task, is_service, order));
        let ctx = ExecutorContext::new(pod, self.settings.clone(), self.runtime.clone());
        let monitor = self.select_monitor();
        let handle = tokio::spawn(launch::launch_task(
            ctx.clone(),
            self.pipeline.clone(),
            driver,
            monitor,
        ));
        *self.active.lock() = Some(ActiveTask { ctx, launch: handle });
    }

    /// `KillTask`: best-effort teardown, then report KILLED and stop the
    /// driver.
    pub async fn kill_task(&self, task_id: &str) {
        let Some(ctx) = self.active_ctx() else {
            tracing::warn!(task_id, "kill for unknown task");
            return;
        };
        if ctx.pod.task.task_id != task_id {
            tracing::warn!(
                task_id,
                active = %ctx.pod.task.task_id,
                "kill does not match the active task"
            );
            return;
        }
        let Some(driver) = self.driver() else {
            tracing::error!("kill without a driver");
            return;
        };

        let status = ctx.pod.status();
        match status {
            PodStatus::Failed => {
                tracing::info!(status = %status, "task already failed, ignoring kill");
            }
            PodStatus::Running => {
                tracing::info!(task_id, "killing running task");
                ctx.pod.set_status(PodStatus::Killed);
                ctx.cancel.cancel();

                self.pipeline.pre_kill(&ctx).await;
                teardown::stop_pod(&ctx).await;
                teardown::clean_after_kill(&ctx).await;

                report::send_task_state(&ctx, driver.as_ref(), TaskState::Killed).await;

                self.pipeline.post_kill(&ctx).await;
                report::stop_driver_after_grace(&ctx, &self.pipeline, driver.as_ref()).await;
            }
            other => {
                tracing::info!(status = %other, "ignoring kill in current status");
            }
        }
    }

    /// `Shutdown`: run shutdown hooks and stop everything.
    pub async fn shutdown(&self) {
        tracing::info!("shutdown requested");
        if let Some(ctx) = self.active_ctx() {
            ctx.cancel.cancel();
            self.pipeline.shutdown(&ctx).await;
            self.pipeline.shutdown_status_hooks(&ctx, ctx.pod.status()).await;
            if ctx.pod.status().is_terminal() {
                teardown::remove_generated_files(&ctx);
            }
        }
        if let Some(driver) = self.driver() {
            driver.stop().await;
        }
        if let Some(active) = self.active.lock().take() {
            active.launch.abort();
        }
    }

    /// The active launch's context, if any.
    pub fn active_ctx(&self) -> Option<ExecutorContext> {
        self.active.lock().as_ref().map(|a| a.ctx.clone())
    }

    fn driver(&self) -> Option<Arc<dyn HostDriver>> {
        self.driver.lock().clone()
    }

    fn plugin_order(&self, task: &TaskSpec) -> Vec<String> {
        if let Some(order) = task.plugin_order() {
            return order;
        }
        tracing::info!("pluginorder label missing, trying config");
        if let Some(raw) = self.settings.get_string(podx_config::PLUGIN_ORDER) {
            let order: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(String::from)
                .collect();
            if !order.is_empty() {
                return order;
            }
        }
        vec![GeneralPlugin::NAME.to_string()]
    }

    fn select_monitor(&self) -> Arc<dyn Monitor> {
        let name = self.settings.monitor_name();
        if let Some(monitor) = self.registry.monitor(&name) {
            return monitor;
        }
        tracing::warn!(monitor = %name, "monitor not registered, using default");
        Arc::new(DefaultMonitor)
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
