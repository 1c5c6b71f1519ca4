// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ordered hook dispatch with panic isolation.
//!
//! Forward-path stages stop at the first error; kill/shutdown stages log
//! and continue. A panic in any plugin is captured at the dispatch
//! boundary and translated into a [`PluginError::Panic`]; remaining
//! plugins in that stage do not run.

use crate::context::ExecutorContext;
use crate::registry::PluginRegistry;
use crate::traits::PluginError;
use futures::FutureExt;
use podx_core::PodStatus;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;

/// Dispatcher over the registered plugins.
#[derive(Clone)]
pub struct Pipeline {
    registry: Arc<PluginRegistry>,
}

impl Pipeline {
    pub fn new(registry: Arc<PluginRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    /// Pre-pull hooks, in `plugin_order`. Each invocation may snapshot the
    /// mutated manifests for tracing.
    pub async fn pre_image_pull(&self, ctx: &ExecutorContext) -> Result<(), PluginError> {
        let trace = ctx.settings.compose_trace();
        let app_folder = PathBuf::from(ctx.settings.app_folder());
        for (ordinal, plugin) in self.ordered(ctx)?.into_iter().enumerate() {
            let name = plugin.name().to_string();
            tracing::info!(plugin = %name, "running pre-image-pull hook");
            guarded(&name, "pre_image_pull", plugin.launch_task_pre_image_pull(ctx)).await?;
            if trace {
                ctx.with_manifests(|set| set.trace_dump(&app_folder, &name, ordinal));
            }
        }
        Ok(())
    }

    /// Post-pull hooks, in `plugin_order`.
    pub async fn post_image_pull(&self, ctx: &ExecutorContext) -> Result<(), PluginError> {
        for plugin in self.ordered(ctx)? {
            let name = plugin.name().to_string();
            tracing::info!(plugin = %name, "running post-image-pull hook");
            guarded(&name, "post_image_pull", plugin.launch_task_post_image_pull(ctx)).await?;
        }
        Ok(())
    }

    /// Post-launch hooks. Errors are logged; the first plugin reporting
    /// FAILED wins.
    pub async fn post_launch(&self, ctx: &ExecutorContext) -> PodStatus {
        let plugins = match self.ordered(ctx) {
            Ok(plugins) => plugins,
            Err(err) => {
                tracing::error!(error = %err, "cannot resolve plugin order for post-launch");
                return PodStatus::Failed;
            }
        };
        for plugin in plugins {
            let name = plugin.name().to_string();
            tracing::info!(plugin = %name, "running post-launch hook");
            match guarded(&name, "post_launch", plugin.post_launch_task(ctx)).await {
                Ok(PodStatus::Failed) => {
                    tracing::error!(plugin = %name, "post-launch hook reported FAILED");
                    return PodStatus::Failed;
                }
                Ok(status) => {
                    tracing::debug!(plugin = %name, status = %status, "post-launch hook done");
                }
                Err(err) => {
                    tracing::error!(plugin = %name, error = %err, "post-launch hook error");
                }
            }
        }
        PodStatus::Empty
    }

    /// Pre-kill hooks; errors logged, execution continues.
    pub async fn pre_kill(&self, ctx: &ExecutorContext) {
        self.best_effort(ctx, BestEffortStage::PreKill).await;
    }

    /// Post-kill hooks; errors logged, execution continues.
    pub async fn post_kill(&self, ctx: &ExecutorContext) {
        self.best_effort(ctx, BestEffortStage::PostKill).await;
    }

    /// Shutdown hooks; errors logged.
    pub async fn shutdown(&self, ctx: &ExecutorContext) {
        self.best_effort(ctx, BestEffortStage::Shutdown).await;
    }

    /// Notify status hooks of a transition, honoring each hook's
    /// fail-execution flag.
    pub async fn notify_status(
        &self,
        ctx: &ExecutorContext,
        status: PodStatus,
    ) -> Result<(), PluginError> {
        for hook in self.registry.status_hooks() {
            let name = hook.name().to_string();
            let outcome = AssertUnwindSafe(hook.on_status(ctx, status))
                .catch_unwind()
                .await;
            match outcome {
                Ok(Ok(())) => {}
                Ok(Err(err)) if err.fail_execution => {
                    return Err(PluginError::Other(format!(
                        "status hook {name} failed: {err}"
                    )));
                }
                Ok(Err(err)) => {
                    tracing::warn!(hook = %name, error = %err, "best-effort status hook failed");
                }
                Err(payload) => {
                    return Err(PluginError::Panic {
                        plugin: name,
                        hook: "on_status".to_string(),
                        message: panic_message(payload),
                    });
                }
            }
        }
        Ok(())
    }

    /// Give status hooks their shutdown callback.
    pub async fn shutdown_status_hooks(&self, ctx: &ExecutorContext, status: PodStatus) {
        for hook in self.registry.status_hooks() {
            let name = hook.name().to_string();
            if AssertUnwindSafe(hook.shutdown(ctx, status))
                .catch_unwind()
                .await
                .is_err()
            {
                tracing::warn!(hook = %name, "status hook panicked during shutdown");
            }
        }
    }

    fn ordered(
        &self,
        ctx: &ExecutorContext,
    ) -> Result<Vec<Arc<dyn crate::traits::ComposePlugin>>, PluginError> {
        self.registry.ordered(ctx.pod.plugin_order())
    }

    async fn best_effort(&self, ctx: &ExecutorContext, stage: BestEffortStage) {
        let hook = stage.name();
        let plugins = match self.ordered(ctx) {
            Ok(plugins) => plugins,
            Err(err) => {
                tracing::error!(error = %err, hook, "cannot resolve plugin order");
                return;
            }
        };
        for plugin in plugins {
            let name = plugin.name().to_string();
            let fut = match stage {
                BestEffortStage::PreKill => plugin.pre_kill_task(ctx),
                BestEffortStage::PostKill => plugin.post_kill_task(ctx),
                BestEffortStage::Shutdown => plugin.shutdown(ctx),
            };
            if let Err(err) = guarded(&name, hook, fut).await {
                tracing::error!(plugin = %name, hook, error = %err, "hook failed");
            }
        }
    }
}

#[derive(Clone, Copy)]
enum BestEffortStage {
    PreKill,
    PostKill,
    Shutdown,
}

impl BestEffortStage {
    fn name(self) -> &'static str {
        match self {
            BestEffortStage::PreKill => "pre_kill",
            BestEffortStage::PostKill => "post_kill",
            BestEffortStage::Shutdown => "shutdown",
        }
    }
}

/// Run one hook with panic capture.
async fn guarded<T>(
    plugin: &str,
    hook: &str,
    fut: impl Future<Output = Result<T, PluginError>>,
) -> Result<T, PluginError> {
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => Err(PluginError::Panic {
            plugin: plugin.to_string(),
            hook: hook.to_string(),
            message: panic_message(payload),
        }),
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
