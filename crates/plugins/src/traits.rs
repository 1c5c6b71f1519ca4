// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Plugin, status-hook, and monitor seams.

use crate::context::ExecutorContext;
use async_trait::async_trait;
use podx_core::PodStatus;
use thiserror::Error;

/// Errors crossing the plugin dispatch boundary.
#[derive(Debug, Error)]
pub enum PluginError {
    #[error("plugin {plugin} is not registered")]
    Unknown { plugin: String },

    #[error("plugin {plugin} panicked in {hook}: {message}")]
    Panic {
        plugin: String,
        hook: String,
        message: String,
    },

    #[error(transparent)]
    Manifest(#[from] podx_compose::ManifestError),

    #[error(transparent)]
    Runtime(#[from] podx_runtime::RuntimeError),

    #[error("{0}")]
    Other(String),
}

/// An error from a pod-status hook, carrying the hook's own verdict on
/// whether it must fail the execution or is best-effort.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HookError {
    pub fail_execution: bool,
    pub message: String,
}

/// A lifecycle plugin. Every hook has a no-op default so implementations
/// cover only the stages they care about.
#[async_trait]
pub trait ComposePlugin: Send + Sync {
    fn name(&self) -> &str;

    /// Runs before images are pulled; the only stage that may rewrite the
    /// manifest model.
    async fn launch_task_pre_image_pull(
        &self,
        _ctx: &ExecutorContext,
    ) -> Result<(), PluginError> {
        Ok(())
    }

    /// Runs between pull and start.
    async fn launch_task_post_image_pull(
        &self,
        _ctx: &ExecutorContext,
    ) -> Result<(), PluginError> {
        Ok(())
    }

    /// Runs after the pod is up. Returning [`PodStatus::Failed`] fails the
    /// launch; any other status is ignored.
    async fn post_launch_task(&self, _ctx: &ExecutorContext) -> Result<PodStatus, PluginError> {
        Ok(PodStatus::Empty)
    }

    /// Runs before the pod is stopped on a kill request. Errors are logged,
    /// not fatal.
    async fn pre_kill_task(&self, _ctx: &ExecutorContext) -> Result<(), PluginError> {
        Ok(())
    }

    /// Runs after the pod was stopped on kill or pull failure. Errors are
    /// logged, not fatal.
    async fn post_kill_task(&self, _ctx: &ExecutorContext) -> Result<(), PluginError> {
        Ok(())
    }

    /// Runs on executor shutdown. Errors are logged.
    async fn shutdown(&self, _ctx: &ExecutorContext) -> Result<(), PluginError> {
        Ok(())
    }
}

/// Secondary hooks subscribed to pod-status transitions.
#[async_trait]
pub trait PodStatusHook: Send + Sync {
    fn name(&self) -> &str;

    /// Invoked on every status transition during launch.
    async fn on_status(&self, ctx: &ExecutorContext, status: PodStatus) -> Result<(), HookError>;

    /// Invoked once when the driver stops, for cleanup.
    async fn shutdown(&self, _ctx: &ExecutorContext, _status: PodStatus) {}
}

/// Periodic pod monitor.
///
/// The implementation named by `podMonitor.monitorName` replaces the
/// default; anything satisfying this contract is accepted.
#[async_trait]
pub trait Monitor: Send + Sync {
    /// Poll the pod until a terminal verdict. Runs until it returns or the
    /// owning task is cancelled.
    async fn start(&self, ctx: &ExecutorContext) -> Result<PodStatus, PluginError>;
}
