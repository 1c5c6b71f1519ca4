// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pod teardown and cleanup.

use podx_compose::GENERATED_SUFFIX;
use podx_plugins::ExecutorContext;

/// Gracefully stop the pod's containers and tear down the infra network.
pub async fn stop_pod(ctx: &ExecutorContext) {
    let files = ctx.pod.files();
    if files.is_empty() {
        return;
    }
    let timeout = ctx.settings.cleanpod_timeout_secs();
    if let Err(err) = ctx.runtime.stop_pod(&files, timeout).await {
        tracing::error!(error = %err, "failed to stop pod");
    }
    remove_infra_network(ctx).await;
}

/// Kill-path cleanup: volume/image removal per the cleanpod policy.
pub async fn clean_after_kill(ctx: &ExecutorContext) {
    let files = ctx.pod.files();
    if ctx.settings.clean_volumes_on_kill() {
        if let Err(err) = ctx.runtime.remove_volumes(&files).await {
            tracing::warn!(error = %err, "failed to remove containers and volumes");
        }
    }
    if ctx.settings.clean_images_on_kill() {
        if let Err(err) = ctx.runtime.remove_images(&files).await {
            tracing::warn!(error = %err, "failed to remove images");
        }
    }
}

/// Remove the pod's network unless it pre-exists or the infra container was
/// never created.
async fn remove_infra_network(ctx: &ExecutorContext) {
    if ctx.pod.infra_removed() {
        return;
    }
    if ctx.settings.network().is_some_and(|n| n.pre_exist) {
        return;
    }
    let Some(infra) = ctx.pod.infra_container() else {
        return;
    };
    match ctx.runtime.container_network(&infra).await {
        Ok(network) => {
            if let Err(err) = ctx.runtime.remove_network(&network).await {
                tracing::warn!(network = %network, error = %err, "failed to remove network");
            }
        }
        Err(err) => {
            tracing::warn!(container = %infra, error = %err, "failed to resolve pod network");
        }
    }
}

/// Delete the generated manifest files and the trace folder.
pub fn remove_generated_files(ctx: &ExecutorContext) {
    for file in ctx.pod.files() {
        if file.to_string_lossy().ends_with(GENERATED_SUFFIX) {
            if let Err(err) = std::fs::remove_file(&file) {
                tracing::debug!(file = %file.display(), error = %err, "failed to remove file");
            }
        }
    }
    let trace = std::path::PathBuf::from(ctx.settings.app_folder())
        .join(podx_compose::TRACE_FOLDER);
    if trace.exists() {
        if let Err(err) = std::fs::remove_dir_all(&trace) {
            tracing::debug!(error = %err, "failed to remove trace folder");
        }
    }
}
