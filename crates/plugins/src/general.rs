// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The built-in `general` plugin.
//!
//! Owns the manifest work of a launch: parses the pod's compose files into
//! the shared model, synthesizes the infra-container document, and applies
//! the service rewrites. After launch it resolves dynamically published
//! single ports.

use crate::context::ExecutorContext;
use crate::traits::{ComposePlugin, PluginError};
use async_trait::async_trait;
use podx_compose::{infra_document, InfraSpec, ManifestSet, RewriteSpec, INFRA_FILE};
use podx_config::INFRA_SERVICE;
use podx_core::PodStatus;
use std::path::{Path, PathBuf};

pub struct GeneralPlugin;

impl GeneralPlugin {
    pub const NAME: &'static str = "general";
}

#[async_trait]
impl ComposePlugin for GeneralPlugin {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn launch_task_pre_image_pull(&self, ctx: &ExecutorContext) -> Result<(), PluginError> {
        let files = ctx.pod.files();
        tracing::info!(files = files.len(), "general: building manifest model");

        // Parse the task's compose files unless an earlier plugin already did.
        let parsed = if ctx.with_manifests(|m| m.is_empty()) {
            Some(ManifestSet::parse(&files)?)
        } else {
            None
        };
        if let Some(set) = parsed {
            ctx.with_manifests(|manifests| *manifests = set);
        }

        let app_folder = PathBuf::from(ctx.settings.app_folder());
        let infra_file = app_folder.join(INFRA_FILE);
        let infra = infra_document(&InfraSpec {
            service: INFRA_SERVICE.to_string(),
            container_name: ctx.settings.infra_container_name(),
            image: ctx.settings.infra_image(),
            network: ctx.settings.network(),
        })?;

        let spec = RewriteSpec {
            task_id: ctx.pod.task.task_id.clone(),
            executor_id: ctx.pod.task.executor_id.clone(),
            cgroup_root: working_dir_basename(),
            assigned_ports: ctx.pod.task.ports(),
            infra_service: INFRA_SERVICE.to_string(),
            folder_name: folder_basename(&app_folder),
            extra_labels: ctx.pod.task.container_labels(),
        };

        let outcome = ctx.with_manifests(|manifests| {
            manifests.insert_document(infra_file.clone(), infra);
            manifests.set_infra_file(infra_file.clone());
            podx_compose::rewrite(manifests, &spec)
        })?;

        ctx.pod.set_service_names(outcome.service_names);
        ctx.pod.set_infra_removed(!outcome.infra_required);
        if let Some(name) = outcome.infra_container_name {
            ctx.pod.set_infra_container(name);
        }
        tracing::info!(
            ports_consumed = outcome.ports_consumed,
            infra_required = outcome.infra_required,
            "general: manifest rewrite complete"
        );
        Ok(())
    }

    async fn post_launch_task(&self, ctx: &ExecutorContext) -> Result<PodStatus, PluginError> {
        let singles = ctx.with_manifests(|manifests| manifests.single_ports().to_vec());
        if singles.is_empty() {
            return Ok(PodStatus::Empty);
        }
        let files = ctx.pod.files();
        for single in singles {
            match ctx
                .runtime
                .service_port(&files, &single.service, &single.container_port)
                .await
            {
                Ok(endpoint) => tracing::info!(
                    service = %single.service,
                    container_port = %single.container_port,
                    endpoint = %endpoint,
                    "resolved dynamically published port"
                ),
                Err(err) => tracing::warn!(
                    service = %single.service,
                    container_port = %single.container_port,
                    error = %err,
                    "failed to resolve dynamic port"
                ),
            }
        }
        Ok(PodStatus::Empty)
    }
}

fn working_dir_basename() -> String {
    std::env::current_dir()
        .ok()
        .and_then(|dir| dir.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_default()
}

fn folder_basename(folder: &Path) -> String {
    folder
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| folder.to_string_lossy().into_owned())
}

#[cfg(test)]
#[path = "general_tests.rs"]
mod tests;
