// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The explicitly passed executor context.
//!
//! Aggregates everything a launch touches — pod, settings, manifest set,
//! runtime handle, and the launch cancellation token. No singletons; tests
//! construct their own.

use parking_lot::Mutex;
use podx_compose::ManifestSet;
use podx_config::Settings;
use podx_core::Pod;
use podx_runtime::ContainerRuntime;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Shared state for one task launch.
#[derive(Clone)]
pub struct ExecutorContext {
    pub pod: Arc<Pod>,
    pub settings: Arc<Settings>,
    /// The manifest model, shared by reference during rewrite and frozen
    /// after the start stage.
    pub manifests: Arc<Mutex<ManifestSet>>,
    pub runtime: Arc<dyn ContainerRuntime>,
    /// Scopes the launch deadline; cancelled when the pod reaches
    /// RUNNING/FINISHED or on kill.
    pub cancel: CancellationToken,
}

impl ExecutorContext {
    pub fn new(
        pod: Arc<Pod>,
        settings: Arc<Settings>,
        runtime: Arc<dyn ContainerRuntime>,
    ) -> Self {
        Self {
            pod,
            settings,
            manifests: Arc::new(Mutex::new(ManifestSet::default())),
            runtime,
            cancel: CancellationToken::new(),
        }
    }

    /// Run a closure against the manifest set.
    pub fn with_manifests<T>(&self, f: impl FnOnce(&mut ManifestSet) -> T) -> T {
        let mut guard = self.manifests.lock();
        f(&mut guard)
    }
}
