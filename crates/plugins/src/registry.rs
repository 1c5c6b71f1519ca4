// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Plugin registration, keyed by name.

use crate::traits::{ComposePlugin, Monitor, PluginError, PodStatusHook};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Registries for lifecycle plugins, status hooks, and monitors.
#[derive(Default)]
pub struct PluginRegistry {
    plugins: Mutex<HashMap<String, Arc<dyn ComposePlugin>>>,
    status_hooks: Mutex<Vec<Arc<dyn PodStatusHook>>>,
    monitors: Mutex<HashMap<String, Arc<dyn Monitor>>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_plugin(&self, plugin: Arc<dyn ComposePlugin>) {
        let name = plugin.name().to_string();
        tracing::info!(plugin = %name, "registering plugin");
        self.plugins.lock().insert(name, plugin);
    }

    pub fn register_status_hook(&self, hook: Arc<dyn PodStatusHook>) {
        tracing::info!(hook = hook.name(), "registering pod status hook");
        self.status_hooks.lock().push(hook);
    }

    pub fn register_monitor(&self, name: &str, monitor: Arc<dyn Monitor>) {
        tracing::info!(monitor = name, "registering monitor plugin");
        self.monitors.lock().insert(name.to_string(), monitor);
    }

    /// Resolve plugins in the given order; a missing name is an error.
    pub fn ordered(&self, order: &[String]) -> Result<Vec<Arc<dyn ComposePlugin>>, PluginError> {
        let plugins = self.plugins.lock();
        order
            .iter()
            .map(|name| {
                plugins.get(name).cloned().ok_or_else(|| PluginError::Unknown {
                    plugin: name.clone(),
                })
            })
            .collect()
    }

    pub fn status_hooks(&self) -> Vec<Arc<dyn PodStatusHook>> {
        self.status_hooks.lock().clone()
    }

    pub fn monitor(&self, name: &str) -> Option<Arc<dyn Monitor>> {
        self.monitors.lock().get(name).cloned()
    }
}
