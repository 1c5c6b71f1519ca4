// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Concurrency-safe settings store.
//!
//! Keys are dotted paths. Writers: the initial file load, plugin config
//! merges, and host-label overrides during `LaunchTask` setup. Readers:
//! every component.

use crate::keys;
use indexmap::IndexMap;
use parking_lot::RwLock;
use podx_core::NetworkSpec;
use serde_yaml::Value;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },
    #[error("config file {0} is not a mapping")]
    NotAMapping(String),
}

/// Keyed settings with defaults.
pub struct Settings {
    map: RwLock<HashMap<String, Value>>,
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

impl Settings {
    /// A store seeded with the core defaults.
    pub fn new() -> Self {
        let settings = Self {
            map: RwLock::new(HashMap::new()),
        };
        settings.seed_defaults();
        settings
    }

    /// Load a YAML config file on top of the defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let settings = Self::new();
        settings.merge_file(path)?;
        Ok(settings)
    }

    /// Merge another YAML file into the store; file values override
    /// existing keys. Plugins use this at registration.
    pub fn merge_file(&self, path: &Path) -> Result<(), ConfigError> {
        let path_display = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path_display.clone(),
            source,
        })?;
        let doc: Value = serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path_display.clone(),
            source,
        })?;
        let Value::Mapping(mapping) = doc else {
            return Err(ConfigError::NotAMapping(path_display));
        };
        let mut map = self.map.write();
        flatten_into(&mut map, String::new(), &Value::Mapping(mapping));
        tracing::info!(path = %path_display, "merged config file");
        Ok(())
    }

    pub fn set(&self, key: &str, value: Value) {
        tracing::debug!(key, value = ?value, "set config");
        self.map.write().insert(key.to_string(), value);
    }

    /// Set a key only when it has no value yet.
    pub fn set_default(&self, key: &str, value: Value) {
        self.map.write().entry(key.to_string()).or_insert(value);
    }

    pub fn is_set(&self, key: &str) -> bool {
        self.map.read().contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.map.read().get(key).cloned()
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key)? {
            Value::Bool(b) => Some(b),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        match self.get(key)? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Immediate string-valued children of a dotted prefix.
    pub fn section(&self, prefix: &str) -> IndexMap<String, String> {
        let full = format!("{prefix}.");
        let map = self.map.read();
        let mut out: Vec<(String, String)> = map
            .iter()
            .filter_map(|(k, v)| {
                let rest = k.strip_prefix(&full)?;
                if rest.contains('.') {
                    return None;
                }
                let rendered = match v {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    _ => return None,
                };
                Some((rest.to_string(), rendered))
            })
            .collect();
        out.sort();
        out.into_iter().collect()
    }

    /// Apply host-label overrides.
    ///
    /// A label whose key contains `config.` overrides the key to the right
    /// of that prefix — but only when the key already has a value. Unknown
    /// keys are ignored with a warning.
    pub fn apply_label_overrides<'a>(&self, labels: impl Iterator<Item = (&'a str, &'a str)>) {
        for (key, value) in labels {
            let Some(idx) = key.find(keys::OVERRIDE_PREFIX) else {
                continue;
            };
            let target = &key[idx + keys::OVERRIDE_PREFIX.len()..];
            if target.is_empty() {
                continue;
            }
            if !self.is_set(target) {
                tracing::warn!(key = target, "ignoring config override for unset key");
                continue;
            }
            tracing::info!(key = target, value, "applying config override from task label");
            self.set(target, parse_scalar(value));
        }
    }

    // --- typed getters, defaults per the configuration contract ---

    pub fn launch_timeout(&self) -> Duration {
        Duration::from_millis(self.get_u64(keys::LAUNCH_TIMEOUT).unwrap_or(500_000))
    }

    pub fn pod_monitor_interval(&self) -> Duration {
        Duration::from_millis(self.get_u64(keys::POD_MONITOR_INTERVAL).unwrap_or(10_000))
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.get_u64(keys::RETRY_INTERVAL).unwrap_or(10_000))
    }

    pub fn max_retry(&self) -> usize {
        self.get_u64(keys::MAX_RETRY).map(|n| n.max(1) as usize).unwrap_or(3)
    }

    pub fn pull_retry(&self) -> usize {
        self.get_u64(keys::PULL_RETRY).map(|n| n.max(1) as usize).unwrap_or(3)
    }

    pub fn skip_pull(&self) -> bool {
        self.get_bool(keys::SKIP_PULL).unwrap_or(false)
    }

    pub fn compose_trace(&self) -> bool {
        self.get_bool(keys::COMPOSE_TRACE).unwrap_or(false)
    }

    pub fn debug(&self) -> bool {
        self.get_bool(keys::DEBUG).unwrap_or(false)
    }

    pub fn compose_http_timeout_secs(&self) -> u64 {
        self.get_u64(keys::COMPOSE_HTTP_TIMEOUT).unwrap_or(300)
    }

    pub fn cleanpod_timeout_secs(&self) -> u64 {
        self.get_u64(keys::CLEANPOD_TIMEOUT).unwrap_or(10)
    }

    pub fn clean_volumes_on_kill(&self) -> bool {
        self.get_bool(keys::CLEAN_VOLUME_AND_CONTAINER_ON_KILL).unwrap_or(false)
    }

    pub fn clean_images_on_kill(&self) -> bool {
        self.get_bool(keys::CLEAN_IMAGE_ON_KILL).unwrap_or(false)
    }

    pub fn clean_fail_task(&self) -> bool {
        self.get_bool(keys::CLEAN_FAIL_TASK).unwrap_or(true)
    }

    /// Whether an unhealthy probe fails the pod during periodic monitoring.
    pub fn unhealthy_fails(&self) -> bool {
        self.get_bool(keys::UNHEALTHY_FAILS).unwrap_or(true)
    }

    pub fn app_folder(&self) -> String {
        self.get_string(keys::FOLDER_NAME).unwrap_or_else(|| "poddata".to_string())
    }

    pub fn dump_on_timeout(&self) -> bool {
        self.get_bool(keys::DOCKER_DUMP).unwrap_or(false)
    }

    pub fn monitor_name(&self) -> String {
        self.get_string(keys::MONITOR_NAME).unwrap_or_else(|| "default".to_string())
    }

    pub fn infra_container_name(&self) -> String {
        self.get_string(keys::INFRA_CONTAINER_NAME)
            .unwrap_or_else(|| keys::INFRA_SERVICE.to_string())
    }

    pub fn infra_image(&self) -> String {
        self.get_string(keys::INFRA_IMAGE).unwrap_or_else(|| "busybox:latest".to_string())
    }

    /// The infra network section, or `None` when not configured.
    pub fn network(&self) -> Option<NetworkSpec> {
        let pre_exist = self.get_bool(keys::INFRA_NETWORK_PRE_EXISTING);
        let name = self.get_string(keys::INFRA_NETWORK_NAME);
        let driver = self.get_string(keys::INFRA_NETWORK_DRIVER);
        if pre_exist.is_none() && name.is_none() && driver.is_none() {
            return None;
        }
        let mut spec = NetworkSpec {
            pre_exist: pre_exist.unwrap_or(false),
            name: name.unwrap_or_default(),
            driver: driver.unwrap_or_default(),
        };
        if !spec.pre_exist {
            if spec.name.is_empty() {
                spec.name = podx_core::network::DEFAULT_NETWORK_NAME.to_string();
            }
            if spec.driver.is_empty() {
                spec.driver = podx_core::network::DEFAULT_NETWORK_DRIVER.to_string();
            }
        }
        Some(spec)
    }

    fn seed_defaults(&self) {
        let mut map = self.map.write();
        let defaults: &[(&str, Value)] = &[
            (keys::LAUNCH_TIMEOUT, Value::from(500_000u64)),
            (keys::POD_MONITOR_INTERVAL, Value::from(10_000u64)),
            (keys::RETRY_INTERVAL, Value::from(10_000u64)),
            (keys::MAX_RETRY, Value::from(3u64)),
            (keys::PULL_RETRY, Value::from(3u64)),
            (keys::SKIP_PULL, Value::from(false)),
            (keys::COMPOSE_TRACE, Value::from(false)),
            (keys::DEBUG, Value::from(false)),
            (keys::COMPOSE_HTTP_TIMEOUT, Value::from(300u64)),
            (keys::CLEANPOD_TIMEOUT, Value::from(10u64)),
            (keys::CLEAN_FAIL_TASK, Value::from(true)),
            (keys::UNHEALTHY_FAILS, Value::from(true)),
            (keys::FOLDER_NAME, Value::from("poddata")),
            (keys::MONITOR_NAME, Value::from("default")),
        ];
        for (key, value) in defaults {
            map.insert((*key).to_string(), value.clone());
        }
    }
}

/// Flatten nested mappings into dotted keys; scalars and sequences are
/// stored at their path.
fn flatten_into(map: &mut HashMap<String, Value>, prefix: String, value: &Value) {
    match value {
        Value::Mapping(mapping) => {
            for (k, v) in mapping {
                let Some(key) = k.as_str() else {
                    tracing::warn!(?k, "skipping non-string config key");
                    continue;
                };
                let path = if prefix.is_empty() {
                    key.to_string()
                } else {
                    format!("{prefix}.{key}")
                };
                match v {
                    Value::Mapping(_) => flatten_into(map, path, v),
                    other => {
                        map.insert(path, other.clone());
                    }
                }
            }
        }
        other => {
            if !prefix.is_empty() {
                map.insert(prefix, other.clone());
            }
        }
    }
}

/// Parse an override label value as a YAML scalar so booleans and numbers
/// keep their types.
fn parse_scalar(raw: &str) -> Value {
    serde_yaml::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
