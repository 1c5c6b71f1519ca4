// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! podxd: the compose pod executor.
//!
//! Launched by the cluster scheduler on the host; the scheduler's
//! transport invokes the `PodExecutor` callbacks. Without a transport
//! wired in, a task file named by `PODX_TASK_FILE` can be launched
//! directly for local runs.

use podx_config::Settings;
use podx_core::{LabelPayloadDecoder, TaskSpec};
use podx_executor::{init_logging, run_signal_loop, LoggingDriver, PodExecutor};
use podx_plugins::{DefaultMonitor, GeneralPlugin, PluginRegistry};
use podx_runtime::ComposeCli;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const CONFIG_LOCATIONS: &[&str] = &["config.yml", "/etc/podx/config.yml"];

#[tokio::main]
async fn main() {
    let settings = Arc::new(load_settings());

    let app_folder = PathBuf::from(settings.app_folder());
    if let Err(err) = std::fs::create_dir_all(&app_folder) {
        eprintln!("cannot create app folder {}: {err}", app_folder.display());
        std::process::exit(1);
    }
    let log_control = Arc::new(init_logging(settings.debug(), Some(&app_folder)));
    tracing::info!("podxd starting");

    let registry = Arc::new(PluginRegistry::new());
    registry.register_plugin(Arc::new(GeneralPlugin));
    registry.register_monitor(DefaultMonitor::NAME, Arc::new(DefaultMonitor));

    // plugins may carry their own config file, merged over the defaults
    let general_config = Path::new("general.yml");
    if general_config.exists() {
        if let Err(err) = settings.merge_file(general_config) {
            tracing::warn!(error = %err, "failed to merge general.yml");
        }
    }

    let runtime = Arc::new(ComposeCli::new(settings.clone()));
    let executor = Arc::new(PodExecutor::new(
        settings,
        registry,
        runtime,
        Arc::new(LabelPayloadDecoder),
    ));
    executor.registered(Arc::new(LoggingDriver));

    if let Ok(task_file) = std::env::var("PODX_TASK_FILE") {
        match load_task(Path::new(&task_file)) {
            Ok(task) => executor.launch_task(task),
            Err(err) => {
                tracing::error!(file = %task_file, error = %err, "cannot load task file");
                std::process::exit(1);
            }
        }
    }

    run_signal_loop(executor, log_control).await;
    tracing::info!("podxd stopped");
}

fn load_settings() -> Settings {
    for location in CONFIG_LOCATIONS {
        let path = Path::new(location);
        if path.exists() {
            match Settings::from_file(path) {
                Ok(settings) => return settings,
                Err(err) => {
                    eprintln!("failed to load config {location}: {err}");
                    std::process::exit(1);
                }
            }
        }
    }
    eprintln!("no config file found, using defaults");
    Settings::new()
}

fn load_task(path: &Path) -> Result<TaskSpec, String> {
    let raw = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    serde_yaml::from_str(&raw).map_err(|e| e.to_string())
}
