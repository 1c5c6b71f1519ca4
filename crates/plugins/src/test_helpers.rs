// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for plugin and monitor tests.

use crate::context::ExecutorContext;
use indexmap::IndexMap;
use podx_config::Settings;
use podx_core::{Pod, TaskSpec};
use podx_runtime::FakeRuntime;
use std::sync::Arc;

pub(crate) fn test_task() -> TaskSpec {
    let mut task = TaskSpec::new("t100", "exec-1");
    task.labels.insert("fileName".to_string(), "a.yml".to_string());
    task
}

pub(crate) fn test_ctx(runtime: FakeRuntime, is_service: bool) -> ExecutorContext {
    let pod = Pod::new(test_task(), is_service, vec!["general".to_string()]);
    let settings = Settings::new();
    // fast polling keeps the paused-clock tests snappy
    settings.set("launchtask.podmonitorinterval", serde_yaml::Value::from(10u64));
    ExecutorContext::new(Arc::new(pod), Arc::new(settings), Arc::new(runtime))
}
