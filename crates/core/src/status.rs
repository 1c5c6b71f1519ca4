// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pod, task, and container-health status enumerations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Internal pod lifecycle status.
///
/// Single writer: the task state machine. Readers: the runtime adapter,
/// the health monitor, and status hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PodStatus {
    Staging,
    Starting,
    Running,
    Failed,
    Killed,
    Finished,
    PullFailed,
    ManifestCheckFailed,
    /// Sentinel for "no verdict yet" — never reported to the host.
    Empty,
}

impl PodStatus {
    /// Terminal statuses admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PodStatus::Failed | PodStatus::Killed | PodStatus::Finished)
    }

    /// Map to the host-facing task state. `Empty` has no mapping.
    pub fn task_state(&self) -> Option<TaskState> {
        match self {
            PodStatus::Staging => Some(TaskState::Staging),
            PodStatus::Starting => Some(TaskState::Starting),
            PodStatus::Running => Some(TaskState::Running),
            PodStatus::Finished => Some(TaskState::Finished),
            PodStatus::Failed | PodStatus::PullFailed | PodStatus::ManifestCheckFailed => {
                Some(TaskState::Failed)
            }
            PodStatus::Killed => Some(TaskState::Killed),
            PodStatus::Empty => None,
        }
    }

    /// Parse the wire form back into a status. Unknown strings map to `Empty`.
    pub fn parse(s: &str) -> PodStatus {
        match s {
            "POD_STAGING" => PodStatus::Staging,
            "POD_STARTING" => PodStatus::Starting,
            "POD_RUNNING" => PodStatus::Running,
            "POD_FAILED" => PodStatus::Failed,
            "POD_KILLED" => PodStatus::Killed,
            "POD_FINISHED" => PodStatus::Finished,
            "POD_PULL_FAILED" => PodStatus::PullFailed,
            "POD_MANIFEST_CHECK_FAILED" => PodStatus::ManifestCheckFailed,
            _ => PodStatus::Empty,
        }
    }
}

impl fmt::Display for PodStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PodStatus::Staging => "POD_STAGING",
            PodStatus::Starting => "POD_STARTING",
            PodStatus::Running => "POD_RUNNING",
            PodStatus::Failed => "POD_FAILED",
            PodStatus::Killed => "POD_KILLED",
            PodStatus::Finished => "POD_FINISHED",
            PodStatus::PullFailed => "POD_PULL_FAILED",
            PodStatus::ManifestCheckFailed => "POD_MANIFEST_CHECK_FAILED",
            PodStatus::Empty => "",
        };
        f.write_str(s)
    }
}

/// Task state reported to the host framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskState {
    Staging,
    Starting,
    Running,
    Finished,
    Failed,
    Killed,
}

impl TaskState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskState::Finished | TaskState::Failed | TaskState::Killed)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskState::Staging => "TASK_STAGING",
            TaskState::Starting => "TASK_STARTING",
            TaskState::Running => "TASK_RUNNING",
            TaskState::Finished => "TASK_FINISHED",
            TaskState::Failed => "TASK_FAILED",
            TaskState::Killed => "TASK_KILLED",
        };
        f.write_str(s)
    }
}

/// Container health as reported by the engine's health probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HealthStatus {
    Starting,
    Healthy,
    Unhealthy,
    #[default]
    Unknown,
}

impl HealthStatus {
    /// Parse the engine's inspect output. Anything unrecognized is `Unknown`.
    pub fn parse(s: &str) -> HealthStatus {
        match s {
            "starting" => HealthStatus::Starting,
            "healthy" => HealthStatus::Healthy,
            "unhealthy" => HealthStatus::Unhealthy,
            _ => HealthStatus::Unknown,
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HealthStatus::Starting => "starting",
            HealthStatus::Healthy => "healthy",
            HealthStatus::Unhealthy => "unhealthy",
            HealthStatus::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
