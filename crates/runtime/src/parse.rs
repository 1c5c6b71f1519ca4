// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parsing of the engine's formatted inspect output.
//!
//! Inspect uses a comma-delimited template: with health
//! `pid,running,exitCode,health,restartCount,maxRetry,name` (7 fields),
//! without `pid,running,exitCode,restartCount,maxRetry,name` (6). Any other
//! field count is an error; no partial records.

use crate::error::RuntimeError;
use podx_core::{ContainerStatus, HealthStatus};

const FIELDS_WITH_HEALTH: usize = 7;
const FIELDS_WITHOUT_HEALTH: usize = 6;

/// Parse one inspect line into a container record.
pub fn parse_inspect(output: &str, want_health: bool) -> Result<ContainerStatus, RuntimeError> {
    let trimmed = output.trim().trim_matches('\'');
    let fields: Vec<&str> = trimmed.split(',').collect();
    let expected = if want_health { FIELDS_WITH_HEALTH } else { FIELDS_WITHOUT_HEALTH };
    if fields.len() != expected {
        return Err(RuntimeError::InspectFieldCount {
            expected,
            found: fields.len(),
            output: trimmed.to_string(),
        });
    }

    let status = if want_health {
        ContainerStatus {
            container_id: String::new(),
            pid: fields[0].parse().unwrap_or_default(),
            running: fields[1].parse().unwrap_or_default(),
            exit_code: fields[2].parse().unwrap_or_default(),
            health: HealthStatus::parse(fields[3]),
            restart_count: fields[4].parse().unwrap_or_default(),
            max_retry_count: fields[5].parse().unwrap_or_default(),
            name: fields[6].to_string(),
        }
    } else {
        ContainerStatus {
            container_id: String::new(),
            pid: fields[0].parse().unwrap_or_default(),
            running: fields[1].parse().unwrap_or_default(),
            exit_code: fields[2].parse().unwrap_or_default(),
            health: HealthStatus::Unknown,
            restart_count: fields[3].parse().unwrap_or_default(),
            max_retry_count: fields[4].parse().unwrap_or_default(),
            name: fields[5].to_string(),
        }
    };
    Ok(status)
}

/// Parse the single-field exit-code template.
pub fn parse_exit_code(output: &str) -> Result<i32, RuntimeError> {
    let trimmed = output.trim().trim_matches('\'');
    trimmed
        .parse()
        .map_err(|_| RuntimeError::ExitCodeParse(trimmed.to_string()))
}

#[cfg(test)]
#[path = "parse_tests.rs"]
mod tests;
