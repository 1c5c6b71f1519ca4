// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess wait and retry helpers.

use crate::error::WaitError;
use std::process::ExitStatus;
use std::time::Duration;
use tokio::process::{Child, Command};

/// Wait for a spawned subprocess, bounded by `timeout` (zero = unbounded).
///
/// On expiry the subprocess is left running; callers own the kill.
pub async fn wait_cmd(timeout: Duration, child: &mut Child) -> Result<ExitStatus, WaitError> {
    if timeout.is_zero() {
        return Ok(child.wait().await?);
    }
    match tokio::time::timeout(timeout, child.wait()).await {
        Ok(status) => Ok(status?),
        Err(_) => Err(WaitError::Timeout),
    }
}

/// Run a command up to `retries` times, backing off `(attempt + 1) *
/// interval` between failures. Returns captured stdout of the first
/// successful run.
pub async fn retry_cmd<F>(
    retries: usize,
    interval: Duration,
    mut build: F,
) -> Result<Vec<u8>, WaitError>
where
    F: FnMut() -> Command,
{
    let mut last_err = WaitError::Timeout;
    for attempt in 0..retries {
        let mut cmd = build();
        match cmd.output().await {
            Ok(out) if out.status.success() => return Ok(out.stdout),
            Ok(out) => {
                let stderr = String::from_utf8_lossy(&out.stderr).trim().to_string();
                tracing::warn!(attempt, code = ?out.status.code(), %stderr, "command failed");
                last_err = WaitError::CommandFailed { code: out.status.code(), stderr };
            }
            Err(source) => {
                tracing::warn!(attempt, error = %source, "failed to run command");
                last_err = WaitError::Io(source);
            }
        }
        if attempt + 1 < retries {
            tokio::time::sleep(interval * (attempt as u32 + 1)).await;
        }
    }
    Err(last_err)
}

#[cfg(test)]
#[path = "cmd_tests.rs"]
mod tests;
