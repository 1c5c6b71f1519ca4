// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process signal handling.
//!
//! SIGINT/SIGTERM shut the executor down; SIGUSR1 toggles debug logging
//! at runtime.

use crate::executor::PodExecutor;
use crate::logging::LogControl;
use std::sync::Arc;
use tokio::signal::unix::{signal, SignalKind};

/// Block on process signals until a shutdown signal arrives.
pub async fn run_signal_loop(executor: Arc<PodExecutor>, log_control: Arc<LogControl>) {
    let mut sigint = match signal(SignalKind::interrupt()) {
        Ok(stream) => stream,
        Err(err) => {
            tracing::error!(error = %err, "cannot install SIGINT handler");
            return;
        }
    };
    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(stream) => stream,
        Err(err) => {
            tracing::error!(error = %err, "cannot install SIGTERM handler");
            return;
        }
    };
    let mut sigusr1 = match signal(SignalKind::user_defined1()) {
        Ok(stream) => stream,
        Err(err) => {
            tracing::error!(error = %err, "cannot install SIGUSR1 handler");
            return;
        }
    };

    loop {
        tokio::select! {
            _ = sigint.recv() => {
                tracing::info!("SIGINT received, shutting down");
                executor.shutdown().await;
                return;
            }
            _ = sigterm.recv() => {
                tracing::info!("SIGTERM received, shutting down");
                executor.shutdown().await;
                return;
            }
            _ = sigusr1.recv() => {
                log_control.toggle_debug();
            }
        }
    }
}

#[cfg(test)]
#[path = "signals_tests.rs"]
mod tests;
