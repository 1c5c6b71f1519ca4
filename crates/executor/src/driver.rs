// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The host-driver seam.
//!
//! The cluster scheduler's transport hands the executor a driver handle;
//! the executor only ever sends status updates through it and stops it.

use async_trait::async_trait;
use podx_core::TaskState;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("status update failed: {0}")]
    Send(String),
}

/// Handle to the host framework's transport.
#[async_trait]
pub trait HostDriver: Send + Sync + 'static {
    /// Report one task state transition to the host.
    async fn send_status_update(&self, task_id: &str, state: TaskState)
        -> Result<(), DriverError>;

    /// Stop the transport; the process exits soon after.
    async fn stop(&self);
}

/// Driver used when no transport is wired in: logs every update.
#[derive(Debug, Default)]
pub struct LoggingDriver;

#[async_trait]
impl HostDriver for LoggingDriver {
    async fn send_status_update(
        &self,
        task_id: &str,
        state: TaskState,
    ) -> Result<(), DriverError> {
        tracing::info!(task_id, state = %state, "status update");
        Ok(())
    }

    async fn stop(&self) {
        tracing::info!("driver stop requested");
    }
}

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;
    use parking_lot::Mutex;

    /// Records status updates for assertions.
    #[derive(Debug, Default)]
    pub struct FakeDriver {
        updates: Mutex<Vec<(String, TaskState)>>,
        stopped: Mutex<bool>,
        fail_sends: Mutex<bool>,
    }

    impl FakeDriver {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn updates(&self) -> Vec<(String, TaskState)> {
            self.updates.lock().clone()
        }

        pub fn states(&self) -> Vec<TaskState> {
            self.updates.lock().iter().map(|(_, s)| *s).collect()
        }

        pub fn stopped(&self) -> bool {
            *self.stopped.lock()
        }

        pub fn set_fail_sends(&self, fail: bool) {
            *self.fail_sends.lock() = fail;
        }
    }

    #[async_trait]
    impl HostDriver for FakeDriver {
        async fn send_status_update(
            &self,
            task_id: &str,
            state: TaskState,
        ) -> Result<(), DriverError> {
            if *self.fail_sends.lock() {
                return Err(DriverError::Send("scripted send failure".to_string()));
            }
            self.updates.lock().push((task_id.to_string(), state));
            Ok(())
        }

        async fn stop(&self) {
            *self.stopped.lock() = true;
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeDriver;
