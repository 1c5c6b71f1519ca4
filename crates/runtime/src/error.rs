// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors surfaced to the state machine from the runtime adapter.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("image pull failed: {0}")]
    Pull(#[source] podx_wait::WaitError),

    #[error("pod start failed: {0}")]
    Start(String),

    #[error("pod stop failed: {0}")]
    Stop(String),

    #[error("inspect of container {container} failed: {message}")]
    Inspect { container: String, message: String },

    #[error("inspect output has {found} fields, expected {expected}: {output:?}")]
    InspectFieldCount {
        expected: usize,
        found: usize,
        output: String,
    },

    #[error("unparseable exit code in {0:?}")]
    ExitCodeParse(String),

    #[error("service {0} has no container")]
    ServiceNotFound(String),

    #[error("service {service} matches {count} containers")]
    AmbiguousService { service: String, count: usize },

    #[error(transparent)]
    Command(#[from] podx_wait::WaitError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
