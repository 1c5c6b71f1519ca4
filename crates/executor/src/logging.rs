// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracing bootstrap with a runtime-reloadable level.
//!
//! `SIGUSR1` toggles between info and debug without a restart.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{reload, EnvFilter, Registry};

/// Handle for the runtime debug toggle.
pub struct LogControl {
    handle: reload::Handle<EnvFilter, Registry>,
    debug: AtomicBool,
    _guard: Option<tracing_appender::non_blocking::WorkerGuard>,
}

impl LogControl {
    /// Flip between info and debug level.
    pub fn toggle_debug(&self) {
        let debug = !self.debug.load(Ordering::SeqCst);
        self.debug.store(debug, Ordering::SeqCst);
        let level = if debug { "debug" } else { "info" };
        match self.handle.reload(EnvFilter::new(level)) {
            Ok(()) => tracing::info!(level, "log level switched"),
            Err(err) => tracing::error!(error = %err, "failed to switch log level"),
        }
    }

    pub fn debug_enabled(&self) -> bool {
        self.debug.load(Ordering::SeqCst)
    }
}

/// Install the global subscriber: stdout plus an executor log file under
/// the app folder. Returns the reload handle for the debug toggle.
pub fn init_logging(debug: bool, log_dir: Option<&Path>) -> LogControl {
    let level = if debug { "debug" } else { "info" };
    let (filter, handle) = reload::Layer::new(EnvFilter::new(level));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::never(dir, "podx.out");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    if let Err(err) = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .try_init()
    {
        tracing::debug!(error = %err, "subscriber already installed");
    }

    LogControl {
        handle,
        debug: AtomicBool::new(debug),
        _guard: guard,
    }
}
