// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Signal-loop tests. These raise real signals; the handlers installed by
//! the loop replace the default dispositions for the test process.

use super::*;
use crate::logging::init_logging;
use crate::test_helpers::executor_fixture;
use nix::sys::signal::{raise, Signal};
use podx_runtime::FakeRuntime;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn sigusr1_toggles_debug_and_sigterm_shuts_down() {
    let dir = tempfile::tempdir().unwrap();
    let f = executor_fixture(dir.path(), FakeRuntime::new());
    let log_control = Arc::new(init_logging(false, None));
    assert!(!log_control.debug_enabled());

    let loop_task = tokio::spawn(run_signal_loop(f.executor.clone(), log_control.clone()));
    // let the handlers install before raising
    tokio::time::sleep(Duration::from_millis(100)).await;

    raise(Signal::SIGUSR1).unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(log_control.debug_enabled());

    raise(Signal::SIGTERM).unwrap();
    tokio::time::timeout(Duration::from_secs(5), loop_task)
        .await
        .expect("signal loop should shut down on SIGTERM")
        .unwrap();
    assert!(f.driver.stopped());
}
