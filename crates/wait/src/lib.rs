// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! podx-wait: timed polls, bounded retries with backoff, and cancellable
//! subprocess waits.

mod cmd;
mod error;
mod poll;

pub use cmd::{retry_cmd, wait_cmd};
pub use error::WaitError;
pub use poll::{poll_forever, poll_retry, poll_until, wait_until};
