// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! podx-config: process-wide keyed settings with defaults, file merge, and
//! host-label overrides.

mod keys;
mod settings;

pub use keys::*;
pub use settings::{ConfigError, Settings};
