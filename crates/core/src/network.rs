// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Infra-container network configuration.

use serde::{Deserialize, Serialize};

pub const DEFAULT_NETWORK_DRIVER: &str = "bridge";
pub const DEFAULT_NETWORK_NAME: &str = "default";

/// How the infra container's network is created.
///
/// `pre_exist` selects an externally managed network (never torn down by the
/// executor); otherwise a named network is created with the given driver and
/// removed on pod stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkSpec {
    pub pre_exist: bool,
    pub name: String,
    pub driver: String,
}

impl Default for NetworkSpec {
    fn default() -> Self {
        Self {
            pre_exist: false,
            name: DEFAULT_NETWORK_NAME.to_string(),
            driver: DEFAULT_NETWORK_DRIVER.to_string(),
        }
    }
}
