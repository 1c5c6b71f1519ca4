// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dotted setting keys consumed by the executor core.

pub const LAUNCH_TIMEOUT: &str = "launchtask.timeout";
pub const POD_MONITOR_INTERVAL: &str = "launchtask.podmonitorinterval";
pub const PULL_RETRY: &str = "launchtask.pullretry";
pub const MAX_RETRY: &str = "launchtask.maxretry";
pub const RETRY_INTERVAL: &str = "launchtask.retryinterval";
pub const SKIP_PULL: &str = "launchtask.skippull";
pub const COMPOSE_TRACE: &str = "launchtask.composetrace";
pub const DEBUG: &str = "launchtask.debug";
pub const COMPOSE_HTTP_TIMEOUT: &str = "launchtask.composehttptimeout";

pub const CLEANPOD_TIMEOUT: &str = "cleanpod.timeout";
pub const CLEAN_VOLUME_AND_CONTAINER_ON_KILL: &str = "cleanpod.cleanvolumeandcontaineronmesoskill";
pub const CLEAN_IMAGE_ON_KILL: &str = "cleanpod.cleanimageonmesoskill";
pub const CLEAN_FAIL_TASK: &str = "cleanpod.cleanfailtask";
pub const UNHEALTHY_FAILS: &str = "cleanpod.unhealthy";

pub const INFRA_NETWORK_PRE_EXISTING: &str = "infracontainer.networks.pre_existing";
pub const INFRA_NETWORK_NAME: &str = "infracontainer.networks.name";
pub const INFRA_NETWORK_DRIVER: &str = "infracontainer.networks.driver";
pub const INFRA_CONTAINER_NAME: &str = "infracontainer.container_name";
pub const INFRA_IMAGE: &str = "infracontainer.image";

pub const FOLDER_NAME: &str = "foldername";
pub const DOCKER_DUMP: &str = "dockerdump.enabled";
pub const MONITOR_NAME: &str = "podMonitor.monitorName";
pub const PLUGIN_ORDER: &str = "plugins.pluginorder";

/// Label-key fragment marking a host-label config override.
pub const OVERRIDE_PREFIX: &str = "config.";

/// The infra service name used in synthesized manifests.
pub const INFRA_SERVICE: &str = "networkproxy";
