// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! podx-compose: the in-memory, plugin-mutable model of merged compose
//! manifests — parse, rewrite, and materialize.

mod error;
mod infra;
mod model;
mod rewrite;

pub use error::ManifestError;
pub use infra::{infra_document, InfraSpec};
pub use model::{ManifestSet, SinglePort, GENERATED_SUFFIX, INFRA_FILE, TRACE_FOLDER};
pub use rewrite::{rewrite, RewriteOutcome, RewriteSpec};

// Compose document keys the rewriter touches.
pub(crate) const SERVICES: &str = "services";
pub(crate) const VERSION: &str = "version";
pub(crate) const NETWORKS: &str = "networks";
pub(crate) const CONTAINER_NAME: &str = "container_name";
pub(crate) const IMAGE: &str = "image";
pub(crate) const NETWORK_MODE: &str = "network_mode";
pub(crate) const ENVIRONMENT: &str = "environment";
pub(crate) const LABELS: &str = "labels";
pub(crate) const PORTS: &str = "ports";
pub(crate) const LINKS: &str = "links";
pub(crate) const RESTART: &str = "restart";
pub(crate) const EXTRA_HOSTS: &str = "extra_hosts";
pub(crate) const CGROUP_PARENT: &str = "cgroup_parent";
pub(crate) const HOST_MODE: &str = "host";
pub(crate) const NONE_MODE: &str = "none";
pub(crate) const TASK_ID_LABEL: &str = "taskId";
pub(crate) const EXECUTOR_ID_LABEL: &str = "executorId";
