// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;
use thiserror::Error;

/// Errors from parsing, validating, rewriting, or materializing manifests.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest {file}: {source}")]
    Read {
        file: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse manifest {file}: {source}")]
    Parse {
        file: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("manifest {0} is not a mapping")]
    NotAMapping(PathBuf),

    #[error("manifest validation failed: {0}")]
    Validation(String),

    #[error("failed to write manifest {file}: {source}")]
    Write {
        file: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize manifest {file}: {source}")]
    Serialize {
        file: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("no host ports left for service {service}")]
    PortsExhausted { service: String },

    #[error("network name is required when pre_existing is true")]
    MissingNetworkName,
}
