// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Infra-container document synthesis.
//!
//! The infra container provides the shared network namespace for the pod's
//! other services. Its document is generated, never user-supplied.

use crate::error::ManifestError;
use crate::{CONTAINER_NAME, IMAGE, NETWORKS, SERVICES, VERSION};
use podx_core::NetworkSpec;
use serde_yaml::{Mapping, Value};

/// Inputs for the synthesized infra document.
#[derive(Debug, Clone)]
pub struct InfraSpec {
    /// Compose service name of the infra container.
    pub service: String,
    pub container_name: String,
    pub image: String,
    /// Network section from config; `None` leaves the engine's default
    /// network in place.
    pub network: Option<NetworkSpec>,
}

/// Build the infra-container compose document.
pub fn infra_document(spec: &InfraSpec) -> Result<Value, ManifestError> {
    let mut detail = Mapping::new();
    detail.insert(Value::from(CONTAINER_NAME), Value::from(spec.container_name.clone()));
    detail.insert(Value::from(IMAGE), Value::from(spec.image.clone()));

    let mut doc = Mapping::new();

    if let Some(network) = &spec.network {
        if network.pre_exist {
            if network.name.is_empty() {
                return Err(ManifestError::MissingNetworkName);
            }
            // reference the externally managed network
            let mut name = Mapping::new();
            name.insert(Value::from("name"), Value::from(network.name.clone()));
            let mut external = Mapping::new();
            external.insert(Value::from("external"), Value::Mapping(name));
            let mut networks = Mapping::new();
            networks.insert(Value::from("default"), Value::Mapping(external));
            doc.insert(Value::from(NETWORKS), Value::Mapping(networks));
        } else {
            let mut driver = Mapping::new();
            driver.insert(Value::from("driver"), Value::from(network.driver.clone()));
            let mut networks = Mapping::new();
            networks.insert(Value::from(network.name.clone()), Value::Mapping(driver));
            doc.insert(Value::from(NETWORKS), Value::Mapping(networks));
            detail.insert(
                Value::from(NETWORKS),
                Value::Sequence(vec![Value::from(network.name.clone())]),
            );
        }
    }

    let mut services = Mapping::new();
    services.insert(Value::from(spec.service.clone()), Value::Mapping(detail));
    doc.insert(Value::from(SERVICES), Value::Mapping(services));
    doc.insert(Value::from(VERSION), Value::from("2.1"));

    Ok(Value::Mapping(doc))
}

#[cfg(test)]
#[path = "infra_tests.rs"]
mod tests;
