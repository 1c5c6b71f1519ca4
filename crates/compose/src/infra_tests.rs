// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for infra-container document synthesis.

use super::*;
use podx_core::NetworkSpec;
use serde_yaml::Value;

fn spec(network: Option<NetworkSpec>) -> InfraSpec {
    InfraSpec {
        service: "networkproxy".to_string(),
        container_name: "networkproxy".to_string(),
        image: "busybox:latest".to_string(),
        network,
    }
}

#[test]
fn minimal_document_without_network_section() {
    let doc = infra_document(&spec(None)).unwrap();
    assert_eq!(doc["version"].as_str(), Some("2.1"));
    let service = &doc["services"]["networkproxy"];
    assert_eq!(service["container_name"].as_str(), Some("networkproxy"));
    assert_eq!(service["image"].as_str(), Some("busybox:latest"));
    assert!(doc.get("networks").is_none());
}

#[test]
fn pre_existing_network_becomes_external_reference() {
    let doc = infra_document(&spec(Some(NetworkSpec {
        pre_exist: true,
        name: "shared-net".to_string(),
        driver: String::new(),
    })))
    .unwrap();
    assert_eq!(
        doc["networks"]["default"]["external"]["name"].as_str(),
        Some("shared-net")
    );
    // external networks are referenced, not attached per-service
    assert!(doc["services"]["networkproxy"].get("networks").is_none());
}

#[test]
fn pre_existing_network_requires_a_name() {
    let result = infra_document(&spec(Some(NetworkSpec {
        pre_exist: true,
        name: String::new(),
        driver: String::new(),
    })));
    assert!(matches!(result, Err(ManifestError::MissingNetworkName)));
}

#[test]
fn managed_network_declares_driver_and_attaches() {
    let doc = infra_document(&spec(Some(NetworkSpec {
        pre_exist: false,
        name: "podnet".to_string(),
        driver: "bridge".to_string(),
    })))
    .unwrap();
    assert_eq!(doc["networks"]["podnet"]["driver"].as_str(), Some("bridge"));
    let attached: Vec<&str> = doc["services"]["networkproxy"]["networks"]
        .as_sequence()
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert_eq!(attached, vec!["podnet"]);
}
