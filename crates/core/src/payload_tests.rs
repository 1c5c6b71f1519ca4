// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for payload decoders.

use super::*;
use yare::parameterized;

#[parameterized(
    service = { "true", true },
    adhoc = { "false", false },
    garbage = { "yes", false },
)]
fn label_decoder_parses_is_service(value: &str, expected: bool) {
    let mut task = TaskSpec::new("t1", "e1");
    task.labels.insert("isService".to_string(), value.to_string());
    assert_eq!(LabelPayloadDecoder.is_service(&task), expected);
}

#[test]
fn label_decoder_defaults_to_adhoc() {
    let task = TaskSpec::new("t1", "e1");
    assert!(!LabelPayloadDecoder.is_service(&task));
}

#[test]
fn json_decoder_reads_payload() {
    let mut task = TaskSpec::new("t1", "e1");
    task.payload = Some(br#"{"isService": true}"#.to_vec());
    assert!(JsonPayloadDecoder.is_service(&task));
}

#[test]
fn json_decoder_falls_back_to_label_on_bad_payload() {
    let mut task = TaskSpec::new("t1", "e1");
    task.payload = Some(b"not json".to_vec());
    task.labels.insert("isService".to_string(), "true".to_string());
    assert!(JsonPayloadDecoder.is_service(&task));
}
