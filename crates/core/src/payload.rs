// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Service-vs-adhoc task classification.
//!
//! The host framework encodes whether a task is a long-running service in an
//! opaque payload. Decoding stays behind a trait so the executor never
//! couples to one framework's wire format.

use crate::task::TaskSpec;

/// Decodes the service flag from a task description.
pub trait PayloadDecoder: Send + Sync {
    /// Whether the task is a long-running service (exits are failures) as
    /// opposed to an adhoc job (clean exits are successes).
    fn is_service(&self, task: &TaskSpec) -> bool;
}

/// Default decoder: reads a plain `isService` boolean label.
///
/// Missing or unparseable labels classify the task as adhoc.
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelPayloadDecoder;

impl PayloadDecoder for LabelPayloadDecoder {
    fn is_service(&self, task: &TaskSpec) -> bool {
        match task.label("isService") {
            Some(v) => v.parse::<bool>().unwrap_or_else(|_| {
                tracing::warn!(value = v, "unparseable isService label, treating task as adhoc");
                false
            }),
            None => false,
        }
    }
}

/// Decoder for hosts that ship a JSON payload with an `isService` field.
///
/// Falls back to the label decoder when the payload is absent or malformed.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonPayloadDecoder;

impl PayloadDecoder for JsonPayloadDecoder {
    fn is_service(&self, task: &TaskSpec) -> bool {
        if let Some(payload) = &task.payload {
            if let Ok(value) = serde_json::from_slice::<serde_json::Value>(payload) {
                if let Some(flag) = value.get("isService").and_then(|v| v.as_bool()) {
                    return flag;
                }
            }
            tracing::warn!("task payload is not a JSON object with isService, falling back to label");
        }
        LabelPayloadDecoder.is_service(task)
    }
}

#[cfg(test)]
#[path = "payload_tests.rs"]
mod tests;
