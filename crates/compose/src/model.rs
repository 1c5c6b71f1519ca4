// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The manifest set: file path → parsed document tree.
//!
//! Documents are plain YAML trees; keys outside the rewrite table pass
//! through verbatim. The set is built once per launch, mutated by plugin
//! hooks strictly before the pull stage and between pull and start, and
//! frozen afterwards.

use crate::error::ManifestError;
use crate::SERVICES;
use indexmap::IndexMap;
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};

/// Suffix appended to rewritten manifest files on disk.
pub const GENERATED_SUFFIX: &str = "-generated.yml";

/// File name of the synthesized infra-container document.
pub const INFRA_FILE: &str = "docker-infra-container.yml";

/// Subfolder holding per-plugin manifest snapshots.
pub const TRACE_FOLDER: &str = "composetrace";

/// A single-port entry (`"C"` with no host part) recorded during rewrite
/// for dynamic resolution after launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinglePort {
    pub service: String,
    pub container_port: String,
}

/// In-memory representation of the pod's merged compose manifests.
#[derive(Debug, Default, Clone)]
pub struct ManifestSet {
    docs: IndexMap<PathBuf, Value>,
    infra_file: Option<PathBuf>,
    single_ports: Vec<SinglePort>,
    infra_removed: bool,
}

impl ManifestSet {
    /// Parse each file into a document tree.
    pub fn parse(files: &[PathBuf]) -> Result<Self, ManifestError> {
        let mut docs = IndexMap::new();
        for file in files {
            let raw = std::fs::read_to_string(file).map_err(|source| ManifestError::Read {
                file: file.clone(),
                source,
            })?;
            let doc: Value =
                serde_yaml::from_str(&raw).map_err(|source| ManifestError::Parse {
                    file: file.clone(),
                    source,
                })?;
            if !doc.is_mapping() {
                return Err(ManifestError::NotAMapping(file.clone()));
            }
            docs.insert(file.clone(), doc);
        }
        Ok(Self {
            docs,
            ..Default::default()
        })
    }

    /// Build a set from already-parsed documents.
    pub fn from_documents(docs: IndexMap<PathBuf, Value>) -> Self {
        Self {
            docs,
            ..Default::default()
        }
    }

    /// Build a set from a serialized `file → document` mapping, as carried
    /// by a host label.
    pub fn from_serialized(raw: &str) -> Result<Self, ManifestError> {
        let value: Value = serde_yaml::from_str(raw).map_err(|source| ManifestError::Parse {
            file: PathBuf::from("serviceDetail"),
            source,
        })?;
        let Value::Mapping(mapping) = value else {
            return Err(ManifestError::NotAMapping(PathBuf::from("serviceDetail")));
        };
        let mut docs = IndexMap::new();
        for (key, doc) in mapping {
            let Some(file) = key.as_str() else {
                return Err(ManifestError::Validation(
                    "serviceDetail keys must be file paths".to_string(),
                ));
            };
            if !doc.is_mapping() {
                return Err(ManifestError::NotAMapping(PathBuf::from(file)));
            }
            docs.insert(PathBuf::from(file), doc);
        }
        Ok(Self {
            docs,
            ..Default::default()
        })
    }

    pub fn insert_document(&mut self, file: PathBuf, doc: Value) {
        self.docs.insert(file, doc);
    }

    pub fn files(&self) -> Vec<PathBuf> {
        self.docs.keys().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn document(&self, file: &Path) -> Option<&Value> {
        self.docs.get(file)
    }

    pub fn document_mut(&mut self, file: &Path) -> Option<&mut Value> {
        self.docs.get_mut(file)
    }

    pub fn documents_mut(&mut self) -> impl Iterator<Item = (&PathBuf, &mut Value)> {
        self.docs.iter_mut()
    }

    pub fn infra_file(&self) -> Option<&PathBuf> {
        self.infra_file.as_ref()
    }

    pub fn set_infra_file(&mut self, file: PathBuf) {
        self.infra_file = Some(file);
    }

    pub fn infra_removed(&self) -> bool {
        self.infra_removed
    }

    pub fn set_infra_removed(&mut self, removed: bool) {
        self.infra_removed = removed;
    }

    pub fn single_ports(&self) -> &[SinglePort] {
        &self.single_ports
    }

    pub fn record_single_port(&mut self, service: &str, container_port: &str) {
        self.single_ports.push(SinglePort {
            service: service.to_string(),
            container_port: container_port.to_string(),
        });
    }

    /// Service names across all documents, in document and declaration order.
    pub fn all_services(&self) -> Vec<String> {
        let mut names = Vec::new();
        for doc in self.docs.values() {
            if let Some(services) = doc.get(SERVICES).and_then(Value::as_mapping) {
                for key in services.keys() {
                    if let Some(name) = key.as_str() {
                        names.push(name.to_string());
                    }
                }
            }
        }
        names
    }

    /// Structural validation ahead of the pull stage.
    pub fn validate(&self) -> Result<(), ManifestError> {
        if self.docs.is_empty() {
            return Err(ManifestError::Validation("no manifest documents".to_string()));
        }
        for (file, doc) in &self.docs {
            let services = doc
                .get(SERVICES)
                .and_then(Value::as_mapping)
                .ok_or_else(|| {
                    ManifestError::Validation(format!(
                        "{} has no services mapping",
                        file.display()
                    ))
                })?;
            if services.is_empty() {
                return Err(ManifestError::Validation(format!(
                    "{} declares no services",
                    file.display()
                )));
            }
            for (name, spec) in services {
                if !spec.is_mapping() {
                    return Err(ManifestError::Validation(format!(
                        "service {:?} in {} is not a mapping",
                        name,
                        file.display()
                    )));
                }
            }
        }
        Ok(())
    }

    /// Write the mutated documents to disk with the generated suffix,
    /// dropping the infra document when it was marked removed.
    ///
    /// Returns the file list to hand to the container runtime; originals are
    /// not used past this point.
    pub fn materialize(&mut self) -> Result<Vec<PathBuf>, ManifestError> {
        if self.infra_removed {
            if let Some(infra) = self.infra_file.take() {
                self.docs.shift_remove(&infra);
                remove_generated(&infra);
                tracing::info!(file = %infra.display(), "removed infra container document");
            }
        }

        let mut renamed = IndexMap::with_capacity(self.docs.len());
        for (file, doc) in self.docs.drain(..) {
            let target = generated_path(&file);
            let content =
                serde_yaml::to_string(&doc).map_err(|source| ManifestError::Serialize {
                    file: target.clone(),
                    source,
                })?;
            std::fs::write(&target, content).map_err(|source| ManifestError::Write {
                file: target.clone(),
                source,
            })?;
            tracing::debug!(file = %target.display(), "materialized manifest");
            renamed.insert(target, doc);
        }
        self.docs = renamed;

        if let Some(infra) = &self.infra_file {
            self.infra_file = Some(generated_path(infra));
        }
        Ok(self.files())
    }

    /// Snapshot the current documents for tracing, best effort.
    pub fn trace_dump(&self, app_folder: &Path, plugin: &str, ordinal: usize) {
        let trace_dir = app_folder.join(TRACE_FOLDER);
        if let Err(err) = std::fs::create_dir_all(&trace_dir) {
            tracing::warn!(error = %err, "failed to create compose trace folder");
            return;
        }
        for (file, doc) in &self.docs {
            let Some(base) = file.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let target = trace_dir.join(format!("{base}-{plugin}-{ordinal}.yml"));
            match serde_yaml::to_string(doc) {
                Ok(content) => {
                    if let Err(err) = std::fs::write(&target, content) {
                        tracing::warn!(plugin, error = %err, "failed to dump compose trace");
                    }
                }
                Err(err) => {
                    tracing::warn!(plugin, error = %err, "failed to serialize compose trace");
                }
            }
        }
    }
}

/// `a.yml` → `a.yml-generated.yml`; already-generated paths pass through.
pub(crate) fn generated_path(file: &Path) -> PathBuf {
    let s = file.to_string_lossy();
    if s.ends_with(GENERATED_SUFFIX) {
        file.to_path_buf()
    } else {
        PathBuf::from(format!("{s}{GENERATED_SUFFIX}"))
    }
}

fn remove_generated(file: &Path) {
    let generated = generated_path(file);
    if generated.exists() {
        if let Err(err) = std::fs::remove_file(&generated) {
            tracing::warn!(file = %generated.display(), error = %err, "failed to remove file");
        }
    }
}

/// Fetch the services mapping of a document.
pub(crate) fn services_mut(doc: &mut Value) -> Option<&mut Mapping> {
    doc.get_mut(SERVICES).and_then(Value::as_mapping_mut)
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
