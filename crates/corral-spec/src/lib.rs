//! # corral-spec
//!
//! Typed model of the container specification document (`config.json`)
//! as authored outside the runtime. Every field that the document may omit
//! is optional here so that "absent" never collapses into a sentinel value
//! before the translator has seen it.
//!
//! The model is deliberately permissive: it accepts any strings for
//! seccomp actions, architectures, namespace types and similar named
//! constants. Rejecting unknown names is the translator's job.

pub mod example;
pub mod hooks;
pub mod linux;
pub mod process;
pub mod rootless;

use std::collections::BTreeMap;
use std::path::Path;

use corral_common::error::{CorralError, Result};
use serde::{Deserialize, Serialize};

pub use hooks::{Hook, Hooks};
pub use linux::Linux;
pub use process::Process;

/// Version of the document format produced by [`Spec::example`].
pub const SPEC_VERSION: &str = "1.0.2";

/// Root of the container specification document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spec {
    /// Version of the specification format.
    #[serde(default)]
    pub oci_version: String,
    /// Container process. May be absent for create-only flows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process: Option<Process>,
    /// Root filesystem.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<Root>,
    /// Container hostname.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub hostname: String,
    /// Container NIS domain name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub domainname: String,
    /// Additional mounts on top of the root filesystem, in mount order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mounts: Vec<Mount>,
    /// Lifecycle hooks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hooks: Option<Hooks>,
    /// Free-form annotations.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
    /// Linux-specific configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linux: Option<Linux>,
}

impl Spec {
    /// Loads a specification from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid
    /// specification document.
    pub fn load(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "loading container spec");
        let raw = std::fs::read(path).map_err(|e| CorralError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_value(serde_json::from_slice(&raw)?)
    }

    /// Parses a specification from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a valid specification document.
    pub fn from_json(input: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(input)?)
    }

    /// Every field is optional, so serde would also accept an array here.
    fn from_value(value: serde_json::Value) -> Result<Self> {
        if !value.is_object() {
            return Err(CorralError::malformed("spec document must be a JSON object"));
        }
        Ok(serde_json::from_value(value)?)
    }
}

/// Root filesystem of the container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Root {
    /// Path to the root filesystem, absolute or relative to the bundle.
    pub path: String,
    /// Mount the root filesystem read-only.
    #[serde(default)]
    pub readonly: bool,
}

/// A mount to perform inside the container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mount {
    /// Destination path inside the container.
    pub destination: String,
    /// Filesystem type.
    #[serde(default, rename = "type", skip_serializing_if = "String::is_empty")]
    pub kind: String,
    /// Source device or path.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source: String,
    /// fstab-style mount options.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}
