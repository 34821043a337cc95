//! Namespace declarations.
//!
//! A container declares each namespace type at most once, either as a new
//! namespace or as an existing one to join by path.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Kernel namespace categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamespaceType {
    /// Mount points.
    Mount,
    /// Hostname and NIS domain name.
    Uts,
    /// System V IPC and POSIX message queues.
    Ipc,
    /// User and group IDs.
    User,
    /// Process IDs.
    Pid,
    /// Network stack.
    Net,
    /// Cgroup root.
    Cgroup,
}

impl NamespaceType {
    /// Name of the handle under `/proc/<pid>/ns/`.
    #[must_use]
    pub const fn proc_name(self) -> &'static str {
        match self {
            Self::Mount => "mnt",
            Self::Uts => "uts",
            Self::Ipc => "ipc",
            Self::User => "user",
            Self::Pid => "pid",
            Self::Net => "net",
            Self::Cgroup => "cgroup",
        }
    }
}

impl fmt::Display for NamespaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.proc_name())
    }
}

/// A namespace to create, or to join when `path` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespace {
    /// Namespace category.
    pub kind: NamespaceType,
    /// Handle of an existing namespace to join.
    pub path: Option<PathBuf>,
}

impl Namespace {
    /// A fresh namespace of `kind`.
    #[must_use]
    pub const fn new(kind: NamespaceType) -> Self {
        Self { kind, path: None }
    }

    /// An existing namespace of `kind` to join through `path`.
    #[must_use]
    pub fn join(kind: NamespaceType, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: Some(path.into()),
        }
    }
}

/// Ordered set of namespace declarations, at most one per type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Namespaces(Vec<Namespace>);

impl Namespaces {
    /// Returns `true` when a namespace of `kind` is declared.
    #[must_use]
    pub fn contains(&self, kind: NamespaceType) -> bool {
        self.0.iter().any(|ns| ns.kind == kind)
    }

    /// Join path of the `kind` namespace, if it is declared as a join.
    #[must_use]
    pub fn path_of(&self, kind: NamespaceType) -> Option<&Path> {
        self.0
            .iter()
            .find(|ns| ns.kind == kind)
            .and_then(|ns| ns.path.as_deref())
    }

    /// Declares `ns`, replacing any existing declaration of the same type.
    pub fn add(&mut self, ns: Namespace) {
        if let Some(existing) = self.0.iter_mut().find(|e| e.kind == ns.kind) {
            *existing = ns;
        } else {
            self.0.push(ns);
        }
    }

    /// Removes the declaration of `kind`, if any.
    pub fn remove(&mut self, kind: NamespaceType) {
        self.0.retain(|ns| ns.kind != kind);
    }

    /// Iterates over declarations in order.
    pub fn iter(&self) -> impl Iterator<Item = &Namespace> {
        self.0.iter()
    }

    /// Number of declared namespaces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when nothing is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Namespace> for Namespaces {
    fn from_iter<I: IntoIterator<Item = Namespace>>(iter: I) -> Self {
        let mut out = Self::default();
        for ns in iter {
            out.add(ns);
        }
        out
    }
}
