//! Namespace declarations.

use std::path::PathBuf;

use corral_common::error::{CorralError, Result};
use corral_config::namespace::{Namespace, NamespaceType, Namespaces};
use corral_spec::linux as spec;

/// Maps a namespace type name to its kind.
///
/// # Errors
///
/// Returns [`CorralError::Unsupported`] for unknown names.
pub fn namespace_type(name: &str) -> Result<NamespaceType> {
    match name {
        "pid" => Ok(NamespaceType::Pid),
        "network" => Ok(NamespaceType::Net),
        "mount" => Ok(NamespaceType::Mount),
        "ipc" => Ok(NamespaceType::Ipc),
        "uts" => Ok(NamespaceType::Uts),
        "user" => Ok(NamespaceType::User),
        "cgroup" => Ok(NamespaceType::Cgroup),
        other => Err(CorralError::Unsupported {
            kind: "namespace type",
            name: other.to_string(),
        }),
    }
}

/// Builds the namespace set. A non-empty path joins an existing namespace.
///
/// # Errors
///
/// Returns [`CorralError::MalformedSpec`] when a type is declared twice and
/// [`CorralError::Unsupported`] for unknown types.
pub fn create_namespaces(declared: &[spec::Namespace]) -> Result<Namespaces> {
    let mut out = Namespaces::default();
    for ns in declared {
        let kind = namespace_type(&ns.kind)?;
        if out.contains(kind) {
            return Err(CorralError::malformed(format!("duplicated ns {:?}", ns.kind)));
        }
        out.add(Namespace {
            kind,
            path: (!ns.path.is_empty()).then(|| PathBuf::from(&ns.path)),
        });
    }
    Ok(out)
}
