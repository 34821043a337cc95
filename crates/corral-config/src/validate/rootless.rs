//! Checks specific to containers started without host root.

use corral_common::error::{CorralError, Result};

use crate::namespace::NamespaceType;
use crate::{Config, IdMap};

const CHECK: &str = "rootless";

pub(super) fn check(config: &Config) -> Result<()> {
    if !config.rootless_euid {
        return Ok(());
    }
    // A joined user namespace was mapped by whoever created it.
    if config.namespaces.path_of(NamespaceType::User).is_some() {
        return Ok(());
    }
    mappings(config)?;
    mount_ids(config)
}

fn mappings(config: &Config) -> Result<()> {
    if !config.namespaces.contains(NamespaceType::User) {
        return Err(CorralError::validation(
            CHECK,
            "rootless containers require a user namespace",
        ));
    }
    if config.uid_mappings.is_empty() {
        return Err(CorralError::validation(
            CHECK,
            "rootless containers require at least one UID mapping",
        ));
    }
    if config.gid_mappings.is_empty() {
        return Err(CorralError::validation(
            CHECK,
            "rootless containers require at least one GID mapping",
        ));
    }
    Ok(())
}

fn require_mapped(value: &str, maps: &[IdMap], option: &str) -> Result<()> {
    let id: u32 = value.parse().map_err(|_| {
        CorralError::validation(CHECK, format!("invalid {option} mount option value {value:?}"))
    })?;
    if maps.iter().any(|m| m.contains(id)) {
        Ok(())
    } else {
        Err(CorralError::validation(
            CHECK,
            format!("cannot specify {option}={id} mount option for an unmapped ID"),
        ))
    }
}

/// `uid=`/`gid=` mount data must name IDs that exist inside the user
/// namespace, or the kernel would resolve them against the host.
fn mount_ids(config: &Config) -> Result<()> {
    for mount in &config.mounts {
        for opt in mount.data_options() {
            if let Some(value) = opt.strip_prefix("uid=") {
                require_mapped(value, &config.uid_mappings, "uid")?;
            } else if let Some(value) = opt.strip_prefix("gid=") {
                require_mapped(value, &config.gid_mappings, "gid")?;
            }
        }
    }
    Ok(())
}
