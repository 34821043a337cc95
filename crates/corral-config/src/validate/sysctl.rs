//! Sysctl scoping.
//!
//! A sysctl is only safe to set when the namespace that scopes it belongs
//! to the container. Anything not known to be namespaced is host-global
//! and always rejected.

use std::path::Path;

use corral_common::constants::{
    IPC_SYSCTLS, JOINED_NETNS_SAFE_SYSCTLS, MQUEUE_SYSCTL_PREFIX, NET_SYSCTL_PREFIX, SELF_NET_NS,
};
use corral_common::error::{CorralError, Result};

use crate::Config;
use crate::namespace::NamespaceType;

const CHECK: &str = "sysctl";

pub(super) fn check(config: &Config) -> Result<()> {
    let ns = &config.namespaces;
    for key in config.sysctl.keys() {
        if IPC_SYSCTLS.contains(&key.as_str()) || key.starts_with(MQUEUE_SYSCTL_PREFIX) {
            if ns.contains(NamespaceType::Ipc) {
                continue;
            }
            return Err(CorralError::validation(
                CHECK,
                format!("sysctl {key:?} is not allowed in the host's ipc namespace"),
            ));
        }

        if key.starts_with(NET_SYSCTL_PREFIX) {
            if !ns.contains(NamespaceType::Net) {
                return Err(CorralError::validation(
                    CHECK,
                    format!("sysctl {key:?} is not allowed in the host's network namespace"),
                ));
            }
            if let Some(path) = ns.path_of(NamespaceType::Net) {
                check_joined_net(key, path)?;
            }
            continue;
        }

        if ns.contains(NamespaceType::Uts) {
            match key.as_str() {
                "kernel.domainname" => continue,
                "kernel.hostname" => {
                    return Err(CorralError::validation(
                        CHECK,
                        format!("sysctl {key:?} conflicts with the hostname field"),
                    ));
                }
                _ => {}
            }
        }

        return Err(CorralError::validation(
            CHECK,
            format!("sysctl {key:?} is not in a separate kernel namespace"),
        ));
    }
    Ok(())
}

/// A joined network namespace is live and shared, so only the allow-listed
/// keys may be written, and none at all when it is the host's own.
fn check_joined_net(key: &str, path: &Path) -> Result<()> {
    if is_host_net_ns(path)? {
        return Err(CorralError::validation(
            CHECK,
            format!("sysctl {key:?} is not allowed in the host network namespace"),
        ));
    }
    if !JOINED_NETNS_SAFE_SYSCTLS.contains(&key) {
        return Err(CorralError::validation(
            CHECK,
            format!(
                "sysctl {key:?} is not allowed in the joined network namespace {}",
                path.display()
            ),
        ));
    }
    Ok(())
}

fn ns_identity(path: &Path) -> Result<(u64, u64)> {
    let st = nix::sys::stat::stat(path).map_err(|e| CorralError::Io {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    #[allow(clippy::useless_conversion)]
    Ok((u64::from(st.st_dev), u64::from(st.st_ino)))
}

fn is_host_net_ns(path: &Path) -> Result<bool> {
    Ok(ns_identity(path)? == ns_identity(Path::new(SELF_NET_NS))?)
}
