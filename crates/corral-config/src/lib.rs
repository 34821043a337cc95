//! # corral-config
//!
//! The internal container configuration consumed by the process, mount,
//! cgroup and seccomp collaborators, and the [`validate`] pass that must
//! accept a configuration before any of them run.
//!
//! A [`Config`] is produced once per container by the translator, is
//! checked once, and is never mutated after validation succeeds.

pub mod cgroup;
pub mod device;
pub mod hooks;
pub mod mount;
pub mod namespace;
pub mod network;
pub mod seccomp;
pub mod validate;

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub use cgroup::Cgroup;
pub use hooks::Hooks;
pub use mount::Mount;
pub use namespace::{Namespace, NamespaceType, Namespaces};
pub use seccomp::Seccomp;

/// Fully-resolved configuration of one container.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Absolute path of the root filesystem.
    pub rootfs: PathBuf,
    /// Mount the root filesystem read-only.
    pub readonly_fs: bool,
    /// Use `chroot`-style entry instead of `pivot_root`.
    pub no_pivot_root: bool,
    /// Keep the caller's session keyring.
    pub no_new_keyring: bool,
    /// `MS_*` propagation flag for the root mount, zero when unset.
    pub rootfs_propagation: u64,
    /// Hostname set inside the UTS namespace.
    pub hostname: String,
    /// NIS domain name set inside the UTS namespace.
    pub domainname: String,
    /// Namespaces to create or join.
    pub namespaces: Namespaces,
    /// Mounts in mount order.
    pub mounts: Vec<Mount>,
    /// Device nodes to create.
    pub devices: Vec<device::Device>,
    /// User ID mappings.
    pub uid_mappings: Vec<IdMap>,
    /// Group ID mappings.
    pub gid_mappings: Vec<IdMap>,
    /// Network interfaces to configure inside the network namespace.
    pub networks: Vec<network::Network>,
    /// Routes to install inside the network namespace.
    pub routes: Vec<network::Route>,
    /// Cgroup placement and resource limits.
    pub cgroups: Cgroup,
    /// Syscall filter, if any.
    pub seccomp: Option<Seccomp>,
    /// Lifecycle hooks by phase.
    pub hooks: Hooks,
    /// Kernel parameters to set.
    pub sysctl: BTreeMap<String, String>,
    /// Paths masked inside the container.
    pub masked_paths: Vec<String>,
    /// Paths made read-only inside the container.
    pub readonly_paths: Vec<String>,
    /// SELinux label for mounts.
    pub mount_label: String,
    /// SELinux label for the process.
    pub process_label: String,
    /// AppArmor profile for the process.
    pub apparmor_profile: String,
    /// Capability sets of the process.
    pub capabilities: Option<Capabilities>,
    /// Resource limits of the process.
    pub rlimits: Vec<Rlimit>,
    /// Set `PR_SET_NO_NEW_PRIVS` before exec.
    pub no_new_privileges: bool,
    /// OOM score adjustment.
    pub oom_score_adj: Option<i32>,
    /// `key=value` labels, including the bundle path.
    pub labels: Vec<String>,
    /// The runtime runs with a non-root effective UID.
    pub rootless_euid: bool,
    /// Cgroup writes are best-effort.
    pub rootless_cgroups: bool,
}

impl Config {
    /// Creates an otherwise empty configuration rooted at `rootfs`.
    #[must_use]
    pub fn new(rootfs: impl Into<PathBuf>) -> Self {
        Self {
            rootfs: rootfs.into(),
            ..Self::default()
        }
    }
}

/// One contiguous ID range mapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdMap {
    /// First ID inside the container.
    pub container_id: u32,
    /// First ID on the host.
    pub host_id: u32,
    /// Number of IDs in the range.
    pub size: u32,
}

impl IdMap {
    /// Returns `true` when `id` (a container-side ID) falls in this range.
    #[must_use]
    pub fn contains(&self, id: u32) -> bool {
        let start = u64::from(self.container_id);
        let id = u64::from(id);
        id >= start && id < start + u64::from(self.size)
    }
}

/// Capability names per set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Bounding set.
    pub bounding: Vec<String>,
    /// Effective set.
    pub effective: Vec<String>,
    /// Inheritable set.
    pub inheritable: Vec<String>,
    /// Permitted set.
    pub permitted: Vec<String>,
    /// Ambient set.
    pub ambient: Vec<String>,
}

/// A process resource limit with its numeric resource identifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rlimit {
    /// `RLIMIT_*` resource number.
    pub resource: u32,
    /// Hard limit.
    pub hard: u64,
    /// Soft limit.
    pub soft: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_map_contains_is_half_open() {
        let map = IdMap {
            container_id: 0,
            host_id: 1000,
            size: 10,
        };
        assert!(map.contains(0));
        assert!(map.contains(9));
        assert!(!map.contains(10));
    }

    #[test]
    fn id_map_contains_does_not_overflow() {
        let map = IdMap {
            container_id: u32::MAX,
            host_id: 0,
            size: 2,
        };
        assert!(map.contains(u32::MAX));
    }

    #[test]
    fn config_serializes_to_json() {
        let config = Config::new("/var/lib/corral/rootfs");
        let json = serde_json::to_string(&config).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
