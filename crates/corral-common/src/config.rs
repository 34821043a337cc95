//! Options that steer a single spec translation.

use serde::{Deserialize, Serialize};

/// Caller-supplied knobs for translating one container specification.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TranslateOptions {
    /// Name used for the container's cgroup when the spec leaves it implicit.
    pub cgroup_name: String,
    /// Interpret the cgroup path as a systemd `parent:prefix:name` triplet.
    pub use_systemd_cgroup: bool,
    /// Skip `pivot_root` when entering the root filesystem.
    pub no_pivot_root: bool,
    /// Do not create a fresh session keyring for the container.
    pub no_new_keyring: bool,
    /// The runtime is executing with a non-root effective UID.
    pub rootless_euid: bool,
    /// Cgroup writes may fail because the caller does not own the hierarchy.
    pub rootless_cgroups: bool,
}

impl TranslateOptions {
    /// Creates options for the given container name with every flag off.
    #[must_use]
    pub fn new(cgroup_name: impl Into<String>) -> Self {
        Self {
            cgroup_name: cgroup_name.into(),
            ..Self::default()
        }
    }
}
