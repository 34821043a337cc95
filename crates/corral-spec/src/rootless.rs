//! Rewrites a specification so it can run without host root.

use corral_common::host::HostIds;

use crate::Mount;
use crate::Spec;
use crate::linux::{IdMapping, Namespace};

/// Adapts `spec` for an unprivileged caller.
///
/// The network namespace is dropped (an unprivileged user cannot wire it
/// up), a fresh user namespace is added, and container root is mapped to
/// the caller's effective UID and GID. Mounts under `/sys` are replaced by
/// a read-only recursive bind of the host `/sys`, `uid=`/`gid=` mount
/// options are removed, and cgroup resources are cleared.
pub fn to_rootless(spec: &mut Spec, ids: HostIds) {
    let linux = spec.linux.get_or_insert_with(Default::default);

    linux
        .namespaces
        .retain(|ns| ns.kind != "network" && ns.kind != "user");
    linux.namespaces.push(Namespace::new("user"));

    linux.uid_mappings = vec![IdMapping {
        container_id: 0,
        host_id: ids.uid,
        size: 1,
    }];
    linux.gid_mappings = vec![IdMapping {
        container_id: 0,
        host_id: ids.gid,
        size: 1,
    }];
    linux.resources = None;

    let mut mounts: Vec<Mount> = spec
        .mounts
        .drain(..)
        .filter(|m| !m.destination.starts_with("/sys"))
        .map(|mut m| {
            m.options
                .retain(|opt| !opt.starts_with("uid=") && !opt.starts_with("gid="));
            m
        })
        .collect();
    mounts.push(Mount {
        destination: "/sys".into(),
        kind: "none".into(),
        source: "/sys".into(),
        options: ["rbind", "nosuid", "noexec", "nodev", "ro"]
            .into_iter()
            .map(String::from)
            .collect(),
    });
    spec.mounts = mounts;

    tracing::debug!(uid = ids.uid, gid = ids.gid, "spec rewritten for rootless execution");
}
