//! Fixed names, paths, and defaults shared by the translator and validator.

/// Annotation key prefix that marks a systemd unit property.
pub const SYSTEMD_PROPERTY_PREFIX: &str = "org.systemd.property.";

/// Parent slice used when a systemd cgroup path is left empty.
pub const DEFAULT_SYSTEMD_PARENT: &str = "system.slice";

/// Scope prefix used when a systemd cgroup path is left empty.
pub const DEFAULT_SYSTEMD_SCOPE_PREFIX: &str = "runc";

/// Minimum length of a systemd property name.
pub const MIN_SYSTEMD_PROPERTY_NAME_LEN: usize = 3;

/// Namespace handle of the calling process's network namespace.
pub const SELF_NET_NS: &str = "/proc/self/ns/net";

/// Present only when the kernel supports user namespaces.
pub const SELF_USER_NS: &str = "/proc/self/ns/user";

/// Present only when the kernel supports cgroup namespaces.
pub const SELF_CGROUP_NS: &str = "/proc/self/ns/cgroup";

/// Prefix of the POSIX message queue sysctls (IPC namespace).
pub const MQUEUE_SYSCTL_PREFIX: &str = "fs.mqueue.";

/// Prefix of the networking sysctls (network namespace).
pub const NET_SYSCTL_PREFIX: &str = "net.";

/// System V IPC sysctls scoped to the IPC namespace.
pub const IPC_SYSCTLS: &[&str] = &[
    "kernel.msgmax",
    "kernel.msgmnb",
    "kernel.msgmni",
    "kernel.sem",
    "kernel.shmall",
    "kernel.shmmax",
    "kernel.shmmni",
    "kernel.shm_rmid_forced",
];

/// Network sysctls still accepted when the network namespace is joined
/// rather than created.
pub const JOINED_NETNS_SAFE_SYSCTLS: &[&str] = &[
    "net.ipv4.ip_local_port_range",
    "net.ipv4.ip_unprivileged_port_start",
    "net.ipv4.ping_group_range",
    "net.ipv4.tcp_syncookies",
];

/// Label key carrying the bundle directory.
pub const BUNDLE_LABEL: &str = "bundle";
