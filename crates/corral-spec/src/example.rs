//! A complete, conservative specification to start from.

use crate::linux::{DeviceCgroup, Linux, Namespace, Resources};
use crate::process::{Capabilities, Process, Rlimit, User};
use crate::{Mount, Root, SPEC_VERSION, Spec};

const DEFAULT_CAPABILITIES: &[&str] = &["CAP_AUDIT_WRITE", "CAP_KILL", "CAP_NET_BIND_SERVICE"];

const DEFAULT_MASKED_PATHS: &[&str] = &[
    "/proc/acpi",
    "/proc/asound",
    "/proc/kcore",
    "/proc/keys",
    "/proc/latency_stats",
    "/proc/timer_list",
    "/proc/timer_stats",
    "/proc/sched_debug",
    "/sys/firmware",
    "/proc/scsi",
];

const DEFAULT_READONLY_PATHS: &[&str] = &[
    "/proc/bus",
    "/proc/fs",
    "/proc/irq",
    "/proc/sys",
    "/proc/sysrq-trigger",
];

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

fn mount(destination: &str, kind: &str, source: &str, options: &[&str]) -> Mount {
    Mount {
        destination: destination.into(),
        kind: kind.into(),
        source: source.into(),
        options: strings(options),
    }
}

impl Spec {
    /// Returns the default specification: an interactive `sh` with a
    /// minimal capability set, private pid/network/ipc/uts/mount
    /// namespaces, the standard pseudo-filesystems, and every device denied
    /// except the runtime's default allow-list.
    #[must_use]
    pub fn example() -> Self {
        let caps = strings(DEFAULT_CAPABILITIES);
        Self {
            oci_version: SPEC_VERSION.into(),
            process: Some(Process {
                terminal: true,
                user: User::default(),
                args: strings(&["sh"]),
                env: strings(&[
                    "PATH=/usr/local/sbin:/usr/local/bin:/usr/sbin:/usr/bin:/sbin:/bin",
                    "TERM=xterm",
                ]),
                cwd: "/".into(),
                capabilities: Some(Capabilities {
                    bounding: caps.clone(),
                    effective: caps.clone(),
                    inheritable: caps.clone(),
                    permitted: caps.clone(),
                    ambient: caps,
                }),
                rlimits: vec![Rlimit {
                    kind: "RLIMIT_NOFILE".into(),
                    hard: 1024,
                    soft: 1024,
                }],
                no_new_privileges: true,
                ..Process::default()
            }),
            root: Some(Root {
                path: "rootfs".into(),
                readonly: true,
            }),
            hostname: "runc".into(),
            mounts: vec![
                mount("/proc", "proc", "proc", &[]),
                mount(
                    "/dev",
                    "tmpfs",
                    "tmpfs",
                    &["nosuid", "strictatime", "mode=755", "size=65536k"],
                ),
                mount(
                    "/dev/pts",
                    "devpts",
                    "devpts",
                    &[
                        "nosuid",
                        "noexec",
                        "newinstance",
                        "ptmxmode=0666",
                        "mode=0620",
                        "gid=5",
                    ],
                ),
                mount(
                    "/dev/shm",
                    "tmpfs",
                    "shm",
                    &["nosuid", "noexec", "nodev", "mode=1777", "size=65536k"],
                ),
                mount("/dev/mqueue", "mqueue", "mqueue", &["nosuid", "noexec", "nodev"]),
                mount("/sys", "sysfs", "sysfs", &["nosuid", "noexec", "nodev", "ro"]),
                mount(
                    "/sys/fs/cgroup",
                    "cgroup",
                    "cgroup",
                    &["nosuid", "noexec", "nodev", "relatime", "ro"],
                ),
            ],
            linux: Some(Linux {
                masked_paths: strings(DEFAULT_MASKED_PATHS),
                readonly_paths: strings(DEFAULT_READONLY_PATHS),
                resources: Some(Resources {
                    devices: vec![DeviceCgroup {
                        allow: false,
                        access: Some("rwm".into()),
                        ..DeviceCgroup::default()
                    }],
                    ..Resources::default()
                }),
                namespaces: ["pid", "network", "ipc", "uts", "mount"]
                    .into_iter()
                    .map(Namespace::new)
                    .collect(),
                ..Linux::default()
            }),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn example_has_private_namespaces() {
        let spec = Spec::example();
        let kinds: Vec<_> = spec
            .linux
            .as_ref()
            .map(|l| l.namespaces.iter().map(|n| n.kind.as_str()).collect())
            .unwrap_or_default();
        assert_eq!(kinds, ["pid", "network", "ipc", "uts", "mount"]);
    }

    #[test]
    fn example_survives_json_roundtrip() {
        let spec = Spec::example();
        let json = serde_json::to_string(&spec).unwrap();
        assert_eq!(Spec::from_json(&json).unwrap(), spec);
    }
}
