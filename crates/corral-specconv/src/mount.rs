//! Mount entries and fstab-style option parsing.

use std::path::Path;

use corral_common::error::{CorralError, Result};
use corral_config::mount::{EXT_COPYUP, Mount};

type Flag = libc::c_ulong;

/// `(option, clears, flag)`.
const FLAGS: &[(&str, bool, Flag)] = &[
    ("acl", false, libc::MS_POSIXACL),
    ("async", true, libc::MS_SYNCHRONOUS),
    ("atime", true, libc::MS_NOATIME),
    ("bind", false, libc::MS_BIND),
    ("defaults", false, 0),
    ("dev", true, libc::MS_NODEV),
    ("diratime", true, libc::MS_NODIRATIME),
    ("dirsync", false, libc::MS_DIRSYNC),
    ("exec", true, libc::MS_NOEXEC),
    ("iversion", false, libc::MS_I_VERSION),
    ("lazytime", false, libc::MS_LAZYTIME),
    ("loud", true, libc::MS_SILENT),
    ("mand", false, libc::MS_MANDLOCK),
    ("noacl", true, libc::MS_POSIXACL),
    ("noatime", false, libc::MS_NOATIME),
    ("nodev", false, libc::MS_NODEV),
    ("nodiratime", false, libc::MS_NODIRATIME),
    ("noexec", false, libc::MS_NOEXEC),
    ("noiversion", true, libc::MS_I_VERSION),
    ("nolazytime", true, libc::MS_LAZYTIME),
    ("nomand", true, libc::MS_MANDLOCK),
    ("norelatime", true, libc::MS_RELATIME),
    ("nostrictatime", true, libc::MS_STRICTATIME),
    ("nosuid", false, libc::MS_NOSUID),
    ("rbind", false, libc::MS_BIND | libc::MS_REC),
    ("relatime", false, libc::MS_RELATIME),
    ("remount", false, libc::MS_REMOUNT),
    ("ro", false, libc::MS_RDONLY),
    ("rw", true, libc::MS_RDONLY),
    ("silent", false, libc::MS_SILENT),
    ("strictatime", false, libc::MS_STRICTATIME),
    ("suid", true, libc::MS_NOSUID),
    ("sync", false, libc::MS_SYNCHRONOUS),
];

const PROPAGATION: &[(&str, Flag)] = &[
    ("private", libc::MS_PRIVATE),
    ("shared", libc::MS_SHARED),
    ("slave", libc::MS_SLAVE),
    ("unbindable", libc::MS_UNBINDABLE),
    ("rprivate", libc::MS_PRIVATE | libc::MS_REC),
    ("rshared", libc::MS_SHARED | libc::MS_REC),
    ("rslave", libc::MS_SLAVE | libc::MS_REC),
    ("runbindable", libc::MS_UNBINDABLE | libc::MS_REC),
];

const EXTENSIONS: &[(&str, bool, u32)] = &[("tmpcopyup", false, EXT_COPYUP)];

/// Mount flags, propagation flags, filesystem data and extension flags
/// parsed from an option list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MountOptions {
    /// `MS_*` flags.
    pub flags: u64,
    /// Propagation changes, applied one by one after the mount.
    pub propagation: Vec<u64>,
    /// Options handed to the filesystem.
    pub data: String,
    /// Runtime extension flags.
    pub extensions: u32,
}

/// Splits `options` the way `mount(8)` would. Later options override
/// earlier ones, so `ro,rw` ends up writable.
#[must_use]
pub fn parse_mount_options(options: &[String]) -> MountOptions {
    let mut out = MountOptions::default();
    let mut data = Vec::new();
    for opt in options {
        if let Some(&(_, clear, flag)) = FLAGS.iter().find(|(n, ..)| n == opt) {
            let flag = u64::from(flag);
            if clear {
                out.flags &= !flag;
            } else {
                out.flags |= flag;
            }
        } else if let Some(&(_, flag)) = PROPAGATION.iter().find(|(n, _)| n == opt) {
            out.propagation.push(u64::from(flag));
        } else if let Some(&(_, clear, flag)) = EXTENSIONS.iter().find(|(n, ..)| n == opt) {
            if clear {
                out.extensions &= !flag;
            } else {
                out.extensions |= flag;
            }
        } else {
            data.push(opt.as_str());
        }
    }
    out.data = data.join(",");
    out
}

/// Maps a `rootfsPropagation` value to its mount flag. Empty means the
/// default, which is no explicit change.
///
/// # Errors
///
/// Returns [`CorralError::Unsupported`] for unknown modes.
pub fn rootfs_propagation(mode: &str) -> Result<u64> {
    if mode.is_empty() {
        return Ok(0);
    }
    PROPAGATION
        .iter()
        .find(|(n, _)| *n == mode)
        .map(|&(_, flag)| u64::from(flag))
        .ok_or_else(|| CorralError::Unsupported {
            kind: "rootfs propagation",
            name: mode.to_string(),
        })
}

/// Converts one declared mount. Destinations are kept verbatim, even when
/// relative. Bind mounts ignore the declared type, and a relative bind
/// source is resolved against `bundle`.
#[must_use]
pub fn create_mount(bundle: &Path, declared: &corral_spec::Mount) -> Mount {
    let opts = parse_mount_options(&declared.options);
    let mut source = declared.source.clone();
    let mut device = declared.kind.clone();

    if opts.flags & u64::from(libc::MS_BIND) != 0 {
        device = "bind".to_string();
        if !Path::new(&source).is_absolute() {
            source = bundle.join(&source).to_string_lossy().into_owned();
        }
    }
    if !Path::new(&declared.destination).is_absolute() {
        tracing::warn!(
            destination = %declared.destination,
            "mount destination is not absolute, accepting for compatibility"
        );
    }

    Mount {
        source,
        destination: declared.destination.clone(),
        device,
        flags: opts.flags,
        propagation_flags: opts.propagation,
        data: opts.data,
        extensions: opts.extensions,
    }
}
