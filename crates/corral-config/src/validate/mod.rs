//! Invariant checks run on a finished [`Config`].
//!
//! # Checks performed, in order
//!
//! 1. The root filesystem is a real directory reached without symlinks.
//! 2. A cgroup is placed either by path or by systemd name, not both.
//! 3. Network interfaces and routes need a private network namespace.
//! 4. A hostname or domain name needs a private UTS namespace.
//! 5. Masked and read-only paths need a private mount namespace.
//! 6. ID mappings need a user namespace, which the kernel must support.
//! 7. A cgroup namespace needs kernel support.
//! 8. Each sysctl must be scoped to a namespace the container owns.
//! 9. Rootless containers are fully mapped.
//! 10. Mount destinations (relative or unclean ones are only logged).
//!
//! Validation stops at the first failure.

mod rootless;
mod sysctl;

use std::path::{Component, Path, PathBuf};

use corral_common::constants::{SELF_CGROUP_NS, SELF_USER_NS};
use corral_common::error::{CorralError, Result};

use crate::Config;
use crate::namespace::NamespaceType;

type Check = fn(&Config) -> Result<()>;

const CHECKS: &[Check] = &[
    rootfs,
    cgroups,
    network,
    hostname,
    security,
    usernamespace,
    cgroupnamespace,
    sysctl::check,
    rootless::check,
    mounts,
];

/// Validates `config`, returning the first violated invariant.
///
/// # Errors
///
/// Returns [`CorralError::Validation`] naming the failing check.
pub fn validate(config: &Config) -> Result<()> {
    tracing::info!(rootfs = %config.rootfs.display(), "validating container config");
    for check in CHECKS {
        check(config)?;
    }
    Ok(())
}

/// Lexically normalizes `path`: drops `.`, resolves `..` against earlier
/// components, and collapses repeated separators.
fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    let _ = out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

fn rootfs(config: &Config) -> Result<()> {
    let root = &config.rootfs;
    let resolved = std::fs::canonicalize(root).map_err(|e| {
        CorralError::validation("rootfs", format!("cannot resolve {}: {e}", root.display()))
    })?;
    if clean(root) != resolved {
        return Err(CorralError::validation(
            "rootfs",
            format!("{} is not an absolute path or is a symlink", root.display()),
        ));
    }
    if !resolved.is_dir() {
        return Err(CorralError::validation(
            "rootfs",
            format!("{} is not a directory", root.display()),
        ));
    }
    Ok(())
}

fn cgroups(config: &Config) -> Result<()> {
    let c = &config.cgroups;
    if !c.path.is_empty() && (!c.name.is_empty() || !c.parent.is_empty()) {
        return Err(CorralError::validation(
            "cgroups",
            "either a path or a systemd name and parent may be set, not both",
        ));
    }
    Ok(())
}

fn network(config: &Config) -> Result<()> {
    if !config.namespaces.contains(NamespaceType::Net)
        && (!config.networks.is_empty() || !config.routes.is_empty())
    {
        return Err(CorralError::validation(
            "network",
            "unable to apply network settings without a private network namespace",
        ));
    }
    Ok(())
}

fn hostname(config: &Config) -> Result<()> {
    if config.namespaces.contains(NamespaceType::Uts) {
        return Ok(());
    }
    if !config.hostname.is_empty() {
        return Err(CorralError::validation(
            "hostname",
            "unable to set hostname without a private UTS namespace",
        ));
    }
    if !config.domainname.is_empty() {
        return Err(CorralError::validation(
            "hostname",
            "unable to set domainname without a private UTS namespace",
        ));
    }
    Ok(())
}

fn security(config: &Config) -> Result<()> {
    if (!config.masked_paths.is_empty() || !config.readonly_paths.is_empty())
        && !config.namespaces.contains(NamespaceType::Mount)
    {
        return Err(CorralError::validation(
            "security",
            "unable to restrict sys entries without a private mount namespace",
        ));
    }
    Ok(())
}

fn usernamespace(config: &Config) -> Result<()> {
    if config.namespaces.contains(NamespaceType::User) {
        if !Path::new(SELF_USER_NS).exists() {
            return Err(CorralError::validation(
                "usernamespace",
                "user namespaces are not enabled in the kernel",
            ));
        }
    } else if !config.uid_mappings.is_empty() || !config.gid_mappings.is_empty() {
        return Err(CorralError::validation(
            "usernamespace",
            "user namespace mappings specified, but user namespace isn't enabled in the config",
        ));
    }
    Ok(())
}

fn cgroupnamespace(config: &Config) -> Result<()> {
    if config.namespaces.contains(NamespaceType::Cgroup) && !Path::new(SELF_CGROUP_NS).exists() {
        return Err(CorralError::validation(
            "cgroupnamespace",
            "cgroup namespaces are not enabled in the kernel",
        ));
    }
    Ok(())
}

fn mounts(config: &Config) -> Result<()> {
    // TODO: reject relative destinations once existing bundles have migrated.
    for m in &config.mounts {
        let dest = Path::new(&m.destination);
        if !dest.is_absolute() || clean(dest) != dest {
            tracing::warn!(destination = %m.destination, "mount destination is relative or unclean");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::os::unix::fs::symlink;

    use tempfile::TempDir;

    use super::*;
    use crate::namespace::Namespace;
    use crate::network::{Network, Route};
    use crate::{IdMap, Mount};

    fn base_config() -> (TempDir, Config) {
        let dir = tempfile::tempdir().unwrap();
        let root = std::fs::canonicalize(dir.path()).unwrap();
        (dir, Config::new(root))
    }

    fn with_namespaces(config: &mut Config, kinds: &[NamespaceType]) {
        config.namespaces = kinds.iter().copied().map(Namespace::new).collect();
    }

    #[test]
    fn clean_resolves_dots() {
        assert_eq!(clean(Path::new("/abs/but/../unclean")), Path::new("/abs/unclean"));
        assert_eq!(clean(Path::new("./rel/path")), Path::new("rel/path"));
        assert_eq!(clean(Path::new("../../path")), Path::new("../../path"));
        assert_eq!(clean(Path::new("/../x")), Path::new("/x"));
        assert_eq!(clean(Path::new("")), Path::new("."));
    }

    #[test]
    fn validate_root_only_succeeds() {
        let (_dir, config) = base_config();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn validate_symlinked_root_fails() {
        let (dir, mut config) = base_config();
        let real = config.rootfs.join("real");
        std::fs::create_dir(&real).unwrap();
        let link = config.rootfs.join("rootfs");
        symlink(&real, &link).unwrap();
        config.rootfs = link;

        let msg = validate(&config).unwrap_err().to_string();
        assert!(msg.contains("symlink"), "got: {msg}");
        drop(dir);
    }

    #[test]
    fn validate_relative_root_fails() {
        let (_dir, mut config) = base_config();
        config.rootfs = PathBuf::from("rootfs");
        assert!(validate(&config).is_err());
    }

    #[test]
    fn validate_missing_root_fails() {
        let (_dir, mut config) = base_config();
        config.rootfs.push("does-not-exist");
        let msg = validate(&config).unwrap_err().to_string();
        assert!(msg.contains("rootfs check failed"), "got: {msg}");
    }

    #[test]
    fn validate_file_root_fails() {
        let (_dir, mut config) = base_config();
        let file = config.rootfs.join("file");
        std::fs::write(&file, b"").unwrap();
        config.rootfs = file;
        let msg = validate(&config).unwrap_err().to_string();
        assert!(msg.contains("not a directory"), "got: {msg}");
    }

    #[test]
    fn validate_cgroup_path_and_name_fails() {
        let (_dir, mut config) = base_config();
        config.cgroups.path = "/user/cgroups/path/id".into();
        config.cgroups.parent = "system.slice".into();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn validate_network_without_net_namespace_fails() {
        let (_dir, mut config) = base_config();
        config.networks.push(Network::loopback());
        let msg = validate(&config).unwrap_err().to_string();
        assert!(msg.contains("network"), "got: {msg}");
    }

    #[test]
    fn validate_routes_without_net_namespace_fails() {
        let (_dir, mut config) = base_config();
        config.routes.push(Route {
            gateway: "255.255.255.0".into(),
            ..Route::default()
        });
        assert!(validate(&config).is_err());
    }

    #[test]
    fn validate_hostname_with_uts_succeeds() {
        let (_dir, mut config) = base_config();
        config.hostname = "runc".into();
        with_namespaces(&mut config, &[NamespaceType::Uts]);
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn validate_hostname_without_uts_fails() {
        let (_dir, mut config) = base_config();
        config.hostname = "runc".into();
        let msg = validate(&config).unwrap_err().to_string();
        assert!(msg.contains("UTS"), "got: {msg}");
    }

    #[test]
    fn validate_domainname_without_uts_fails() {
        let (_dir, mut config) = base_config();
        config.domainname = "example.org".into();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn validate_masked_paths_with_mount_namespace_succeeds() {
        let (_dir, mut config) = base_config();
        config.masked_paths = vec!["/proc/kcore".into()];
        with_namespaces(&mut config, &[NamespaceType::Mount]);
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn validate_readonly_paths_with_mount_namespace_succeeds() {
        let (_dir, mut config) = base_config();
        config.readonly_paths = vec!["/proc/sys".into()];
        with_namespaces(&mut config, &[NamespaceType::Mount]);
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn validate_security_paths_without_mount_namespace_fails() {
        let (_dir, mut config) = base_config();
        config.masked_paths = vec!["/proc/kcore".into()];
        config.readonly_paths = vec!["/proc/sys".into()];
        let msg = validate(&config).unwrap_err().to_string();
        assert!(msg.contains("security"), "got: {msg}");
    }

    #[test]
    fn validate_user_namespace_succeeds_when_supported() {
        if !Path::new(SELF_USER_NS).exists() {
            return;
        }
        let (_dir, mut config) = base_config();
        with_namespaces(&mut config, &[NamespaceType::User]);
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn validate_mappings_without_user_namespace_fails() {
        let (_dir, mut config) = base_config();
        config.uid_mappings.push(IdMap {
            container_id: 123,
            ..IdMap::default()
        });
        let msg = validate(&config).unwrap_err().to_string();
        assert!(msg.contains("usernamespace"), "got: {msg}");
    }

    #[test]
    fn validate_accepts_relative_and_unclean_mounts() {
        let (_dir, config) = base_config();
        for dest in [
            "not/an/abs/path",
            "./rel/path",
            "../../path",
            "/abs/path",
            "/abs/but/../unclean",
        ] {
            let mut config = config.clone();
            config.mounts.push(Mount {
                destination: dest.into(),
                ..Mount::default()
            });
            assert!(validate(&config).is_ok(), "mount dest: {dest}");
        }
    }
}
