//! # corral-specconv
//!
//! Translates a container [`Spec`] into the runtime's internal [`Config`].
//!
//! Translation is pure apart from two read-only host facts, captured in a
//! [`HostContext`]: the bundle directory (the current directory of the
//! caller) and the invoking user's effective IDs. The result is either a
//! complete configuration or an error; nothing partial is ever returned.
//! Callers pass the result to [`corral_config::validate::validate`] before
//! acting on it.

pub mod cgroup;
pub mod device;
pub mod hooks;
pub mod mount;
pub mod namespace;
pub mod process;
pub mod rootless;
pub mod seccomp;
pub mod systemd;

use std::path::{Path, PathBuf};

use corral_common::config::TranslateOptions;
use corral_common::constants::BUNDLE_LABEL;
use corral_common::error::{CorralError, Result};
use corral_common::host::HostIds;
use corral_config::namespace::NamespaceType;
use corral_config::network::Network;
use corral_config::{Config, IdMap};
use corral_spec::Spec;
use corral_spec::linux::IdMapping;

/// Host facts translation depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostContext {
    /// Bundle directory; relative paths in the specification resolve here.
    pub bundle: PathBuf,
    /// Effective IDs of the invoking user.
    pub ids: HostIds,
}

impl HostContext {
    /// Captures the current directory and effective IDs.
    ///
    /// # Errors
    ///
    /// Returns [`CorralError::Io`] when the current directory is unreadable.
    pub fn current() -> Result<Self> {
        let bundle = std::env::current_dir().map_err(|source| CorralError::Io {
            path: PathBuf::from("."),
            source,
        })?;
        Ok(Self {
            bundle,
            ids: HostIds::current(),
        })
    }
}

/// Translates `spec` using the current directory as the bundle.
///
/// # Errors
///
/// See [`create_config_with`].
pub fn create_config(spec: &Spec, opts: &TranslateOptions) -> Result<Config> {
    create_config_with(spec, opts, &HostContext::current()?)
}

fn id_maps(declared: &[IdMapping]) -> Vec<IdMap> {
    declared
        .iter()
        .map(|m| IdMap {
            container_id: m.container_id,
            host_id: m.host_id,
            size: m.size,
        })
        .collect()
}

fn rootfs_path(bundle: &Path, root: &str) -> PathBuf {
    let root = Path::new(root);
    if root.is_absolute() {
        root.to_path_buf()
    } else {
        bundle.join(root)
    }
}

/// Translates `spec` against explicit host facts.
///
/// # Errors
///
/// Returns [`CorralError::MalformedSpec`] when the root is missing or a
/// namespace is declared twice, [`CorralError::Unsupported`] for unknown
/// named constants, and the cgroup and systemd property errors of
/// [`cgroup::create_cgroup_config`].
pub fn create_config_with(spec: &Spec, opts: &TranslateOptions, host: &HostContext) -> Result<Config> {
    let root = spec
        .root
        .as_ref()
        .ok_or_else(|| CorralError::malformed("root must be specified"))?;

    let mut labels = vec![format!("{BUNDLE_LABEL}={}", host.bundle.display())];
    labels.extend(spec.annotations.iter().map(|(k, v)| format!("{k}={v}")));

    let mut config = Config {
        rootfs: rootfs_path(&host.bundle, &root.path),
        readonly_fs: root.readonly,
        no_pivot_root: opts.no_pivot_root,
        no_new_keyring: opts.no_new_keyring,
        hostname: spec.hostname.clone(),
        domainname: spec.domainname.clone(),
        labels,
        rootless_euid: opts.rootless_euid,
        rootless_cgroups: opts.rootless_cgroups,
        ..Config::default()
    };

    config.mounts = spec
        .mounts
        .iter()
        .map(|m| mount::create_mount(&host.bundle, m))
        .collect();

    config.cgroups = cgroup::create_cgroup_config(spec, opts)?;

    if let Some(linux) = &spec.linux {
        config.rootfs_propagation = mount::rootfs_propagation(&linux.rootfs_propagation)?;
        config.namespaces = namespace::create_namespaces(&linux.namespaces)?;
        if config.namespaces.contains(NamespaceType::Net)
            && config.namespaces.path_of(NamespaceType::Net).is_none()
        {
            config.networks = vec![Network::loopback()];
        }
        config.uid_mappings = id_maps(&linux.uid_mappings);
        config.gid_mappings = id_maps(&linux.gid_mappings);
        config.sysctl.clone_from(&linux.sysctl);
        config.masked_paths.clone_from(&linux.masked_paths);
        config.readonly_paths.clone_from(&linux.readonly_paths);
        config.mount_label.clone_from(&linux.mount_label);
        config.seccomp = linux.seccomp.as_ref().map(seccomp::setup_seccomp).transpose()?;
        config.devices = device::create_devices(&linux.devices)?;
    } else {
        config.devices = device::create_devices(&[])?;
    }

    if let Some(declared) = &spec.process {
        process::apply_process(declared, &mut config)?;
    }

    if let Some(declared) = &spec.hooks {
        config.hooks = hooks::create_hooks(declared);
    }

    if opts.rootless_euid {
        let (uid, gid) = spec
            .process
            .as_ref()
            .map_or((0, 0), |p| (p.user.uid, p.user.gid));
        rootless::adjust(&mut config, host.ids, uid, gid);
    }

    tracing::info!(
        rootfs = %config.rootfs.display(),
        namespaces = config.namespaces.len(),
        mounts = config.mounts.len(),
        rootless = opts.rootless_euid,
        "translated container spec"
    );
    Ok(config)
}
