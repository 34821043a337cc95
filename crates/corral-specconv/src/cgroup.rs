//! Cgroup placement, resource limits and device rules.

use corral_common::config::TranslateOptions;
use corral_common::constants::{DEFAULT_SYSTEMD_PARENT, DEFAULT_SYSTEMD_SCOPE_PREFIX};
use corral_common::error::{CorralError, Result};
use corral_config::cgroup::{Cgroup, HugepageLimit, IfPrioMap, Resources};
use corral_config::device::{self, DeviceRule, DeviceType, WILDCARD};
use corral_spec::Spec;
use corral_spec::linux as spec;

use crate::systemd;

/// Places the cgroup. Under systemd naming `cgroups_path` is a
/// `parent:scope-prefix:name` triplet, and an empty path selects the
/// default slice and prefix with `name`. Otherwise the path is taken
/// verbatim, and `name` is only used when the path is empty.
///
/// # Errors
///
/// Returns [`CorralError::InvalidCgroupPath`] when a systemd path is not a
/// triplet.
pub fn resolve_placement(cgroups_path: &str, name: &str, use_systemd: bool) -> Result<Cgroup> {
    if !use_systemd {
        return Ok(Cgroup {
            path: cgroups_path.to_string(),
            name: if cgroups_path.is_empty() {
                name.to_string()
            } else {
                String::new()
            },
            ..Cgroup::default()
        });
    }

    if cgroups_path.is_empty() {
        return Ok(Cgroup {
            parent: DEFAULT_SYSTEMD_PARENT.to_string(),
            scope_prefix: DEFAULT_SYSTEMD_SCOPE_PREFIX.to_string(),
            name: name.to_string(),
            ..Cgroup::default()
        });
    }

    let parts: Vec<&str> = cgroups_path.split(':').collect();
    let [parent, scope_prefix, unit] = parts.as_slice() else {
        return Err(CorralError::InvalidCgroupPath {
            path: cgroups_path.to_string(),
            reason: "expected \"slice:prefix:name\" for systemd cgroups",
        });
    };
    Ok(Cgroup {
        parent: (*parent).to_string(),
        scope_prefix: (*scope_prefix).to_string(),
        name: (*unit).to_string(),
        ..Cgroup::default()
    })
}

fn device_type(kind: Option<&str>) -> Result<DeviceType> {
    match kind.unwrap_or("a") {
        "a" => Ok(DeviceType::All),
        "b" => Ok(DeviceType::Block),
        "c" => Ok(DeviceType::Char),
        other => Err(CorralError::malformed(format!(
            "invalid cgroup device type {other:?}"
        ))),
    }
}

/// Converts one device cgroup entry. Missing numbers are wildcards and a
/// missing access string means `rwm`.
///
/// # Errors
///
/// Returns [`CorralError::MalformedSpec`] for an unknown device type or an
/// access string with letters other than `r`, `w` and `m`.
pub fn create_device_rule(entry: &spec::DeviceCgroup) -> Result<DeviceRule> {
    let permissions = entry.access.clone().unwrap_or_else(|| "rwm".to_string());
    if !permissions.chars().all(|c| matches!(c, 'r' | 'w' | 'm')) {
        return Err(CorralError::malformed(format!(
            "invalid cgroup device access {permissions:?}"
        )));
    }
    Ok(DeviceRule {
        kind: device_type(entry.kind.as_deref())?,
        major: entry.major.unwrap_or(WILDCARD),
        minor: entry.minor.unwrap_or(WILDCARD),
        permissions,
        allow: entry.allow,
    })
}

/// Copies every present limit. Absent limits keep their zero defaults.
fn apply_limits(declared: &spec::Resources, out: &mut Resources) {
    if let Some(mem) = &declared.memory {
        out.memory = mem.limit.unwrap_or_default();
        out.memory_reservation = mem.reservation.unwrap_or_default();
        out.memory_swap = mem.swap.unwrap_or_default();
        out.kernel_memory = mem.kernel.unwrap_or_default();
        out.kernel_memory_tcp = mem.kernel_tcp.unwrap_or_default();
        out.memory_swappiness = mem.swappiness;
        out.oom_kill_disable = mem.disable_oom_killer.unwrap_or_default();
    }
    if let Some(cpu) = &declared.cpu {
        out.cpu_shares = cpu.shares.unwrap_or_default();
        out.cpu_quota = cpu.quota.unwrap_or_default();
        out.cpu_period = cpu.period.unwrap_or_default();
        out.cpu_rt_runtime = cpu.realtime_runtime.unwrap_or_default();
        out.cpu_rt_period = cpu.realtime_period.unwrap_or_default();
        out.cpuset_cpus.clone_from(&cpu.cpus);
        out.cpuset_mems.clone_from(&cpu.mems);
    }
    if let Some(pids) = &declared.pids {
        out.pids_limit = pids.limit;
    }
    if let Some(blkio) = &declared.block_io {
        out.blkio_weight = blkio.weight.unwrap_or_default();
        out.blkio_leaf_weight = blkio.leaf_weight.unwrap_or_default();
    }
    out.hugetlb_limit = declared
        .hugepage_limits
        .iter()
        .map(|l| HugepageLimit {
            page_size: l.page_size.clone(),
            limit: l.limit,
        })
        .collect();
    if let Some(net) = &declared.network {
        out.net_cls_classid = net.class_id.unwrap_or_default();
        out.net_prio_ifpriomap = net
            .priorities
            .iter()
            .map(|p| IfPrioMap {
                interface: p.name.clone(),
                priority: p.priority,
            })
            .collect();
    }
    out.unified.clone_from(&declared.unified);
}

/// Builds the full cgroup description: placement, limits, device rules and,
/// under systemd naming, unit properties from the annotations.
///
/// # Errors
///
/// Propagates placement, device rule and systemd property errors.
pub fn create_cgroup_config(spec: &Spec, opts: &TranslateOptions) -> Result<Cgroup> {
    let linux = spec.linux.as_ref();
    let cgroups_path = linux.map_or("", |l| l.cgroups_path.as_str());
    let mut cgroup = resolve_placement(cgroups_path, &opts.cgroup_name, opts.use_systemd_cgroup)?;

    if opts.use_systemd_cgroup {
        cgroup.systemd_props = systemd::init_systemd_props(&spec.annotations)?;
    }

    if let Some(declared) = linux.and_then(|l| l.resources.as_ref()) {
        cgroup.resources.devices = declared
            .devices
            .iter()
            .map(create_device_rule)
            .collect::<Result<Vec<_>>>()?;
        apply_limits(declared, &mut cgroup.resources);
    }
    cgroup.resources.devices.extend(device::default_allow_rules());
    cgroup.rootless = opts.rootless_cgroups;

    tracing::debug!(
        path = %cgroup.path,
        parent = %cgroup.parent,
        name = %cgroup.name,
        device_rules = cgroup.resources.devices.len(),
        "resolved cgroup"
    );
    Ok(cgroup)
}
