//! Cgroup placement and resource limits.
//!
//! Only the declared shape lives here; writing it to the control-group
//! filesystem or to systemd is the cgroup collaborator's job.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::device::DeviceRule;

/// Where the container's cgroup lives and what it may consume.
///
/// Under filesystem naming only `path` (or `name` when the path is empty)
/// is set. Under systemd naming `parent`, `scope_prefix` and `name` are set
/// and `path` stays empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cgroup {
    /// Literal cgroup path.
    pub path: String,
    /// Systemd parent slice.
    pub parent: String,
    /// Systemd scope prefix.
    pub scope_prefix: String,
    /// Cgroup or unit name.
    pub name: String,
    /// Resource limits.
    pub resources: Resources,
    /// Extra unit properties for the systemd backend.
    pub systemd_props: Vec<SystemdProperty>,
    /// Failures to apply limits are tolerated.
    pub rootless: bool,
}

/// Resource limits. A zero value means "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resources {
    /// Device access rules, in order.
    pub devices: Vec<DeviceRule>,
    /// Memory hard limit in bytes.
    pub memory: i64,
    /// Memory soft limit in bytes.
    pub memory_reservation: i64,
    /// Memory plus swap limit in bytes.
    pub memory_swap: i64,
    /// Kernel memory limit in bytes.
    pub kernel_memory: i64,
    /// Kernel TCP buffer limit in bytes.
    pub kernel_memory_tcp: i64,
    /// Swappiness. Kept optional because zero is a meaningful setting.
    pub memory_swappiness: Option<u64>,
    /// Disable the OOM killer.
    pub oom_kill_disable: bool,
    /// CPU shares.
    pub cpu_shares: u64,
    /// CPU quota in microseconds.
    pub cpu_quota: i64,
    /// CPU period in microseconds.
    pub cpu_period: u64,
    /// Realtime runtime in microseconds.
    pub cpu_rt_runtime: i64,
    /// Realtime period in microseconds.
    pub cpu_rt_period: u64,
    /// Allowed CPUs.
    pub cpuset_cpus: String,
    /// Allowed memory nodes.
    pub cpuset_mems: String,
    /// Task limit.
    pub pids_limit: i64,
    /// Block I/O weight.
    pub blkio_weight: u16,
    /// Block I/O leaf weight.
    pub blkio_leaf_weight: u16,
    /// Hugetlb limits.
    pub hugetlb_limit: Vec<HugepageLimit>,
    /// net_cls class identifier.
    pub net_cls_classid: u32,
    /// net_prio interface priorities.
    pub net_prio_ifpriomap: Vec<IfPrioMap>,
    /// Raw cgroup v2 key/values.
    pub unified: BTreeMap<String, String>,
}

/// Hugetlb limit for one page size.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HugepageLimit {
    /// Page size, e.g. `2MB`.
    pub page_size: String,
    /// Limit in bytes.
    pub limit: u64,
}

/// Priority of one interface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IfPrioMap {
    /// Interface name.
    pub interface: String,
    /// Priority.
    pub priority: u32,
}

/// Typed value of a systemd unit property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyValue {
    /// Any numeric property, widened to 64 bits.
    Uint64(u64),
    /// A string property.
    Str(String),
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uint64(v) => write!(f, "{v}"),
            Self::Str(s) => write!(f, "{s:?}"),
        }
    }
}

/// A systemd unit property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemdProperty {
    /// Property name, e.g. `TimeoutStopUSec`.
    pub name: String,
    /// Property value.
    pub value: PropertyValue,
}
