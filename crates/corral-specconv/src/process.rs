//! Process settings that the container's init applies to itself.

use corral_common::error::{CorralError, Result};
use corral_config::{Capabilities, Config, Rlimit};
use corral_spec::Process;
use corral_spec::process as spec;

/// Resource numbers from `<sys/resource.h>` on Linux.
const RLIMITS: &[(&str, u32)] = &[
    ("RLIMIT_CPU", 0),
    ("RLIMIT_FSIZE", 1),
    ("RLIMIT_DATA", 2),
    ("RLIMIT_STACK", 3),
    ("RLIMIT_CORE", 4),
    ("RLIMIT_RSS", 5),
    ("RLIMIT_NPROC", 6),
    ("RLIMIT_NOFILE", 7),
    ("RLIMIT_MEMLOCK", 8),
    ("RLIMIT_AS", 9),
    ("RLIMIT_LOCKS", 10),
    ("RLIMIT_SIGPENDING", 11),
    ("RLIMIT_MSGQUEUE", 12),
    ("RLIMIT_NICE", 13),
    ("RLIMIT_RTPRIO", 14),
    ("RLIMIT_RTTIME", 15),
];

/// Converts one rlimit declaration.
///
/// # Errors
///
/// Returns [`CorralError::Unsupported`] for unknown resource names.
pub fn create_rlimit(declared: &spec::Rlimit) -> Result<Rlimit> {
    let resource = RLIMITS
        .iter()
        .find(|(n, _)| *n == declared.kind)
        .map(|&(_, r)| r)
        .ok_or_else(|| CorralError::Unsupported {
            kind: "rlimit",
            name: declared.kind.clone(),
        })?;
    Ok(Rlimit {
        resource,
        hard: declared.hard,
        soft: declared.soft,
    })
}

/// Copies the process-level security settings into `config`.
///
/// # Errors
///
/// Propagates [`create_rlimit`] errors.
pub fn apply_process(process: &Process, config: &mut Config) -> Result<()> {
    config.no_new_privileges = process.no_new_privileges;
    config.oom_score_adj = process.oom_score_adj;
    config.apparmor_profile.clone_from(&process.apparmor_profile);
    config.process_label.clone_from(&process.selinux_label);
    config.capabilities = process.capabilities.as_ref().map(|c| Capabilities {
        bounding: c.bounding.clone(),
        effective: c.effective.clone(),
        inheritable: c.inheritable.clone(),
        permitted: c.permitted.clone(),
        ambient: c.ambient.clone(),
    });
    config.rlimits = process
        .rlimits
        .iter()
        .map(create_rlimit)
        .collect::<Result<Vec<_>>>()?;
    Ok(())
}
