//! Seccomp names to numeric codes.

use corral_common::error::{CorralError, Result};
use corral_config::seccomp::{Action, Arg, Operator, Seccomp, Syscall};
use corral_spec::linux as spec;

const ACTIONS: &[(&str, Action)] = &[
    ("SCMP_ACT_KILL", Action::Kill),
    ("SCMP_ACT_KILL_THREAD", Action::KillThread),
    ("SCMP_ACT_KILL_PROCESS", Action::KillProcess),
    ("SCMP_ACT_ERRNO", Action::Errno),
    ("SCMP_ACT_TRAP", Action::Trap),
    ("SCMP_ACT_ALLOW", Action::Allow),
    ("SCMP_ACT_TRACE", Action::Trace),
    ("SCMP_ACT_LOG", Action::Log),
    ("SCMP_ACT_NOTIFY", Action::Notify),
];

const OPERATORS: &[(&str, Operator)] = &[
    ("SCMP_CMP_NE", Operator::NotEqualTo),
    ("SCMP_CMP_LT", Operator::LessThan),
    ("SCMP_CMP_LE", Operator::LessThanOrEqualTo),
    ("SCMP_CMP_EQ", Operator::EqualTo),
    ("SCMP_CMP_GE", Operator::GreaterThanOrEqualTo),
    ("SCMP_CMP_GT", Operator::GreaterThan),
    ("SCMP_CMP_MASKED_EQ", Operator::MaskEqualTo),
];

const ARCHITECTURES: &[(&str, &str)] = &[
    ("SCMP_ARCH_X86", "x86"),
    ("SCMP_ARCH_X86_64", "amd64"),
    ("SCMP_ARCH_X32", "x32"),
    ("SCMP_ARCH_ARM", "arm"),
    ("SCMP_ARCH_AARCH64", "arm64"),
    ("SCMP_ARCH_MIPS", "mips"),
    ("SCMP_ARCH_MIPS64", "mips64"),
    ("SCMP_ARCH_MIPS64N32", "mips64n32"),
    ("SCMP_ARCH_MIPSEL", "mipsel"),
    ("SCMP_ARCH_MIPSEL64", "mipsel64"),
    ("SCMP_ARCH_MIPSEL64N32", "mipsel64n32"),
    ("SCMP_ARCH_PPC", "ppc"),
    ("SCMP_ARCH_PPC64", "ppc64"),
    ("SCMP_ARCH_PPC64LE", "ppc64le"),
    ("SCMP_ARCH_RISCV64", "riscv64"),
    ("SCMP_ARCH_S390", "s390"),
    ("SCMP_ARCH_S390X", "s390x"),
];

fn lookup<T: Copy>(table: &[(&str, T)], kind: &'static str, name: &str) -> Result<T> {
    table
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, v)| *v)
        .ok_or_else(|| CorralError::Unsupported {
            kind,
            name: name.to_string(),
        })
}

/// Looks up a seccomp action name.
///
/// # Errors
///
/// Returns [`CorralError::Unsupported`] for unknown names.
pub fn action(name: &str) -> Result<Action> {
    lookup(ACTIONS, "seccomp action", name)
}

/// Looks up a seccomp comparison operator name.
///
/// # Errors
///
/// Returns [`CorralError::Unsupported`] for unknown names.
pub fn operator(name: &str) -> Result<Operator> {
    lookup(OPERATORS, "seccomp operator", name)
}

/// Looks up the short token of a seccomp architecture name.
///
/// # Errors
///
/// Returns [`CorralError::Unsupported`] for unknown names.
pub fn architecture(name: &str) -> Result<&'static str> {
    lookup(ARCHITECTURES, "seccomp architecture", name)
}

/// Converts a declared filter. Each rule is expanded into one entry per
/// syscall name, all sharing the rule's action and argument conditions.
///
/// # Errors
///
/// Returns [`CorralError::Unsupported`] for any unknown action, operator or
/// architecture.
pub fn setup_seccomp(declared: &spec::Seccomp) -> Result<Seccomp> {
    let default_action = action(&declared.default_action)?;
    let architectures = declared
        .architectures
        .iter()
        .map(|a| architecture(a).map(str::to_string))
        .collect::<Result<Vec<_>>>()?;

    let mut syscalls = Vec::new();
    for rule in &declared.syscalls {
        let rule_action = action(&rule.action)?;
        let args = rule
            .args
            .iter()
            .map(|a| {
                Ok(Arg {
                    index: a.index,
                    value: a.value,
                    value_two: a.value_two,
                    op: operator(&a.op)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        syscalls.extend(rule.names.iter().map(|name| Syscall {
            name: name.clone(),
            action: rule_action,
            errno_ret: rule.errno_ret,
            args: args.clone(),
        }));
    }

    tracing::debug!(
        default_action = default_action.code(),
        rules = syscalls.len(),
        "translated seccomp filter"
    );
    Ok(Seccomp {
        default_action,
        architectures,
        syscalls,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(names: &[&str], action: &str, args: Vec<spec::SeccompArg>) -> spec::Syscall {
        spec::Syscall {
            names: names.iter().map(|n| (*n).to_string()).collect(),
            action: action.into(),
            errno_ret: None,
            args,
        }
    }

    fn clone_mask() -> u64 {
        let flags = libc::CLONE_NEWNS
            | libc::CLONE_NEWUTS
            | libc::CLONE_NEWIPC
            | libc::CLONE_NEWUSER
            | libc::CLONE_NEWPID
            | libc::CLONE_NEWNET
            | libc::CLONE_NEWCGROUP;
        u64::try_from(flags).unwrap()
    }

    fn declared() -> spec::Seccomp {
        spec::Seccomp {
            default_action: "SCMP_ACT_ERRNO".into(),
            architectures: vec!["SCMP_ARCH_X86_64".into(), "SCMP_ARCH_ARM".into()],
            syscalls: vec![
                rule(
                    &["clone"],
                    "SCMP_ACT_ALLOW",
                    vec![spec::SeccompArg {
                        index: 0,
                        value: clone_mask(),
                        value_two: 0,
                        op: "SCMP_CMP_MASKED_EQ".into(),
                    }],
                ),
                rule(
                    &["select", "semctl", "semget", "semop", "semtimedop", "send", "sendfile"],
                    "SCMP_ACT_ALLOW",
                    Vec::new(),
                ),
            ],
        }
    }

    #[test]
    fn setup_seccomp_translates_codes() {
        let filter = setup_seccomp(&declared()).unwrap();
        assert_eq!(filter.default_action.code(), 2);
        assert_eq!(filter.architectures, ["amd64", "arm"]);
        assert_eq!(filter.syscalls.len(), 8);

        let clone = &filter.syscalls[0];
        assert_eq!(clone.name, "clone");
        assert_eq!(clone.action.code(), 4);
        assert_eq!(clone.args.len(), 1);
        assert_eq!(clone.args[0].op.code(), 7);
        assert_eq!(clone.args[0].index, 0);
        assert_eq!(clone.args[0].value, clone_mask());
        assert_eq!(clone.args[0].value_two, 0);

        for call in &filter.syscalls[1..] {
            assert_eq!(call.action, Action::Allow);
            assert!(call.args.is_empty());
        }
        assert_eq!(filter.syscalls[7].name, "sendfile");
    }

    #[test]
    fn setup_seccomp_unknown_action_fails() {
        let mut spec = declared();
        spec.syscalls[1].action = "SCMP_ACT_SHRUG".into();
        let msg = setup_seccomp(&spec).unwrap_err().to_string();
        assert!(msg.contains("SCMP_ACT_SHRUG"), "got: {msg}");
    }

    #[test]
    fn setup_seccomp_unknown_architecture_fails() {
        let mut spec = declared();
        spec.architectures.push("SCMP_ARCH_VAX".into());
        assert!(matches!(
            setup_seccomp(&spec),
            Err(CorralError::Unsupported {
                kind: "seccomp architecture",
                ..
            })
        ));
    }

    #[test]
    fn setup_seccomp_unknown_operator_fails() {
        let mut spec = declared();
        spec.syscalls[0].args[0].op = "SCMP_CMP_APPROX".into();
        assert!(setup_seccomp(&spec).is_err());
    }

    #[test]
    fn every_action_name_resolves() {
        assert_eq!(action("SCMP_ACT_KILL").unwrap().code(), 1);
        assert_eq!(action("SCMP_ACT_TRAP").unwrap().code(), 3);
        assert_eq!(action("SCMP_ACT_TRACE").unwrap().code(), 5);
        assert_eq!(action("SCMP_ACT_LOG").unwrap().code(), 6);
        assert_eq!(action("SCMP_ACT_NOTIFY").unwrap().code(), 7);
        assert_eq!(action("SCMP_ACT_KILL_THREAD").unwrap().code(), 8);
        assert_eq!(action("SCMP_ACT_KILL_PROCESS").unwrap().code(), 9);
    }

    #[test]
    fn architecture_tokens() {
        assert_eq!(architecture("SCMP_ARCH_AARCH64").unwrap(), "arm64");
        assert_eq!(architecture("SCMP_ARCH_PPC64LE").unwrap(), "ppc64le");
        assert!(architecture("x86_64").is_err());
    }
}
