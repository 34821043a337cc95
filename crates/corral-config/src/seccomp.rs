//! Numerically-encoded syscall filter understood by the seccomp loader.

use serde::{Deserialize, Serialize};

/// What the kernel does when a rule matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum Action {
    /// Kill the offending thread.
    Kill = 1,
    /// Fail the syscall with an errno.
    Errno = 2,
    /// Send `SIGSYS`.
    Trap = 3,
    /// Let the syscall through.
    Allow = 4,
    /// Notify a ptrace tracer.
    Trace = 5,
    /// Allow and log.
    Log = 6,
    /// Forward to a user-space notifier.
    Notify = 7,
    /// Kill the offending thread (explicit form).
    KillThread = 8,
    /// Kill the whole process.
    KillProcess = 9,
}

impl Action {
    /// Code understood by the filter backend.
    #[must_use]
    pub const fn code(self) -> u32 {
        self as u32
    }
}

/// Comparison applied to a syscall argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum Operator {
    /// `arg == value`
    EqualTo = 1,
    /// `arg != value`
    NotEqualTo = 2,
    /// `arg > value`
    GreaterThan = 3,
    /// `arg >= value`
    GreaterThanOrEqualTo = 4,
    /// `arg < value`
    LessThan = 5,
    /// `arg <= value`
    LessThanOrEqualTo = 6,
    /// `arg & value == value_two`
    MaskEqualTo = 7,
}

impl Operator {
    /// Code understood by the filter backend.
    #[must_use]
    pub const fn code(self) -> u32 {
        self as u32
    }
}

/// A condition on one syscall argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arg {
    /// Argument index.
    pub index: u32,
    /// Primary comparison value.
    pub value: u64,
    /// Second value, meaningful only for [`Operator::MaskEqualTo`].
    pub value_two: u64,
    /// Comparison.
    pub op: Operator,
}

/// A rule for exactly one syscall.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Syscall {
    /// Syscall name.
    pub name: String,
    /// Action taken when the rule matches.
    pub action: Action,
    /// Errno for [`Action::Errno`] and [`Action::Trace`].
    pub errno_ret: Option<u32>,
    /// Conditions, all of which must hold.
    pub args: Vec<Arg>,
}

/// A complete filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seccomp {
    /// Action for syscalls no rule matches.
    pub default_action: Action,
    /// Architecture tokens (`amd64`, `arm`, ...).
    pub architectures: Vec<String>,
    /// One rule per syscall name.
    pub syscalls: Vec<Syscall>,
}
