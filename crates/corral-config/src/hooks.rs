//! Lifecycle hooks, keyed by the phase in which they run.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Lifecycle phase at which a hook runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HookPhase {
    /// After the container is created, before `pivot_root` (deprecated).
    Prestart,
    /// During create, in the runtime namespace.
    CreateRuntime,
    /// During create, in the container namespace.
    CreateContainer,
    /// During start, before the user process executes.
    StartContainer,
    /// After the user process starts.
    Poststart,
    /// After the container is deleted.
    Poststop,
}

/// Upper bound on a hook's run time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timeout(Duration);

impl Timeout {
    /// A timeout of `secs` seconds.
    #[must_use]
    pub const fn from_secs(secs: u64) -> Self {
        Self(Duration::from_secs(secs))
    }

    /// The timeout as a [`Duration`].
    #[must_use]
    pub const fn as_duration(self) -> Duration {
        self.0
    }
}

impl From<Duration> for Timeout {
    fn from(d: Duration) -> Self {
        Self(d)
    }
}

/// Writes `value / scale` with its fractional part, trailing zeros trimmed.
fn write_scaled(f: &mut fmt::Formatter<'_>, value: u128, scale: u128, unit: &str) -> fmt::Result {
    let whole = value / scale;
    let frac = value % scale;
    if frac == 0 {
        return write!(f, "{whole}{unit}");
    }
    let width = scale.ilog10() as usize;
    let digits = format!("{frac:0width$}");
    write!(f, "{whole}.{}{unit}", digits.trim_end_matches('0'))
}

/// Renders as hours, minutes and seconds (`1h0m0s`, `1m30s`, `45s`),
/// falling back to `ms`, `µs` or `ns` below one second.
impl fmt::Display for Timeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nanos = self.0.as_nanos();
        if nanos == 0 {
            return f.write_str("0s");
        }
        if nanos < 1_000 {
            return write!(f, "{nanos}ns");
        }
        if nanos < 1_000_000 {
            return write_scaled(f, nanos, 1_000, "µs");
        }
        if nanos < 1_000_000_000 {
            return write_scaled(f, nanos, 1_000_000, "ms");
        }

        let secs = self.0.as_secs();
        let (hours, minutes) = (secs / 3600, (secs % 3600) / 60);
        if hours > 0 {
            write!(f, "{hours}h{minutes}m")?;
        } else if minutes > 0 {
            write!(f, "{minutes}m")?;
        }
        let rem = u128::from(secs % 60) * 1_000_000_000 + u128::from(self.0.subsec_nanos());
        write_scaled(f, rem, 1_000_000_000, "s")
    }
}

/// A command executed at a lifecycle phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandHook {
    /// Absolute path of the executable.
    pub path: String,
    /// Arguments, including `argv[0]`.
    pub args: Vec<String>,
    /// Environment in `KEY=value` form.
    pub env: Vec<String>,
    /// Run-time limit enforced by the executor, if any.
    pub timeout: Option<Timeout>,
}

/// Hooks grouped by phase. A phase with no entry was not declared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hooks(BTreeMap<HookPhase, Vec<CommandHook>>);

impl Hooks {
    /// Hooks declared for `phase`, or `None` when the phase was absent.
    #[must_use]
    pub fn get(&self, phase: HookPhase) -> Option<&[CommandHook]> {
        self.0.get(&phase).map(Vec::as_slice)
    }

    /// Records the hooks for `phase`, replacing any previous list.
    pub fn set(&mut self, phase: HookPhase, hooks: Vec<CommandHook>) {
        let _ = self.0.insert(phase, hooks);
    }

    /// Returns `true` when no phase was declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
