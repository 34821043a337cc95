//! Hook declarations to command descriptors.

use corral_config::hooks::{CommandHook, HookPhase, Hooks, Timeout};
use corral_spec::hooks as spec;

/// Converts one hook declaration.
#[must_use]
pub fn create_command_hook(hook: &spec::Hook) -> CommandHook {
    CommandHook {
        path: hook.path.clone(),
        args: hook.args.clone(),
        env: hook.env.clone(),
        timeout: hook.timeout.map(|secs| Timeout::from_secs(u64::from(secs))),
    }
}

/// Converts every declared phase, preserving declaration order. Phases the
/// specification omits get no entry.
#[must_use]
pub fn create_hooks(hooks: &spec::Hooks) -> Hooks {
    let phases = [
        (HookPhase::Prestart, &hooks.prestart),
        (HookPhase::CreateRuntime, &hooks.create_runtime),
        (HookPhase::CreateContainer, &hooks.create_container),
        (HookPhase::StartContainer, &hooks.start_container),
        (HookPhase::Poststart, &hooks.poststart),
        (HookPhase::Poststop, &hooks.poststop),
    ];

    let mut out = Hooks::default();
    for (phase, declared) in phases {
        if let Some(declared) = declared {
            out.set(phase, declared.iter().map(create_command_hook).collect());
        }
    }
    out
}
