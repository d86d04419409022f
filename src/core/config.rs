/*!
 * Guard Configuration
 *
 * Process-wide policies applied when guards are disposed.
 *
 * Environment variables (read by `GuardConfig::from_env`):
 * - ATLAS_SCOPE_ON_PANIC: `log` (default) or `abort`
 * - ATLAS_SCOPE_TRACE: `1`/`true` to emit lifecycle events (default), `0`/`false` to silence them
 */

use std::sync::OnceLock;
use tracing::warn;

pub const ENV_ON_PANIC: &str = "ATLAS_SCOPE_ON_PANIC";
pub const ENV_TRACE: &str = "ATLAS_SCOPE_TRACE";

static CONFIG: OnceLock<GuardConfig> = OnceLock::new();

/// What to do after an exit action or deleter panics during disposal
///
/// The panic is always contained at the disposal boundary and logged first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActionPanicPolicy {
    /// Log the panic and keep tearing down sibling guards
    #[default]
    Log,
    /// Log the panic, then abort the process
    Abort,
}

impl ActionPanicPolicy {
    /// Parse a policy name, case-insensitively
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "log" => Some(Self::Log),
            "abort" => Some(Self::Abort),
            _ => None,
        }
    }
}

/// Guard disposal configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardConfig {
    /// Handling of panics raised by actions and deleters (default: log)
    pub action_panic: ActionPanicPolicy,

    /// Emit created/released/disposed events (default: true)
    pub trace_lifecycle: bool,
}

impl GuardConfig {
    /// Create default configuration
    pub fn new() -> Self {
        Self {
            action_panic: ActionPanicPolicy::Log,
            trace_lifecycle: true,
        }
    }

    /// Abort on any panicking cleanup
    pub fn strict() -> Self {
        Self {
            action_panic: ActionPanicPolicy::Abort,
            trace_lifecycle: true,
        }
    }

    /// Only report errors, no lifecycle events
    pub fn quiet() -> Self {
        Self {
            action_panic: ActionPanicPolicy::Log,
            trace_lifecycle: false,
        }
    }

    /// Build configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    ///
    /// Unrecognized values fall back to the defaults with a warning.
    pub fn from_lookup<L>(lookup: L) -> Self
    where
        L: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new();

        if let Some(raw) = lookup(ENV_ON_PANIC) {
            match ActionPanicPolicy::parse(&raw) {
                Some(policy) => config.action_panic = policy,
                None => warn!(key = ENV_ON_PANIC, value = %raw, "Unknown panic policy, using default"),
            }
        }

        if let Some(raw) = lookup(ENV_TRACE) {
            match raw.trim() {
                "1" | "true" => config.trace_lifecycle = true,
                "0" | "false" => config.trace_lifecycle = false,
                other => warn!(key = ENV_TRACE, value = %other, "Expected 0/1/true/false, using default"),
            }
        }

        config
    }
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Install the process-wide configuration
///
/// Only the first call wins; later calls get their config handed back.
pub fn install(config: GuardConfig) -> Result<(), GuardConfig> {
    CONFIG.set(config)
}

/// Active configuration, read from the environment on first use
pub fn current() -> &'static GuardConfig {
    CONFIG.get_or_init(GuardConfig::from_env)
}
