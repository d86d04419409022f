/*!
 * Structured Tracing
 * Subscriber setup for the events guards emit through the tracing crate
 *
 * Guards log at these levels:
 * - trace: arm, transfer, reset
 * - debug: release, disposal (with lifetime in microseconds)
 * - error: a cleanup action or deleter panicked
 */

use tracing::info;
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError,
    EnvFilter,
};

/// Enables JSON output when set to `1` or `true`
pub const ENV_TRACE_JSON: &str = "ATLAS_SCOPE_TRACE_JSON";

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - ATLAS_SCOPE_TRACE_JSON: Enable JSON output (default: false)
///
/// # Panics
///
/// Panics if a global subscriber is already installed; use
/// [`try_init_tracing`] where that can happen.
pub fn init_tracing() {
    if let Err(e) = try_init_tracing() {
        panic!("Failed to install tracing subscriber: {}", e);
    }
}

/// Initialize structured tracing, reporting an already-installed subscriber
pub fn try_init_tracing() -> Result<(), TryInitError> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let use_json = json_requested(std::env::var(ENV_TRACE_JSON).ok().as_deref());

    // Exactly one of the two output layers is present
    let json = use_json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
    });
    let compact = (!use_json).then(|| {
        tracing_subscriber::fmt::layer()
            .compact()
            .with_thread_ids(true)
            .with_span_events(FmtSpan::CLOSE)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json)
        .with(compact)
        .try_init()?;

    info!(json = use_json, "Structured tracing initialized");
    Ok(())
}

fn json_requested(value: Option<&str>) -> bool {
    matches!(value.map(str::trim), Some("1") | Some("true"))
}
