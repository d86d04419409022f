/*!
 * Monitoring
 * Structured logging setup for guard lifecycle events
 */

mod tracer;

pub use tracer::{init_tracing, try_init_tracing, ENV_TRACE_JSON};
