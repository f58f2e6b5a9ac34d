/*!
 * Diagnostics
 * Memory-poisoning instrumentation and tracing setup
 */

mod poison;
mod tracer;

pub use poison::{MemoryChecker, NoopChecker, TracingChecker};
pub use tracer::init_tracing;
