/*!
 * AI-OS Pipe Library
 * Growable linear staging buffer between I/O producers and protocol consumers
 *
 * ```
 * use ai_os_pipe::Pipe;
 *
 * let mut pipe = Pipe::new(1000);
 * assert_eq!(pipe.growth_unit(), 1024);
 *
 * pipe.ensure_capacity(5);
 * pipe.produce(|buf| {
 *     buf[..5].copy_from_slice(b"hello");
 *     5
 * });
 * let seen = pipe.consume(|data| data.len() as isize);
 * assert_eq!(seen, 5);
 * assert!(pipe.empty());
 * ```
 */

pub mod core;
pub mod diagnostics;
pub mod pipe;

// Re-exports
pub use crate::core::errors::{ContractViolation, PipeError};
pub use crate::core::types::{ByteCount, PipeResult, Size};
pub use diagnostics::{init_tracing, MemoryChecker, NoopChecker, TracingChecker};
pub use pipe::{DrainHandoff, FillHandoff, Pipe, PipeConfig, PipeStats};
