/*!
 * Pipe Limits and Constants
 *
 * Centralized location for allocation sizes used by the pipe.
 *
 * - Performance-critical constants are marked with [PERF]
 */

use super::types::Size;

// =============================================================================
// ALLOCATION
// =============================================================================

/// Base allocation unit (512 bytes)
/// The growth unit of every pipe is a multiple of this, never smaller
/// [PERF] Small pipes grow in base-unit steps, large pipes in proportionally larger steps
pub const DEFAULT_ALLOCATION_UNIT: Size = 512;

/// Initial capacity of a default-constructed pipe
pub const DEFAULT_INITIAL_CAPACITY: Size = 0;

/// Minimum growth requested by `BufMut::chunk_mut` when the writable region is exhausted
/// Any non-zero value rounds up to one growth unit
pub const BUF_MUT_MIN_RESERVE: Size = 1;

// =============================================================================
// DIAGNOSTICS
// =============================================================================

/// Environment variable enabling JSON trace output
pub const TRACE_JSON_ENV: &str = "PIPE_TRACE_JSON";

/// Default tracing filter when `RUST_LOG` is unset
pub const DEFAULT_TRACE_FILTER: &str = "info";
