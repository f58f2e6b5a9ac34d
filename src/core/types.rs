/*!
 * Core Types
 * Common types used across the pipe
 */

/// Size type for buffer lengths and offsets
pub type Size = usize;

/// Address type used when reporting storage locations
pub type Address = usize;

/// Signed byte count returned by producer/consumer callbacks
///
/// Positive values are byte counts, zero means "nothing happened" and
/// negative values carry the callback's own error code.
pub type ByteCount = isize;

/// Common result type for recoverable pipe operations
pub type PipeResult<T> = Result<T, super::errors::PipeError>;
