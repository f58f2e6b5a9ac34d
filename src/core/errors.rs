/*!
 * Error Types
 * Fatal contract violations and recoverable pipe errors, with thiserror and miette support
 */

use super::types::Size;
use miette::Diagnostic;
use thiserror::Error;
use tracing::error;

/// Caller-induced invariant breaches
///
/// These are never returned through `Result`. Detection raises them with
/// [`ContractViolation::raise`], which terminates the offending call path.
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum ContractViolation {
    #[error("Pipe::{operation}(): Buffer locked")]
    #[diagnostic(
        code(pipe::locked),
        help("A view into the buffer was handed out. Finish the hand-off or call unlock() first.")
    )]
    Locked { operation: &'static str },

    #[error("Pipe::lock(): Buffer already locked")]
    #[diagnostic(
        code(pipe::already_locked),
        help("lock() was called twice without an intermediate unlock().")
    )]
    AlreadyLocked,

    #[error("Pipe::unlock(): Buffer not locked")]
    #[diagnostic(
        code(pipe::not_locked),
        help("unlock() was called without a matching lock().")
    )]
    NotLocked,

    #[error("Pipe::produced(): Produced bytes exceeds the number of available bytes ({requested} > {available})")]
    #[diagnostic(
        code(pipe::produced_overflow),
        help("A producer may only claim bytes inside the writable region it was given.")
    )]
    ProducedOverflow { requested: Size, available: Size },

    #[error("Pipe::consumed(): Consumed bytes exceeds the number of available bytes ({requested} > {available})")]
    #[diagnostic(
        code(pipe::consumed_overflow),
        help("A consumer may only release bytes inside the readable region it was given.")
    )]
    ConsumedOverflow { requested: Size, available: Size },

    #[error("Pipe::ensure_capacity(): expecting pack to free up enough bytes: {available} < {needed}. hs: {head_space} ts: {tail_space}")]
    #[diagnostic(code(pipe::pack_shortfall))]
    PackShortfall {
        available: Size,
        needed: Size,
        head_space: Size,
        tail_space: Size,
    },

    #[error("Pipe::{operation}(): Hand-off does not describe the current {region} region")]
    #[diagnostic(
        code(pipe::foreign_handoff),
        help("Hand-off tokens must be finished on the pipe that issued them.")
    )]
    ForeignHandoff {
        operation: &'static str,
        region: &'static str,
    },

    #[error("Pipe::{operation}(): Completed {requested} bytes but the hand-off covered {available}")]
    #[diagnostic(code(pipe::handoff_overflow))]
    HandoffOverflow {
        operation: &'static str,
        requested: Size,
        available: Size,
    },
}

impl ContractViolation {
    /// Log the violation and abort the current call path
    #[cold]
    #[inline(never)]
    #[track_caller]
    pub fn raise(self) -> ! {
        error!(violation = %self, "Pipe contract violation");
        panic!("{}", self)
    }
}

/// Recoverable pipe errors
///
/// Environmental failures only. Misuse of the pipe is a [`ContractViolation`].
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum PipeError {
    #[error("Memory allocation failed: requested {requested} bytes")]
    #[diagnostic(
        code(pipe::allocation_failed),
        help("System may be low on memory. Consider a smaller request.")
    )]
    AllocationFailed { requested: Size },

    #[error("Capacity overflow: capacity {capacity} cannot grow by {additional} bytes")]
    #[diagnostic(code(pipe::capacity_overflow))]
    CapacityOverflow { capacity: Size, additional: Size },

    #[error("Invalid configuration: {0}")]
    #[diagnostic(
        code(pipe::invalid_config),
        help("Check the allocation unit and initial capacity.")
    )]
    InvalidConfig(String),
}
