/*!
 * Core Module
 * Fundamental pipe types, limits and error handling
 */

pub mod errors;
pub mod limits;
pub mod types;

// Re-export for convenience
pub use errors::{ContractViolation, PipeError};
pub use types::*;
