/*!
 * Pipe Module
 * Growable staging buffer decoupling a producer from a consumer
 */

mod cursor;
mod growth;
pub mod handoff;
mod io;
pub mod pipe;
pub mod types;

// Re-export public API
pub use handoff::{DrainHandoff, FillHandoff};
pub use pipe::Pipe;
pub use types::{PipeConfig, PipeStats};
