/*!
 * Memory Poisoning
 * Instrumentation seam for marking unread/unwritten storage to a memory checker
 */

use tracing::trace;

/// Receives accessibility changes for regions of pipe storage
///
/// The pipe calls these hooks around every mutation so an instrumented
/// build can flag reads of unwritten bytes or writes outside the region a
/// producer was given. Implementations must not touch the bytes themselves.
/// Empty regions are never reported.
pub trait MemoryChecker {
    /// The region may be read and written
    fn mark_accessible(&mut self, region: &[u8]);

    /// Any access to the region is a bug
    fn mark_inaccessible(&mut self, region: &[u8]);
}

/// Default checker; compiles away entirely
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoopChecker;

impl MemoryChecker for NoopChecker {
    #[inline(always)]
    fn mark_accessible(&mut self, _region: &[u8]) {}

    #[inline(always)]
    fn mark_inaccessible(&mut self, _region: &[u8]) {}
}

/// Emits every accessibility change as a `trace!` event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TracingChecker;

impl MemoryChecker for TracingChecker {
    fn mark_accessible(&mut self, region: &[u8]) {
        trace!(
            target: "ai_os_pipe::poison",
            address = format!("0x{:x}", region.as_ptr() as usize),
            len = region.len(),
            "mark accessible"
        );
    }

    fn mark_inaccessible(&mut self, region: &[u8]) {
        trace!(
            target: "ai_os_pipe::poison",
            address = format!("0x{:x}", region.as_ptr() as usize),
            len = region.len(),
            "mark inaccessible"
        );
    }
}
