/*!
 * Asynchronous Hand-off
 * Lock-backed raw views for I/O that completes after the call returns
 */

use super::pipe::Pipe;
use crate::core::errors::ContractViolation;
use crate::core::types::Size;
use crate::diagnostics::MemoryChecker;
use std::ptr::NonNull;

/// Writable region handed to an asynchronous producer
///
/// Obtained from [`Pipe::begin_fill`]. The pipe stays locked until the
/// token is returned through [`Pipe::finish_fill`], so the storage behind
/// the pointer cannot move in the meantime.
#[must_use = "the pipe stays locked until the hand-off is finished"]
#[derive(Debug)]
pub struct FillHandoff {
    ptr: NonNull<u8>,
    len: Size,
}

// SAFETY: the token is a plain address. The pipe stays locked until the token
// comes back through `finish_fill`, so the region is neither moved nor freed
// while it is in flight, and the owning `&mut Pipe` hands out no other
// writable view of it. Dereferencing remains the caller's unsafe obligation.
unsafe impl Send for FillHandoff {}

impl FillHandoff {
    /// Start of the writable region
    pub fn as_mut_ptr(&self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    pub fn len(&self) -> Size {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Readable region handed to an asynchronous consumer
#[must_use = "the pipe stays locked until the hand-off is finished"]
#[derive(Debug)]
pub struct DrainHandoff {
    ptr: NonNull<u8>,
    len: Size,
}

// SAFETY: as for `FillHandoff`; the readable region is fixed until
// `finish_drain` unlocks the pipe.
unsafe impl Send for DrainHandoff {}

impl DrainHandoff {
    /// Start of the readable region
    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    pub fn len(&self) -> Size {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<C: MemoryChecker> Pipe<C> {
    /// Lock the pipe and expose the writable region through a raw pointer
    ///
    /// Call [`ensure_capacity`](Self::ensure_capacity) first.
    #[track_caller]
    pub fn begin_fill(&mut self) -> FillHandoff {
        self.lock();
        self.expose_writable();

        let range = self.writable_range();
        let len = range.len();
        FillHandoff {
            ptr: NonNull::from(&mut self.storage[range]).cast::<u8>(),
            len,
        }
    }

    /// Unlock the pipe and publish `nbytes` written through the hand-off
    #[track_caller]
    pub fn finish_fill(&mut self, handoff: FillHandoff, nbytes: Size) {
        let range = self.writable_range();
        let region = &self.storage[range];
        if handoff.ptr.as_ptr().cast_const() != region.as_ptr() || handoff.len != region.len() {
            ContractViolation::ForeignHandoff {
                operation: "finish_fill",
                region: "writable",
            }
            .raise();
        }
        if nbytes > handoff.len {
            ContractViolation::HandoffOverflow {
                operation: "finish_fill",
                requested: nbytes,
                available: handoff.len,
            }
            .raise();
        }

        self.unlock();
        self.hide_writable();
        self.produced(nbytes);
    }

    /// Lock the pipe and expose the readable region through a raw pointer
    #[track_caller]
    pub fn begin_drain(&mut self) -> DrainHandoff {
        self.lock();

        let region = &self.storage[self.cursors.readable()];
        DrainHandoff {
            ptr: NonNull::from(region).cast::<u8>(),
            len: region.len(),
        }
    }

    /// Unlock the pipe and release `nbytes` read through the hand-off
    #[track_caller]
    pub fn finish_drain(&mut self, handoff: DrainHandoff, nbytes: Size) {
        let region = &self.storage[self.cursors.readable()];
        if handoff.ptr.as_ptr().cast_const() != region.as_ptr() || handoff.len != region.len() {
            ContractViolation::ForeignHandoff {
                operation: "finish_drain",
                region: "readable",
            }
            .raise();
        }
        if nbytes > handoff.len {
            ContractViolation::HandoffOverflow {
                operation: "finish_drain",
                requested: nbytes,
                available: handoff.len,
            }
            .raise();
        }

        self.unlock();
        self.consumed(nbytes);
    }
}
