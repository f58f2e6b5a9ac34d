/*!
 * I/O Adapters
 * std::io and bytes trait implementations on top of the pipe protocol
 */

use super::pipe::Pipe;
use crate::core::errors::PipeError;
use crate::core::limits::BUF_MUT_MIN_RESERVE;
use crate::core::types::Size;
use crate::diagnostics::MemoryChecker;
use bytes::buf::UninitSlice;
use bytes::{Buf, BufMut};
use std::io;

impl From<PipeError> for io::Error {
    fn from(err: PipeError) -> Self {
        let kind = match err {
            PipeError::AllocationFailed { .. } | PipeError::CapacityOverflow { .. } => {
                io::ErrorKind::OutOfMemory
            }
            PipeError::InvalidConfig(_) => io::ErrorKind::InvalidInput,
        };
        io::Error::new(kind, err)
    }
}

/// Appends the whole buffer, growing the pipe as needed
impl<C: MemoryChecker> io::Write for Pipe<C> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.try_ensure_capacity(buf.len())?;
        self.try_produce(|dst| {
            dst[..buf.len()].copy_from_slice(buf);
            Ok::<_, io::Error>(buf.len())
        })
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Copies out of the readable region and consumes what was copied
impl<C: MemoryChecker> io::Read for Pipe<C> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let nbytes = buf.len().min(self.rsize());
        if nbytes > 0 {
            buf[..nbytes].copy_from_slice(&self.rdata()[..nbytes]);
            self.consumed(nbytes);
        }
        Ok(nbytes)
    }
}

impl<C: MemoryChecker> Buf for Pipe<C> {
    fn remaining(&self) -> usize {
        self.rsize()
    }

    fn chunk(&self) -> &[u8] {
        self.rdata()
    }

    fn advance(&mut self, cnt: usize) {
        self.consumed(cnt);
    }
}

// SAFETY: `chunk_mut` only exposes the writable region, whose bytes are
// always initialized, and `advance_mut` rejects counts beyond it.
//
// The writable region is open to the memory checker from `chunk_mut` until
// the next `advance_mut`.
unsafe impl<C: MemoryChecker> BufMut for Pipe<C> {
    fn remaining_mut(&self) -> usize {
        isize::MAX as Size - self.rsize()
    }

    unsafe fn advance_mut(&mut self, cnt: usize) {
        self.check_unlocked("advance_mut");
        self.hide_writable();
        self.produced(cnt);
    }

    fn chunk_mut(&mut self) -> &mut UninitSlice {
        if self.wsize() == 0 {
            self.ensure_capacity(BUF_MUT_MIN_RESERVE);
        }
        self.check_unlocked("chunk_mut");
        self.expose_writable();

        let range = self.writable_range();
        UninitSlice::new(&mut self.storage[range])
    }
}
