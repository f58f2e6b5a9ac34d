/*!
 * Pipe Cursors
 * Read/write cursor pair; the only place region bounds are computed
 */

use crate::core::errors::ContractViolation;
use crate::core::types::Size;
use std::ops::Range;

/// Read and write offsets into pipe storage
///
/// Invariant: `read <= write`. The upper bound (`write <= capacity`) is
/// enforced by [`Cursors::advance_write`], the only operation that moves
/// `write` forward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Cursors {
    read: Size,
    write: Size,
}

impl Cursors {
    #[inline]
    pub(crate) fn read(&self) -> Size {
        self.read
    }

    #[inline]
    pub(crate) fn write(&self) -> Size {
        self.write
    }

    /// Bytes available to the consumer
    #[inline]
    pub(crate) fn readable(&self) -> Range<Size> {
        self.read..self.write
    }

    /// Space available to the producer
    #[inline]
    pub(crate) fn writable(&self, capacity: Size) -> Range<Size> {
        self.write..capacity
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.read == self.write
    }

    /// Number of unread bytes
    #[inline]
    pub(crate) fn len(&self) -> Size {
        self.write - self.read
    }

    /// Already-consumed space in front of the readable region
    #[inline]
    pub(crate) fn head_space(&self) -> Size {
        self.read
    }

    #[inline]
    pub(crate) fn tail_space(&self, capacity: Size) -> Size {
        capacity - self.write
    }

    pub(crate) fn advance_write(
        &mut self,
        nbytes: Size,
        capacity: Size,
    ) -> Result<(), ContractViolation> {
        match self.write.checked_add(nbytes) {
            Some(write) if write <= capacity => {
                self.write = write;
                Ok(())
            }
            _ => Err(ContractViolation::ProducedOverflow {
                requested: nbytes,
                available: self.tail_space(capacity),
            }),
        }
    }

    /// Advance the read cursor, normalizing both cursors to zero when drained
    pub(crate) fn advance_read(&mut self, nbytes: Size) -> Result<(), ContractViolation> {
        if nbytes > self.len() {
            return Err(ContractViolation::ConsumedOverflow {
                requested: nbytes,
                available: self.len(),
            });
        }

        self.read += nbytes;
        if self.is_empty() {
            self.reset();
        }
        Ok(())
    }

    /// Shift both cursors so the readable region starts at offset zero
    ///
    /// Callers must have moved the bytes first.
    #[inline]
    pub(crate) fn rebase(&mut self) {
        self.write -= self.read;
        self.read = 0;
    }

    #[inline]
    pub(crate) fn reset(&mut self) {
        self.read = 0;
        self.write = 0;
    }
}
