/*!
 * Pipe Implementation
 * Growable linear staging buffer between a producer and a consumer
 */

use super::cursor::Cursors;
use super::growth::{GrowthPlan, GrowthPolicy};
use super::types::{PipeConfig, PipeStats};
use crate::core::errors::{ContractViolation, PipeError};
use crate::core::limits::DEFAULT_ALLOCATION_UNIT;
use crate::core::types::{ByteCount, PipeResult, Size};
use crate::diagnostics::{MemoryChecker, NoopChecker};
use std::fmt;
use std::io;
use std::ops::Range;
use tracing::{debug, error, trace};

/// Growable staging buffer
///
/// Bytes are appended at the write cursor and drained from the read
/// cursor. When a producer needs more room than the tail offers, the pipe
/// first tries to reclaim the consumed prefix by packing, and only then
/// reallocates in multiples of its growth unit.
///
/// # Views
/// [`rdata`](Self::rdata), [`wdata`](Self::wdata) and the producer/consumer
/// callbacks hand out borrows, so they cannot outlive the next mutation.
/// Views that must outlive a call go through the hand-off API, which holds
/// the lock until completion.
///
/// # Contract violations
/// Mutating a locked pipe, over-claiming produced/consumed bytes and
/// unbalanced lock/unlock calls panic with a [`ContractViolation`].
pub struct Pipe<C: MemoryChecker = NoopChecker> {
    pub(super) storage: Box<[u8]>,
    pub(super) cursors: Cursors,
    growth: GrowthPolicy,
    locked: bool,
    pub(super) checker: C,
}

impl Pipe {
    /// Create a pipe whose storage is exactly `size` bytes
    pub fn new(size: Size) -> Self {
        Self::with_checker(size, NoopChecker)
    }

    pub fn with_config(config: PipeConfig) -> PipeResult<Self> {
        Self::with_config_and_checker(config, NoopChecker)
    }
}

impl Default for Pipe {
    fn default() -> Self {
        Self::new(0)
    }
}

impl<C: MemoryChecker> Pipe<C> {
    pub fn with_checker(size: Size, checker: C) -> Self {
        Self::from_parts(
            vec![0u8; size].into_boxed_slice(),
            GrowthPolicy::for_initial_capacity(size, DEFAULT_ALLOCATION_UNIT),
            checker,
        )
    }

    pub fn with_config_and_checker(config: PipeConfig, checker: C) -> PipeResult<Self> {
        config.validate()?;
        let storage = allocate(config.initial_capacity)?;
        Ok(Self::from_parts(
            storage,
            GrowthPolicy::for_initial_capacity(config.initial_capacity, config.allocation_unit),
            checker,
        ))
    }

    fn from_parts(storage: Box<[u8]>, growth: GrowthPolicy, checker: C) -> Self {
        let mut pipe = Self {
            storage,
            cursors: Cursors::default(),
            growth,
            locked: false,
            checker,
        };
        pipe.hide_storage();
        pipe.expose_readable();
        pipe
    }

    /// Make sure at least `nbytes` can be written without reallocating again
    ///
    /// May pack or reallocate, which moves the readable bytes.
    ///
    /// # Panics
    /// If the pipe is locked, or if the allocation fails.
    ///
    /// # Returns
    /// The size of the writable region, always `>= nbytes`
    pub fn ensure_capacity(&mut self, nbytes: Size) -> Size {
        match self.try_ensure_capacity(nbytes) {
            Ok(available) => available,
            Err(err) => {
                error!(error = %err, nbytes, "Pipe allocation failed");
                panic!("Pipe::ensure_capacity(): {}", err)
            }
        }
    }

    /// Like [`ensure_capacity`](Self::ensure_capacity), reporting allocation
    /// failure instead of panicking
    pub fn try_ensure_capacity(&mut self, nbytes: Size) -> PipeResult<Size> {
        self.check_unlocked("ensure_capacity");

        match self.growth.plan(self.capacity(), &self.cursors, nbytes)? {
            GrowthPlan::Fits => {}
            GrowthPlan::Pack => {
                let head_space = self.cursors.head_space();
                let tail_space = self.cursors.tail_space(self.capacity());
                self.pack();
                let available = self.wsize();
                if available < nbytes {
                    ContractViolation::PackShortfall {
                        available,
                        needed: nbytes,
                        head_space,
                        tail_space,
                    }
                    .raise();
                }
            }
            GrowthPlan::Grow {
                chunks,
                new_capacity,
            } => self.grow(chunks, new_capacity)?,
        }

        Ok(self.wsize())
    }

    fn grow(&mut self, chunks: Size, new_capacity: Size) -> PipeResult<()> {
        let mut storage = allocate(new_capacity)?;
        let old_capacity = self.capacity();
        let live = self.cursors.len();

        self.hide_readable();
        self.expose_storage();

        storage[..live].copy_from_slice(&self.storage[self.cursors.readable()]);
        // The old allocation is released here, after the copy
        self.storage = storage;
        self.cursors.rebase();

        self.hide_storage();
        self.expose_readable();

        debug!(
            old_capacity,
            new_capacity,
            chunks,
            live,
            "Pipe storage grown"
        );
        Ok(())
    }

    /// Current allocation size
    #[inline]
    pub fn capacity(&self) -> Size {
        self.storage.len()
    }

    /// Increment used when the storage has to grow
    #[inline]
    pub fn growth_unit(&self) -> Size {
        self.growth.unit()
    }

    /// Number of bytes available in the read end
    #[inline]
    pub fn rsize(&self) -> Size {
        self.cursors.len()
    }

    /// Readable region
    ///
    /// Stays available while the pipe is locked, including during a
    /// [`begin_fill`](Self::begin_fill) hand-off.
    #[inline]
    pub fn rdata(&self) -> &[u8] {
        &self.storage[self.cursors.readable()]
    }

    /// Number of bytes that can be written without growing
    #[inline]
    pub fn wsize(&self) -> Size {
        self.cursors.tail_space(self.capacity())
    }

    /// Writable region
    ///
    /// Fill a prefix and report it with [`produced`](Self::produced).
    pub fn wdata(&mut self) -> &mut [u8] {
        self.check_unlocked("wdata");
        let range = self.writable_range();
        &mut self.storage[range]
    }

    /// A number of bytes was made available for the consumer
    #[track_caller]
    pub fn produced(&mut self, nbytes: Size) {
        self.check_unlocked("produced");

        let mut cursors = self.cursors;
        cursors
            .advance_write(nbytes, self.capacity())
            .unwrap_or_else(|violation| violation.raise());

        self.hide_readable();
        self.cursors = cursors;
        self.expose_readable();
    }

    /// The number of bytes just removed from the consumer end
    ///
    /// Draining the pipe completely moves both cursors back to the start.
    #[track_caller]
    pub fn consumed(&mut self, nbytes: Size) {
        self.check_unlocked("consumed");

        let mut cursors = self.cursors;
        cursors
            .advance_read(nbytes)
            .unwrap_or_else(|violation| violation.raise());

        self.hide_readable();
        self.cursors = cursors;
        self.expose_readable();
    }

    /// Consumer end has caught up with the producer
    #[inline]
    pub fn empty(&self) -> bool {
        self.cursors.is_empty()
    }

    /// No tail space left
    #[inline]
    pub fn full(&self) -> bool {
        self.cursors.write() == self.capacity()
    }

    #[inline]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Forbid every mutation until [`unlock`](Self::unlock)
    #[track_caller]
    pub fn lock(&mut self) {
        if self.locked {
            ContractViolation::AlreadyLocked.raise();
        }
        self.locked = true;
    }

    #[track_caller]
    pub fn unlock(&mut self) {
        if !self.locked {
            ContractViolation::NotLocked.raise();
        }
        self.locked = false;
    }

    /// Move the unread bytes to the start of the storage
    ///
    /// # Returns
    /// `true` if the pipe is empty afterwards
    #[track_caller]
    pub fn pack(&mut self) -> bool {
        self.check_unlocked("pack");

        self.hide_readable();
        self.expose_storage();

        if self.cursors.is_empty() {
            self.cursors.reset();
        } else if self.cursors.head_space() > 0 {
            let moved = self.cursors.len();
            self.storage.copy_within(self.cursors.readable(), 0);
            self.cursors.rebase();
            trace!(moved, capacity = self.capacity(), "Pipe packed");
        }

        self.hide_storage();
        self.expose_readable();

        self.empty()
    }

    /// Drop all unread content
    #[track_caller]
    pub fn clear(&mut self) {
        self.check_unlocked("clear");
        self.hide_readable();
        self.cursors.reset();
        self.expose_readable();
    }

    /// Let `producer` fill the writable region
    ///
    /// A positive return value is applied with [`produced`](Self::produced).
    /// Zero and negative values (the producer's own error codes) are passed
    /// through untouched.
    pub fn produce<F>(&mut self, producer: F) -> ByteCount
    where
        F: FnOnce(&mut [u8]) -> ByteCount,
    {
        let ret = self.with_writable("produce", producer);
        if ret > 0 {
            self.produced(ret as Size);
        }
        ret
    }

    /// Fallible variant of [`produce`](Self::produce); `Err` is passed through
    pub fn try_produce<F, E>(&mut self, producer: F) -> Result<Size, E>
    where
        F: FnOnce(&mut [u8]) -> Result<Size, E>,
    {
        let nbytes = self.with_writable("produce", producer)?;
        if nbytes > 0 {
            self.produced(nbytes);
        }
        Ok(nbytes)
    }

    /// Let `consumer` drain the readable region
    ///
    /// A positive return value is applied with [`consumed`](Self::consumed).
    /// Zero and negative values are passed through untouched.
    pub fn consume<F>(&mut self, consumer: F) -> ByteCount
    where
        F: FnOnce(&[u8]) -> ByteCount,
    {
        let ret = self.with_readable("consume", consumer);
        if ret > 0 {
            self.consumed(ret as Size);
        }
        ret
    }

    /// Fallible variant of [`consume`](Self::consume); `Err` is passed through
    pub fn try_consume<F, E>(&mut self, consumer: F) -> Result<Size, E>
    where
        F: FnOnce(&[u8]) -> Result<Size, E>,
    {
        let nbytes = self.with_readable("consume", consumer)?;
        if nbytes > 0 {
            self.consumed(nbytes);
        }
        Ok(nbytes)
    }

    /// Read once from `reader` straight into the writable region
    ///
    /// Call [`ensure_capacity`](Self::ensure_capacity) first; with no tail
    /// space the reader sees an empty buffer and `Ok(0)` is ambiguous.
    pub fn fill_from<R: io::Read + ?Sized>(&mut self, reader: &mut R) -> io::Result<Size> {
        self.try_produce(|buf| reader.read(buf))
    }

    /// Write once from the readable region into `writer`
    pub fn drain_into<W: io::Write + ?Sized>(&mut self, writer: &mut W) -> io::Result<Size> {
        self.try_consume(|buf| writer.write(buf))
    }

    /// Report internal properties as key/value pairs
    pub fn stats<F>(&self, mut emit: F)
    where
        F: FnMut(&str, &str),
    {
        emit("buffer", &format!("0x{:x}", self.storage.as_ptr() as usize));
        emit("size", &self.capacity().to_string());
        emit("read_head", &self.cursors.read().to_string());
        emit("write_head", &self.cursors.write().to_string());
        emit("empty", bool_str(self.empty()));
        emit("locked", bool_str(self.locked));
    }

    pub fn snapshot(&self) -> PipeStats {
        PipeStats {
            address: self.storage.as_ptr() as usize,
            capacity: self.capacity(),
            growth_unit: self.growth_unit(),
            read_cursor: self.cursors.read(),
            write_cursor: self.cursors.write(),
            empty: self.empty(),
            locked: self.locked,
        }
    }

    /// Memory checker receiving poisoning events
    pub fn checker(&self) -> &C {
        &self.checker
    }

    pub fn checker_mut(&mut self) -> &mut C {
        &mut self.checker
    }

    fn with_writable<R>(&mut self, operation: &'static str, f: impl FnOnce(&mut [u8]) -> R) -> R {
        self.check_unlocked(operation);

        self.hide_readable();
        self.expose_writable();

        let range = self.writable_range();
        let ret = f(&mut self.storage[range]);

        self.hide_writable();
        self.expose_readable();
        ret
    }

    fn with_readable<R>(&mut self, operation: &'static str, f: impl FnOnce(&[u8]) -> R) -> R {
        self.check_unlocked(operation);
        f(&self.storage[self.cursors.readable()])
    }

    #[inline]
    pub(super) fn writable_range(&self) -> Range<Size> {
        self.cursors.writable(self.capacity())
    }

    #[inline]
    #[track_caller]
    pub(super) fn check_unlocked(&self, operation: &'static str) {
        if self.locked {
            ContractViolation::Locked { operation }.raise();
        }
    }

    fn mark(&mut self, range: Range<Size>, accessible: bool) {
        if range.is_empty() {
            return;
        }
        let region = &self.storage[range];
        if accessible {
            self.checker.mark_accessible(region);
        } else {
            self.checker.mark_inaccessible(region);
        }
    }

    pub(super) fn expose_readable(&mut self) {
        self.mark(self.cursors.readable(), true);
    }

    pub(super) fn hide_readable(&mut self) {
        self.mark(self.cursors.readable(), false);
    }

    pub(super) fn expose_writable(&mut self) {
        self.mark(self.writable_range(), true);
    }

    pub(super) fn hide_writable(&mut self) {
        self.mark(self.writable_range(), false);
    }

    fn expose_storage(&mut self) {
        self.mark(0..self.capacity(), true);
    }

    fn hide_storage(&mut self) {
        self.mark(0..self.capacity(), false);
    }
}

impl<C: MemoryChecker> fmt::Debug for Pipe<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipe")
            .field("buffer", &format_args!("0x{:x}", self.storage.as_ptr() as usize))
            .field("capacity", &self.capacity())
            .field("growth_unit", &self.growth_unit())
            .field("read_head", &self.cursors.read())
            .field("write_head", &self.cursors.write())
            .field("locked", &self.locked)
            .finish()
    }
}

fn bool_str(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// Zero-filled storage of exactly `size` bytes
fn allocate(size: Size) -> PipeResult<Box<[u8]>> {
    let mut storage = Vec::new();
    storage
        .try_reserve_exact(size)
        .map_err(|_| PipeError::AllocationFailed { requested: size })?;
    storage.resize(size, 0);
    Ok(storage.into_boxed_slice())
}
