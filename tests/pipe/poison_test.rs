/*!
 * Memory Poisoning Tests
 * Hook placement and transparency of the instrumentation seam
 */

use ai_os_pipe::{init_tracing, MemoryChecker, Pipe, TracingChecker};
use bytes::BufMut;
use pretty_assertions::assert_eq;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Accessible(usize),
    Inaccessible(usize),
}

#[derive(Debug, Default)]
struct RecordingChecker {
    marks: Vec<Mark>,
}

impl RecordingChecker {
    fn take(&mut self) -> Vec<Mark> {
        std::mem::take(&mut self.marks)
    }
}

impl MemoryChecker for RecordingChecker {
    fn mark_accessible(&mut self, region: &[u8]) {
        self.marks.push(Mark::Accessible(region.len()));
    }

    fn mark_inaccessible(&mut self, region: &[u8]) {
        self.marks.push(Mark::Inaccessible(region.len()));
    }
}

use Mark::{Accessible, Inaccessible};

#[test]
fn test_construction_hides_storage() {
    let mut pipe = Pipe::with_checker(1000, RecordingChecker::default());
    assert_eq!(pipe.checker_mut().take(), vec![Inaccessible(1000)]);
}

#[test]
fn test_empty_storage_is_never_reported() {
    let mut pipe = Pipe::with_checker(0, RecordingChecker::default());
    pipe.produce(|_| 0);
    pipe.pack();
    assert!(pipe.checker().marks.is_empty());
}

#[test]
fn test_produce_opens_writable_region_only_during_callback() {
    let mut pipe = Pipe::with_checker(1000, RecordingChecker::default());
    pipe.checker_mut().take();

    pipe.produce(|buf| {
        buf[..10].fill(7);
        10
    });

    assert_eq!(
        pipe.checker_mut().take(),
        vec![
            // producer window
            Accessible(1000),
            Inaccessible(1000),
            // produced(10) re-opens the grown read region
            Accessible(10),
        ]
    );
}

#[test]
fn test_consume_and_pack_marks() {
    let mut pipe = Pipe::with_checker(1000, RecordingChecker::default());
    pipe.produce(|_| 10);
    pipe.checker_mut().take();

    pipe.consume(|_| 4);
    assert_eq!(
        pipe.checker_mut().take(),
        vec![Inaccessible(10), Accessible(6)]
    );

    assert!(!pipe.pack());
    assert_eq!(
        pipe.checker_mut().take(),
        vec![
            Inaccessible(6),
            Accessible(1000),
            Inaccessible(1000),
            Accessible(6),
        ]
    );
}

#[test]
fn test_growth_marks_new_storage() {
    let mut pipe = Pipe::with_checker(16, RecordingChecker::default());
    pipe.produce(|_| 16);
    pipe.checker_mut().take();

    pipe.ensure_capacity(100);
    assert_eq!(
        pipe.checker_mut().take(),
        vec![
            Inaccessible(16),
            Accessible(16),
            Inaccessible(16 + 512),
            Accessible(16),
        ]
    );
}

#[test]
fn test_io_write_opens_writable_region() {
    let mut pipe = Pipe::with_checker(64, RecordingChecker::default());
    pipe.checker_mut().take();

    pipe.write_all(b"hello").unwrap();
    assert_eq!(
        pipe.checker_mut().take(),
        vec![Accessible(64), Inaccessible(64), Accessible(5)]
    );
    assert_eq!(pipe.rdata(), b"hello");
}

#[test]
fn test_buf_mut_opens_writable_region() {
    let mut pipe = Pipe::with_checker(16, RecordingChecker::default());
    pipe.put_slice(b"ab");
    pipe.checker_mut().take();

    pipe.put_slice(b"cde");
    assert_eq!(
        pipe.checker_mut().take(),
        vec![
            // chunk_mut
            Accessible(14),
            // advance_mut
            Inaccessible(14),
            Inaccessible(2),
            Accessible(5),
        ]
    );
    assert_eq!(pipe.rdata(), b"abcde");
}

#[test]
fn test_fill_handoff_keeps_readable_region_open() {
    let mut pipe = Pipe::with_checker(32, RecordingChecker::default());
    pipe.produce(|buf| {
        buf[..3].copy_from_slice(b"abc");
        3
    });
    pipe.checker_mut().take();

    let handoff = pipe.begin_fill();
    assert_eq!(pipe.checker_mut().take(), vec![Accessible(29)]);
    assert_eq!(pipe.rdata(), b"abc");

    pipe.finish_fill(handoff, 4);
    assert_eq!(
        pipe.checker_mut().take(),
        vec![Inaccessible(29), Inaccessible(3), Accessible(7)]
    );
}

#[test]
fn test_checker_does_not_change_behavior() {
    let mut plain = Pipe::new(24);
    let mut checked = Pipe::with_checker(24, RecordingChecker::default());

    for round in 0..20u8 {
        let len = (round as usize * 7) % 40 + 1;
        let chunk = vec![round; len];

        plain.ensure_capacity(len);
        checked.ensure_capacity(len);
        plain.produce(|buf| {
            buf[..len].copy_from_slice(&chunk);
            len as isize
        });
        checked.produce(|buf| {
            buf[..len].copy_from_slice(&chunk);
            len as isize
        });

        let drain = len / 2 + 1;
        plain.consume(|_| drain as isize);
        checked.consume(|_| drain as isize);

        let (a, b) = (plain.snapshot(), checked.snapshot());
        assert_eq!(a.capacity, b.capacity);
        assert_eq!(a.read_cursor, b.read_cursor);
        assert_eq!(a.write_cursor, b.write_cursor);
        assert_eq!(plain.rdata(), checked.rdata());
    }
    assert!(!checked.checker().marks.is_empty());
}

#[test]
fn test_tracing_checker() {
    init_tracing();
    assert!(!init_tracing());

    let mut pipe = Pipe::with_checker(64, TracingChecker);
    pipe.produce(|buf| {
        buf[..5].copy_from_slice(b"trace");
        5
    });
    pipe.ensure_capacity(128);
    assert_eq!(pipe.rdata(), b"trace");
}
