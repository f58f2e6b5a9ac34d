/*!
 * Property Tests
 * Random operation sequences checked against a VecDeque model
 */

use ai_os_pipe::{MemoryChecker, Pipe};
use proptest::prelude::*;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
enum PipeOp {
    Produce(Vec<u8>),
    Consume(usize),
    Ensure(usize),
    Pack,
    Clear,
}

fn op_strategy() -> impl Strategy<Value = PipeOp> {
    prop_oneof![
        4 => proptest::collection::vec(any::<u8>(), 0..700).prop_map(PipeOp::Produce),
        4 => (0usize..900).prop_map(PipeOp::Consume),
        2 => (0usize..3000).prop_map(PipeOp::Ensure),
        1 => Just(PipeOp::Pack),
        1 => Just(PipeOp::Clear),
    ]
}

/// Counts hook calls without touching the bytes
#[derive(Debug, Default)]
struct CountingChecker {
    calls: usize,
}

impl MemoryChecker for CountingChecker {
    fn mark_accessible(&mut self, _region: &[u8]) {
        self.calls += 1;
    }

    fn mark_inaccessible(&mut self, _region: &[u8]) {
        self.calls += 1;
    }
}

fn apply<C: MemoryChecker>(
    pipe: &mut Pipe<C>,
    model: &mut VecDeque<u8>,
    op: &PipeOp,
) -> Result<(), TestCaseError> {
    match op {
        PipeOp::Produce(data) => {
            pipe.ensure_capacity(data.len());
            let ret = pipe.produce(|buf| {
                buf[..data.len()].copy_from_slice(data);
                data.len() as isize
            });
            prop_assert_eq!(ret, data.len() as isize);
            model.extend(data.iter().copied());
        }
        PipeOp::Consume(n) => {
            let n = (*n).min(pipe.rsize());
            let expected: Vec<u8> = model.drain(..n).collect();
            prop_assert_eq!(&pipe.rdata()[..n], expected.as_slice());
            pipe.consume(|_| n as isize);
        }
        PipeOp::Ensure(n) => {
            let available = pipe.ensure_capacity(*n);
            prop_assert!(available >= *n);
            prop_assert_eq!(available, pipe.wsize());
        }
        PipeOp::Pack => {
            let before = pipe.snapshot();
            pipe.pack();
            let after = pipe.snapshot();
            prop_assert_eq!(after.read_cursor, 0);
            prop_assert_eq!(after.write_cursor, before.write_cursor - before.read_cursor);

            pipe.pack();
            prop_assert_eq!(pipe.snapshot(), after);
        }
        PipeOp::Clear => {
            pipe.clear();
            model.clear();
        }
    }
    Ok(())
}

fn check_invariants<C: MemoryChecker>(
    pipe: &Pipe<C>,
    model: &VecDeque<u8>,
    previous_capacity: usize,
) -> Result<(), TestCaseError> {
    let stats = pipe.snapshot();
    prop_assert!(stats.read_cursor <= stats.write_cursor);
    prop_assert!(stats.write_cursor <= stats.capacity);
    prop_assert!(stats.capacity >= previous_capacity);
    prop_assert_eq!(pipe.empty(), stats.read_cursor == stats.write_cursor);
    if pipe.empty() {
        prop_assert_eq!(stats.read_cursor, 0);
        prop_assert_eq!(stats.write_cursor, 0);
    }
    prop_assert_eq!(pipe.full(), stats.write_cursor == stats.capacity);

    let (front, back) = model.as_slices();
    prop_assert_eq!(pipe.rsize(), model.len());
    prop_assert_eq!(&pipe.rdata()[..front.len()], front);
    prop_assert_eq!(&pipe.rdata()[front.len()..], back);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_invariants_and_fifo(
        initial in 0usize..2048,
        ops in proptest::collection::vec(op_strategy(), 1..64),
    ) {
        let mut pipe = Pipe::new(initial);
        let mut model = VecDeque::new();
        prop_assert_eq!(pipe.capacity(), initial);

        for op in &ops {
            let capacity = pipe.capacity();
            apply(&mut pipe, &mut model, op)?;
            check_invariants(&pipe, &model, capacity)?;
        }

        // Drain everything that is left and compare with the model
        let rest: Vec<u8> = model.iter().copied().collect();
        let drained = pipe.consume(|data| {
            assert_eq!(data, rest.as_slice());
            data.len() as isize
        });
        prop_assert_eq!(drained, rest.len() as isize);
        prop_assert!(pipe.empty());
    }

    #[test]
    fn prop_growth_sufficiency(
        initial in 0usize..4096,
        prefill in 0usize..4096,
        consumed in 0usize..4096,
        needed in 0usize..16384,
    ) {
        let mut pipe = Pipe::new(initial);
        let prefill = prefill.min(initial);
        pipe.produced(prefill);
        pipe.consumed(consumed.min(prefill));
        let before = pipe.snapshot();

        let available = pipe.ensure_capacity(needed);
        let after = pipe.snapshot();

        prop_assert!(after.capacity - after.write_cursor >= needed);
        prop_assert_eq!(available, after.capacity - after.write_cursor);
        prop_assert_eq!(after.rsize(), before.rsize());
        if after.capacity > before.capacity {
            let grown = after.capacity - before.capacity;
            prop_assert_eq!(grown % pipe.growth_unit(), 0);
            // One chunk fewer would not have been enough
            let reclaimable = before.wsize() + before.read_cursor;
            prop_assert!(grown - pipe.growth_unit() + reclaimable < needed);
        }
    }

    #[test]
    fn prop_checker_is_transparent(
        initial in 0usize..1024,
        ops in proptest::collection::vec(op_strategy(), 1..32),
    ) {
        let mut plain = Pipe::new(initial);
        let mut checked = Pipe::with_checker(initial, CountingChecker::default());
        let mut plain_model = VecDeque::new();
        let mut checked_model = VecDeque::new();

        for op in &ops {
            apply(&mut plain, &mut plain_model, op)?;
            apply(&mut checked, &mut checked_model, op)?;

            let (a, b) = (plain.snapshot(), checked.snapshot());
            prop_assert_eq!(a.capacity, b.capacity);
            prop_assert_eq!(a.read_cursor, b.read_cursor);
            prop_assert_eq!(a.write_cursor, b.write_cursor);
            prop_assert_eq!(plain.rdata(), checked.rdata());
        }

        if checked.capacity() > 0 {
            prop_assert!(checked.checker().calls > 0);
        }
    }
}
