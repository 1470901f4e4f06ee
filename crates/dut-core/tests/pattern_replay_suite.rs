//! Pattern timeline suite: production scoping, replay determinism, and
//! cycle accounting.

#![allow(clippy::pedantic, clippy::nursery)]

use dut_core::{Dut, Level, Pattern, PinState};
use indexmap as _;
use proptest::prelude::*;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

fn two_pin_dut() -> Dut {
    let mut dut = Dut::new("pattern-suite");
    dut.define_pin("clk").expect("unique pin");
    dut.define_pin("tdi").expect("unique pin");
    dut
}

/// Drive `clk` high, hold 100 cycles, drive low, hold 100 cycles:
/// exactly 200 records, split 100/100.
#[test]
fn clock_scenario_yields_exactly_two_hundred_cycles() {
    let dut = two_pin_dut();
    let mut builder = dut.produce_pattern("clock");
    builder.drive("clk", 1).expect("clk exists");
    builder.repeat(100);
    builder.drive("clk", 0).expect("clk exists");
    builder.repeat(100);
    let pattern = builder.finalize();

    assert_eq!(pattern.cycle_count(), 200);

    let records: Vec<_> = pattern.replay().collect();
    assert_eq!(records.len(), 200);
    assert!(records[..100]
        .iter()
        .all(|r| r.pin_states["clk"] == PinState::Drive(Level::High)));
    assert!(records[100..]
        .iter()
        .all(|r| r.pin_states["clk"] == PinState::Drive(Level::Low)));
}

#[test]
fn dropping_a_builder_discards_the_in_progress_pattern() {
    let dut = two_pin_dut();
    {
        let mut builder = dut.produce_pattern("abandoned");
        builder.drive("clk", 1).expect("clk exists");
        builder.repeat(10);
        // Dropped without finalize: nothing observable remains, and the
        // pins were never touched.
    }
    assert_eq!(dut.pin("clk").expect("clk exists").sample(), PinState::Undriven);
}

#[test]
fn committing_a_pattern_is_the_only_pin_mutation_path() {
    let mut dut = two_pin_dut();
    let pattern = {
        let mut builder = dut.produce_pattern("commit");
        builder.drive("clk", 1).expect("clk exists");
        builder.release("tdi").expect("tdi exists");
        builder.repeat(4);
        builder.finalize()
    };

    assert_eq!(dut.pin("clk").expect("clk exists").sample(), PinState::Undriven);
    let cycles = dut.commit_pattern(&pattern).expect("pins exist");
    assert_eq!(cycles, 4);
    assert_eq!(
        dut.pin("clk").expect("clk exists").sample(),
        PinState::Drive(Level::High)
    );
    assert_eq!(dut.pin("tdi").expect("tdi exists").sample(), PinState::HighZ);

    // Replay after commit still starts from the recorded baseline.
    let first = pattern.replay().next().expect("one cycle");
    assert_eq!(first.pin_states["clk"], PinState::Drive(Level::High));
}

/// Random timelines over two pins; levels and cycle counts drawn small
/// enough to keep replays fast.
fn arbitrary_pattern(dut: &Dut, moves: &[(u8, u8)]) -> Pattern {
    let mut builder = dut.produce_pattern("random");
    for (kind, arg) in moves {
        match kind % 4 {
            0 => builder.drive("clk", arg % 2).expect("clk exists"),
            1 => builder.drive("tdi", arg % 2).expect("tdi exists"),
            2 => builder.repeat(u32::from(*arg) % 8),
            _ => builder.wait(u32::from(*arg) % 8),
        }
    }
    builder.finalize()
}

proptest! {
    #[test]
    fn replay_is_idempotent_for_arbitrary_timelines(
        moves in proptest::collection::vec((any::<u8>(), any::<u8>()), 0..32),
    ) {
        let dut = two_pin_dut();
        let pattern = arbitrary_pattern(&dut, &moves);

        let first: Vec<_> = pattern.replay().collect();
        let second: Vec<_> = pattern.replay().collect();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.len() as u64, pattern.cycle_count());
    }

    #[test]
    fn cycle_indices_are_dense_and_zero_based(
        moves in proptest::collection::vec((any::<u8>(), any::<u8>()), 0..32),
    ) {
        let dut = two_pin_dut();
        let pattern = arbitrary_pattern(&dut, &moves);

        for (position, record) in pattern.replay().enumerate() {
            prop_assert_eq!(record.cycle_index, position as u64);
        }
    }
}
