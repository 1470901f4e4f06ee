//! Register model conformance suite: layout invariants, shadow
//! semantics, and verify reporting.

#![allow(clippy::pedantic, clippy::nursery)]

use dut_core::{AccessType, DefinitionError, Dut, Register, UsageError, ValueSpec};
use indexmap as _;
use proptest::prelude::*;
use rstest::rstest;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

/// Builds the ADC status register scenario: `reg2` at 0x0024, 16 bits,
/// `coco`(7, ro), `aien`(6), `diff`(5), `adch`(4..=0, reset 0x1F).
fn adc_dut() -> Dut {
    let mut dut = Dut::new("adc");
    dut.define_register("reg2", 0x0024, 16).expect("reg2");
    dut.define_field("reg2", "coco", 7, 1, AccessType::ReadOnly, 0)
        .expect("coco");
    dut.define_field("reg2", "aien", 6, 1, AccessType::ReadWrite, 0)
        .expect("aien");
    dut.define_field("reg2", "diff", 5, 1, AccessType::ReadWrite, 0)
        .expect("diff");
    dut.define_field("reg2", "adch", 0, 5, AccessType::ReadWrite, 0x1F)
        .expect("adch");
    dut
}

#[test]
fn adc_scenario_reset_value_and_field_write() {
    let mut dut = adc_dut();
    assert_eq!(dut.register("reg2").unwrap().reset_value(), 0x001F);

    let reg = dut.register_mut("reg2").unwrap();
    reg.write(&ValueSpec::fields([("adch", 0x0A)]))
        .expect("adch fits");

    assert_eq!(reg.field_value("adch"), Ok(0x0A));
    // Bits 7/6/5 keep their reset state.
    assert_eq!(reg.field_value("coco"), Ok(0));
    assert_eq!(reg.field_value("aien"), Ok(0));
    assert_eq!(reg.field_value("diff"), Ok(0));
    assert_eq!(reg.read(), 0x000A);
}

#[test]
fn verify_names_the_single_altered_field_with_expected_and_actual() {
    let mut dut = adc_dut();
    let reg = dut.register_mut("reg2").unwrap();
    let written = reg.read();

    // Verify against the untouched shadow is clean.
    let report = reg.verify(&ValueSpec::Whole(written)).expect("valid spec");
    assert!(report.is_clean());

    // Deliberately alter one field and verify the original expectation.
    reg.write(&ValueSpec::fields([("diff", 1)])).expect("diff fits");
    let report = reg.verify(&ValueSpec::Whole(written)).expect("valid spec");
    assert_eq!(report.mismatches.len(), 1);
    assert_eq!(report.mismatches[0].field, "diff");
    assert_eq!(report.mismatches[0].expected, 0);
    assert_eq!(report.mismatches[0].actual, 1);
}

#[rstest]
#[case(0, 8, 4, 8, 4, 7)]
#[case(0, 8, 7, 1, 7, 7)]
#[case(4, 4, 0, 8, 4, 7)]
#[case(3, 2, 4, 2, 4, 4)]
fn sharing_any_bit_is_an_overlap(
    #[case] offset_a: u32,
    #[case] width_a: u32,
    #[case] offset_b: u32,
    #[case] width_b: u32,
    #[case] overlap_lsb: u32,
    #[case] overlap_msb: u32,
) {
    let mut reg = Register::new("reg", 0x0, 16).expect("valid register");
    reg.define_field("a", offset_a, width_a, AccessType::ReadWrite, 0)
        .expect("first field");
    let err = reg
        .define_field("b", offset_b, width_b, AccessType::ReadWrite, 0)
        .expect_err("shared bits");
    assert_eq!(
        err,
        DefinitionError::Overlap {
            field_a: "b".to_string(),
            field_b: "a".to_string(),
            overlap_lsb,
            overlap_msb,
        }
    );
}

#[rstest]
#[case(0, 4, 4, 4)]
#[case(0, 1, 15, 1)]
#[case(8, 8, 0, 8)]
fn disjoint_ranges_always_define(
    #[case] offset_a: u32,
    #[case] width_a: u32,
    #[case] offset_b: u32,
    #[case] width_b: u32,
) {
    let mut reg = Register::new("reg", 0x0, 16).expect("valid register");
    reg.define_field("a", offset_a, width_a, AccessType::ReadWrite, 0)
        .expect("first field");
    reg.define_field("b", offset_b, width_b, AccessType::ReadWrite, 0)
        .expect("disjoint field");
}

#[test]
fn usage_errors_do_not_corrupt_defined_fields() {
    let mut dut = adc_dut();
    let reg = dut.register_mut("reg2").unwrap();
    let before = reg.clone();

    assert!(matches!(
        reg.write(&ValueSpec::fields([("adch", 0x20)])),
        Err(UsageError::ValueOverflow { .. })
    ));
    assert!(matches!(
        reg.write(&ValueSpec::fields([("nope", 0)])),
        Err(UsageError::UnknownField { .. })
    ));
    assert_eq!(*reg, before);
}

proptest! {
    #[test]
    fn whole_write_then_read_masks_to_the_register_size(
        value in any::<u64>(),
        size_bits in 1u32..=64,
    ) {
        let mut reg = Register::new("r", 0x0, size_bits).expect("valid register");
        reg.write(&ValueSpec::Whole(value)).expect("whole write");
        let mask = if size_bits == 64 { u64::MAX } else { (1u64 << size_bits) - 1 };
        prop_assert_eq!(reg.read(), value & mask);
    }

    #[test]
    fn field_writes_never_disturb_sibling_fields(
        lo in 0u64..=0xFF,
        hi in 0u64..=0xFF,
        update in 0u64..=0xFF,
    ) {
        let mut reg = Register::new("pair", 0x0, 16).expect("valid register");
        reg.define_field("lo", 0, 8, AccessType::ReadWrite, 0).expect("lo");
        reg.define_field("hi", 8, 8, AccessType::ReadWrite, 0).expect("hi");

        reg.write(&ValueSpec::fields([("lo", lo), ("hi", hi)])).expect("both fit");
        reg.write(&ValueSpec::fields([("lo", update)])).expect("update fits");

        prop_assert_eq!(reg.field_value("lo"), Ok(update));
        prop_assert_eq!(reg.field_value("hi"), Ok(hi));
    }

    #[test]
    fn verify_against_the_written_value_is_always_clean(
        value in any::<u64>(),
    ) {
        let mut reg = Register::new("r", 0x0, 16).expect("valid register");
        reg.define_field("lo", 0, 8, AccessType::ReadWrite, 0).expect("lo");
        reg.define_field("hi", 8, 8, AccessType::ReadWrite, 0).expect("hi");

        reg.write(&ValueSpec::Whole(value)).expect("whole write");
        let report = reg.verify(&ValueSpec::Whole(reg.read())).expect("valid spec");
        prop_assert!(report.is_clean());
    }
}
