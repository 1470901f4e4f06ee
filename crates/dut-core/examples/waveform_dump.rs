//! Dumps a pattern replay as a plain-text waveform table.

use dut_core::Dut;
use indexmap as _;
use proptest as _;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

fn main() {
    let mut dut = Dut::new("demo");
    dut.define_pin("clk").expect("unique pin");
    dut.define_pin("tdi").expect("unique pin");

    let mut builder = dut.produce_pattern("strobe");
    builder.drive("clk", 1).expect("clk exists");
    builder.drive("tdi", 0).expect("tdi exists");
    builder.repeat(4);
    builder.drive("clk", 0).expect("clk exists");
    builder.release("tdi").expect("tdi exists");
    builder.repeat(4);
    let pattern = builder.finalize();

    let header: Vec<&str> = pattern.pins().iter().map(String::as_str).collect();
    println!("cycle  {}", header.join("  "));
    for record in pattern.replay() {
        let states: Vec<String> = record
            .pin_states
            .values()
            .map(|state| state.as_tester_char().to_string())
            .collect();
        println!("{:>5}  {}", record.cycle_index, states.join("    "));
    }
}
