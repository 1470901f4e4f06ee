//! Vector-file rendering of finalized patterns.
//!
//! One pattern renders to one vector file: a comment header, a pinlist
//! row, then one row per run of identical cycles. Consecutive identical
//! cycles compress into a single `repeat <n>` row; state symbols are
//! `1`/`0` (driven), `Z` (high impedance), and `X` (undriven).
//!
//! ```text
//! // pattern clock
//! // cycles 200
//! pins > clk tdi ;
//! repeat 100 > 1 X ;
//! repeat 100 > 0 X ;
//! end ;
//! ```

use std::fmt::Write as _;

use dut_core::Pattern;

/// Renders one finalized pattern as vector-file text.
///
/// Rendering walks a fresh replay, so the output is deterministic and
/// identical across calls.
#[must_use]
pub fn render_pattern(pattern: &Pattern) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "// pattern {}", pattern.name());
    let _ = writeln!(out, "// cycles {}", pattern.cycle_count());

    let pins: Vec<&str> = pattern.pins().iter().map(String::as_str).collect();
    if !pins.is_empty() {
        let _ = writeln!(out, "pins > {} ;", pins.join(" "));
    }

    let mut current: Option<(String, u64)> = None;
    for record in pattern.replay() {
        let row: Vec<String> = record
            .pin_states
            .values()
            .map(|state| state.as_tester_char().to_string())
            .collect();
        let row = row.join(" ");

        if let Some((states, count)) = &mut current {
            if *states == row {
                *count += 1;
                continue;
            }
        }
        flush_row(&mut out, current.take());
        current = Some((row, 1));
    }
    flush_row(&mut out, current);

    out.push_str("end ;\n");
    out
}

fn flush_row(out: &mut String, row: Option<(String, u64)>) {
    if let Some((states, count)) = row {
        let _ = writeln!(out, "repeat {count} > {states} ;");
    }
}
