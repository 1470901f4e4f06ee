//! Pattern script compiler library.
//!
//! Ingests line-oriented stimulus scripts, builds the DUT model and
//! finalized patterns through `dut-core`, and renders tester vector
//! files from pattern replay.

/// Script compilation pipeline producing a DUT and finalized patterns.
pub mod compiler;
/// Line parser for stimulus script directives.
pub mod parser;
/// Vector-file rendering of finalized patterns.
pub mod render;

#[cfg(test)]
use tempfile as _;
