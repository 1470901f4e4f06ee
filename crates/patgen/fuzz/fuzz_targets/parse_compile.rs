#![no_main]

use libfuzzer_sys::fuzz_target;
use patgen::compiler::compile;
use patgen::parser::parse_source;

fuzz_target!(|data: &[u8]| {
    let Ok(source) = std::str::from_utf8(data) else {
        return;
    };

    let _ = parse_source(source);

    if let Ok(output) = compile(source, "fuzz") {
        for pattern in &output.patterns {
            // Replay must terminate and stay consistent with the
            // pattern's own cycle accounting. Skip pathological repeat
            // counts to keep iterations fast.
            if pattern.cycle_count() <= 10_000 {
                let replayed = pattern.replay().count() as u64;
                assert_eq!(replayed, pattern.cycle_count());
            }
        }
    }
});
