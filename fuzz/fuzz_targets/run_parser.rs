#![no_main]

use frozen_audit::loader::parse_run;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        // Malformed tables must surface as LoadError, never a panic
        for block_length in [0, 1, 4, 128] {
            let _ = parse_run("fuzz", text, block_length);
        }
    }
});
