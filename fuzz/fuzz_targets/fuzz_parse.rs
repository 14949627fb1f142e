#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(source) = std::str::from_utf8(data) {
        // Graph loading should never panic on any input.
        let _ = vgc_graph::parse(source);
    }
});
