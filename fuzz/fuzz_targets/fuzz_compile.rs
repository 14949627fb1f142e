#![no_main]

use libfuzzer_sys::fuzz_target;

use vgc_compiler::{CompileContext, CompilerManager};

fuzz_target!(|data: &[u8]| {
    if let Ok(source) = std::str::from_utf8(data) {
        // The full parse + compile pipeline should never panic; failures
        // must come back as diagnostics.
        if let Ok(graph) = vgc_graph::parse(source) {
            let context = CompileContext::default();
            let _ = CompilerManager::new(&graph, &context).compile_with_fallback();
        }
    }
});
