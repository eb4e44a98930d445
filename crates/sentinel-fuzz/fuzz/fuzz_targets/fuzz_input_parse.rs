#![no_main]

use libfuzzer_sys::fuzz_target;
use mydisease_mcp::models::{BatchQueryInput, Dimension, ExportFormat};

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes as tool arguments; parsing must never panic
    if let Ok(input) = serde_json::from_slice::<BatchQueryInput>(data) {
        let _ = input.dimension.parse::<Dimension>();
        if let Some(format) = input.format {
            let _ = format.parse::<ExportFormat>();
        }
    }
});
