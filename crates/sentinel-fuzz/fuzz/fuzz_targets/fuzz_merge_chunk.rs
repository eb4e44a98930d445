#![no_main]

use libfuzzer_sys::fuzz_target;
use mydisease_mcp::dispatch::merge_chunk;

fuzz_target!(|data: &[u8]| {
    // Arbitrary upstream bodies either merge into aligned slots or fail cleanly
    if let Ok(body) = serde_json::from_slice::<serde_json::Value>(data) {
        let ids = vec!["BRCA1".to_string(), "TP53".to_string(), "BRCA1".to_string()];
        if let Ok(results) = merge_chunk(&ids, &body, 3) {
            assert_eq!(results.len(), ids.len());
        }
    }
});
