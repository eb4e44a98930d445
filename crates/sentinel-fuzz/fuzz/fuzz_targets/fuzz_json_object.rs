#![no_main]

use libfuzzer_sys::fuzz_target;
use mydisease_mcp::formatters;
use mydisease_mcp::models::{BatchEntry, BatchResult, ExportFormat, Record, UpstreamResult};

fuzz_target!(|data: &[u8]| {
    // Any JSON document flattens into a record that every format can render
    if let Ok(json) = serde_json::from_slice::<serde_json::Value>(data) {
        let record = Record::from_json(&json);
        let batch = BatchResult::new(vec![BatchEntry {
            identifier: "fuzz".to_string(),
            result: UpstreamResult::Hit(vec![record]),
        }]);
        for format in ExportFormat::ALL {
            let _ = formatters::render(&batch, format, None);
        }
    }
});
