//! Fuzzing library for mydisease-mcp.
//!
//! This crate provides fuzzing targets for the parts of the server that
//! consume untrusted JSON: tool arguments and upstream batch responses.
//!
//! # Usage
//!
//! ```bash
//! cd crates/sentinel-fuzz
//! cargo +nightly fuzz run fuzz_merge_chunk -- -max_total_time=60
//! ```

pub use mydisease_mcp::{dispatch, formatters, models};
