//! Data models for batch lookups, disease records, and tool inputs.
//!
//! Upstream documents are not modelled field by field; they are flattened
//! into [`Record`]s so any field the API returns can be selected and rendered.

mod batch;
mod enums;
mod inputs;
mod record;

pub use batch::{
    BatchEntry, BatchResult, QueryRequest, ResultStatus, UpstreamResult, validate_identifier_count,
};
pub use enums::{Dimension, ExportFormat, IdentifierType};
pub use inputs::*;
pub use record::{FieldValue, Record};
