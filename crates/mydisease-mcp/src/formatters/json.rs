//! JSON output formatting.

use serde::Serialize;

use serde_json::{Map, Value};

use super::Table;
use crate::error::{ToolResult, TransportErrorKind};
use crate::models::{BatchResult, Record, ResultStatus, UpstreamResult};

/// One output object per input identifier.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EntryJson<'a> {
    identifier: &'a str,
    status: ResultStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    records: Option<Vec<Record>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_kind: Option<TransportErrorKind>,
}

/// Format a batch as a pretty-printed JSON array in input order.
///
/// Hits carry their records, filtered to `fields` when given. Errors carry
/// the chunk failure message and its kind.
///
/// # Errors
///
/// Returns error if serialization fails.
pub fn format_batch_json(batch: &BatchResult, fields: Option<&[String]>) -> ToolResult<String> {
    let fields = fields.filter(|f| !f.is_empty());

    let entries: Vec<EntryJson<'_>> = batch
        .entries()
        .iter()
        .map(|entry| {
            let mut out = EntryJson {
                identifier: &entry.identifier,
                status: entry.result.status(),
                records: None,
                error: None,
                error_kind: None,
            };
            match &entry.result {
                UpstreamResult::Hit(records) => {
                    out.records = Some(
                        records
                            .iter()
                            .map(|r| fields.map_or_else(|| r.clone(), |f| r.select(f)))
                            .collect(),
                    );
                }
                UpstreamResult::NotFound => {}
                UpstreamResult::TransportError { kind, message } => {
                    out.error = Some(message);
                    out.error_kind = Some(*kind);
                }
            }
            out
        })
        .collect();

    Ok(serde_json::to_string_pretty(&entries)?)
}

/// Format a table as a JSON array with one object per row, keyed by header.
///
/// # Errors
///
/// Returns error if serialization fails.
pub fn format_table_json(table: &Table) -> ToolResult<String> {
    let rows: Vec<Map<String, Value>> = table
        .rows
        .iter()
        .map(|row| {
            table
                .header
                .iter()
                .zip(row)
                .map(|(column, cell)| (column.clone(), Value::String(cell.clone())))
                .collect()
        })
        .collect();

    Ok(serde_json::to_string_pretty(&rows)?)
}
