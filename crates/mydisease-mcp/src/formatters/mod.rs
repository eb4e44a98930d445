//! Result formatting for batch lookups.
//!
//! Every renderer is a pure function of a [`BatchResult`]: the same batch
//! always renders to the same bytes. JSON emits one object per input
//! identifier. The tabular formats emit one row per hit record, so an
//! identifier with several matches spans several rows, while a not_found or
//! error identifier still gets exactly one row. No identifier is ever
//! dropped, even when every identifier failed.

pub mod delimited;
pub mod json;
pub mod markdown;

use crate::error::ToolResult;
use crate::models::{BatchResult, ExportFormat, Record};

/// Column holding the caller's identifier.
pub const IDENTIFIER_COLUMN: &str = "identifier";

/// Column holding the result status tag.
pub const STATUS_COLUMN: &str = "status";

/// Render a batch in the named format.
///
/// # Errors
///
/// `InvalidArgument` naming the value when `format` is not one of
/// `tsv`, `csv`, `json`, or `markdown`.
pub fn format_batch(batch: &BatchResult, format: &str, fields: Option<&[String]>) -> ToolResult<String> {
    render(batch, format.parse()?, fields)
}

/// Render a pre-built table in a known format.
///
/// # Errors
///
/// Only if JSON serialization fails.
pub fn render_table(table: &Table, format: ExportFormat) -> ToolResult<String> {
    match format {
        ExportFormat::Json => json::format_table_json(table),
        ExportFormat::Csv => Ok(delimited::format_delimited(table, ',')),
        ExportFormat::Tsv => Ok(delimited::format_delimited(table, '\t')),
        ExportFormat::Markdown => Ok(markdown::format_table_markdown(table)),
    }
}

/// Render a batch in a known format.
///
/// # Errors
///
/// Only if JSON serialization fails.
pub fn render(batch: &BatchResult, format: ExportFormat, fields: Option<&[String]>) -> ToolResult<String> {
    match format {
        ExportFormat::Json => json::format_batch_json(batch, fields),
        tabular => render_table(&Table::build(batch, fields), tabular),
    }
}

/// Field columns for a batch: the requested fields in the order given, or
/// the union of every hit record's fields in first-seen order.
#[must_use]
pub fn field_columns(batch: &BatchResult, fields: Option<&[String]>) -> Vec<String> {
    if let Some(fields) = fields.filter(|f| !f.is_empty()) {
        let mut columns: Vec<String> = Vec::with_capacity(fields.len());
        for field in fields {
            if !columns.contains(field) {
                columns.push(field.clone());
            }
        }
        return columns;
    }

    let mut columns: Vec<String> = Vec::new();
    for record in batch.entries().iter().flat_map(|e| e.result.records()) {
        for key in record.keys() {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.to_string());
            }
        }
    }
    columns
}

/// A batch laid out as rows of plain cell text, shared by the tabular renderers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    /// Column names, starting with identifier and status.
    pub header: Vec<String>,
    /// One row per hit record, or one row per identifier without records.
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Lay out a batch.
    ///
    /// A hit with several records contributes one row per record. Not-found
    /// and error rows carry only identifier and status; their field cells
    /// are empty.
    #[must_use]
    pub fn build(batch: &BatchResult, fields: Option<&[String]>) -> Self {
        let columns = field_columns(batch, fields);

        let mut header = Vec::with_capacity(columns.len() + 2);
        header.push(IDENTIFIER_COLUMN.to_string());
        header.push(STATUS_COLUMN.to_string());
        header.extend(columns.iter().cloned());

        let mut rows = Vec::with_capacity(batch.len());
        for entry in batch.entries() {
            let status = entry.result.status().as_str();
            let records = entry.result.records();
            if records.is_empty() {
                let mut row = vec![entry.identifier.clone(), status.to_string()];
                row.resize(header.len(), String::new());
                rows.push(row);
                continue;
            }
            for record in records {
                rows.push(record_row(&entry.identifier, status, record, &columns));
            }
        }

        Self { header, rows }
    }
}

fn record_row(identifier: &str, status: &str, record: &Record, columns: &[String]) -> Vec<String> {
    let mut row = Vec::with_capacity(columns.len() + 2);
    row.push(identifier.to_string());
    row.push(status.to_string());
    row.extend(columns.iter().map(|c| record.cell(c)));
    row
}
