//! Batch request and aligned result types.

use serde::Serialize;

use super::{Dimension, Record};
use crate::config::api::MAX_IDENTIFIERS;
use crate::error::{ToolError, ToolResult, TransportErrorKind};

/// A validated batch lookup request.
///
/// Identifiers keep caller order; duplicates are allowed and each occurrence
/// gets its own result slot.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    identifiers: Vec<String>,
    dimension: Dimension,
    fields: Option<Vec<String>>,
    scopes: Option<String>,
    limit: usize,
}

impl QueryRequest {
    /// Build a request, rejecting empty or oversized identifier lists.
    pub fn new(identifiers: Vec<String>, dimension: Dimension) -> ToolResult<Self> {
        validate_identifier_count(identifiers.len())?;
        Ok(Self { identifiers, dimension, fields: None, scopes: None, limit: dimension.default_limit() })
    }

    /// Restrict the upstream fields returned for each record.
    #[must_use]
    pub fn with_fields(mut self, fields: Option<Vec<String>>) -> Self {
        self.fields = fields.filter(|f| !f.is_empty());
        self
    }

    /// Search these comma-separated upstream fields instead of the
    /// dimension's own scopes. Always routes through `POST /query`.
    #[must_use]
    pub fn with_scopes(mut self, scopes: impl Into<String>) -> Self {
        let scopes = scopes.into();
        self.scopes = (!scopes.trim().is_empty()).then_some(scopes);
        self
    }

    /// Maximum records kept per identifier (at least 1).
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    /// Identifiers in caller order.
    #[must_use]
    pub fn identifiers(&self) -> &[String] {
        &self.identifiers
    }

    /// Search dimension.
    #[must_use]
    pub const fn dimension(&self) -> Dimension {
        self.dimension
    }

    /// Requested upstream fields.
    #[must_use]
    pub fn fields(&self) -> Option<&[String]> {
        self.fields.as_deref()
    }

    /// Explicit scopes, if any.
    #[must_use]
    pub fn scopes(&self) -> Option<&str> {
        self.scopes.as_deref()
    }

    /// Records kept per identifier.
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }
}

/// Reject identifier lists outside `1..=1000`.
pub fn validate_identifier_count(count: usize) -> ToolResult<()> {
    if count == 0 {
        return Err(ToolError::invalid_argument(
            "identifiers",
            "at least one identifier is required",
        ));
    }
    if count > MAX_IDENTIFIERS {
        return Err(ToolError::invalid_argument(
            "identifiers",
            format!("at most {MAX_IDENTIFIERS} identifiers are allowed per call, got {count}"),
        ));
    }
    Ok(())
}

/// Outcome for one identifier.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamResult {
    /// One or more matching records, in upstream order.
    Hit(Vec<Record>),
    /// The upstream had no match. Expected and common, not an error.
    NotFound,
    /// The chunk carrying this identifier failed.
    TransportError {
        /// Failure class.
        kind: TransportErrorKind,
        /// Underlying cause, shared by every identifier in the chunk.
        message: String,
    },
}

impl UpstreamResult {
    /// Status tag as rendered in output.
    #[must_use]
    pub const fn status(&self) -> ResultStatus {
        match self {
            Self::Hit(_) => ResultStatus::Hit,
            Self::NotFound => ResultStatus::NotFound,
            Self::TransportError { .. } => ResultStatus::Error,
        }
    }

    /// Records, empty unless this is a hit.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        match self {
            Self::Hit(records) => records,
            _ => &[],
        }
    }
}

/// Status tag for one result slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultStatus {
    /// Resolved.
    Hit,
    /// No match.
    NotFound,
    /// Transport failure.
    Error,
}

impl ResultStatus {
    /// Tag as rendered in output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hit => "hit",
            Self::NotFound => "not_found",
            Self::Error => "error",
        }
    }
}

/// One `(identifier, result)` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchEntry {
    /// Identifier as supplied by the caller.
    pub identifier: String,
    /// Outcome for that identifier.
    pub result: UpstreamResult,
}

/// Results aligned with the request: same length, same order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchResult {
    entries: Vec<BatchEntry>,
}

impl BatchResult {
    /// Wrap aligned entries.
    #[must_use]
    pub fn new(entries: Vec<BatchEntry>) -> Self {
        Self { entries }
    }

    /// Entries in request order.
    #[must_use]
    pub fn entries(&self) -> &[BatchEntry] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Count entries with the given status.
    #[must_use]
    pub fn count(&self, status: ResultStatus) -> usize {
        self.entries.iter().filter(|e| e.result.status() == status).count()
    }
}

impl FromIterator<BatchEntry> for BatchResult {
    fn from_iter<I: IntoIterator<Item = BatchEntry>>(iter: I) -> Self {
        Self { entries: iter.into_iter().collect() }
    }
}
