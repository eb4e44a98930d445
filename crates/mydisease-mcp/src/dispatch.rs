//! Batch dispatcher: bounded fan-out of identifier chunks and ordered merge.
//!
//! A [`QueryRequest`] is split into consecutive chunks no larger than the
//! upstream batch ceiling for its dimension. Chunks run with at most
//! `concurrency_limit` calls in flight, each retried once on a transient
//! failure, and their results are written back into the slot of the
//! identifier they came from. The returned [`BatchResult`] always has one
//! entry per input identifier, in input order.
//!
//! A failing chunk marks only its own identifiers as errors. The one thing
//! that aborts the whole dispatch is the invocation deadline: when it
//! expires, in-flight calls are dropped and [`ToolError::Timeout`] is
//! returned instead of a partial result.

use std::collections::HashMap;
use std::ops::Range;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use serde_json::Value;

use crate::client::MyDiseaseClient;
use crate::config::Config;
use crate::error::{ClientError, ToolError, ToolResult, TransportErrorKind};
use crate::models::{
    BatchEntry, BatchResult, Dimension, QueryRequest, Record, ResultStatus, UpstreamResult,
};
use crate::query::{self, UpstreamRequest};

/// Attempts per chunk: the first call plus one retry.
const MAX_ATTEMPTS: u32 = 2;

/// Limits applied to every dispatch.
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    /// Upstream ceiling for `POST /disease`.
    pub id_batch_size: usize,
    /// Upstream ceiling for `POST /query`.
    pub query_batch_size: usize,
    /// Default chunk calls in flight.
    pub concurrency_limit: usize,
    /// Deadline for one dispatch.
    pub invocation_timeout: Duration,
    /// Pause before the retry.
    pub retry_pause: Duration,
}

impl From<&Config> for DispatchSettings {
    fn from(config: &Config) -> Self {
        Self {
            id_batch_size: config.max_batch_size(Dimension::Id),
            query_batch_size: config.max_batch_size(Dimension::Text),
            concurrency_limit: config.concurrency_limit.max(1),
            invocation_timeout: config.invocation_timeout,
            retry_pause: config.retry_pause,
        }
    }
}

/// Per-call overrides. `None` falls back to the dispatcher settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct DispatchOptions {
    /// Identifiers per upstream call, capped at the upstream ceiling.
    pub chunk_size: Option<usize>,
    /// Chunk calls in flight, capped at the configured limit.
    pub concurrency_limit: Option<usize>,
}

/// Fans a batch out to the upstream API and merges the answers.
#[derive(Debug, Clone)]
pub struct BatchDispatcher {
    client: Arc<MyDiseaseClient>,
    settings: DispatchSettings,
}

impl BatchDispatcher {
    /// Create a dispatcher sharing the process-wide client.
    #[must_use]
    pub fn new(client: Arc<MyDiseaseClient>, settings: DispatchSettings) -> Self {
        Self { client, settings }
    }

    /// Settings in effect.
    #[must_use]
    pub const fn settings(&self) -> &DispatchSettings {
        &self.settings
    }

    /// Upstream ceiling for one call in the given dimension.
    #[must_use]
    pub const fn max_chunk_size(&self, dimension: Dimension) -> usize {
        match dimension {
            Dimension::Id => self.settings.id_batch_size,
            _ => self.settings.query_batch_size,
        }
    }

    /// Resolve every identifier of `request`.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a zero chunk size, zero concurrency, or an
    /// invalid field name, raised before any network call. `Timeout` when
    /// the invocation deadline expires. Upstream failures never surface
    /// here; they are recorded per identifier.
    pub async fn dispatch(
        &self,
        request: &QueryRequest,
        options: DispatchOptions,
    ) -> ToolResult<BatchResult> {
        let dimension = request.dimension();
        let scopes = query::request_scopes(request);
        let chunk_size = self.effective_chunk_size(dimension, scopes.is_some(), options.chunk_size)?;
        let concurrency = self.effective_concurrency(options.concurrency_limit)?;
        let identifiers = request.identifiers();

        // Translate every chunk up front so validation errors precede any call.
        let chunks = plan_chunks(identifiers.len(), chunk_size)
            .into_iter()
            .map(|range| {
                query::translate(scopes, &identifiers[range.clone()], request.fields())
                    .map(|upstream| (range, upstream))
            })
            .collect::<ToolResult<Vec<_>>>()?;

        tracing::debug!(
            %dimension,
            scopes = scopes.unwrap_or("_id"),
            identifiers = identifiers.len(),
            chunks = chunks.len(),
            chunk_size,
            concurrency,
            "Dispatching batch"
        );

        let limit = request.limit();
        let calls: Vec<_> = chunks
            .into_iter()
            .map(|(range, upstream)| self.settle_chunk(range, upstream, identifiers, limit))
            .collect();
        let gather = stream::iter(calls).buffer_unordered(concurrency).collect::<Vec<_>>();

        let settled = tokio::time::timeout(self.settings.invocation_timeout, gather)
            .await
            .map_err(|_| {
                tracing::warn!(
                    timeout = ?self.settings.invocation_timeout,
                    identifiers = identifiers.len(),
                    "Batch dispatch exceeded its deadline"
                );
                ToolError::Timeout(self.settings.invocation_timeout)
            })?;

        let mut slots: Vec<Option<UpstreamResult>> = vec![None; identifiers.len()];
        for (range, results) in settled {
            for (slot, result) in slots[range].iter_mut().zip(results) {
                *slot = Some(result);
            }
        }

        let batch: BatchResult = identifiers
            .iter()
            .zip(slots)
            .map(|(identifier, slot)| {
                slot.map(|result| BatchEntry { identifier: identifier.clone(), result }).ok_or_else(
                    || ToolError::internal(format!("no chunk result for identifier '{identifier}'")),
                )
            })
            .collect::<ToolResult<_>>()?;

        tracing::info!(
            %dimension,
            total = batch.len(),
            hits = batch.count(ResultStatus::Hit),
            not_found = batch.count(ResultStatus::NotFound),
            errors = batch.count(ResultStatus::Error),
            "Batch dispatch complete"
        );

        Ok(batch)
    }

    fn effective_chunk_size(
        &self,
        dimension: Dimension,
        scoped: bool,
        requested: Option<usize>,
    ) -> ToolResult<usize> {
        let ceiling =
            if scoped { self.settings.query_batch_size } else { self.settings.id_batch_size }.max(1);
        match requested {
            None => Ok(ceiling),
            Some(0) => Err(ToolError::invalid_argument("chunkSize", "chunk size must be at least 1")),
            Some(size) if size > ceiling => {
                tracing::debug!(requested = size, ceiling, %dimension, "Capping chunk size");
                Ok(ceiling)
            }
            Some(size) => Ok(size),
        }
    }

    fn effective_concurrency(&self, requested: Option<usize>) -> ToolResult<usize> {
        match requested {
            None => Ok(self.settings.concurrency_limit),
            Some(0) => Err(ToolError::invalid_argument(
                "concurrencyLimit",
                "concurrency limit must be at least 1",
            )),
            Some(limit) => Ok(limit.min(self.settings.concurrency_limit)),
        }
    }

    async fn settle_chunk(
        &self,
        range: Range<usize>,
        upstream: UpstreamRequest,
        identifiers: &[String],
        limit: usize,
    ) -> (Range<usize>, Vec<UpstreamResult>) {
        let results = self.run_chunk(&upstream, &identifiers[range.clone()], limit).await;
        (range, results)
    }

    /// Call the upstream for one chunk and map its answer onto the chunk's slots.
    async fn run_chunk(
        &self,
        upstream: &UpstreamRequest,
        identifiers: &[String],
        limit: usize,
    ) -> Vec<UpstreamResult> {
        let mut attempt = 1;
        let outcome = loop {
            match self.client.execute(upstream).await {
                Ok(body) => break Ok(body),
                Err(e) if e.is_retryable() && attempt < MAX_ATTEMPTS => {
                    tracing::warn!(
                        error = %e,
                        attempt,
                        identifiers = identifiers.len(),
                        "Chunk call failed, retrying"
                    );
                    if !self.settings.retry_pause.is_zero() {
                        tokio::time::sleep(self.settings.retry_pause).await;
                    }
                    attempt += 1;
                }
                Err(e) => break Err(e),
            }
        };

        match outcome {
            Ok(body) => merge_chunk(identifiers, &body, limit).unwrap_or_else(|message| {
                tracing::warn!(%message, identifiers = identifiers.len(), "Malformed chunk response");
                failed(identifiers.len(), TransportErrorKind::MalformedBody, &message)
            }),
            Err(ClientError::NotFound { .. }) => vec![UpstreamResult::NotFound; identifiers.len()],
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    attempts = attempt,
                    identifiers = identifiers.len(),
                    "Chunk failed"
                );
                failed(identifiers.len(), e.kind(), &e.to_string())
            }
        }
    }
}

/// Split `len` items into consecutive ranges of at most `chunk_size`.
#[must_use]
pub fn plan_chunks(len: usize, chunk_size: usize) -> Vec<Range<usize>> {
    let chunk_size = chunk_size.max(1);
    (0..len).step_by(chunk_size).map(|start| start..(start + chunk_size).min(len)).collect()
}

fn failed(count: usize, kind: TransportErrorKind, message: &str) -> Vec<UpstreamResult> {
    vec![UpstreamResult::TransportError { kind, message: message.to_string() }; count]
}

/// Map a batch response back onto the identifiers that produced it.
///
/// The upstream answers with a flat array in no guaranteed order. Each item
/// names its originating term in `query`; misses carry `notfound: true`.
/// A term may yield several items, of which the first `limit` distinct
/// documents are kept. Repeated identifiers share their term's records.
pub fn merge_chunk(
    identifiers: &[String],
    body: &Value,
    limit: usize,
) -> Result<Vec<UpstreamResult>, String> {
    let items = body
        .as_array()
        .ok_or_else(|| format!("expected a JSON array from the batch endpoint, got {}", kind_of(body)))?;

    let mut matches: HashMap<&str, Vec<Record>> = HashMap::new();
    for item in items {
        let object = item
            .as_object()
            .ok_or_else(|| format!("expected objects in the batch response, got {}", kind_of(item)))?;

        let Some(term) = object
            .get("query")
            .or_else(|| object.get("_id"))
            .and_then(Value::as_str)
        else {
            tracing::debug!("Skipping batch item without a query key");
            continue;
        };

        let records = matches.entry(term).or_default();
        let missing = object.get("notfound").and_then(Value::as_bool).unwrap_or(false);
        if missing || records.len() >= limit {
            continue;
        }

        // A term answered more than once repeats the same documents.
        let record = Record::from_upstream_hit(item);
        if record.id().is_none_or(|id| records.iter().all(|r| r.id() != Some(id))) {
            records.push(record);
        }
    }

    Ok(identifiers
        .iter()
        .map(|id| match matches.get(id.as_str()) {
            Some(records) if !records.is_empty() => UpstreamResult::Hit(records.clone()),
            _ => UpstreamResult::NotFound,
        })
        .collect())
}

const fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
