//! Batch tools: batch_query_diseases, batch_get_diseases.

use serde_json::{Value, json};

use super::{BatchCall, McpTool, ToolContext, fields_schema, format_schema, identifier_list_schema};
use crate::config::{api, fields};
use crate::error::ToolResult;
use crate::models::{BatchGetInput, BatchQueryInput, Dimension, ExportFormat};
use crate::query::XREF_SCOPES;

/// Generic batch lookup over any dimension.
pub struct BatchQueryDiseasesTool;

#[async_trait::async_trait]
impl McpTool for BatchQueryDiseasesTool {
    fn name(&self) -> &'static str {
        "batch_query_diseases"
    }

    fn description(&self) -> &'static str {
        "Resolve up to 1000 identifiers in one call. The dimension selects what the \
         identifiers are: gene symbols, variants (rsID/HGVS), phenotypes (HPO id or term), \
         free text, or disease ids of any namespace (MONDO, OMIM, Orphanet, UMLS), matched \
         against _id, mondo.mondo, orphanet.id, omim and umls.cui. Output has one entry per \
         identifier, in input order, tagged hit, not_found or error."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "identifiers": identifier_list_schema("Identifiers to resolve, in output order"),
                "dimension": {
                    "type": "string",
                    "enum": Dimension::ALL.iter().map(|d| d.as_str()).collect::<Vec<_>>(),
                    "default": "id",
                    "description": "What the identifiers are"
                },
                "fields": fields_schema("Fields to return (default: all)"),
                "scopes": {
                    "type": "string",
                    "description": format!(
                        "Comma-separated fields to match identifiers against \
                         (default for id: {XREF_SCOPES})"
                    )
                },
                "limit": {
                    "type": "integer",
                    "minimum": 1,
                    "description": "Diseases kept per identifier (default 1 for id, 10 otherwise)"
                },
                "chunkSize": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": api::ID_BATCH_SIZE,
                    "description": "Identifiers per upstream request (capped at the upstream maximum)"
                },
                "format": format_schema(ExportFormat::Json)
            },
            "required": ["identifiers"]
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: Value) -> ToolResult<String> {
        let params: BatchQueryInput = serde_json::from_value(input)?;
        let dimension: Dimension = params.dimension.parse()?;
        let scopes = match (params.scopes, dimension) {
            (Some(scopes), _) => Some(scopes),
            (None, Dimension::Id) => Some(XREF_SCOPES.to_string()),
            (None, _) => None,
        };

        BatchCall {
            identifiers: params.identifiers,
            dimension,
            fields: params.fields,
            scopes,
            limit: params.limit,
            chunk_size: params.chunk_size,
            format: params.format,
            default_format: ExportFormat::Json,
        }
        .run(ctx, self.name())
        .await
    }
}

/// Batch retrieval by disease id.
pub struct BatchGetDiseasesTool;

#[async_trait::async_trait]
impl McpTool for BatchGetDiseasesTool {
    fn name(&self) -> &'static str {
        "batch_get_diseases"
    }

    fn description(&self) -> &'static str {
        "Get up to 1000 diseases by MyDisease document id (usually MONDO, e.g. \
         'MONDO:0007739') in one call. Ids are matched exactly against _id; use \
         batch_query_diseases to resolve OMIM, Orphanet or UMLS ids."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "diseaseIds": identifier_list_schema("Disease IDs"),
                "fields": fields_schema("Fields to return (default: _id, name, mondo, orphanet, omim, inheritance)"),
                "format": format_schema(ExportFormat::Json)
            },
            "required": ["diseaseIds"]
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: Value) -> ToolResult<String> {
        let params: BatchGetInput = serde_json::from_value(input)?;

        BatchCall {
            identifiers: params.disease_ids,
            dimension: Dimension::Id,
            fields: Some(params.fields.unwrap_or_else(|| owned_fields(fields::BATCH_DEFAULT))),
            scopes: None,
            limit: None,
            chunk_size: None,
            format: params.format,
            default_format: ExportFormat::Json,
        }
        .run(ctx, self.name())
        .await
    }
}

/// Owned copy of a default field set.
pub(crate) fn owned_fields(fields: &[&str]) -> Vec<String> {
    fields.iter().map(|f| (*f).to_string()).collect()
}
