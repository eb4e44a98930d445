//! Search tools: search_disease, search_by_field, get_disease_by_id.

use serde_json::{Value, json};

use super::{McpTool, ToolContext, fields_schema};
use crate::config::fields;
use crate::error::{ClientError, ToolError, ToolResult};
use crate::models::{GetDiseaseByIdInput, SearchByFieldInput, SearchDiseaseInput};
use crate::query;

/// Largest page the upstream serves for `GET /query`.
const MAX_PAGE_SIZE: u32 = 1000;

/// Free-text disease search tool.
pub struct SearchDiseaseTool;

#[async_trait::async_trait]
impl McpTool for SearchDiseaseTool {
    fn name(&self) -> &'static str {
        "search_disease"
    }

    fn description(&self) -> &'static str {
        "Search diseases by name, identifier, symptom or any Lucene query \
         (e.g. 'Alzheimer', 'OMIM:104300', 'inheritance.inheritance_type:AD')."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "q": {
                    "type": "string",
                    "description": "Query string"
                },
                "fields": fields_schema("Fields to return (default: _id, name, mondo, definition)"),
                "size": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": MAX_PAGE_SIZE,
                    "default": 10,
                    "description": "Number of hits"
                },
                "from": {
                    "type": "integer",
                    "minimum": 0,
                    "description": "Offset for pagination"
                },
                "sort": {
                    "type": "string",
                    "description": "Sort order, e.g. '-_score'"
                }
            },
            "required": ["q"]
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: Value) -> ToolResult<String> {
        let params: SearchDiseaseInput = serde_json::from_value(input)?;
        run_search(ctx, &params.q, params.fields.as_deref(), params.size, params.from, params.sort.as_deref())
            .await
    }
}

/// Field-targeted search tool.
pub struct SearchByFieldTool;

#[async_trait::async_trait]
impl McpTool for SearchByFieldTool {
    fn name(&self) -> &'static str {
        "search_by_field"
    }

    fn description(&self) -> &'static str {
        "Search diseases by exact field values, e.g. {\"mondo.mondo\": \"MONDO:0007739\"}. \
         Values are escaped; pairs are joined with AND or OR."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "fieldQueries": {
                    "type": "object",
                    "additionalProperties": {"type": ["string", "number", "boolean"]},
                    "description": "Field name to value"
                },
                "operator": {
                    "type": "string",
                    "enum": ["AND", "OR"],
                    "default": "AND"
                },
                "fields": fields_schema("Fields to return"),
                "size": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": MAX_PAGE_SIZE,
                    "default": 10
                }
            },
            "required": ["fieldQueries"]
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: Value) -> ToolResult<String> {
        let params: SearchByFieldInput = serde_json::from_value(input)?;

        let pairs = params
            .field_queries
            .iter()
            .map(|(field, value)| match value {
                Value::String(s) => Ok((field.clone(), s.clone())),
                Value::Number(n) => Ok((field.clone(), n.to_string())),
                Value::Bool(b) => Ok((field.clone(), b.to_string())),
                other => Err(ToolError::invalid_argument(
                    "fieldQueries",
                    format!("value for '{field}' must be a string, number or boolean, got {other}"),
                )),
            })
            .collect::<ToolResult<Vec<_>>>()?;

        let q = query::build_field_query(&pairs, &params.operator)?;
        run_search(ctx, &q, params.fields.as_deref(), params.size, None, None).await
    }
}

async fn run_search(
    ctx: &ToolContext,
    q: &str,
    requested: Option<&[String]>,
    size: u32,
    from: Option<u32>,
    sort: Option<&str>,
) -> ToolResult<String> {
    let q = q.trim();
    if q.is_empty() {
        return Err(ToolError::invalid_argument("q", "query must not be empty"));
    }

    let field_list = match requested {
        Some(list) => query::join_fields(list)?,
        None => fields::SEARCH_DEFAULT.join(","),
    };

    let mut params = vec![
        ("q".to_string(), q.to_string()),
        ("fields".to_string(), field_list),
        ("size".to_string(), size.clamp(1, MAX_PAGE_SIZE).to_string()),
    ];
    if let Some(from) = from {
        params.push(("from".to_string(), from.to_string()));
    }
    if let Some(sort) = sort.filter(|s| !s.trim().is_empty()) {
        params.push(("sort".to_string(), sort.trim().to_string()));
    }

    tracing::info!(query = %q, size, "Searching diseases");

    let body = ctx.client.query(&params).await?;

    let hits = body.get("hits").cloned().unwrap_or_else(|| json!([]));
    Ok(serde_json::to_string_pretty(&json!({
        "query": q,
        "total": body.get("total").cloned().unwrap_or(Value::Null),
        "hits": hits,
    }))?)
}

/// Single disease lookup tool.
pub struct GetDiseaseByIdTool;

#[async_trait::async_trait]
impl McpTool for GetDiseaseByIdTool {
    fn name(&self) -> &'static str {
        "get_disease_by_id"
    }

    fn description(&self) -> &'static str {
        "Get the full annotation of one disease by its MyDisease document id, usually a MONDO id \
         (e.g. 'MONDO:0007739'). To resolve OMIM, Orphanet or UMLS ids, use batch_query_diseases \
         or map_disease_ids."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "diseaseId": {
                    "type": "string",
                    "description": "MyDisease document id (e.g. 'MONDO:0007739')"
                },
                "fields": fields_schema("Fields to return (default: all)")
            },
            "required": ["diseaseId"]
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: Value) -> ToolResult<String> {
        let params: GetDiseaseByIdInput = serde_json::from_value(input)?;

        let disease_id = params.disease_id.trim();
        if disease_id.is_empty() {
            return Err(ToolError::invalid_argument("diseaseId", "disease id must not be empty"));
        }

        let field_list = params.fields.as_deref().map(query::join_fields).transpose()?;

        let disease = ctx
            .client
            .get_disease(disease_id, field_list.as_deref())
            .await
            .map_err(|e| match e {
                ClientError::NotFound { .. } => ClientError::not_found(format!("disease '{disease_id}'")),
                other => other,
            })?;

        Ok(serde_json::to_string_pretty(&disease)?)
    }
}
