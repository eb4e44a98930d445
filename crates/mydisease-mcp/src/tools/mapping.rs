//! Mapping tools: map_disease_ids, validate_disease_ids, find_common_diseases.
//!
//! Every lookup is one batch on `POST /query`, scoped to the fields of the
//! source namespace, so ids of any namespace resolve to MyDisease documents.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::{Map, Value, json};

use super::{McpTool, ToolContext, identifier_list_schema};
use crate::dispatch::DispatchOptions;
use crate::error::{ToolError, ToolResult, TransportErrorKind};
use crate::models::{
    BatchResult, Dimension, FieldValue, FindCommonDiseasesInput, IdentifierType,
    MapDiseaseIdsInput, QueryRequest, Record, ResultStatus, UpstreamResult,
    ValidateDiseaseIdsInput,
};

/// Lookup of `identifiers` in the `from` namespace, returning the fields of
/// every `to` namespace. One document is kept per identifier.
fn xref_request(
    identifiers: Vec<String>,
    from: IdentifierType,
    to: &[IdentifierType],
) -> ToolResult<QueryRequest> {
    let mut fields = vec!["_id".to_string(), "name".to_string()];
    for field in to.iter().flat_map(|kind| kind.fields()) {
        if !fields.iter().any(|f| f == field) {
            fields.push((*field).to_string());
        }
    }

    Ok(QueryRequest::new(identifiers, Dimension::Id)?
        .with_scopes(from.scopes())
        .with_fields(Some(fields))
        .with_limit(1))
}

async fn resolve(ctx: &ToolContext, request: &QueryRequest, from: IdentifierType) -> ToolResult<BatchResult> {
    tracing::info!(%from, identifiers = request.identifiers().len(), "Resolving identifiers");
    ctx.dispatcher.dispatch(request, DispatchOptions::default()).await
}

/// First populated field holding a namespace's identifier.
fn identifier_value(record: &Record, kind: IdentifierType) -> Option<&FieldValue> {
    kind.fields().iter().filter_map(|f| record.get(f)).find(|v| !v.is_null())
}

fn disease_name(record: &Record) -> Option<String> {
    record.get("name").map(FieldValue::to_cell).filter(|name| !name.is_empty())
}

/// An identifier whose chunk failed upstream.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FailedLookup<'a> {
    identifier: &'a str,
    error: &'a str,
    error_kind: TransportErrorKind,
}

fn failures(batch: &BatchResult) -> Vec<FailedLookup<'_>> {
    batch
        .entries()
        .iter()
        .filter_map(|entry| match &entry.result {
            UpstreamResult::TransportError { kind, message } => Some(FailedLookup {
                identifier: &entry.identifier,
                error: message,
                error_kind: *kind,
            }),
            _ => None,
        })
        .collect()
}

fn not_found(batch: &BatchResult) -> Vec<&str> {
    batch
        .entries()
        .iter()
        .filter(|e| e.result.status() == ResultStatus::NotFound)
        .map(|e| e.identifier.as_str())
        .collect()
}

fn identifier_type_schema(description: &str) -> Value {
    json!({
        "type": "string",
        "enum": IdentifierType::ALL.iter().map(|t| t.as_str()).collect::<Vec<_>>(),
        "description": description
    })
}

// =============================================================================
// map_disease_ids
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IdMapping<'a> {
    input: &'a str,
    disease_id: Option<&'a str>,
    disease_name: Option<String>,
    mappings: Map<String, Value>,
}

/// Cross-reference mapping tool.
pub struct MapDiseaseIdsTool;

#[async_trait::async_trait]
impl McpTool for MapDiseaseIdsTool {
    fn name(&self) -> &'static str {
        "map_disease_ids"
    }

    fn description(&self) -> &'static str {
        "Map up to 1000 disease identifiers from one namespace to others \
         (MONDO, OMIM, Orphanet, DOID, UMLS, MeSH, ICD-10, ICD-11, HPO)."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "inputIds": identifier_list_schema("Identifiers to map"),
                "fromType": identifier_type_schema("Namespace of the input identifiers"),
                "toTypes": {
                    "type": "array",
                    "items": identifier_type_schema("Target namespace"),
                    "minItems": 1,
                    "description": "Namespaces to map to"
                },
                "missingOk": {
                    "type": "boolean",
                    "default": true,
                    "description": "List identifiers without a match in the output"
                }
            },
            "required": ["inputIds", "fromType", "toTypes"]
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: Value) -> ToolResult<String> {
        let params: MapDiseaseIdsInput = serde_json::from_value(input)?;
        let from: IdentifierType = params.from_type.parse()?;
        let to = params
            .to_types
            .iter()
            .map(|t| t.parse())
            .collect::<ToolResult<Vec<IdentifierType>>>()?;
        if to.is_empty() {
            return Err(ToolError::invalid_argument("toTypes", "at least one target type is required"));
        }

        let request = xref_request(params.input_ids, from, &to)?;
        let batch = resolve(ctx, &request, from).await?;

        let mappings: Vec<IdMapping<'_>> = batch
            .entries()
            .iter()
            .filter_map(|entry| {
                let record = entry.result.records().first()?;
                let mappings = to
                    .iter()
                    .filter_map(|kind| {
                        identifier_value(record, *kind).map(|v| (kind.as_str().to_string(), json!(v)))
                    })
                    .collect();
                Some(IdMapping {
                    input: &entry.identifier,
                    disease_id: record.id(),
                    disease_name: disease_name(record),
                    mappings,
                })
            })
            .collect();
        let unmapped = not_found(&batch);
        let errors = failures(&batch);

        let mut output = json!({
            "fromType": from,
            "toTypes": to,
            "totalInput": batch.len(),
            "mapped": mappings.len(),
            "unmapped": unmapped.len(),
            "failed": errors.len(),
            "mappings": mappings,
        });
        if params.missing_ok {
            output["unmappedIds"] = json!(unmapped);
        }
        if !errors.is_empty() {
            output["errors"] = json!(errors);
        }

        Ok(serde_json::to_string_pretty(&output)?)
    }
}

// =============================================================================
// validate_disease_ids
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValidIdentifier<'a> {
    identifier: &'a str,
    disease_id: Option<&'a str>,
    disease_name: Option<String>,
    mondo_id: Option<String>,
}

/// Identifier validation tool.
pub struct ValidateDiseaseIdsTool;

#[async_trait::async_trait]
impl McpTool for ValidateDiseaseIdsTool {
    fn name(&self) -> &'static str {
        "validate_disease_ids"
    }

    fn description(&self) -> &'static str {
        "Check which of up to 1000 disease identifiers of one namespace exist in MyDisease.info. \
         Valid identifiers are returned with their disease name and MONDO id."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "identifiers": identifier_list_schema("Identifiers to check"),
                "identifierType": identifier_type_schema("Namespace of the identifiers")
            },
            "required": ["identifiers", "identifierType"]
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: Value) -> ToolResult<String> {
        let params: ValidateDiseaseIdsInput = serde_json::from_value(input)?;
        let kind: IdentifierType = params.identifier_type.parse()?;

        let request = xref_request(params.identifiers, kind, &[IdentifierType::Mondo])?;
        let batch = resolve(ctx, &request, kind).await?;

        let valid: Vec<ValidIdentifier<'_>> = batch
            .entries()
            .iter()
            .filter_map(|entry| {
                let record = entry.result.records().first()?;
                Some(ValidIdentifier {
                    identifier: &entry.identifier,
                    disease_id: record.id(),
                    disease_name: disease_name(record),
                    mondo_id: identifier_value(record, IdentifierType::Mondo).map(FieldValue::to_cell),
                })
            })
            .collect();
        let invalid = not_found(&batch);
        let errors = failures(&batch);

        let mut output = json!({
            "identifierType": kind,
            "total": batch.len(),
            "validCount": valid.len(),
            "invalidCount": invalid.len(),
            "validIdentifiers": valid,
            "invalidIdentifiers": invalid,
        });
        if !errors.is_empty() {
            output["errors"] = json!(errors);
        }

        Ok(serde_json::to_string_pretty(&output)?)
    }
}

// =============================================================================
// find_common_diseases
// =============================================================================

#[derive(Debug, Serialize)]
struct ListHit {
    list: String,
    identifier: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DiseaseOccurrences {
    disease_id: String,
    disease_name: Option<String>,
    identifiers: Vec<ListHit>,
}

/// Cross-list intersection tool.
pub struct FindCommonDiseasesTool;

#[async_trait::async_trait]
impl McpTool for FindCommonDiseasesTool {
    fn name(&self) -> &'static str {
        "find_common_diseases"
    }

    fn description(&self) -> &'static str {
        "Find diseases present in every one of several named identifier lists, e.g. \
         {\"omim_ids\": [...], \"orphanet_ids\": [...]}. The namespace of each list is \
         read from its name (omim, orphanet, mondo, doid, umls, mesh, icd10, icd11)."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "identifierLists": {
                    "type": "object",
                    "additionalProperties": {"type": "array", "items": {"type": "string"}},
                    "description": "Named identifier lists"
                }
            },
            "required": ["identifierLists"]
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: Value) -> ToolResult<String> {
        let params: FindCommonDiseasesInput = serde_json::from_value(input)?;
        if params.identifier_lists.is_empty() {
            return Err(ToolError::invalid_argument(
                "identifierLists",
                "at least one identifier list is required",
            ));
        }

        // Every list is validated before the first upstream call.
        let lists = params
            .identifier_lists
            .into_iter()
            .map(|(label, ids)| {
                let kind = IdentifierType::from_label(&label).ok_or_else(|| {
                    ToolError::invalid_argument(
                        "identifierLists",
                        format!("cannot determine identifier type from list name '{label}'"),
                    )
                })?;
                let ids: Vec<String> = serde_json::from_value(ids).map_err(|_| {
                    ToolError::invalid_argument(
                        "identifierLists",
                        format!("list '{label}' must be an array of strings"),
                    )
                })?;
                Ok((label, kind, xref_request(ids, kind, &[])?))
            })
            .collect::<ToolResult<Vec<_>>>()?;

        let mut diseases: Vec<DiseaseOccurrences> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut errors = Vec::new();

        for (label, kind, request) in &lists {
            let batch = resolve(ctx, request, *kind).await?;
            for entry in batch.entries() {
                if let UpstreamResult::TransportError { message, .. } = &entry.result {
                    errors.push(json!({"list": label, "identifier": entry.identifier, "error": message}));
                    continue;
                }
                let Some((record, id)) =
                    entry.result.records().first().and_then(|r| r.id().map(|id| (r, id)))
                else {
                    continue;
                };

                let slot = *index.entry(id.to_string()).or_insert_with(|| {
                    diseases.push(DiseaseOccurrences {
                        disease_id: id.to_string(),
                        disease_name: disease_name(record),
                        identifiers: Vec::new(),
                    });
                    diseases.len() - 1
                });
                diseases[slot]
                    .identifiers
                    .push(ListHit { list: label.clone(), identifier: entry.identifier.clone() });
            }
        }

        let total_unique = diseases.len();
        let common: Vec<DiseaseOccurrences> = diseases
            .into_iter()
            .filter(|d| lists.iter().all(|(label, ..)| d.identifiers.iter().any(|h| &h.list == label)))
            .collect();

        let mut output = json!({
            "inputLists": lists.iter().map(|(label, ..)| label).collect::<Vec<_>>(),
            "totalUniqueDiseases": total_unique,
            "commonDiseasesCount": common.len(),
            "commonDiseases": common,
        });
        if !errors.is_empty() {
            output["errors"] = json!(errors);
        }

        Ok(serde_json::to_string_pretty(&output)?)
    }
}
