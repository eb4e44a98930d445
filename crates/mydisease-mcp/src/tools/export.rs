//! Export tools: export_disease_list, export_disease_comparison,
//! export_gene_disease_matrix, export_phenotype_profile.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::{Value, json};

use super::batch::owned_fields;
use super::{BatchCall, McpTool, ToolContext, fields_schema, format_schema, identifier_list_schema};
use crate::config::{api, fields};
use crate::dispatch::DispatchOptions;
use crate::error::{ClientError, ToolError, ToolResult};
use crate::formatters::{self, IDENTIFIER_COLUMN, STATUS_COLUMN, Table};
use crate::models::{
    BatchEntry, Dimension, ExportDiseaseComparisonInput, ExportDiseaseListInput, ExportFormat,
    ExportGeneDiseaseMatrixInput, ExportPhenotypeProfileInput, FieldValue, QueryRequest, Record,
    ResultStatus, validate_identifier_count,
};

fn parse_format(format: Option<&str>, default: ExportFormat) -> ToolResult<ExportFormat> {
    format.map_or(Ok(default), str::parse)
}

/// Non-empty cell texts of a field, one per list item.
fn texts(record: &Record, field: &str) -> Vec<String> {
    match record.get(field) {
        Some(FieldValue::List(items)) => {
            items.iter().map(FieldValue::to_cell).filter(|s| !s.is_empty()).collect()
        }
        Some(value) => Some(value.to_cell()).filter(|s| !s.is_empty()).into_iter().collect(),
        None => Vec::new(),
    }
}

/// Disease list export tool.
pub struct ExportDiseaseListTool;

#[async_trait::async_trait]
impl McpTool for ExportDiseaseListTool {
    fn name(&self) -> &'static str {
        "export_disease_list"
    }

    fn description(&self) -> &'static str {
        "Export diseases as a table for spreadsheets or reports. Formats: tsv (default), \
         csv, json, markdown. Unknown ids are kept as not_found rows."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "diseaseIds": identifier_list_schema("Disease IDs to export"),
                "format": format_schema(ExportFormat::Tsv),
                "fields": fields_schema(
                    "Columns to export (default: _id, name, mondo.mondo, omim, orphanet.id, \
                     inheritance.inheritance_type, prevalence)"
                )
            },
            "required": ["diseaseIds"]
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: Value) -> ToolResult<String> {
        let params: ExportDiseaseListInput = serde_json::from_value(input)?;

        BatchCall {
            identifiers: params.disease_ids,
            dimension: Dimension::Id,
            fields: Some(params.fields.unwrap_or_else(|| owned_fields(fields::EXPORT_DEFAULT))),
            scopes: None,
            limit: None,
            chunk_size: None,
            format: params.format,
            default_format: ExportFormat::Tsv,
        }
        .run(ctx, self.name())
        .await
    }
}

// =============================================================================
// export_disease_comparison
// =============================================================================

/// Phenotypes listed per disease in a comparison.
const MAIN_PHENOTYPES: usize = 5;

/// Upstream fields an aspect is derived from. Unknown aspects are plain fields.
fn aspect_sources(aspect: &str) -> &[&str] {
    match aspect {
        "inheritance" => &["inheritance.inheritance_type"],
        "genes" => &["gene.symbol", "causal_gene.symbol"],
        "prevalence" => &["prevalence", "orphanet.prevalence"],
        "age_of_onset" => &["age_of_onset", "orphanet.age_of_onset"],
        "main_phenotypes" => &["phenotype_related_to_disease.hpo_phenotype"],
        _ => &[],
    }
}

fn first_populated(record: &Record, candidates: &[&str]) -> String {
    candidates.iter().map(|f| record.cell(f)).find(|c| !c.is_empty()).unwrap_or_default()
}

fn aspect_cell(record: &Record, aspect: &str) -> String {
    match aspect {
        "inheritance" => texts(record, "inheritance.inheritance_type").join(", "),
        "genes" => {
            let mut genes: Vec<String> = Vec::new();
            for gene in texts(record, "gene.symbol").into_iter().chain(texts(record, "causal_gene.symbol")) {
                if !genes.contains(&gene) {
                    genes.push(gene);
                }
            }
            genes.join(", ")
        }
        "prevalence" => first_populated(record, &["orphanet.prevalence.prevalence_class", "prevalence"]),
        "age_of_onset" => first_populated(record, &["orphanet.age_of_onset.label", "age_of_onset"]),
        "main_phenotypes" => texts(record, "phenotype_related_to_disease.hpo_phenotype")
            .into_iter()
            .take(MAIN_PHENOTYPES)
            .collect::<Vec<_>>()
            .join("; "),
        other => record.cell(other),
    }
}

fn comparison_table(entries: &[BatchEntry], aspects: &[String]) -> Table {
    let mut header = vec![
        IDENTIFIER_COLUMN.to_string(),
        STATUS_COLUMN.to_string(),
        "_id".to_string(),
        "name".to_string(),
    ];
    header.extend(aspects.iter().cloned());

    let rows = entries
        .iter()
        .map(|entry| {
            let mut row = vec![entry.identifier.clone(), entry.result.status().as_str().to_string()];
            match entry.result.records().first() {
                Some(record) => {
                    row.push(record.id().unwrap_or_default().to_string());
                    row.push(record.cell("name"));
                    row.extend(aspects.iter().map(|aspect| aspect_cell(record, aspect)));
                }
                None => row.resize(header.len(), String::new()),
            }
            row
        })
        .collect();

    Table { header, rows }
}

/// Side-by-side disease comparison tool.
pub struct ExportDiseaseComparisonTool;

#[async_trait::async_trait]
impl McpTool for ExportDiseaseComparisonTool {
    fn name(&self) -> &'static str {
        "export_disease_comparison"
    }

    fn description(&self) -> &'static str {
        "Compare diseases side by side, one row per disease id. Aspects: inheritance, genes, \
         prevalence, age_of_onset, main_phenotypes, or any field name. Formats: markdown \
         (default), csv, tsv, json."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "diseaseIds": identifier_list_schema("Disease IDs to compare"),
                "comparisonFields": fields_schema(
                    "Aspects to compare (default: inheritance, genes, prevalence, age_of_onset, \
                     main_phenotypes)"
                ),
                "format": format_schema(ExportFormat::Markdown)
            },
            "required": ["diseaseIds"]
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: Value) -> ToolResult<String> {
        let params: ExportDiseaseComparisonInput = serde_json::from_value(input)?;
        let format = parse_format(params.format.as_deref(), ExportFormat::Markdown)?;

        let mut aspects: Vec<String> = Vec::new();
        for aspect in params.comparison_fields.unwrap_or_else(|| owned_fields(fields::COMPARISON_DEFAULT)) {
            if aspect != "name" && aspect != "_id" && !aspects.contains(&aspect) {
                aspects.push(aspect);
            }
        }

        let mut upstream_fields = vec!["_id".to_string(), "name".to_string()];
        for aspect in &aspects {
            let sources = aspect_sources(aspect);
            let sources = if sources.is_empty() { vec![aspect.as_str()] } else { sources.to_vec() };
            for field in sources {
                if !upstream_fields.iter().any(|f| f == field) {
                    upstream_fields.push(field.to_string());
                }
            }
        }

        let request =
            QueryRequest::new(params.disease_ids, Dimension::Id)?.with_fields(Some(upstream_fields));
        tracing::info!(diseases = request.identifiers().len(), aspects = aspects.len(), %format, "Comparing diseases");
        let batch = ctx.dispatcher.dispatch(&request, DispatchOptions::default()).await?;

        formatters::render_table(&comparison_table(batch.entries(), &aspects), format)
    }
}

// =============================================================================
// export_gene_disease_matrix
// =============================================================================

/// Scopes used to discover diseases for the matrix genes.
const MATRIX_SCOPES: &str = "gene.symbol,causal_gene.symbol";

/// Diseases kept per gene during discovery.
const DISCOVERY_LIMIT: usize = 100;

/// Matrix cell: 0 no association, 1 associated, 2 causal.
fn association_level(gene: &str, associated: &[String], causal: &[String]) -> &'static str {
    if causal.iter().any(|g| g == gene) {
        "2"
    } else if associated.iter().any(|g| g == gene) {
        "1"
    } else {
        "0"
    }
}

fn matrix_header(genes: &[String]) -> Vec<String> {
    let mut header = vec![IDENTIFIER_COLUMN.to_string(), STATUS_COLUMN.to_string(), "name".to_string()];
    header.extend(genes.iter().cloned());
    header
}

fn matrix_row(entry: &BatchEntry, genes: &[String]) -> Vec<String> {
    let mut row = vec![entry.identifier.clone(), entry.result.status().as_str().to_string()];
    match entry.result.records().first() {
        Some(record) => {
            let associated = texts(record, "gene.symbol");
            let causal = texts(record, "causal_gene.symbol");
            row.push(record.cell("name"));
            row.extend(genes.iter().map(|g| association_level(g, &associated, &causal).to_string()));
        }
        None => row.resize(genes.len() + 3, String::new()),
    }
    row
}

/// Disease ids associated with any of `genes`, in first-seen order.
async fn discover_diseases(ctx: &ToolContext, genes: &[String]) -> ToolResult<Vec<String>> {
    let request = QueryRequest::new(genes.to_vec(), Dimension::Gene)?
        .with_scopes(MATRIX_SCOPES)
        .with_fields(Some(vec!["_id".to_string()]))
        .with_limit(DISCOVERY_LIMIT);
    let batch = ctx.dispatcher.dispatch(&request, DispatchOptions::default()).await?;

    let failed = batch.count(ResultStatus::Error);
    if failed > 0 {
        tracing::warn!(failed, genes = genes.len(), "Some gene lookups failed; matrix covers the rest");
    }

    let mut seen = HashSet::new();
    Ok(batch
        .entries()
        .iter()
        .flat_map(|e| e.result.records())
        .filter_map(Record::id)
        .filter(|id| seen.insert(*id))
        .map(str::to_string)
        .collect())
}

/// Gene by disease association matrix tool.
pub struct ExportGeneDiseaseMatrixTool;

#[async_trait::async_trait]
impl McpTool for ExportGeneDiseaseMatrixTool {
    fn name(&self) -> &'static str {
        "export_gene_disease_matrix"
    }

    fn description(&self) -> &'static str {
        "Export a gene by disease association matrix: one row per disease, one column per \
         gene, cells 0 (no association), 1 (associated) or 2 (causal). Without a disease \
         list, the diseases linked to the genes are discovered first. Formats: csv (default), \
         tsv, json, markdown."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "geneList": identifier_list_schema("Gene symbols, one column each"),
                "diseaseList": identifier_list_schema("Disease IDs, one row each (optional)"),
                "format": format_schema(ExportFormat::Csv)
            },
            "required": ["geneList"]
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: Value) -> ToolResult<String> {
        let params: ExportGeneDiseaseMatrixInput = serde_json::from_value(input)?;
        let format = parse_format(params.format.as_deref(), ExportFormat::Csv)?;
        let genes = params.gene_list;
        validate_identifier_count(genes.len())?;
        if let Some(diseases) = &params.disease_list {
            validate_identifier_count(diseases.len())?;
        }

        let diseases = match params.disease_list {
            Some(diseases) => diseases,
            None => discover_diseases(ctx, &genes).await?,
        };
        tracing::info!(genes = genes.len(), diseases = diseases.len(), %format, "Building gene-disease matrix");

        let mut table = Table { header: matrix_header(&genes), rows: Vec::new() };
        for chunk in diseases.chunks(api::MAX_IDENTIFIERS) {
            let request = QueryRequest::new(chunk.to_vec(), Dimension::Id)?
                .with_fields(Some(owned_fields(fields::MATRIX)));
            let batch = ctx.dispatcher.dispatch(&request, DispatchOptions::default()).await?;
            table.rows.extend(batch.entries().iter().map(|entry| matrix_row(entry, &genes)));
        }

        formatters::render_table(&table, format)
    }
}

// =============================================================================
// export_phenotype_profile
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct PhenotypeEntry {
    hpo_id: Option<String>,
    phenotype: Option<String>,
    frequency: Option<String>,
    onset: Option<String>,
}

#[derive(Debug, Serialize)]
struct FrequencyGroup {
    frequency: String,
    phenotypes: Vec<PhenotypeEntry>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PhenotypeProfile {
    disease_id: String,
    disease_name: Option<String>,
    inheritance: Vec<String>,
    age_of_onset: Option<String>,
    prevalence: Option<String>,
    phenotypes: Vec<PhenotypeEntry>,
    by_frequency: Vec<FrequencyGroup>,
}

const UNKNOWN: &str = "Unknown";

/// A value that may be a single object or an array of them.
fn items(value: Option<&Value>) -> std::slice::Iter<'_, Value> {
    match value {
        Some(Value::Array(items)) => items.iter(),
        Some(value) => std::slice::from_ref(value).iter(),
        None => Default::default(),
    }
}

/// Plain text of a scalar or list; `None` when empty.
fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()).filter(|s| !s.is_empty()),
        Value::Array(values) => {
            let parts: Vec<String> = values.iter().filter_map(|v| text(Some(v))).collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        other => Some(other.to_string()),
    }
}

impl PhenotypeProfile {
    fn from_document(disease_id: &str, document: &Value) -> Self {
        let phenotypes: Vec<PhenotypeEntry> = items(document.get("phenotype_related_to_disease"))
            .filter(|p| p.is_object())
            .map(|p| PhenotypeEntry {
                hpo_id: text(p.get("hpo_id")),
                phenotype: text(p.get("hpo_phenotype")),
                frequency: text(p.get("frequency")),
                onset: text(p.get("onset")),
            })
            .collect();

        let mut by_frequency: Vec<FrequencyGroup> = Vec::new();
        for phenotype in &phenotypes {
            let frequency = phenotype.frequency.as_deref().unwrap_or(UNKNOWN);
            match by_frequency.iter_mut().find(|g| g.frequency == frequency) {
                Some(group) => group.phenotypes.push(phenotype.clone()),
                None => by_frequency.push(FrequencyGroup {
                    frequency: frequency.to_string(),
                    phenotypes: vec![phenotype.clone()],
                }),
            }
        }

        Self {
            disease_id: disease_id.to_string(),
            disease_name: text(document.get("name")),
            inheritance: items(document.get("inheritance"))
                .filter_map(|i| text(i.get("inheritance_type")))
                .collect(),
            age_of_onset: text(document.get("age_of_onset")),
            prevalence: text(document.get("prevalence")),
            phenotypes,
            by_frequency,
        }
    }

    fn to_markdown(&self) -> String {
        let mut out = format!(
            "# Phenotype Profile: {}\n\n## Basic Information\n",
            self.disease_name.as_deref().unwrap_or(&self.disease_id)
        );
        let inheritance =
            if self.inheritance.is_empty() { UNKNOWN.to_string() } else { self.inheritance.join(", ") };
        out.push_str(&format!("- **Inheritance**: {inheritance}\n"));
        out.push_str(&format!("- **Age of Onset**: {}\n", self.age_of_onset.as_deref().unwrap_or(UNKNOWN)));
        out.push_str(&format!("- **Prevalence**: {}\n", self.prevalence.as_deref().unwrap_or(UNKNOWN)));
        out.push_str("\n## Clinical Features by Frequency\n");

        for group in &self.by_frequency {
            out.push_str(&format!("\n### {}\n", group.frequency));
            for phenotype in &group.phenotypes {
                match (&phenotype.phenotype, &phenotype.hpo_id) {
                    (Some(name), Some(id)) => out.push_str(&format!("- {name} ({id})\n")),
                    (Some(label), None) | (None, Some(label)) => out.push_str(&format!("- {label}\n")),
                    (None, None) => {}
                }
            }
        }
        out
    }
}

/// Phenotype profile tool.
pub struct ExportPhenotypeProfileTool;

#[async_trait::async_trait]
impl McpTool for ExportPhenotypeProfileTool {
    fn name(&self) -> &'static str {
        "export_phenotype_profile"
    }

    fn description(&self) -> &'static str {
        "Export the phenotype profile of one disease: inheritance, onset, prevalence and its \
         HPO phenotypes grouped by frequency. Formats: json (default), markdown."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "diseaseId": {
                    "type": "string",
                    "description": "MyDisease document id (e.g. 'MONDO:0007739')"
                },
                "format": {
                    "type": "string",
                    "enum": [ExportFormat::Json.as_str(), ExportFormat::Markdown.as_str()],
                    "default": ExportFormat::Json.as_str(),
                    "description": "Output format"
                }
            },
            "required": ["diseaseId"]
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: Value) -> ToolResult<String> {
        let params: ExportPhenotypeProfileInput = serde_json::from_value(input)?;
        let format = parse_format(params.format.as_deref(), ExportFormat::Json)?;
        if !matches!(format, ExportFormat::Json | ExportFormat::Markdown) {
            return Err(ToolError::invalid_argument(
                "format",
                format!("unsupported format '{format}' for a phenotype profile, expected json or markdown"),
            ));
        }

        let disease_id = params.disease_id.trim();
        if disease_id.is_empty() {
            return Err(ToolError::invalid_argument("diseaseId", "disease id must not be empty"));
        }

        let document = ctx
            .client
            .get_disease(disease_id, Some(&fields::PHENOTYPE_PROFILE.join(",")))
            .await
            .map_err(|e| match e {
                ClientError::NotFound { .. } => ClientError::not_found(format!("disease '{disease_id}'")),
                other => other,
            })?;

        let profile = PhenotypeProfile::from_document(disease_id, &document);
        match format {
            ExportFormat::Markdown => Ok(profile.to_markdown()),
            _ => Ok(serde_json::to_string_pretty(&profile)?),
        }
    }
}
