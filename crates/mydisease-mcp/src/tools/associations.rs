//! Association tools: diseases linked to genes, variants and phenotypes.
//!
//! All three are batch lookups pinned to one dimension; they differ only in
//! the argument name and the default fields.

use serde_json::{Value, json};

use super::batch::owned_fields;
use super::{BatchCall, McpTool, ToolContext, fields_schema, format_schema, identifier_list_schema};
use crate::config::fields;
use crate::error::ToolResult;
use crate::models::{
    Dimension, ExportFormat, GeneLookupInput, LookupOptions, PhenotypeLookupInput,
    VariantLookupInput,
};

fn lookup_schema(list_name: &str, list_description: &str, default_fields: &[&str]) -> Value {
    let mut properties = serde_json::Map::new();
    properties.insert(list_name.to_string(), identifier_list_schema(list_description));
    properties.insert(
        "fields".to_string(),
        fields_schema(&format!("Fields to return (default: {})", default_fields.join(", "))),
    );
    properties.insert(
        "limit".to_string(),
        json!({
            "type": "integer",
            "minimum": 1,
            "default": Dimension::Gene.default_limit(),
            "description": "Diseases kept per identifier"
        }),
    );
    properties.insert("format".to_string(), format_schema(ExportFormat::Json));

    json!({
        "type": "object",
        "properties": properties,
        "required": [list_name]
    })
}

fn lookup(identifiers: Vec<String>, dimension: Dimension, options: LookupOptions, default_fields: &[&str]) -> BatchCall {
    BatchCall {
        identifiers,
        dimension,
        fields: Some(options.fields.unwrap_or_else(|| owned_fields(default_fields))),
        scopes: None,
        limit: options.limit,
        chunk_size: None,
        format: options.format,
        default_format: ExportFormat::Json,
    }
}

/// Gene-to-disease lookup tool.
pub struct DiseasesByGeneTool;

#[async_trait::async_trait]
impl McpTool for DiseasesByGeneTool {
    fn name(&self) -> &'static str {
        "get_diseases_by_gene"
    }

    fn description(&self) -> &'static str {
        "Find diseases associated with each of up to 1000 gene symbols (e.g. BRCA1, TP53)."
    }

    fn input_schema(&self) -> Value {
        lookup_schema("geneSymbols", "Gene symbols", fields::GENE)
    }

    async fn execute(&self, ctx: &ToolContext, input: Value) -> ToolResult<String> {
        let params: GeneLookupInput = serde_json::from_value(input)?;
        lookup(params.gene_symbols, Dimension::Gene, params.options, fields::GENE)
            .run(ctx, self.name())
            .await
    }
}

/// Variant-to-disease lookup tool.
pub struct DiseasesByVariantTool;

#[async_trait::async_trait]
impl McpTool for DiseasesByVariantTool {
    fn name(&self) -> &'static str {
        "get_diseases_by_variant"
    }

    fn description(&self) -> &'static str {
        "Find diseases associated with each of up to 1000 variants, given as rsIDs \
         (rs80357906) or HGVS notation."
    }

    fn input_schema(&self) -> Value {
        lookup_schema("variantIds", "rsIDs or HGVS notations", fields::VARIANT)
    }

    async fn execute(&self, ctx: &ToolContext, input: Value) -> ToolResult<String> {
        let params: VariantLookupInput = serde_json::from_value(input)?;
        lookup(params.variant_ids, Dimension::Variant, params.options, fields::VARIANT)
            .run(ctx, self.name())
            .await
    }
}

/// Phenotype-to-disease lookup tool.
pub struct DiseasesByPhenotypeTool;

#[async_trait::async_trait]
impl McpTool for DiseasesByPhenotypeTool {
    fn name(&self) -> &'static str {
        "search_by_phenotype"
    }

    fn description(&self) -> &'static str {
        "Find diseases presenting each of up to 1000 phenotypes, given as HPO ids \
         (HP:0001250) or terms (Seizure)."
    }

    fn input_schema(&self) -> Value {
        lookup_schema("phenotypes", "HPO ids or phenotype terms", fields::PHENOTYPE)
    }

    async fn execute(&self, ctx: &ToolContext, input: Value) -> ToolResult<String> {
        let params: PhenotypeLookupInput = serde_json::from_value(input)?;
        lookup(params.phenotypes, Dimension::Phenotype, params.options, fields::PHENOTYPE)
            .run(ctx, self.name())
            .await
    }
}
