//! Metadata tools: get_mydisease_metadata, get_available_fields.

use serde_json::{Map, Value, json};

use super::{McpTool, ToolContext};
use crate::error::ToolResult;

/// Field categories in output order, each with the name fragments that select it.
/// A field lands in the first category with a matching fragment; anything
/// unmatched is `basic_info`.
const FIELD_CATEGORIES: &[(&str, &[&str])] = &[
    ("identifiers", &["mondo", "omim", "orphanet", "doid", "umls", "mesh", "icd"]),
    ("genetic", &["gene", "variant", "causal"]),
    ("clinical", &["phenotype", "clinical", "treatment", "drug"]),
    ("epidemiology", &["prevalence", "incidence", "epidemiology"]),
    ("ontology", &["ontology", "parents", "children", "ancestors"]),
    ("sources", &["disgenet", "ctd", "kegg", "pharmgkb"]),
];

const FALLBACK_CATEGORY: &str = "basic_info";

/// Category for one field name.
#[must_use]
pub fn field_category(field: &str) -> &'static str {
    FIELD_CATEGORIES
        .iter()
        .find(|(_, fragments)| fragments.iter().any(|f| field.contains(f)))
        .map_or(FALLBACK_CATEGORY, |(name, _)| *name)
}

/// API metadata tool.
pub struct MetadataTool;

#[async_trait::async_trait]
impl McpTool for MetadataTool {
    fn name(&self) -> &'static str {
        "get_mydisease_metadata"
    }

    fn description(&self) -> &'static str {
        "Get metadata about the MyDisease.info API: build version, data sources and statistics."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, ctx: &ToolContext, _input: Value) -> ToolResult<String> {
        let metadata = ctx.client.metadata().await?;
        Ok(serde_json::to_string_pretty(&json!({ "metadata": metadata }))?)
    }
}

/// Field catalogue tool.
pub struct AvailableFieldsTool;

#[async_trait::async_trait]
impl McpTool for AvailableFieldsTool {
    fn name(&self) -> &'static str {
        "get_available_fields"
    }

    fn description(&self) -> &'static str {
        "List every field MyDisease.info can return, grouped into identifiers, genetic, \
         clinical, epidemiology, ontology, sources and basic_info."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, ctx: &ToolContext, _input: Value) -> ToolResult<String> {
        let catalogue = ctx.client.metadata_fields().await?;
        let names: Vec<&str> = catalogue
            .as_object()
            .map(|fields| fields.keys().map(String::as_str).collect())
            .unwrap_or_default();

        let mut categories = Map::new();
        for (name, _) in FIELD_CATEGORIES {
            categories.insert((*name).to_string(), json!([]));
        }
        categories.insert(FALLBACK_CATEGORY.to_string(), json!([]));

        for name in &names {
            if let Some(Value::Array(bucket)) = categories.get_mut(field_category(name)) {
                bucket.push(json!(name));
            }
        }

        tracing::debug!(fields = names.len(), "Categorised field catalogue");

        Ok(serde_json::to_string_pretty(&json!({
            "totalFields": names.len(),
            "fieldCategories": categories,
            "fields": catalogue,
        }))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_category() {
        assert_eq!(field_category("mondo.mondo"), "identifiers");
        assert_eq!(field_category("causal_gene.symbol"), "genetic");
        assert_eq!(field_category("hpo.phenotype_related_to_disease"), "clinical");
        assert_eq!(field_category("prevalence"), "epidemiology");
        assert_eq!(field_category("ctd.chemical_related_to_disease"), "sources");
        assert_eq!(field_category("name"), "basic_info");
    }

    #[test]
    fn test_first_matching_category_wins() {
        // "disgenet" contains "gene".
        assert_eq!(field_category("disgenet.xrefs"), "genetic");
    }
}
