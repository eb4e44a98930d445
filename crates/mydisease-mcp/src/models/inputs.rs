//! Input models for MCP tool parameters.
//!
//! Names are camelCase in the published schemas; the snake_case names used by
//! earlier MyDisease MCP clients are accepted as aliases.

use serde::{Deserialize, Deserializer, Serialize};

/// Input for free-text disease search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchDiseaseInput {
    /// Query string (e.g. "Alzheimer", "OMIM:104300", "memory loss").
    pub q: String,

    /// Fields to return.
    #[serde(default, deserialize_with = "field_list")]
    pub fields: Option<Vec<String>>,

    /// Number of hits to return.
    #[serde(default = "default_search_size")]
    pub size: u32,

    /// Offset for pagination.
    #[serde(default, alias = "from_")]
    pub from: Option<u32>,

    /// Sort order, e.g. "-_score".
    #[serde(default)]
    pub sort: Option<String>,
}

fn default_search_size() -> u32 {
    10
}

/// Input for field-targeted search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchByFieldInput {
    /// Field/value pairs, e.g. `{"mondo.mondo": "MONDO:0007739"}`.
    #[serde(alias = "field_queries")]
    pub field_queries: serde_json::Map<String, serde_json::Value>,

    /// Boolean operator joining the pairs: AND or OR.
    #[serde(default = "default_operator")]
    pub operator: String,

    /// Fields to return.
    #[serde(default, deserialize_with = "field_list")]
    pub fields: Option<Vec<String>>,

    /// Number of hits to return.
    #[serde(default = "default_search_size")]
    pub size: u32,
}

fn default_operator() -> String {
    "AND".to_string()
}

/// Input for a single disease lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetDiseaseByIdInput {
    /// MyDisease document id (e.g. "MONDO:0007739").
    #[serde(alias = "disease_id")]
    pub disease_id: String,

    /// Fields to return (default: all).
    #[serde(default, deserialize_with = "field_list")]
    pub fields: Option<Vec<String>>,
}

/// Input for the generic batch lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchQueryInput {
    /// Identifiers to resolve, in output order.
    #[serde(alias = "disease_ids", alias = "ids")]
    pub identifiers: Vec<String>,

    /// Search dimension: gene, variant, phenotype, text, or id.
    #[serde(default = "default_dimension")]
    pub dimension: String,

    /// Fields to return and render.
    #[serde(default, deserialize_with = "field_list")]
    pub fields: Option<Vec<String>>,

    /// Upstream fields to search, comma-separated. Defaults to the dimension's
    /// own scopes; for `id` the cross-reference fields.
    #[serde(default)]
    pub scopes: Option<String>,

    /// Records kept per identifier.
    #[serde(default)]
    pub limit: Option<usize>,

    /// Identifiers per upstream call (capped at the upstream maximum).
    #[serde(default, alias = "chunk_size")]
    pub chunk_size: Option<usize>,

    /// Output format: tsv, csv, json, or markdown.
    #[serde(default)]
    pub format: Option<String>,
}

fn default_dimension() -> String {
    "id".to_string()
}

/// Input for batch retrieval by disease id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchGetInput {
    /// Disease ids.
    #[serde(alias = "disease_ids")]
    pub disease_ids: Vec<String>,

    /// Fields to return and render.
    #[serde(default, deserialize_with = "field_list")]
    pub fields: Option<Vec<String>>,

    /// Output format: tsv, csv, json, or markdown.
    #[serde(default)]
    pub format: Option<String>,
}

/// Input for disease list export.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDiseaseListInput {
    /// Disease ids to export.
    #[serde(alias = "disease_ids")]
    pub disease_ids: Vec<String>,

    /// Export format (default tsv).
    #[serde(default)]
    pub format: Option<String>,

    /// Columns to export.
    #[serde(default, deserialize_with = "field_list")]
    pub fields: Option<Vec<String>>,
}

/// Input for gene-to-disease lookups.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneLookupInput {
    /// Gene symbols (e.g. "BRCA1", "TP53").
    #[serde(alias = "gene_symbols")]
    pub gene_symbols: Vec<String>,

    /// Shared lookup options.
    #[serde(flatten)]
    pub options: LookupOptions,
}

/// Input for variant-to-disease lookups.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantLookupInput {
    /// rsIDs or HGVS notations.
    #[serde(alias = "variant_ids")]
    pub variant_ids: Vec<String>,

    /// Shared lookup options.
    #[serde(flatten)]
    pub options: LookupOptions,
}

/// Input for phenotype-to-disease lookups.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhenotypeLookupInput {
    /// Phenotype terms or HPO ids (e.g. "Seizure", "HP:0001250").
    pub phenotypes: Vec<String>,

    /// Shared lookup options.
    #[serde(flatten)]
    pub options: LookupOptions,
}

/// Options shared by the per-dimension lookup tools.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupOptions {
    /// Fields to return and render.
    #[serde(default, deserialize_with = "field_list")]
    pub fields: Option<Vec<String>>,

    /// Diseases kept per identifier.
    #[serde(default, alias = "size")]
    pub limit: Option<usize>,

    /// Output format: tsv, csv, json, or markdown.
    #[serde(default)]
    pub format: Option<String>,
}

/// Input for cross-reference id mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapDiseaseIdsInput {
    /// Identifiers to map.
    #[serde(alias = "input_ids", alias = "identifiers")]
    pub input_ids: Vec<String>,

    /// Namespace of the input identifiers (e.g. "omim").
    #[serde(alias = "from_type")]
    pub from_type: String,

    /// Namespaces to map to.
    #[serde(alias = "to_types")]
    pub to_types: Vec<String>,

    /// List identifiers without a match in the output.
    #[serde(default = "default_true", alias = "missing_ok")]
    pub missing_ok: bool,
}

fn default_true() -> bool {
    true
}

/// Input for identifier validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateDiseaseIdsInput {
    /// Identifiers to check.
    pub identifiers: Vec<String>,

    /// Namespace of the identifiers.
    #[serde(alias = "identifier_type")]
    pub identifier_type: String,
}

/// Input for the cross-list intersection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindCommonDiseasesInput {
    /// Named identifier lists, e.g. `{"omim_ids": [...], "orphanet_ids": [...]}`.
    /// The namespace of each list is read from its name.
    #[serde(alias = "identifier_lists")]
    pub identifier_lists: serde_json::Map<String, serde_json::Value>,
}

/// Input for the side-by-side disease comparison export.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDiseaseComparisonInput {
    /// Disease ids to compare.
    #[serde(alias = "disease_ids")]
    pub disease_ids: Vec<String>,

    /// Aspects to compare (default: name, inheritance, genes, prevalence,
    /// age_of_onset, main_phenotypes).
    #[serde(default, alias = "comparison_fields", deserialize_with = "field_list")]
    pub comparison_fields: Option<Vec<String>>,

    /// Output format (default markdown).
    #[serde(default)]
    pub format: Option<String>,
}

/// Input for the gene by disease association matrix.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportGeneDiseaseMatrixInput {
    /// Gene symbols, one matrix column each.
    #[serde(alias = "gene_list", alias = "geneSymbols")]
    pub gene_list: Vec<String>,

    /// Disease ids, one matrix row each. Discovered from the genes when absent.
    #[serde(default, alias = "disease_list")]
    pub disease_list: Option<Vec<String>>,

    /// Output format (default csv).
    #[serde(default)]
    pub format: Option<String>,
}

/// Input for the phenotype profile export.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportPhenotypeProfileInput {
    /// MyDisease document id.
    #[serde(alias = "disease_id")]
    pub disease_id: String,

    /// Output format: json (default) or markdown.
    #[serde(default)]
    pub format: Option<String>,
}

/// Accept a field list as either a JSON array or a comma-separated string.
fn field_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        List(Vec<String>),
        Joined(String),
    }

    let fields = match Option::<Raw>::deserialize(deserializer)? {
        None => return Ok(None),
        Some(Raw::List(list)) => list,
        Some(Raw::Joined(joined)) => joined.split(',').map(str::to_string).collect(),
    };

    let fields: Vec<String> = fields
        .into_iter()
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
        .collect();

    Ok((!fields.is_empty()).then_some(fields))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_field_list_accepts_string_and_array() {
        let a: BatchQueryInput =
            serde_json::from_value(json!({"identifiers": ["x"], "fields": "_id, name"})).unwrap();
        let b: BatchQueryInput =
            serde_json::from_value(json!({"identifiers": ["x"], "fields": ["_id", "name"]}))
                .unwrap();
        assert_eq!(a.fields, b.fields);
        assert_eq!(a.fields.unwrap(), vec!["_id", "name"]);
    }

    #[test]
    fn test_snake_case_aliases() {
        let input: BatchGetInput =
            serde_json::from_value(json!({"disease_ids": ["MONDO:0007739"]})).unwrap();
        assert_eq!(input.disease_ids.len(), 1);
        assert!(input.fields.is_none());

        let input: BatchQueryInput = serde_json::from_value(
            json!({"ids": ["a"], "chunk_size": 2, "dimension": "gene"}),
        )
        .unwrap();
        assert_eq!(input.chunk_size, Some(2));
    }

    #[test]
    fn test_lookup_options_flatten() {
        let input: GeneLookupInput = serde_json::from_value(
            json!({"geneSymbols": ["BRCA1"], "limit": 3, "format": "csv"}),
        )
        .unwrap();
        assert_eq!(input.options.limit, Some(3));
        assert_eq!(input.options.format.as_deref(), Some("csv"));
    }

    #[test]
    fn test_search_defaults() {
        let input: SearchDiseaseInput = serde_json::from_value(json!({"q": "alzheimer"})).unwrap();
        assert_eq!(input.size, 10);
        assert!(input.from.is_none());
    }

    #[test]
    fn test_mapping_inputs() {
        let input: MapDiseaseIdsInput = serde_json::from_value(
            json!({"input_ids": ["104300"], "from_type": "omim", "to_types": ["mondo"]}),
        )
        .unwrap();
        assert!(input.missing_ok);
        assert_eq!(input.to_types, vec!["mondo"]);

        let input: ExportDiseaseComparisonInput = serde_json::from_value(
            json!({"diseaseIds": ["MONDO:1"], "comparisonFields": "genes, prevalence"}),
        )
        .unwrap();
        assert_eq!(input.comparison_fields.unwrap(), vec!["genes", "prevalence"]);
    }

    #[test]
    fn test_blank_field_list_is_none() {
        let input: ExportDiseaseListInput =
            serde_json::from_value(json!({"diseaseIds": ["a"], "fields": " , "})).unwrap();
        assert!(input.fields.is_none());
    }
}
