//! Enumeration types for API and tool parameters.

use std::str::FromStr;

use serde::Serialize;

use crate::error::ToolError;

/// Biological axis a batch of identifiers is resolved along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    /// Gene symbols (e.g. `BRCA1`).
    Gene,
    /// Variant identifiers: dbSNP rsIDs or HGVS notation.
    Variant,
    /// Phenotype terms or HPO ids.
    Phenotype,
    /// Free-text disease names.
    Text,
    /// Disease ids. Matched exactly against `_id` unless explicit scopes are given.
    Id,
}

impl Dimension {
    /// All dimensions, in schema order.
    pub const ALL: [Self; 5] = [Self::Gene, Self::Variant, Self::Phenotype, Self::Text, Self::Id];

    /// Name as accepted in tool input.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gene => "gene",
            Self::Variant => "variant",
            Self::Phenotype => "phenotype",
            Self::Text => "text",
            Self::Id => "id",
        }
    }

    /// Default number of records kept per identifier.
    #[must_use]
    pub const fn default_limit(self) -> usize {
        match self {
            Self::Id => 1,
            _ => 10,
        }
    }
}

impl FromStr for Dimension {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                ToolError::invalid_argument(
                    "dimension",
                    format!("unknown dimension '{s}', expected one of: gene, variant, phenotype, text, id"),
                )
            })
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier namespace for cross-reference mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierType {
    /// MONDO ids (`MONDO:0007739`).
    Mondo,
    /// OMIM numbers.
    Omim,
    /// Orphanet ids.
    Orphanet,
    /// Disease Ontology ids.
    Doid,
    /// UMLS concept ids.
    Umls,
    /// MeSH ids.
    Mesh,
    /// ICD-10 codes.
    Icd10,
    /// ICD-11 codes.
    Icd11,
    /// HPO ids.
    Hp,
}

impl IdentifierType {
    /// All identifier types, in schema order.
    pub const ALL: [Self; 9] = [
        Self::Mondo,
        Self::Omim,
        Self::Orphanet,
        Self::Doid,
        Self::Umls,
        Self::Mesh,
        Self::Icd10,
        Self::Icd11,
        Self::Hp,
    ];

    /// Name as accepted in tool input.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mondo => "mondo",
            Self::Omim => "omim",
            Self::Orphanet => "orphanet",
            Self::Doid => "doid",
            Self::Umls => "umls",
            Self::Mesh => "mesh",
            Self::Icd10 => "icd10",
            Self::Icd11 => "icd11",
            Self::Hp => "hp",
        }
    }

    /// Upstream fields holding this identifier, most specific first.
    #[must_use]
    pub const fn fields(self) -> &'static [&'static str] {
        match self {
            Self::Mondo => &["mondo.mondo", "mondo.id"],
            Self::Omim => &["omim"],
            Self::Orphanet => &["orphanet.id", "orphanet.orphanet"],
            Self::Doid => &["disease_ontology.doid"],
            Self::Umls => &["umls.cui"],
            Self::Mesh => &["mesh"],
            Self::Icd10 => &["icd10"],
            Self::Icd11 => &["icd11"],
            Self::Hp => &["hpo.hpo_id"],
        }
    }

    /// Comma-joined [`fields`](Self::fields), usable as `POST /query` scopes.
    #[must_use]
    pub fn scopes(self) -> String {
        self.fields().join(",")
    }

    /// Guess the type from a list label such as `omim_ids` or `Orphanet codes`.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.to_ascii_lowercase();
        [
            ("omim", Self::Omim),
            ("orphanet", Self::Orphanet),
            ("mondo", Self::Mondo),
            ("doid", Self::Doid),
            ("disease_ontology", Self::Doid),
            ("umls", Self::Umls),
            ("mesh", Self::Mesh),
            ("icd10", Self::Icd10),
            ("icd11", Self::Icd11),
        ]
        .into_iter()
        .find(|(needle, _)| label.contains(needle))
        .map(|(_, kind)| kind)
    }
}

impl FromStr for IdentifierType {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                ToolError::invalid_argument(
                    "identifierType",
                    format!(
                        "unsupported identifier type '{s}', expected one of: \
                         mondo, omim, orphanet, doid, umls, mesh, icd10, icd11, hp"
                    ),
                )
            })
    }
}

impl std::fmt::Display for IdentifierType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output format for batch results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Tab-separated values.
    Tsv,
    /// Comma-separated values.
    Csv,
    /// JSON array, one object per identifier.
    Json,
    /// Markdown table.
    Markdown,
}

impl ExportFormat {
    /// All formats, in schema order.
    pub const ALL: [Self; 4] = [Self::Tsv, Self::Csv, Self::Json, Self::Markdown];

    /// Name as accepted in tool input.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tsv => "tsv",
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Markdown => "markdown",
        }
    }

    /// Get the MIME type for this format.
    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Tsv => "text/tab-separated-values",
            Self::Csv => "text/csv",
            Self::Json => "application/json",
            Self::Markdown => "text/markdown",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                ToolError::invalid_argument(
                    "format",
                    format!("unsupported format '{s}', expected one of: tsv, csv, json, markdown"),
                )
            })
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_parse() {
        assert_eq!("gene".parse::<Dimension>().unwrap(), Dimension::Gene);
        assert_eq!("ID".parse::<Dimension>().unwrap(), Dimension::Id);
        assert_eq!(" phenotype ".parse::<Dimension>().unwrap(), Dimension::Phenotype);
    }

    #[test]
    fn test_unknown_dimension_names_value() {
        let err = "protein".parse::<Dimension>().unwrap_err();
        assert!(matches!(err, ToolError::InvalidArgument { .. }));
        assert!(err.to_string().contains("protein"));
    }

    #[test]
    fn test_unknown_format_names_value() {
        let err = "xml".parse::<ExportFormat>().unwrap_err();
        assert!(matches!(err, ToolError::InvalidArgument { ref field, .. } if field == "format"));
        assert!(err.to_string().contains("'xml'"));
    }

    #[test]
    fn test_format_roundtrip_names() {
        for format in ExportFormat::ALL {
            assert_eq!(format.as_str().parse::<ExportFormat>().unwrap(), format);
        }
        assert_eq!(ExportFormat::Csv.mime_type(), "text/csv");
    }

    #[test]
    fn test_identifier_type_scopes() {
        assert_eq!(IdentifierType::Orphanet.scopes(), "orphanet.id,orphanet.orphanet");
        assert_eq!("UMLS".parse::<IdentifierType>().unwrap(), IdentifierType::Umls);
        let err = "kegg".parse::<IdentifierType>().unwrap_err();
        assert!(err.to_string().contains("'kegg'"));
    }

    #[test]
    fn test_identifier_type_from_label() {
        assert_eq!(IdentifierType::from_label("omim_ids"), Some(IdentifierType::Omim));
        assert_eq!(IdentifierType::from_label("Disease_Ontology"), Some(IdentifierType::Doid));
        assert_eq!(IdentifierType::from_label("ICD10 codes"), Some(IdentifierType::Icd10));
        assert_eq!(IdentifierType::from_label("my list"), None);
    }

    #[test]
    fn test_default_limit() {
        assert_eq!(Dimension::Id.default_limit(), 1);
        assert_eq!(Dimension::Gene.default_limit(), 10);
    }
}
