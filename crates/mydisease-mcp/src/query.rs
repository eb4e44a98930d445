//! Query translation: typed tool arguments to upstream requests.
//!
//! Every batch request maps onto one of two upstream batch endpoints:
//! `POST /disease` for exact document ids and `POST /query` with `scopes`
//! for everything else. Translation is pure; no I/O happens here.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Value, json};

use crate::error::{ToolError, ToolResult};
use crate::models::{Dimension, QueryRequest};

/// HTTP method for an upstream request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET with query parameters.
    Get,
    /// POST with a JSON body.
    Post,
}

/// A fully translated upstream request, relative to the API base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamRequest {
    /// HTTP method.
    pub method: Method,
    /// Path below the base URL, without a leading slash.
    pub path: String,
    /// Query-string parameters.
    pub params: Vec<(String, String)>,
    /// JSON body for POST requests.
    pub body: Option<Value>,
}

impl UpstreamRequest {
    /// GET request.
    #[must_use]
    pub fn get(path: impl Into<String>, params: Vec<(String, String)>) -> Self {
        Self { method: Method::Get, path: path.into(), params, body: None }
    }

    /// POST request with a JSON body.
    #[must_use]
    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self { method: Method::Post, path: path.into(), params: Vec::new(), body: Some(body) }
    }
}

/// Cross-reference fields searched when resolving disease ids of any namespace.
pub const XREF_SCOPES: &str = "_id,mondo.mondo,orphanet.id,omim,umls.cui";

/// Upstream fields searched for each query dimension.
#[must_use]
pub const fn scopes(dimension: Dimension) -> Option<&'static str> {
    match dimension {
        Dimension::Gene => Some(
            "gene.symbol,causal_gene.symbol,disgenet.genes_related_to_disease.gene_name,ctd.gene_info.symbol",
        ),
        Dimension::Variant => Some(
            "clinvar.variant.rsid,clinvar.variant.hgvs,pathogenic_variants.hgvs,gwas_catalog.rsid",
        ),
        Dimension::Phenotype => Some(
            "hpo.phenotype_related_to_disease.hpo_id,phenotype_related_to_disease.hpo_id,phenotype_related_to_disease.hpo_phenotype,hpo.phenotype_name",
        ),
        Dimension::Text => Some("name,mondo.label,disease_ontology.name,mondo.synonym.exact"),
        Dimension::Id => None,
    }
}

/// Scopes a request is searched with: its explicit scopes, else its dimension's.
/// `None` means the request goes to `POST /disease`.
#[must_use]
pub fn request_scopes(request: &QueryRequest) -> Option<&str> {
    request.scopes().or_else(|| scopes(request.dimension()))
}

/// Translate one chunk of identifiers into a single upstream batch request.
///
/// Each distinct term is sent once, in first-seen order. The upstream echoes
/// every term back in a `query` key, which is what the dispatcher uses to
/// map results onto input slots, repeated terms included.
pub fn translate(
    scopes: Option<&str>,
    identifiers: &[String],
    fields: Option<&[String]>,
) -> ToolResult<UpstreamRequest> {
    let fields = fields.map(join_fields).transpose()?;
    let terms = distinct_terms(identifiers);

    let mut request = match scopes {
        None => UpstreamRequest::post("disease", json!({ "ids": terms })),
        Some(scopes) => {
            validate_scopes(scopes)?;
            UpstreamRequest::post("query", json!({ "q": terms, "scopes": scopes }))
        }
    };
    if let (Some(fields), Some(body)) = (fields, request.body.as_mut()) {
        body["fields"] = json!(fields);
    }

    Ok(request)
}

fn distinct_terms(identifiers: &[String]) -> Vec<&str> {
    let mut seen = HashSet::with_capacity(identifiers.len());
    identifiers.iter().map(String::as_str).filter(|id| seen.insert(*id)).collect()
}

fn validate_scopes(scopes: &str) -> ToolResult<&str> {
    if scopes.split(',').all(|scope| FIELD_NAME.is_match(scope.trim())) {
        Ok(scopes)
    } else {
        Err(ToolError::invalid_argument("scopes", format!("invalid scopes '{scopes}'")))
    }
}

/// Validate and comma-join a field list.
pub fn join_fields(fields: &[String]) -> ToolResult<String> {
    for field in fields {
        validate_field_name(field)?;
    }
    Ok(fields.join(","))
}

static FIELD_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.]+$").expect("valid field-name regex"));

/// Reject field names that could inject query syntax.
pub fn validate_field_name(field: &str) -> ToolResult<&str> {
    if FIELD_NAME.is_match(field) {
        Ok(field)
    } else {
        Err(ToolError::invalid_argument("fields", format!("invalid field name '{field}'")))
    }
}

/// Characters with meaning in an unquoted Lucene term.
const TERM_SPECIAL_CHARS: &str = r#"+-!(){}[]^"~*?:\/&|"#;

/// Escape text for use inside a quoted Lucene phrase.
#[must_use]
pub fn escape_lucene_phrase(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Escape text for use as an unquoted Lucene term.
#[must_use]
pub fn escape_lucene_term(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if TERM_SPECIAL_CHARS.contains(c) || c.is_whitespace() {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Wrap escaped phrase content in quotes.
#[must_use]
pub fn quote_lucene_phrase(value: &str) -> String {
    format!("\"{}\"", escape_lucene_phrase(value))
}

/// Quote a field value when it is already quoted or contains spaces,
/// otherwise escape it as a bare term.
#[must_use]
pub fn maybe_quote_field_value(value: &str) -> String {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        quote_lucene_phrase(&value[1..value.len() - 1])
    } else if value.contains(' ') {
        quote_lucene_phrase(value)
    } else {
        escape_lucene_term(value)
    }
}

/// Build a `field:value` Lucene query joined by `AND` or `OR`.
pub fn build_field_query(pairs: &[(String, String)], operator: &str) -> ToolResult<String> {
    let operator = operator.trim().to_ascii_uppercase();
    if operator != "AND" && operator != "OR" {
        return Err(ToolError::invalid_argument(
            "operator",
            format!("unsupported operator '{operator}', expected AND or OR"),
        ));
    }
    if pairs.is_empty() {
        return Err(ToolError::invalid_argument("fieldQueries", "at least one field is required"));
    }

    let parts = pairs
        .iter()
        .map(|(field, value)| {
            validate_field_name(field).map(|f| format!("{f}:{}", maybe_quote_field_value(value)))
        })
        .collect::<ToolResult<Vec<_>>>()?;

    Ok(parts.join(&format!(" {operator} ")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_translate_id_dimension() {
        let req = translate(
            scopes(Dimension::Id),
            &ids(&["MONDO:0007739", "OMIM:143100"]),
            Some(&ids(&["_id", "name"])),
        )
        .unwrap();

        assert_eq!(req.method, Method::Post);
        assert_eq!(req.path, "disease");
        let body = req.body.unwrap();
        assert_eq!(body["ids"], json!(["MONDO:0007739", "OMIM:143100"]));
        assert_eq!(body["fields"], "_id,name");
    }

    #[test]
    fn test_translate_gene_dimension_uses_scopes() {
        let req = translate(scopes(Dimension::Gene), &ids(&["BRCA1", "TP53"]), None).unwrap();
        assert_eq!(req.path, "query");
        let body = req.body.unwrap();
        assert_eq!(body["q"], json!(["BRCA1", "TP53"]));
        assert!(body["scopes"].as_str().unwrap().contains("gene.symbol"));
        assert!(body.get("fields").is_none());
    }

    #[test]
    fn test_repeated_terms_sent_once() {
        let req =
            translate(scopes(Dimension::Gene), &ids(&["BRCA1", "TP53", "BRCA1"]), None).unwrap();
        assert_eq!(req.body.unwrap()["q"], json!(["BRCA1", "TP53"]));

        let req = translate(None, &ids(&["A", "A"]), None).unwrap();
        assert_eq!(req.body.unwrap()["ids"], json!(["A"]));
    }

    #[test]
    fn test_explicit_scopes_route_to_query() {
        let request = QueryRequest::new(ids(&["OMIM:143100"]), Dimension::Id)
            .unwrap()
            .with_scopes(XREF_SCOPES);
        let req = translate(request_scopes(&request), request.identifiers(), None).unwrap();

        assert_eq!(req.path, "query");
        assert_eq!(req.body.unwrap()["scopes"], XREF_SCOPES);
    }

    #[test]
    fn test_invalid_scopes_rejected() {
        let err = translate(Some("omim) OR (x"), &ids(&["x"]), None).unwrap_err();
        assert!(err.to_string().contains("scopes"));
    }

    #[test]
    fn test_every_query_dimension_has_scopes() {
        for dimension in Dimension::ALL {
            assert_eq!(scopes(dimension).is_none(), dimension == Dimension::Id);
        }
    }

    #[test]
    fn test_invalid_field_rejected() {
        let err = translate(None, &ids(&["x"]), Some(&ids(&["name) OR (x"]))).unwrap_err();
        assert!(err.to_string().contains("name) OR (x"));
    }

    #[test]
    fn test_escape_lucene_term() {
        assert_eq!(escape_lucene_term("OMIM:104300"), "OMIM\\:104300");
        assert_eq!(escape_lucene_term("a b"), "a\\ b");
    }

    #[test]
    fn test_maybe_quote_field_value() {
        assert_eq!(maybe_quote_field_value("memory loss"), "\"memory loss\"");
        assert_eq!(maybe_quote_field_value("\"say \"hi\"\""), "\"say \\\"hi\\\"\"");
        assert_eq!(maybe_quote_field_value("MONDO:1"), "MONDO\\:1");
    }

    #[test]
    fn test_build_field_query() {
        let pairs = vec![
            ("mondo.mondo".to_string(), "MONDO:0007739".to_string()),
            ("name".to_string(), "huntington disease".to_string()),
        ];
        assert_eq!(
            build_field_query(&pairs, "or").unwrap(),
            "mondo.mondo:MONDO\\:0007739 OR name:\"huntington disease\""
        );
        assert!(build_field_query(&pairs, "XOR").is_err());
        assert!(build_field_query(&[], "AND").is_err());
    }
}
