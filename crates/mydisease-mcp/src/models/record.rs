//! Flattened disease records.
//!
//! MyDisease.info documents vary in shape from one disease to the next. A
//! [`Record`] flattens nested objects into dotted field names
//! (`mondo.mondo`, `inheritance.inheritance_type`) over a closed set of
//! [`FieldValue`] variants so formatters can render any record
//! deterministically.

use serde::ser::{Serialize, Serializer};
use serde_json::Value;

/// Keys the upstream adds to batch responses for its own bookkeeping.
const BOOKKEEPING_KEYS: &[&str] = &["query", "notfound", "found", "_score", "_version"];

/// Separator used when a list is rendered into a single cell.
const LIST_SEPARATOR: &str = "; ";

/// A single field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// JSON `null`.
    Null,
    /// Boolean.
    Bool(bool),
    /// Integer that fits in an `i64`.
    Integer(i64),
    /// Integer above `i64::MAX`.
    Unsigned(u64),
    /// Any other number.
    Float(f64),
    /// String.
    Text(String),
    /// Ordered values collected from a JSON array.
    List(Vec<FieldValue>),
}

impl FieldValue {
    /// Convert a JSON scalar or array. Objects are rendered as compact JSON text;
    /// [`Record::from_json`] flattens them before they reach this point.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Integer(i)
                } else if let Some(u) = n.as_u64() {
                    Self::Unsigned(u)
                } else {
                    Self::Float(n.as_f64().unwrap_or_default())
                }
            }
            Value::String(s) => Self::Text(s.clone()),
            Value::Array(items) => Self::List(items.iter().map(Self::from_json).collect()),
            Value::Object(_) => Self::Text(value.to_string()),
        }
    }

    /// Render for a single table cell. `Null` renders empty.
    #[must_use]
    pub fn to_cell(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Integer(i) => i.to_string(),
            Self::Unsigned(u) => u.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Text(s) => s.clone(),
            Self::List(items) => items
                .iter()
                .map(Self::to_cell)
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(LIST_SEPARATOR),
        }
    }

    /// Returns true for `Null`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Integer(i) => serializer.serialize_i64(*i),
            Self::Unsigned(u) => serializer.serialize_u64(*u),
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::Text(s) => serializer.serialize_str(s),
            Self::List(items) => serializer.collect_seq(items),
        }
    }
}

/// A disease record as an ordered list of dotted field names and values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, FieldValue)>,
}

impl Record {
    /// Create an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly useful in tests.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set(key.into(), value.into());
        self
    }

    /// Flatten a JSON document into a record.
    ///
    /// Nested objects become dotted names. Arrays of objects collect each
    /// nested value into a `List` under the dotted name. A non-object
    /// document is stored under the single field `value`.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        let mut record = Self::new();
        match value {
            Value::Object(map) => {
                for (key, child) in map {
                    record.flatten(key, child, false);
                }
            }
            other => record.set("value".to_string(), FieldValue::from_json(other)),
        }
        record
    }

    /// Flatten one item of an upstream batch response, dropping bookkeeping keys.
    #[must_use]
    pub fn from_upstream_hit(value: &Value) -> Self {
        let mut record = Self::new();
        if let Value::Object(map) = value {
            for (key, child) in map {
                if !BOOKKEEPING_KEYS.contains(&key.as_str()) {
                    record.flatten(key, child, false);
                }
            }
        }
        record
    }

    fn flatten(&mut self, key: &str, value: &Value, in_array: bool) {
        match value {
            Value::Object(map) => {
                for (child_key, child) in map {
                    self.flatten(&format!("{key}.{child_key}"), child, in_array);
                }
            }
            Value::Array(items) if items.iter().any(|v| v.is_object() || v.is_array()) => {
                for item in items {
                    self.flatten(key, item, true);
                }
            }
            Value::Array(items) => {
                let values = items.iter().map(FieldValue::from_json).collect::<Vec<_>>();
                if in_array {
                    for v in values {
                        self.append(key, v);
                    }
                } else {
                    self.set(key.to_string(), FieldValue::List(values));
                }
            }
            scalar if in_array => self.append(key, FieldValue::from_json(scalar)),
            scalar => self.set(key.to_string(), FieldValue::from_json(scalar)),
        }
    }

    fn set(&mut self, key: String, value: FieldValue) {
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((key, value)),
        }
    }

    fn append(&mut self, key: &str, value: FieldValue) {
        match self.fields.iter_mut().find(|(k, _)| k == key) {
            Some((_, FieldValue::List(items))) => items.push(value),
            Some((_, slot)) => {
                let previous = std::mem::replace(slot, FieldValue::Null);
                *slot = FieldValue::List(vec![previous, value]);
            }
            None => self.fields.push((key.to_string(), FieldValue::List(vec![value]))),
        }
    }

    /// Value stored under an exact field name.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Fields matching a requested name: the exact field, or every nested
    /// field beneath it when the name refers to an object (`mondo` matches
    /// `mondo.mondo` and `mondo.xrefs.doid`).
    pub fn matching<'a>(&'a self, requested: &'a str) -> impl Iterator<Item = (&'a str, &'a FieldValue)> {
        self.fields
            .iter()
            .filter(move |(k, _)| field_matches(k, requested))
            .map(|(k, v)| (k.as_str(), v))
    }

    /// Keep only the fields matched by any of `requested`, in record order.
    #[must_use]
    pub fn select(&self, requested: &[String]) -> Self {
        let fields = self
            .fields
            .iter()
            .filter(|(k, _)| requested.iter().any(|r| field_matches(k, r)))
            .cloned()
            .collect();
        Self { fields }
    }

    /// Render a requested field as one cell.
    ///
    /// Missing fields render empty. Object fields render their nested fields
    /// as `name: value` pairs.
    #[must_use]
    pub fn cell(&self, requested: &str) -> String {
        if let Some(value) = self.get(requested) {
            return value.to_cell();
        }
        self.matching(requested)
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| format!("{}: {}", &k[requested.len() + 1..], v.to_cell()))
            .collect::<Vec<_>>()
            .join(LIST_SEPARATOR)
    }

    /// Field names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    /// Fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Disease id (`_id`), if present.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        match self.get("_id") {
            Some(FieldValue::Text(id)) => Some(id),
            _ => None,
        }
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the record has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// `key` is `requested` itself or a field nested beneath it.
fn field_matches(key: &str, requested: &str) -> bool {
    key == requested
        || (key.len() > requested.len()
            && key.starts_with(requested)
            && key.as_bytes()[requested.len()] == b'.')
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.fields.iter().map(|(k, v)| (k, v)))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_flatten_nested_objects() {
        let record = Record::from_json(&json!({
            "_id": "MONDO:0007739",
            "name": "Huntington disease",
            "mondo": {"mondo": "MONDO:0007739", "xrefs": {"omim": "143100"}}
        }));

        assert_eq!(record.id(), Some("MONDO:0007739"));
        assert_eq!(record.get("mondo.mondo"), Some(&FieldValue::from("MONDO:0007739")));
        assert_eq!(record.get("mondo.xrefs.omim"), Some(&FieldValue::from("143100")));
        assert_eq!(
            record.keys().collect::<Vec<_>>(),
            vec!["_id", "name", "mondo.mondo", "mondo.xrefs.omim"]
        );
    }

    #[test]
    fn test_flatten_array_of_objects_collects_lists() {
        let record = Record::from_json(&json!({
            "gene": [{"symbol": "BRCA1", "id": 672}, {"symbol": "BRCA2", "id": 675}]
        }));

        assert_eq!(
            record.get("gene.symbol"),
            Some(&FieldValue::List(vec!["BRCA1".into(), "BRCA2".into()]))
        );
        assert_eq!(record.cell("gene.id"), "672; 675");
    }

    #[test]
    fn test_scalar_array_stays_a_list() {
        let record = Record::from_json(&json!({"omim": ["143100", "613004"]}));
        assert_eq!(record.cell("omim"), "143100; 613004");
    }

    #[test]
    fn test_bookkeeping_keys_are_dropped() {
        let record = Record::from_upstream_hit(&json!({
            "query": "BRCA1",
            "_id": "MONDO:0011450",
            "_score": 12.5,
            "name": "breast cancer"
        }));
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["_id", "name"]);
    }

    #[test]
    fn test_cell_for_object_field_and_missing_field() {
        let record = Record::from_json(&json!({
            "inheritance": {"inheritance_type": "AD", "source": "hpo"}
        }));
        assert_eq!(record.cell("inheritance"), "inheritance_type: AD; source: hpo");
        assert_eq!(record.cell("prevalence"), "");
        assert_eq!(record.cell("inherit"), "");
    }

    #[test]
    fn test_large_unsigned_keeps_every_digit() {
        let record = Record::from_json(&json!({"count": 18_446_744_073_709_551_615_u64, "small": 7}));
        assert_eq!(record.get("count"), Some(&FieldValue::Unsigned(u64::MAX)));
        assert_eq!(record.cell("count"), "18446744073709551615");
        assert_eq!(record.get("small"), Some(&FieldValue::Integer(7)));

        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"count":18446744073709551615,"small":7}"#);
    }

    #[test]
    fn test_null_renders_empty() {
        let record = Record::from_json(&json!({"prevalence": null, "score": 0.5}));
        assert_eq!(record.cell("prevalence"), "");
        assert_eq!(record.cell("score"), "0.5");
    }

    #[test]
    fn test_select_keeps_record_order() {
        let record = Record::from_json(&json!({
            "_id": "MONDO:0007739",
            "name": "Huntington disease",
            "mondo": {"mondo": "MONDO:0007739", "label": "HD"},
            "mondoish": 1
        }));
        let selected = record.select(&["mondo".to_string(), "_id".to_string()]);
        assert_eq!(
            selected.keys().collect::<Vec<_>>(),
            vec!["_id", "mondo.mondo", "mondo.label"]
        );
    }

    #[test]
    fn test_serialize_keeps_order() {
        let record = Record::new().with("name", "b").with("_id", "a").with("count", 3_i64);
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"name":"b","_id":"a","count":3}"#);
    }
}
