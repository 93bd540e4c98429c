use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// FieldValue is a single value stored in (or returned for) a document field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// No value. Omitted from encoded commands entirely.
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    DateTime(DateTime<Utc>),
    /// Calendar date, indexed as midnight UTC.
    Date(NaiveDate),
    /// Repeated field, one field instance per item.
    Multi(Vec<FieldValue>),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(n) => Some(*n),
            FieldValue::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_slice(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::Multi(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Convert a JSON value. Objects have no field representation.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        use serde_json::Value;

        Ok(match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Int(i),
                None => FieldValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => FieldValue::Text(s),
            Value::Array(items) => FieldValue::Multi(
                items
                    .into_iter()
                    .map(FieldValue::from_json)
                    .collect::<Result<Vec<_>>>()?,
            ),
            Value::Object(_) => {
                return Err(Error::input("nested objects cannot be used as field values"))
            }
        })
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Int(value.into())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Int(value.into())
    }
}

impl From<f32> for FieldValue {
    fn from(value: f32) -> Self {
        FieldValue::Float(value.into())
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::DateTime(value)
    }
}

/// Naive timestamps are taken to be UTC.
impl From<NaiveDateTime> for FieldValue {
    fn from(value: NaiveDateTime) -> Self {
        FieldValue::DateTime(value.and_utc())
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        FieldValue::Date(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(value: Vec<T>) -> Self {
        FieldValue::Multi(value.into_iter().map(Into::into).collect())
    }
}

/// Document is a set of named fields sent to the index.
///
/// Fields are kept sorted by name, which is also the order they are
/// written in an `<add>` command.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    fields: BTreeMap<String, FieldValue>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field setter
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Set a field, returning the previous value if there was one
    pub fn set(
        &mut self,
        name: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> Option<FieldValue> {
        self.fields.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.fields.remove(name)
    }

    /// Fields in encoding order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Document
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl TryFrom<serde_json::Value> for Document {
    type Error = Error;

    fn try_from(value: serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::Object(map) => {
                let mut doc = Document::new();
                for (name, value) in map {
                    let value = FieldValue::from_json(value).map_err(|_| {
                        Error::input(format!("field '{}' holds a nested object", name))
                    })?;
                    doc.set(name, value);
                }
                Ok(doc)
            }
            other => Err(Error::input(format!(
                "expected a JSON object for a document, got {}",
                json_kind(&other)
            ))),
        }
    }
}

/// Build documents from one JSON object or an array of objects
pub fn documents_from_json(value: serde_json::Value) -> Result<Vec<Document>> {
    match value {
        serde_json::Value::Array(items) => items.into_iter().map(Document::try_from).collect(),
        other => Ok(vec![Document::try_from(other)?]),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_from_json_object() {
        let doc = Document::try_from(json!({
            "id": 1,
            "title": "hello",
            "tags": ["a", "b"],
            "price": 9.5,
            "stock": null,
            "active": true
        }))
        .unwrap();

        assert_eq!(doc.get("id"), Some(&FieldValue::Int(1)));
        assert_eq!(doc.get("title").and_then(|v| v.as_str()), Some("hello"));
        assert_eq!(doc.get("tags").and_then(|v| v.as_slice()).map(|s| s.len()), Some(2));
        assert_eq!(doc.get("price"), Some(&FieldValue::Float(9.5)));
        assert_eq!(doc.get("stock"), Some(&FieldValue::Null));
        assert_eq!(doc.get("active"), Some(&FieldValue::Bool(true)));
    }

    #[test]
    fn test_document_rejects_non_objects() {
        assert!(matches!(
            Document::try_from(json!("string")),
            Err(Error::Input(_))
        ));
        assert!(matches!(
            Document::try_from(serde_json::Value::Null),
            Err(Error::Input(_))
        ));
    }

    #[test]
    fn test_document_rejects_nested_object_field() {
        let err = Document::try_from(json!({"id": 1, "meta": {"a": 1}})).unwrap_err();
        match err {
            Error::Input(msg) => assert!(msg.contains("meta"), "got {}", msg),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_documents_from_json_accepts_one_or_many() {
        assert_eq!(documents_from_json(json!({"id": "a"})).unwrap().len(), 1);
        assert_eq!(
            documents_from_json(json!([{"id": "a"}, {"id": "b"}, {"id": "c"}]))
                .unwrap()
                .len(),
            3
        );
        assert!(documents_from_json(json!([{"id": "a"}, 42])).is_err());
    }

    #[test]
    fn test_fields_are_sorted_by_name() {
        let doc = Document::new()
            .with_field("text", "hello")
            .with_field("id", 1)
            .with_field("author", "x");
        let names: Vec<&str> = doc.fields().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["author", "id", "text"]);
    }

    #[test]
    fn test_option_and_vec_conversions() {
        assert_eq!(FieldValue::from(None::<i32>), FieldValue::Null);
        assert_eq!(FieldValue::from(Some("x")), FieldValue::Text("x".into()));
        assert_eq!(
            FieldValue::from(vec![1, 2]),
            FieldValue::Multi(vec![FieldValue::Int(1), FieldValue::Int(2)])
        );
    }
}
