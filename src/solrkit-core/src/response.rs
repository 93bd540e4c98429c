//! Decoding of select responses.
//!
//! `responseHeader.status == 0` is the only success marker. A body that
//! reports anything else, or that cannot be read in the expected format,
//! becomes [`Error::SolrResponse`] and never an empty result.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::models::FieldValue;
use crate::value::DATE_FORMAT;
use crate::xml;

/// Body format of a response, selected with the `wt` parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    #[default]
    Json,
    /// Legacy XML response writer
    Xml,
}

impl ResponseFormat {
    /// Value of the `wt` request parameter
    pub fn wt(&self) -> &'static str {
        match self {
            ResponseFormat::Json => "json",
            ResponseFormat::Xml => "xml",
        }
    }
}

/// ResponseHeader is the `responseHeader` section
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseHeader {
    pub status: i64,
    /// Server-side query time in milliseconds
    pub qtime: Option<u64>,
    /// Request parameters echoed by the server
    pub params: Map<String, Value>,
}

impl ResponseHeader {
    /// Echoed parameter as text, if it was a single string
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).and_then(Value::as_str)
    }
}

/// ResponseDocument is one matching document.
///
/// A field is present only if the server returned a value for it. Multi
/// valued fields stay sequences and single values stay scalars, exactly as
/// the server reported them. Dates arrive as text; use
/// [`ResponseDocument::get_datetime`] to read them.
///
/// Fields holding JSON objects (child documents, `[json]` transformer
/// output) have no [`FieldValue`] form and are kept as raw JSON, reachable
/// through [`ResponseDocument::get_raw`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseDocument {
    fields: BTreeMap<String, FieldValue>,
    raw: BTreeMap<String, Value>,
}

impl ResponseDocument {
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name) || self.raw.contains_key(name)
    }

    /// Structured field that could not be read as a [`FieldValue`]
    pub fn get_raw(&self, name: &str) -> Option<&Value> {
        self.raw.get(name)
    }

    /// Nested documents under `_childDocuments_`, in server order
    pub fn child_documents(&self) -> Result<Vec<ResponseDocument>> {
        match self.raw.get("_childDocuments_") {
            Some(Value::Array(children)) => children
                .iter()
                .cloned()
                .map(ResponseDocument::from_json)
                .collect(),
            Some(child @ Value::Object(_)) => Ok(vec![ResponseDocument::from_json(child.clone())?]),
            _ => Ok(Vec::new()),
        }
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::as_str)
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(FieldValue::as_i64)
    }

    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(FieldValue::as_f64)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(FieldValue::as_bool)
    }

    /// Parse a date field (`YYYY-MM-DDTHH:MM:SSZ`, fractional seconds allowed)
    pub fn get_datetime(&self, name: &str) -> Option<DateTime<Utc>> {
        let text = self.get_str(name)?;
        NaiveDateTime::parse_from_str(text, DATE_FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.fZ"))
            .ok()
            .map(|dt| dt.and_utc())
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len() + self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.raw.is_empty()
    }

    fn from_json(value: Value) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(Error::unparsable("result document is not an object"));
        };
        let mut doc = Self::default();
        for (name, value) in map {
            if value.is_null() {
                continue;
            }
            if holds_object(&value) {
                doc.raw.insert(name, value);
            } else if let Ok(field) = FieldValue::from_json(value) {
                doc.fields.insert(name, field);
            }
        }
        Ok(doc)
    }
}

fn holds_object(value: &Value) -> bool {
    match value {
        Value::Object(_) => true,
        Value::Array(items) => items.iter().any(holds_object),
        _ => false,
    }
}

/// ResultSet is the `response` section
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    pub num_found: u64,
    pub start: u64,
    pub max_score: Option<f64>,
    /// Documents in server order
    pub docs: Vec<ResponseDocument>,
}

/// FacetCount is one value of a field facet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetCount {
    pub value: String,
    pub count: u64,
}

/// FacetCounts is the `facet_counts` section
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FacetCounts {
    pub facet_queries: BTreeMap<String, u64>,
    /// Field name to counts, in the order the server ranked them
    pub facet_fields: BTreeMap<String, Vec<FacetCount>>,
    /// Remaining sections (ranges, pivots, ...) as returned
    pub other: Map<String, Value>,
}

/// Document id to field name to highlighted snippets
pub type Highlighting = BTreeMap<String, BTreeMap<String, Vec<String>>>;

/// SearchResult is a fully decoded select response
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub header: ResponseHeader,
    pub results: ResultSet,
    pub facet_counts: Option<FacetCounts>,
    pub highlighting: Option<Highlighting>,
}

/// Decode a select response body
pub fn decode(body: &str, format: ResponseFormat) -> Result<SearchResult> {
    let value = match format {
        ResponseFormat::Json => serde_json::from_str::<Value>(body)
            .map_err(|e| Error::unparsable(format!("response is not valid JSON: {}", e)))?,
        ResponseFormat::Xml => xml::parse_response(body)?,
    };
    let result = SearchResult::from_value(value)?;

    tracing::debug!(
        "Decoded response: numFound={}, docs={}, QTime={:?}",
        result.results.num_found,
        result.results.docs.len(),
        result.header.qtime
    );
    Ok(result)
}

impl SearchResult {
    /// Build from a response already parsed into its JSON shape
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(mut root) = value else {
            return Err(Error::unparsable("response body is not an object"));
        };

        let header = decode_header(root.remove("responseHeader"))?;
        if header.status != 0 {
            return Err(Error::SolrResponse {
                status: Some(header.status),
                message: error_message(root.get("error")),
            });
        }

        let results = decode_result_set(root.remove("response"))?;
        let facet_counts = root.remove("facet_counts").map(decode_facets).transpose()?;
        let highlighting = root
            .remove("highlighting")
            .map(decode_highlighting)
            .transpose()?;

        Ok(Self {
            header,
            results,
            facet_counts,
            highlighting,
        })
    }
}

fn decode_header(value: Option<Value>) -> Result<ResponseHeader> {
    let Some(Value::Object(mut map)) = value else {
        return Err(Error::unparsable("missing responseHeader section"));
    };
    let status = map
        .get("status")
        .and_then(Value::as_i64)
        .ok_or_else(|| Error::unparsable("responseHeader has no integer status"))?;
    let qtime = map.get("QTime").and_then(Value::as_u64);
    let params = match map.remove("params") {
        Some(Value::Object(params)) => params,
        _ => Map::new(),
    };
    Ok(ResponseHeader {
        status,
        qtime,
        params,
    })
}

fn error_message(error: Option<&Value>) -> String {
    error
        .and_then(|e| e.get("msg"))
        .and_then(Value::as_str)
        .unwrap_or("request failed")
        .to_string()
}

fn decode_result_set(value: Option<Value>) -> Result<ResultSet> {
    let Some(Value::Object(mut map)) = value else {
        return Err(Error::unparsable("missing response section"));
    };
    let num_found = map
        .get("numFound")
        .and_then(Value::as_u64)
        .ok_or_else(|| Error::unparsable("response section has no numFound"))?;
    let start = map.get("start").and_then(Value::as_u64).unwrap_or(0);
    let max_score = map.get("maxScore").and_then(Value::as_f64);
    let docs = match map.remove("docs") {
        Some(Value::Array(docs)) => docs
            .into_iter()
            .map(ResponseDocument::from_json)
            .collect::<Result<Vec<_>>>()?,
        None => Vec::new(),
        Some(_) => return Err(Error::unparsable("response docs is not an array")),
    };
    Ok(ResultSet {
        num_found,
        start,
        max_score,
        docs,
    })
}

fn decode_facets(value: Value) -> Result<FacetCounts> {
    let Value::Object(mut map) = value else {
        return Err(Error::unparsable("facet_counts is not an object"));
    };

    let mut facets = FacetCounts::default();
    if let Some(Value::Object(queries)) = map.remove("facet_queries") {
        for (query, count) in queries {
            facets.facet_queries.insert(query, facet_count(&count)?);
        }
    }
    if let Some(Value::Object(fields)) = map.remove("facet_fields") {
        for (field, counts) in fields {
            facets.facet_fields.insert(field, decode_field_counts(counts)?);
        }
    }
    facets.other = map;
    Ok(facets)
}

/// Accepts every `json.nl` layout: flat `[v, n, ...]`, pairs
/// `[[v, n], ...]` and map `{v: n}`.
fn decode_field_counts(value: Value) -> Result<Vec<FacetCount>> {
    match value {
        Value::Array(items) if items.iter().all(Value::is_array) => items
            .into_iter()
            .map(|pair| match pair {
                Value::Array(mut pair) if pair.len() == 2 => {
                    let count = pair.pop().unwrap_or(Value::Null);
                    let value = pair.pop().unwrap_or(Value::Null);
                    facet_entry(value, &count)
                }
                _ => Err(Error::unparsable("facet pair is not [value, count]")),
            })
            .collect(),
        Value::Array(items) => {
            if items.len() % 2 != 0 {
                return Err(Error::unparsable("flat facet list has odd length"));
            }
            let mut counts = Vec::with_capacity(items.len() / 2);
            let mut iter = items.into_iter();
            while let (Some(value), Some(count)) = (iter.next(), iter.next()) {
                counts.push(facet_entry(value, &count)?);
            }
            Ok(counts)
        }
        Value::Object(map) => map
            .into_iter()
            .map(|(value, count)| facet_entry(Value::String(value), &count))
            .collect(),
        _ => Err(Error::unparsable("facet field counts have an unknown layout")),
    }
}

fn facet_entry(value: Value, count: &Value) -> Result<FacetCount> {
    let value = match value {
        Value::String(s) => s,
        // Missing-value bucket (facet.missing)
        Value::Null => String::new(),
        other => other.to_string(),
    };
    Ok(FacetCount {
        value,
        count: facet_count(count)?,
    })
}

fn facet_count(count: &Value) -> Result<u64> {
    count
        .as_u64()
        .ok_or_else(|| Error::unparsable(format!("facet count {} is not a count", count)))
}

fn decode_highlighting(value: Value) -> Result<Highlighting> {
    let Value::Object(docs) = value else {
        return Err(Error::unparsable("highlighting is not an object"));
    };

    let mut highlighting = Highlighting::new();
    for (id, fields) in docs {
        let Value::Object(fields) = fields else {
            return Err(Error::unparsable(format!("highlighting for '{}' is not an object", id)));
        };
        let mut snippets = BTreeMap::new();
        for (field, values) in fields {
            let texts = match values {
                Value::Array(items) => items
                    .into_iter()
                    .map(|item| match item {
                        Value::String(s) => Ok(s),
                        _ => Err(Error::unparsable("highlight snippet is not text")),
                    })
                    .collect::<Result<Vec<_>>>()?,
                Value::String(s) => vec![s],
                _ => return Err(Error::unparsable("highlight snippets are not text")),
            };
            snippets.insert(field, texts);
        }
        highlighting.insert(id, snippets);
    }
    Ok(highlighting)
}
