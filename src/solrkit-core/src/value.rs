use std::borrow::Cow;

use crate::models::FieldValue;

/// Wire format for date fields. Sub-second precision is dropped, not rounded.
pub const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Encode a field value into the texts written for it in an update command.
///
/// A scalar yields one text, a repeated field one text per item (nested
/// sequences are flattened) and `Null` yields nothing, which callers
/// treat as "omit the field".
pub fn encode_value(value: &FieldValue) -> Vec<Cow<'_, str>> {
    let mut out = Vec::new();
    push_encoded(value, &mut out);
    out
}

fn push_encoded<'a>(value: &'a FieldValue, out: &mut Vec<Cow<'a, str>>) {
    match value {
        FieldValue::Multi(items) => {
            for item in items {
                push_encoded(item, out);
            }
        }
        scalar => {
            if let Some(text) = encode_scalar(scalar) {
                out.push(text);
            }
        }
    }
}

/// Encode a single non-sequence value. Returns `None` for `Null`.
pub fn encode_scalar(value: &FieldValue) -> Option<Cow<'_, str>> {
    let text = match value {
        FieldValue::Null => return None,
        FieldValue::Bool(true) => Cow::Borrowed("true"),
        FieldValue::Bool(false) => Cow::Borrowed("false"),
        FieldValue::DateTime(dt) => Cow::Owned(dt.format(DATE_FORMAT).to_string()),
        FieldValue::Date(d) => Cow::Owned(d.format("%Y-%m-%dT00:00:00Z").to_string()),
        FieldValue::Int(n) => Cow::Owned(n.to_string()),
        FieldValue::Float(n) => Cow::Owned(encode_float(*n)),
        FieldValue::Text(s) => Cow::Borrowed(s.as_str()),
        FieldValue::Multi(_) => return None,
    };
    Some(text)
}

// Solr parses Java float literals.
fn encode_float(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n == f64::INFINITY {
        "Infinity".to_string()
    } else if n == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else {
        n.to_string()
    }
}
