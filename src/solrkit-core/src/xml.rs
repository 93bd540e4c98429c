//! Reader for Solr's legacy XML response writer (`wt=xml`).
//!
//! The XML tree is converted into the same JSON shape `wt=json` produces,
//! so both formats share one decoding path afterwards.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::{Map, Number, Value};

use crate::error::{Error, Result};

struct Frame {
    tag: String,
    name: Option<String>,
    attrs: Vec<(String, String)>,
    text: String,
    children: Vec<(Option<String>, Value)>,
}

impl Frame {
    fn open(e: &BytesStart<'_>) -> Result<Self> {
        let tag = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
        let mut name = None;
        let mut attrs = Vec::new();
        for attr in e.attributes() {
            let attr = attr.map_err(|err| Error::unparsable(format!("bad XML attribute: {}", err)))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|err| Error::unparsable(format!("bad XML attribute: {}", err)))?
                .into_owned();
            if key == "name" {
                name = Some(value);
            } else {
                attrs.push((key, value));
            }
        }
        Ok(Self {
            tag,
            name,
            attrs,
            text: String::new(),
            children: Vec::new(),
        })
    }

    fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Unnamed `<doc>` children of a `<doc>` are nested documents and are
    /// gathered under `_childDocuments_`, as the JSON writer reports them.
    fn into_object(self) -> Value {
        let is_doc = self.tag == "doc";
        let mut map = Map::new();
        let mut children = Vec::new();
        for (name, value) in self.children {
            match name {
                Some(name) => {
                    map.insert(name, value);
                }
                None if is_doc && value.is_object() => children.push(value),
                None => {}
            }
        }
        if !children.is_empty() {
            map.insert("_childDocuments_".to_string(), Value::Array(children));
        }
        Value::Object(map)
    }

    /// Named-list as `[name, value, name, value, ...]`, the `json.nl=flat`
    /// layout Solr uses for facet fields.
    fn into_flat_list(self) -> Value {
        let mut items = Vec::with_capacity(self.children.len() * 2);
        for (name, value) in self.children {
            items.push(name.map_or(Value::Null, Value::String));
            items.push(value);
        }
        Value::Array(items)
    }

    fn close(self, parent: Option<&Frame>) -> Result<Value> {
        let in_facet_fields = parent
            .map(|p| p.tag == "lst" && p.name.as_deref() == Some("facet_fields"))
            .unwrap_or(false);

        match self.tag.as_str() {
            "lst" if in_facet_fields => Ok(self.into_flat_list()),
            "lst" | "doc" | "response" => Ok(self.into_object()),
            "arr" => Ok(Value::Array(
                self.children.into_iter().map(|(_, v)| v).collect(),
            )),
            "result" => self.into_result(),
            "str" | "date" => Ok(Value::String(self.text)),
            "int" | "long" | "short" | "byte" => self
                .text
                .trim()
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| self.bad_scalar()),
            "float" | "double" => {
                let n = self.text.trim().parse::<f64>().map_err(|_| self.bad_scalar())?;
                Ok(Number::from_f64(n).map_or_else(|| Value::String(self.text.clone()), Value::Number))
            }
            "bool" => match self.text.trim() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(self.bad_scalar()),
            },
            "null" => Ok(Value::Null),
            _ => Ok(Value::String(self.text)),
        }
    }

    fn into_result(self) -> Result<Value> {
        let mut map = Map::new();
        for key in ["numFound", "start"] {
            if let Some(raw) = self.attr(key) {
                let n = raw
                    .parse::<u64>()
                    .map_err(|_| Error::unparsable(format!("bad {} attribute: {}", key, raw)))?;
                map.insert(key.to_string(), Value::from(n));
            }
        }
        if let Some(raw) = self.attr("maxScore") {
            if let Some(n) = raw.parse::<f64>().ok().and_then(Number::from_f64) {
                map.insert("maxScore".to_string(), Value::Number(n));
            }
        }
        let docs = self.children.into_iter().map(|(_, v)| v).collect();
        map.insert("docs".to_string(), Value::Array(docs));
        Ok(Value::Object(map))
    }

    fn bad_scalar(&self) -> Error {
        Error::unparsable(format!(
            "bad <{}> value {:?} for '{}'",
            self.tag,
            self.text,
            self.name.as_deref().unwrap_or("")
        ))
    }
}

/// Parse a Solr XML response into its JSON-shaped equivalent
pub fn parse_response(body: &str) -> Result<Value> {
    let mut reader = Reader::from_str(body);
    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<Value> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| Error::unparsable(format!("malformed XML at byte {}: {}", reader.buffer_position(), e)))?;

        match event {
            Event::Start(ref e) => {
                let frame = Frame::open(e)?;
                if stack.is_empty() && frame.tag != "response" {
                    return Err(Error::unparsable(format!(
                        "expected <response> root element, found <{}>",
                        frame.tag
                    )));
                }
                stack.push(frame);
            }
            Event::Empty(ref e) => {
                let frame = Frame::open(e)?;
                if stack.is_empty() {
                    return Err(Error::unparsable(format!(
                        "expected <response> root element, found <{}/>",
                        frame.tag
                    )));
                }
                finish(frame, &mut stack, &mut root)?;
            }
            Event::Text(e) => {
                if let Some(frame) = stack.last_mut() {
                    let text = e
                        .unescape()
                        .map_err(|err| Error::unparsable(format!("bad XML text: {}", err)))?;
                    frame.text.push_str(&text);
                }
            }
            Event::CData(e) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Event::End(_) => match stack.pop() {
                Some(frame) => finish(frame, &mut stack, &mut root)?,
                None => return Err(Error::unparsable("unbalanced XML end tag")),
            },
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(Error::unparsable("truncated XML response"));
    }
    root.ok_or_else(|| Error::unparsable("empty XML response"))
}

fn finish(frame: Frame, stack: &mut [Frame], root: &mut Option<Value>) -> Result<()> {
    let name = frame.name.clone();
    let value = frame.close(stack.last())?;
    match stack.last_mut() {
        Some(parent) => parent.children.push((name, value)),
        None => *root = Some(value),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_header_and_result() {
        let raw = r#"<?xml version="1.0" encoding="UTF-8"?>
            <response>
              <lst name="responseHeader">
                <int name="status">0</int>
                <int name="QTime">3</int>
                <lst name="params"><str name="q">manuel</str></lst>
              </lst>
              <result name="response" numFound="2" start="0" maxScore="1.5">
                <doc>
                  <str name="id">a&amp;b</str>
                  <arr name="links"><str>x</str><str>y</str></arr>
                  <float name="score">1.5</float>
                  <bool name="active">true</bool>
                  <date name="created">2010-01-01T00:00:00Z</date>
                </doc>
                <doc><str name="id">c</str></doc>
              </result>
            </response>"#;

        let value = parse_response(raw).unwrap();
        assert_eq!(value["responseHeader"]["status"], json!(0));
        assert_eq!(value["responseHeader"]["QTime"], json!(3));
        assert_eq!(value["responseHeader"]["params"]["q"], json!("manuel"));
        assert_eq!(value["response"]["numFound"], json!(2));
        assert_eq!(value["response"]["maxScore"], json!(1.5));
        assert_eq!(value["response"]["docs"][0]["id"], json!("a&b"));
        assert_eq!(value["response"]["docs"][0]["links"], json!(["x", "y"]));
        assert_eq!(value["response"]["docs"][0]["active"], json!(true));
        assert_eq!(value["response"]["docs"][1]["id"], json!("c"));
    }

    #[test]
    fn test_parse_empty_result_element() {
        let raw = r#"<response>
            <lst name="responseHeader"><int name="status">0</int></lst>
            <result name="response" numFound="0" start="0"/>
        </response>"#;
        let value = parse_response(raw).unwrap();
        assert_eq!(value["response"]["docs"], json!([]));
    }

    #[test]
    fn test_facet_fields_become_flat_lists() {
        let raw = r#"<response>
            <lst name="facet_counts">
              <lst name="facet_queries"><int name="popularity:[0 TO 8]">2</int></lst>
              <lst name="facet_fields">
                <lst name="category"><int name="drama">3</int><int name="action">2</int></lst>
              </lst>
            </lst>
        </response>"#;
        let value = parse_response(raw).unwrap();
        assert_eq!(
            value["facet_counts"]["facet_fields"]["category"],
            json!(["drama", 3, "action", 2])
        );
        assert_eq!(
            value["facet_counts"]["facet_queries"]["popularity:[0 TO 8]"],
            json!(2)
        );
    }

    #[test]
    fn test_nested_docs_become_child_documents() {
        let raw = r#"<response>
            <result name="response" numFound="1" start="0">
              <doc>
                <str name="id">parent</str>
                <doc><str name="id">child1</str></doc>
                <doc><str name="id">child2</str></doc>
              </doc>
            </result>
        </response>"#;
        let value = parse_response(raw).unwrap();
        let parent = &value["response"]["docs"][0];
        assert_eq!(parent["id"], json!("parent"));
        assert_eq!(
            parent["_childDocuments_"],
            json!([{"id": "child1"}, {"id": "child2"}])
        );
    }

    #[test]
    fn test_rejects_non_solr_xml() {
        assert!(parse_response("<html><body>502</body></html>").is_err());
        assert!(parse_response("<response><lst name=\"x\">").is_err());
        assert!(parse_response("<response><int name=\"status\">zero</int></response>").is_err());
        assert!(parse_response("").is_err());
    }
}
