//! Solr XML update commands.
//!
//! Every command is rendered as a small XML document. Anything that comes
//! from the caller (ids, field names, field values, queries) is escaped
//! before it is written, so a value containing `<` or `"` cannot break out
//! of its element or attribute.

use quick_xml::escape::escape;
use std::fmt::Display;

use crate::error::{Error, Result};
use crate::models::{Document, FieldValue};
use crate::value::encode_value;

/// Content type of every update payload
pub const XML_CONTENT_TYPE: &str = "text/xml; charset=utf-8";

/// An encoded request body together with its content type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub body: String,
    pub content_type: &'static str,
}

impl Payload {
    fn xml(body: String) -> Self {
        Self {
            body,
            content_type: XML_CONTENT_TYPE,
        }
    }
}

/// Options for `<add>`. Unset options are not written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddOptions {
    pub overwrite: Option<bool>,
    pub commit_within_ms: Option<u64>,
}

impl AddOptions {
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = Some(overwrite);
        self
    }

    pub fn commit_within(mut self, ms: u64) -> Self {
        self.commit_within_ms = Some(ms);
        self
    }
}

/// Options for `<commit>`. Unset options are not written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitOptions {
    pub wait_flush: Option<bool>,
    pub wait_searcher: Option<bool>,
    pub expunge_deletes: Option<bool>,
}

impl CommitOptions {
    pub fn wait_flush(mut self, wait: bool) -> Self {
        self.wait_flush = Some(wait);
        self
    }

    pub fn wait_searcher(mut self, wait: bool) -> Self {
        self.wait_searcher = Some(wait);
        self
    }

    pub fn expunge_deletes(mut self, expunge: bool) -> Self {
        self.expunge_deletes = Some(expunge);
        self
    }
}

/// Options for `<optimize>`. Unset options are not written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptimizeOptions {
    pub wait_flush: Option<bool>,
    pub wait_searcher: Option<bool>,
    pub max_segments: Option<u32>,
}

impl OptimizeOptions {
    pub fn wait_flush(mut self, wait: bool) -> Self {
        self.wait_flush = Some(wait);
        self
    }

    pub fn wait_searcher(mut self, wait: bool) -> Self {
        self.wait_searcher = Some(wait);
        self
    }

    pub fn max_segments(mut self, segments: u32) -> Self {
        self.max_segments = Some(segments);
        self
    }
}

/// Command is one update operation sent to the update handler
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Add {
        documents: Vec<Document>,
        options: AddOptions,
    },
    Delete {
        ids: Vec<FieldValue>,
    },
    DeleteByQuery {
        query: String,
    },
    Commit(CommitOptions),
    Rollback,
    Optimize(OptimizeOptions),
}

impl Command {
    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Command::Add { .. } => "add",
            Command::Delete { .. } => "delete",
            Command::DeleteByQuery { .. } => "delete_by_query",
            Command::Commit(_) => "commit",
            Command::Rollback => "rollback",
            Command::Optimize(_) => "optimize",
        }
    }

    pub fn encode(&self) -> Result<Payload> {
        let payload = match self {
            Command::Add { documents, options } => encode_add(documents, options)?,
            Command::Delete { ids } => encode_delete(ids)?,
            Command::DeleteByQuery { query } => encode_delete_by_query(query)?,
            Command::Commit(options) => encode_commit(options),
            Command::Rollback => encode_rollback(),
            Command::Optimize(options) => encode_optimize(options),
        };

        tracing::debug!(
            "Encoded {} command ({} bytes)",
            self.name(),
            payload.body.len()
        );
        Ok(payload)
    }
}

/// `<add>` with one `<doc>` per document.
///
/// Fields are written in name order. `Null` fields are left out, and a
/// repeated field is written once per item.
pub fn encode_add(documents: &[Document], options: &AddOptions) -> Result<Payload> {
    if documents.is_empty() {
        return Err(Error::input("add requires at least one document"));
    }

    let mut attrs = Attributes::default();
    attrs.push("overwrite", options.overwrite);
    attrs.push("commitWithin", options.commit_within_ms);

    let mut body = format!("<add{}>", attrs);
    for doc in documents {
        body.push_str("<doc>");
        for (name, value) in doc.fields() {
            if name.is_empty() {
                return Err(Error::input("field names must not be empty"));
            }
            let name = escape(name);
            for text in encode_value(value) {
                body.push_str("<field name=\"");
                body.push_str(&name);
                body.push_str("\">");
                body.push_str(&escape(&*text));
                body.push_str("</field>");
            }
        }
        body.push_str("</doc>");
    }
    body.push_str("</add>");

    Ok(Payload::xml(body))
}

/// `<delete>` with one `<id>` per id
pub fn encode_delete(ids: &[FieldValue]) -> Result<Payload> {
    let mut body = String::from("<delete>");
    let mut count = 0;
    for id in ids {
        if id.is_null() {
            return Err(Error::input("document ids must not be null"));
        }
        for text in encode_value(id) {
            body.push_str("<id>");
            body.push_str(&escape(&*text));
            body.push_str("</id>");
            count += 1;
        }
    }
    if count == 0 {
        return Err(Error::input("delete requires at least one id"));
    }
    body.push_str("</delete>");

    Ok(Payload::xml(body))
}

/// `<delete><query>` with the query text as given. The server parses it,
/// so no term escaping is applied here.
pub fn encode_delete_by_query(query: &str) -> Result<Payload> {
    if query.trim().is_empty() {
        return Err(Error::input("delete by query requires a non-empty query"));
    }
    Ok(Payload::xml(format!(
        "<delete><query>{}</query></delete>",
        escape(query)
    )))
}

pub fn encode_commit(options: &CommitOptions) -> Payload {
    let mut attrs = Attributes::default();
    attrs.push("waitFlush", options.wait_flush);
    attrs.push("waitSearcher", options.wait_searcher);
    attrs.push("expungeDeletes", options.expunge_deletes);
    Payload::xml(format!("<commit{} />", attrs))
}

pub fn encode_rollback() -> Payload {
    Payload::xml("<rollback />".to_string())
}

pub fn encode_optimize(options: &OptimizeOptions) -> Payload {
    let mut attrs = Attributes::default();
    attrs.push("waitFlush", options.wait_flush);
    attrs.push("waitSearcher", options.wait_searcher);
    attrs.push("maxSegments", options.max_segments);
    Payload::xml(format!("<optimize{} />", attrs))
}

/// Space-prefixed `name="value"` list; only set options are written
#[derive(Default)]
struct Attributes(String);

impl Attributes {
    fn push<T: Display>(&mut self, name: &str, value: Option<T>) {
        if let Some(value) = value {
            let value = value.to_string();
            self.0.push(' ');
            self.0.push_str(name);
            self.0.push_str("=\"");
            self.0.push_str(&escape(value.as_str()));
            self.0.push('"');
        }
    }
}

impl Display for Attributes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
