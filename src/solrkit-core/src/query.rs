/// Characters with a meaning in the Lucene query syntax
const LUCENE_SPECIAL: &[char] = &[
    '+', '-', '&', '|', '!', '(', ')', '{', '}', '[', ']', '^', '"', '~', '*', '?', ':', '\\',
];

/// Escape a literal term for embedding in a Lucene query.
///
/// Only apply this to text meant to be matched literally, never to a whole
/// query that uses operators of its own.
pub fn escape_term(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if LUCENE_SPECIAL.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Query is a select request: the `q` text plus ordered request parameters.
///
/// Parameters are passed through as given, so repeated names (several
/// `fq` or `facet.field`) are kept in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    q: String,
    params: Vec<(String, String)>,
}

impl Query {
    pub fn new(q: impl Into<String>) -> Self {
        Self {
            q: q.into(),
            params: Vec::new(),
        }
    }

    /// Build from keyword-style names, where `_` stands for `.`
    /// (`hl_fl` becomes `hl.fl`, `facet_field` becomes `facet.field`).
    /// Names that already contain a `.` are sent unchanged.
    pub fn from_pairs<I, K, V>(q: impl Into<String>, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        pairs.into_iter().fold(Self::new(q), |query, (name, value)| {
            let name = name.as_ref();
            if name.contains('.') {
                query.param(name, value)
            } else {
                query.param(name.replace('_', "."), value)
            }
        })
    }

    pub fn query(&self) -> &str {
        &self.q
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Raw parameter. A `q` parameter replaces the query text.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        if name == "q" {
            self.q = value.into();
        } else {
            self.params.push((name, value.into()));
        }
        self
    }

    /// Filter query (`fq`); may be given more than once
    pub fn filter(self, fq: impl Into<String>) -> Self {
        self.param("fq", fq)
    }

    /// Field list (`fl`), comma separated, or `*` for all stored fields
    pub fn fields(self, fl: impl Into<String>) -> Self {
        self.param("fl", fl)
    }

    /// Sort spec, e.g. `popularity desc`
    pub fn sort(self, sort: impl Into<String>) -> Self {
        self.param("sort", sort)
    }

    pub fn rows(self, rows: u32) -> Self {
        self.param("rows", rows.to_string())
    }

    pub fn start(self, start: u64) -> Self {
        self.param("start", start.to_string())
    }

    pub fn facet(self, enabled: bool) -> Self {
        self.set("facet", enabled.to_string())
    }

    /// Field facet; turns faceting on
    pub fn facet_field(self, field: impl Into<String>) -> Self {
        self.enable("facet").param("facet.field", field)
    }

    /// Query facet; turns faceting on
    pub fn facet_query(self, query: impl Into<String>) -> Self {
        self.enable("facet").param("facet.query", query)
    }

    pub fn highlight(self, enabled: bool) -> Self {
        self.set("hl", enabled.to_string())
    }

    /// Fields to highlight (`hl.fl`); turns highlighting on
    pub fn highlight_fields(self, fl: impl Into<String>) -> Self {
        self.enable("hl").param("hl.fl", fl)
    }

    /// Parameters for the wire, with the response writer forced to `wt`.
    pub fn to_params(&self, wt: &str) -> Vec<(String, String)> {
        let mut out = Vec::with_capacity(self.params.len() + 2);
        out.push(("q".to_string(), self.q.clone()));
        out.extend(
            self.params
                .iter()
                .filter(|(name, _)| name != "wt")
                .cloned(),
        );
        out.push(("wt".to_string(), wt.to_string()));
        out
    }

    fn set(mut self, name: &str, value: String) -> Self {
        self.params.retain(|(n, _)| n != name);
        self.params.push((name.to_string(), value));
        self
    }

    fn enable(self, name: &str) -> Self {
        if self.params.iter().any(|(n, _)| n == name) {
            self
        } else {
            self.param(name, "true")
        }
    }
}

impl From<&str> for Query {
    fn from(q: &str) -> Self {
        Query::new(q)
    }
}

impl From<String> for Query {
    fn from(q: String) -> Self {
        Query::new(q)
    }
}
