//! solrkit Client Library
//!
//! Async HTTP client for indexing into and querying a Solr core.

mod client;
pub mod transport;

pub use client::Client;
pub use solrkit_core::{
    documents_from_json, escape_term, AddOptions, ClientConfig, Command, CommitOptions,
    Document, FacetCount, FacetCounts, FieldValue, Highlighting, OptimizeOptions, Query,
    ResponseDocument, ResponseHeader, ResultSet, SearchResult,
};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Malformed document, id or value; nothing was sent.
    #[error("Invalid input: {0}")]
    Input(String),

    /// The server answered with a status outside the accepted set. The
    /// body is kept as-is and not interpreted.
    #[error("Unexpected HTTP status {status} (expected one of {expected:?})")]
    WrongHttpStatus {
        status: u16,
        expected: Vec<u16>,
        body: String,
    },

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Transport error: {0}")]
    Transport(String),

    /// The body reported a non-zero status or could not be decoded.
    #[error("Solr response error (status {status:?}): {message}")]
    SolrResponse {
        status: Option<i64>,
        message: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<solrkit_core::Error> for ClientError {
    fn from(err: solrkit_core::Error) -> Self {
        match err {
            solrkit_core::Error::Input(message) => ClientError::Input(message),
            solrkit_core::Error::SolrResponse { status, message } => {
                ClientError::SolrResponse { status, message }
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
