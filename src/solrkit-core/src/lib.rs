//! solrkit Core Library
//!
//! Network-free half of the Solr client:
//! - Document and field value model
//! - XML update command encoding
//! - Query parameters and Lucene term escaping
//! - JSON (and legacy XML) response decoding
//! - Client configuration

pub mod config;
pub mod error;
pub mod input;
pub mod models;
pub mod query;
pub mod response;
pub mod value;
mod xml;

// Re-export commonly used types
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use input::{AddOptions, Command, CommitOptions, OptimizeOptions, Payload};
pub use models::*;
pub use query::{escape_term, Query};
pub use response::{
    decode, FacetCount, FacetCounts, Highlighting, ResponseDocument, ResponseFormat,
    ResponseHeader, ResultSet, SearchResult,
};
pub use value::encode_value;
