/// Errors raised while encoding commands or decoding Solr responses.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The caller handed the encoder something it cannot express as a
    /// Solr update command. Raised before any network activity.
    #[error("Invalid input: {0}")]
    Input(String),

    /// The body decoded but carried a non-zero status, or it could not be
    /// decoded in the expected format at all (`status` is `None` then).
    #[error("Solr response error (status {}): {message}", display_status(.status))]
    SolrResponse {
        status: Option<i64>,
        message: String,
    },
}

fn display_status(status: &Option<i64>) -> String {
    match status {
        Some(code) => code.to_string(),
        None => "unknown".to_string(),
    }
}

impl Error {
    pub(crate) fn input(message: impl Into<String>) -> Self {
        Error::Input(message.into())
    }

    pub(crate) fn unparsable(message: impl Into<String>) -> Self {
        Error::SolrResponse {
            status: None,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
