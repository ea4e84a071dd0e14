use thiserror::Error;

/// Why a question bank could not be produced. The message is shown to the
/// learner as the "data unavailable" state, so keep it readable.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("dictionary file `{name}` was not found")]
    Missing { name: String },

    #[error("failed to read `{name}`: {source}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("download failed ({reason}): {url}")]
    Download { url: String, reason: String },

    #[error("load was cancelled")]
    Cancelled,
}

impl LoadError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, LoadError::Cancelled)
    }
}
