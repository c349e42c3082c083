//! Errors raised while talking to the content source

use thiserror::Error;

/// Result type alias for content operations
pub type Result<T> = std::result::Result<T, Error>;

/// Failures of the content layer
#[derive(Error, Debug)]
pub enum Error {
    /// The requested document does not exist at the content source
    #[error("{kind} `{id}` not found")]
    NotFound { kind: String, id: String },

    /// Network or service failure
    #[error("content source unavailable: {0}")]
    SourceUnavailable(String),

    /// A document is missing a required field or has the wrong shape
    #[error("malformed content in {context}: {message}")]
    MalformedContent { context: String, message: String },
}

impl Error {
    pub fn not_found(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: kind.into(),
            id: id.into(),
        }
    }

    pub fn unavailable(message: impl std::fmt::Display) -> Self {
        Self::SourceUnavailable(message.to_string())
    }

    pub fn malformed(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedContent {
            context: context.into(),
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::malformed("response body", err.to_string())
        } else {
            Self::unavailable(err)
        }
    }
}
