use thiserror::Error;

/// The primary error type for all fallible operations in this crate.
#[derive(Debug, Error)]
pub enum NewsError {
    /// An error occurred during an HTTP request.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a failure envelope or a non-2xx status.
    #[error("API error ({status}): {message}")]
    Api {
        /// The HTTP status code of the response.
        status: u16,
        /// The machine-readable error code from the envelope, if any.
        code: Option<String>,
        /// The human-readable message from the envelope, or the HTTP status line.
        message: String,
    },

    /// An error occurred during JSON deserialization.
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// A provided URL could not be parsed.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The data received from the API was in an unexpected format or was missing a required field.
    #[error("Data format unexpected or missing field: {0}")]
    Data(String),

    /// Any other failure, carrying its original message.
    #[error("{0}")]
    Unknown(String),
}

/// The coarse failure classes a caller needs to decide what to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The server could not be reached at all.
    Transport,
    /// The server responded, but with a failure.
    Protocol,
    /// Anything else.
    Unknown,
}

pub(crate) const CHECK_CONNECTION: &str = "Please check your network connection";

impl NewsError {
    /// Classifies this error into one of the three fetch failure kinds.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Http(e) if e.is_connect() || e.is_timeout() || e.is_request() => {
                ErrorKind::Transport
            }
            Self::Api { .. } => ErrorKind::Protocol,
            _ => ErrorKind::Unknown,
        }
    }

    /// Returns the HTTP status attached to a protocol failure.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the server error code attached to a protocol failure.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// The text to show an end user for this failure.
    ///
    /// Transport failures become a generic connectivity hint, protocol failures
    /// surface the server message unchanged, and anything else keeps its
    /// original message.
    #[must_use]
    pub fn user_message(&self) -> String {
        match (self.kind(), self) {
            (ErrorKind::Transport, _) => CHECK_CONNECTION.to_string(),
            (_, Self::Api { message, .. }) => message.clone(),
            (_, Self::Unknown(message) | Self::Data(message)) => message.clone(),
            (_, other) => other.to_string(),
        }
    }
}
