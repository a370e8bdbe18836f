use pagecraft_sections::SectionsError;
use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

/// Failures talking to the content API. None of these are retried; the
/// caller decides what to do and the draft stays as it was.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    /// HTTP 401. The editor has to sign in again.
    #[error("Session expired, please sign in again")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("API returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Could not decode response: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Page is not valid: {0}")]
    Invalid(#[from] SectionsError),
}

impl ClientError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Unauthorized)
    }

    /// Map a non-success HTTP status and its body
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            401 => ClientError::Unauthorized,
            404 => ClientError::NotFound(body.trim().to_string()),
            _ => ClientError::Status {
                status,
                message: body.trim().to_string(),
            },
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

impl From<serde_yaml::Error> for ClientError {
    fn from(err: serde_yaml::Error) -> Self {
        ClientError::Config(err.to_string())
    }
}
