use thiserror::Error;

/// Every way a call to the diagnosis service can fail. Callers that only need a
/// pass/fail signal can treat all variants alike.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("diagnosis service returned HTTP {status}")]
    Status {
        status: u16,
        message: Option<String>,
    },
    #[error("malformed response from diagnosis service: {0}")]
    Decode(String),
    #[error("invalid image upload: {0}")]
    InvalidUpload(String),
}

impl ServiceError {
    /// The `message` field of a non-2xx body, when the server sent one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            Self::Decode(value.to_string())
        } else {
            Self::Transport(value.to_string())
        }
    }
}
