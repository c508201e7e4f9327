use thiserror::Error;

/// Every failure a portal operation can surface.
///
/// Views render the `Display` text as-is, so server messages stay verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// No response was received (connection refused, DNS, timeout...).
    #[error("{message}")]
    Transport { message: String },

    /// Non-success HTTP status. `message` is the server's own message when
    /// the body carried one, otherwise a generic status line.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// A client-side check failed; nothing was sent.
    #[error("{message}")]
    Precondition { message: String },

    /// A success response whose body did not have the expected shape.
    #[error("Unexpected response: {message}")]
    Decode { message: String },

    /// The persisted session store could not be read or written.
    #[error("Session storage error: {message}")]
    Storage { message: String },
}

impl ApiError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    /// The fallback used when an error response carries no usable message.
    pub fn generic_status(status: u16) -> Self {
        Self::status(status, format!("Request failed with status {status}"))
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition {
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status_code(), Some(401 | 403))
    }

    /// True when the error was raised locally before any request went out.
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Precondition { .. })
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return Self::transport(format!("Request timed out: {e}"));
        }
        Self::transport(format!("Network error: {e}"))
    }
}
