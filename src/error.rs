use thiserror::Error;

pub type ClientResult<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    /// A tree, upload or file-content call answered with a non-success status.
    #[error("request failed: {message}")]
    RequestFailed { message: String },
    #[error("transport send failed: {0}")]
    TransportSendFailed(String),
    #[error("transport connect failed: {0}")]
    Connect(String),
    #[error("transport protocol error: {0}")]
    Protocol(String),
    #[error("storage error: {0}")]
    Storage(String),
}

impl ClientError {
    pub fn request_failed(message: impl Into<String>) -> Self {
        ClientError::RequestFailed {
            message: message.into(),
        }
    }

    /// Text suitable for a user-facing notification.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::RequestFailed { message } => message.clone(),
            other => other.to_string(),
        }
    }
}
