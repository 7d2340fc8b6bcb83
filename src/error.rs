use thiserror::Error;

/// Shown whenever the service gave us nothing structured to report.
pub const GENERIC_FAILURE: &str =
    "An error occurred while processing your request. Please try again.";

/// Rejections raised before anything reaches the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Please enter a YouTube URL")]
    Empty,
    #[error("Please enter a valid YouTube URL")]
    Unsupported,
}

#[derive(Debug, Error)]
pub enum ClientError {
    /// Non-2xx response that carried a `detail` string.
    #[error("service error: {detail}")]
    Service { detail: String },

    /// Non-2xx response without a usable body.
    #[error("service returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A body arrived but did not have the expected shape.
    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("invalid service address: {0}")]
    Address(#[from] url::ParseError),
}

impl ClientError {
    /// The text the session shows for this failure. A structured `detail`
    /// wins over the generic message.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Service { detail } => format!("Error: {}", detail),
            _ => GENERIC_FAILURE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("conversion did not succeed, nothing to deliver")]
    NotConverted,

    #[error("file path '{0}' cannot be encoded as a delivery token")]
    AmbiguousPath(String),

    #[error("invalid delivery location: {0}")]
    Location(#[from] url::ParseError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("a conversion is already in progress")]
    Busy,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid backend url '{value}': {reason}")]
    BackendUrl { value: String, reason: String },

    #[error("download directory '{0}' is not a directory")]
    DownloadDir(String),
}
