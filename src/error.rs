use reqwest::StatusCode;

/// Failure talking to the remote book service. The shelf treats every variant alike.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("SetupError")]
    Setup(#[source] reqwest::Error),
    #[error("TransportError: {method} {path}")]
    Transport {
        method: &'static str,
        path: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("StatusError: {method} {path} returned {status}")]
    Status {
        method: &'static str,
        path: String,
        status: StatusCode,
    },
    #[error("DecodeError: {method} {path}")]
    Decode {
        method: &'static str,
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
