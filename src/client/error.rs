//! Error taxonomy for client-side operations.

use crate::common::ApiFailure;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Login rejected by the server (envelope 401 on the login endpoint).
    #[error("invalid credentials: {0}")]
    Credentials(String),
    /// A protected call was made without a usable token, or the server no
    /// longer recognizes the one attached.
    #[error("not authenticated")]
    NotAuthenticated,
    #[error("not found: {0}")]
    NotFound(String),
    /// Request rejected as malformed (envelope 400).
    #[error("request rejected: {0}")]
    Rejected(String),
    /// Any other non-zero envelope code.
    #[error("api failure {code}: {message}")]
    Api { code: i32, message: String },
    /// Explicit caller abort; only the upload path produces this.
    #[error("transfer cancelled")]
    Cancelled,
    /// Network or response-parse failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl From<ApiFailure> for ClientError {
    fn from(failure: ApiFailure) -> Self {
        match failure.code {
            401 => ClientError::NotAuthenticated,
            404 => ClientError::NotFound(failure.message),
            400 => ClientError::Rejected(failure.message),
            _ => ClientError::Api {
                code: failure.code,
                message: failure.message,
            },
        }
    }
}

impl ClientError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ClientError::Cancelled)
    }
}
