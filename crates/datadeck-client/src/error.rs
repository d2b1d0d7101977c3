//! Client-side request errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
}

pub type Result<T> = std::result::Result<T, ClientError>;

impl From<ClientError> for datadeck_core::Error {
    fn from(e: ClientError) -> Self {
        datadeck_core::Error::Api(e.to_string())
    }
}
