use std::time::Duration;

use thiserror::Error;

use crate::ValidationError;

/// Failures at the boundary with the external agent platform.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("agent integration is not configured")]
    Unconfigured,
    #[error("agent platform timed out after {0:?}")]
    Timeout(Duration),
    #[error("agent platform transport failure: {0}")]
    Transport(String),
    #[error("agent platform error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("agent reply is unparseable: {0}")]
    Unparseable(String),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("agent integration is not configured")]
    Unconfigured,
    #[error("agent platform unreachable: {0}")]
    Unreachable(#[source] GatewayError),
}

impl From<GatewayError> for SessionError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Unconfigured => SessionError::Unconfigured,
            other => SessionError::Unreachable(other),
        }
    }
}

/// Why an `analyze` call did not commit a result.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("an analysis is already running")]
    Busy,
    #[error("no notebook snapshot has been saved")]
    NoNotebook,
    #[error("analysis rejected: {0}")]
    Validation(#[from] ValidationError),
    #[error("analysis failed: {0}")]
    Gateway(#[from] GatewayError),
}
