use std::time::Duration;

use notebridge_core::GatewayError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LettaError {
    #[error("letta is not configured: {0}")]
    Unconfigured(&'static str),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("letta api error {status}: {body}")]
    Http { status: u16, body: String },
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("letta response carried no agent id")]
    MissingAgentId,
}

impl From<LettaError> for GatewayError {
    fn from(value: LettaError) -> Self {
        match value {
            LettaError::Unconfigured(_) => GatewayError::Unconfigured,
            LettaError::Timeout(duration) => GatewayError::Timeout(duration),
            LettaError::Http { status, body } => GatewayError::Api {
                status,
                message: body,
            },
            LettaError::Malformed(message) => GatewayError::Unparseable(message),
            other => GatewayError::Transport(other.to_string()),
        }
    }
}
