use async_trait::async_trait;

use crate::GatewayError;

/// Transport to the external conversational agent platform.
///
/// Implementations return [`GatewayError::Unconfigured`] when credentials are
/// absent instead of failing at construction, so the bridge can run degraded.
#[async_trait]
pub trait AgentBackend: Send + Sync {
    /// Whether credentials are present. When `false` every call returns
    /// [`GatewayError::Unconfigured`].
    fn is_configured(&self) -> bool;

    /// Whether new agents can be created, which may need more than
    /// credentials (a template, for instance).
    fn can_create_agents(&self) -> bool {
        self.is_configured()
    }

    /// Create a fresh agent and return its id.
    async fn create_agent(&self, notebook_id: Option<&str>) -> Result<String, GatewayError>;

    /// Send one user message to an agent and return the agent's reply text.
    async fn send_message(&self, agent_id: &str, content: &str) -> Result<String, GatewayError>;
}

/// Backend used when no platform credentials are available.
#[derive(Clone, Copy, Debug, Default)]
pub struct DisabledBackend;

#[async_trait]
impl AgentBackend for DisabledBackend {
    fn is_configured(&self) -> bool {
        false
    }

    async fn create_agent(&self, _notebook_id: Option<&str>) -> Result<String, GatewayError> {
        Err(GatewayError::Unconfigured)
    }

    async fn send_message(&self, _agent_id: &str, _content: &str) -> Result<String, GatewayError> {
        Err(GatewayError::Unconfigured)
    }
}
