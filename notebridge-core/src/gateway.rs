use std::sync::Arc;

use serde_json::Value;
use tracing::Instrument;

use crate::backend::AgentBackend;
use crate::extract::extract_json_object;
use crate::notebook::NotebookSnapshot;
use crate::session::AgentSession;
use crate::GatewayError;

const ANALYSIS_HEADER: &str = "ANALYZE NOTEBOOK:";
const NOTEBOOK_HEADER: &str = "NOTEBOOK:";
const ANALYSIS_INSTRUCTION: &str = "Reply with a single JSON object containing breakthroughSummary, \
recommendedEdit, expectedOutcome, confidence, nextSteps, analysisSummary, editedEntity and graph \
(at most 10 nodes; every edge source and target must be a node id). Do not add any other text.";

/// Turns a notebook snapshot into an analysis request and the agent's reply
/// into a raw JSON payload. The payload is not validated here.
#[derive(Clone)]
pub struct AgentGateway {
    backend: Arc<dyn AgentBackend>,
}

impl AgentGateway {
    pub fn new(backend: Arc<dyn AgentBackend>) -> Self {
        Self { backend }
    }

    pub fn is_configured(&self) -> bool {
        self.backend.is_configured()
    }

    pub fn can_create_agents(&self) -> bool {
        self.backend.can_create_agents()
    }

    /// Single attempt, no retries: transport failures go straight back to the caller.
    pub async fn request_analysis(
        &self,
        snapshot: &NotebookSnapshot,
        session: &AgentSession,
    ) -> Result<Value, GatewayError> {
        if !self.backend.is_configured() {
            return Err(GatewayError::Unconfigured);
        }

        let prompt = analysis_prompt(snapshot)?;
        let span = tracing::info_span!(
            "agent_analysis",
            agent_id = %session.agent_id,
            prompt_bytes = prompt.len(),
        );
        let reply = self
            .backend
            .send_message(&session.agent_id, &prompt)
            .instrument(span)
            .await?;
        tracing::debug!(reply_bytes = reply.len(), "agent reply received");
        extract_json_object(&reply)
    }

    /// Push the latest snapshot into the agent's conversation; the reply is ignored.
    pub async fn forward_snapshot(
        &self,
        snapshot: &NotebookSnapshot,
        session: &AgentSession,
    ) -> Result<(), GatewayError> {
        if !self.backend.is_configured() {
            return Err(GatewayError::Unconfigured);
        }
        let message = notebook_message(snapshot)?;
        self.backend
            .send_message(&session.agent_id, &message)
            .await
            .map(|_| ())
    }
}

pub fn analysis_prompt(snapshot: &NotebookSnapshot) -> Result<String, GatewayError> {
    Ok(format!(
        "{ANALYSIS_HEADER}\n{}\n\n{ANALYSIS_INSTRUCTION}",
        encode(snapshot)?
    ))
}

pub fn notebook_message(snapshot: &NotebookSnapshot) -> Result<String, GatewayError> {
    Ok(format!("{NOTEBOOK_HEADER}\n{}", encode(snapshot)?))
}

fn encode(snapshot: &NotebookSnapshot) -> Result<String, GatewayError> {
    serde_json::to_string_pretty(snapshot)
        .map_err(|err| GatewayError::Transport(format!("failed to encode notebook: {err}")))
}
