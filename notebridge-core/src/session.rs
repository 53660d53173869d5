use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::backend::AgentBackend;
use crate::SessionError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSession {
    pub agent_id: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notebook_id: Option<String>,
}

/// Holds the one agent session of this process.
///
/// Creation is idempotent: once a session exists it is returned as is.
/// Concurrent creators are serialized so the platform sees a single create.
/// The session lives in memory only and goes stale if the platform restarts.
pub struct AgentSessionManager {
    backend: Arc<dyn AgentBackend>,
    current: RwLock<Option<AgentSession>>,
    create_lock: Mutex<()>,
}

impl AgentSessionManager {
    pub fn new(backend: Arc<dyn AgentBackend>) -> Self {
        Self {
            backend,
            current: RwLock::new(None),
            create_lock: Mutex::new(()),
        }
    }

    pub fn current(&self) -> Option<AgentSession> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub async fn create_session(
        &self,
        notebook_id: Option<&str>,
    ) -> Result<AgentSession, SessionError> {
        if let Some(session) = self.current() {
            return Ok(session);
        }
        if !self.backend.is_configured() {
            return Err(SessionError::Unconfigured);
        }

        let _creating = self.create_lock.lock().await;
        if let Some(session) = self.current() {
            return Ok(session);
        }

        let agent_id = self
            .backend
            .create_agent(notebook_id)
            .await
            .map_err(|err| {
                tracing::warn!(error = %err, "agent creation failed");
                SessionError::from(err)
            })?;

        let session = AgentSession {
            agent_id,
            created_at: Utc::now(),
            notebook_id: notebook_id.map(ToOwned::to_owned),
        };
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        tracing::info!(
            agent_id = %session.agent_id,
            notebook_id = ?session.notebook_id,
            "agent session created"
        );
        Ok(session)
    }
}
