use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use serde::Serialize;

use crate::cache::{PublishedResult, ResultCache};
use crate::gateway::AgentGateway;
use crate::notebook::NotebookStateStore;
use crate::session::AgentSessionManager;
use crate::validate::validate;
use crate::{AnalyzeError, GatewayError, SessionError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Idle,
    Running,
}

/// Terminal state of the most recent run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    Committed,
    /// The agent reply failed validation.
    Rejected,
    Failed,
    NotConfigured,
}

#[derive(Debug)]
pub enum AnalyzeOutcome {
    Committed(Arc<PublishedResult>),
    /// Degraded mode: no platform credentials. The cache is untouched.
    NotConfigured,
}

/// Runs one analysis cycle at a time: snapshot, agent, validation, cache.
///
/// A call made while another is in flight returns [`AnalyzeError::Busy`]
/// immediately. No store lock is held across the agent call, so readers of
/// the notebook and the cache stay responsive during a run.
pub struct AnalysisOrchestrator {
    notebooks: Arc<NotebookStateStore>,
    cache: Arc<ResultCache>,
    sessions: Arc<AgentSessionManager>,
    gateway: AgentGateway,
    running: AtomicBool,
    last_outcome: Mutex<Option<RunOutcome>>,
}

impl AnalysisOrchestrator {
    pub fn new(
        notebooks: Arc<NotebookStateStore>,
        cache: Arc<ResultCache>,
        sessions: Arc<AgentSessionManager>,
        gateway: AgentGateway,
    ) -> Self {
        Self {
            notebooks,
            cache,
            sessions,
            gateway,
            running: AtomicBool::new(false),
            last_outcome: Mutex::new(None),
        }
    }

    pub fn state(&self) -> RunState {
        if self.running.load(Ordering::Acquire) {
            RunState::Running
        } else {
            RunState::Idle
        }
    }

    pub fn last_outcome(&self) -> Option<RunOutcome> {
        *self
            .last_outcome
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub async fn analyze(&self) -> Result<AnalyzeOutcome, AnalyzeError> {
        let Some(_running) = RunGuard::acquire(&self.running) else {
            tracing::warn!("analysis rejected: another run is in flight");
            return Err(AnalyzeError::Busy);
        };

        let started = Instant::now();
        let result = self.run().await;
        let outcome = match &result {
            Ok(AnalyzeOutcome::Committed(_)) => RunOutcome::Committed,
            Ok(AnalyzeOutcome::NotConfigured) => RunOutcome::NotConfigured,
            Err(AnalyzeError::Validation(_)) => RunOutcome::Rejected,
            Err(_) => RunOutcome::Failed,
        };
        *self
            .last_outcome
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(outcome);

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(AnalyzeOutcome::Committed(_)) => {
                tracing::info!(elapsed_ms, "analysis committed")
            }
            Ok(AnalyzeOutcome::NotConfigured) => {
                tracing::info!("analysis skipped: agent integration disabled")
            }
            Err(err) => tracing::warn!(elapsed_ms, outcome = ?outcome, error = %err, "analysis did not commit"),
        }

        result
    }

    async fn run(&self) -> Result<AnalyzeOutcome, AnalyzeError> {
        let snapshot = self.notebooks.current().ok_or(AnalyzeError::NoNotebook)?;
        if !self.gateway.is_configured() {
            return Ok(AnalyzeOutcome::NotConfigured);
        }

        let session = match self
            .sessions
            .create_session(snapshot.value.notebook_id.as_deref())
            .await
        {
            Ok(session) => session,
            Err(SessionError::Unconfigured) => return Ok(AnalyzeOutcome::NotConfigured),
            Err(SessionError::Unreachable(err)) => return Err(err.into()),
        };

        let payload = match self
            .gateway
            .request_analysis(&snapshot.value, &session)
            .await
        {
            Ok(payload) => payload,
            Err(GatewayError::Unconfigured) => return Ok(AnalyzeOutcome::NotConfigured),
            Err(err) => return Err(err.into()),
        };

        let result = validate(&payload)?;
        Ok(AnalyzeOutcome::Committed(self.cache.publish(result)))
    }
}

/// Holds the single-flight flag for the lifetime of a run, including when the
/// run's future is dropped part way.
struct RunGuard<'a>(&'a AtomicBool);

impl<'a> RunGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
