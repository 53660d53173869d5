#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Notify;

use notebridge_core::{AgentBackend, GatewayError, NotebookSnapshot};

pub fn fixture() -> Value {
    serde_json::from_str(include_str!("../fixtures/tlr4_analysis.json")).unwrap()
}

pub fn snapshot() -> NotebookSnapshot {
    serde_json::from_value(json!({
        "savedAt": "2025-10-26T13:20:24Z",
        "notebookId": "nb-tlr4",
        "snapshot": {
            "body": {"type": "doc", "content": [{"type": "paragraph", "text": "LPS dose response"}]},
            "tables": {"tbl-reporter": {"rows": [["LPS ng/mL", "NF-kB RLU"], ["10", "1.8"]]}},
            "protocols": {"prt-transfect": {"steps": ["seed HEK293", "co-transfect TLR4 and MD-2"]}}
        }
    }))
    .unwrap()
}

/// Agent backend that replays queued replies and records what it was sent.
pub struct ScriptedBackend {
    configured: bool,
    replies: Mutex<VecDeque<Result<String, GatewayError>>>,
    agent_ids: Mutex<VecDeque<Result<String, GatewayError>>>,
    gate: Option<Arc<Notify>>,
    pub creates: AtomicUsize,
    pub sent: Mutex<Vec<(String, String)>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self {
            configured: true,
            replies: Mutex::new(VecDeque::new()),
            agent_ids: Mutex::new(VecDeque::new()),
            gate: None,
            creates: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::new()
        }
    }

    /// Hold every `send_message` until the gate is notified.
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn reply(self, reply: Result<String, GatewayError>) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    pub fn agent(self, agent_id: Result<String, GatewayError>) -> Self {
        self.agent_ids.lock().unwrap().push_back(agent_id);
        self
    }

    pub fn create_count(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AgentBackend for ScriptedBackend {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn create_agent(&self, _notebook_id: Option<&str>) -> Result<String, GatewayError> {
        let count = self.creates.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::task::yield_now().await;
        self.agent_ids
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(format!("agent-{count}")))
    }

    async fn send_message(&self, agent_id: &str, content: &str) -> Result<String, GatewayError> {
        self.sent
            .lock()
            .unwrap()
            .push((agent_id.to_string(), content.to_string()));
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GatewayError::Transport("no scripted reply".to_string())))
    }
}
