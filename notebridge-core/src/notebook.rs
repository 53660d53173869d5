use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::slot::{Slot, Stamped};

/// One save event from the notebook editor: metadata plus the full document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotebookSnapshot {
    /// ISO timestamp of the save, as reported by the editor.
    pub saved_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notebook_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changes: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
    #[serde(default)]
    pub snapshot: NotebookDocument,
}

impl NotebookSnapshot {
    pub fn new(saved_at: impl Into<String>, document: NotebookDocument) -> Self {
        Self {
            saved_at: saved_at.into(),
            notebook_id: None,
            agent_id: None,
            report: None,
            changes: None,
            meta: None,
            snapshot: document,
        }
    }

    pub fn with_notebook_id(mut self, notebook_id: impl Into<String>) -> Self {
        self.notebook_id = Some(notebook_id.into());
        self
    }
}

/// The notebook document. Blocks are opaque JSON keyed by their stable ids;
/// keys the editor adds beyond these collections are kept in `extra`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotebookDocument {
    /// Rich-text body.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub body: Value,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tables: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub sequences: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub protocols: BTreeMap<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NotebookDocument {
    pub fn block_count(&self) -> usize {
        self.tables.len() + self.sequences.len() + self.protocols.len()
    }
}

pub type StoredSnapshot = Stamped<NotebookSnapshot>;

/// Holds the current notebook snapshot. Each save replaces it wholesale and
/// the newest save wins; there is no merge and no history.
#[derive(Default)]
pub struct NotebookStateStore {
    slot: Slot<NotebookSnapshot>,
}

impl NotebookStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save(&self, snapshot: NotebookSnapshot) -> Arc<StoredSnapshot> {
        let stored = self.slot.replace(snapshot);
        tracing::debug!(
            notebook_id = ?stored.value.notebook_id,
            blocks = stored.value.snapshot.block_count(),
            "notebook snapshot replaced"
        );
        stored
    }

    pub fn current(&self) -> Option<Arc<StoredSnapshot>> {
        self.slot.load()
    }
}
