use std::collections::BTreeMap;

use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;
use serde_json::Value;

/// Upper bound on the number of nodes an interaction graph may carry.
pub const MAX_GRAPH_NODES: usize = 10;

/// A text field with optional source attribution.
///
/// The agent may emit either a bare string or `{"text": ..., "source_ids": [...]}`.
/// Serialization mirrors that: a plain string when no sources are attached,
/// otherwise the object form with the platform's `source_ids` key.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SourcedText {
    pub text: String,
    pub source_ids: Vec<String>,
}

impl SourcedText {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source_ids: Vec::new(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl From<&str> for SourcedText {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SourcedText {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl Serialize for SourcedText {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.source_ids.is_empty() {
            return serializer.serialize_str(&self.text);
        }
        let mut state = serializer.serialize_struct("SourcedText", 2)?;
        state.serialize_field("text", &self.text)?;
        state.serialize_field("source_ids", &self.source_ids)?;
        state.end()
    }
}

/// The validated output of one analysis cycle.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub breakthrough_summary: SourcedText,
    pub recommended_edit: RecommendedEdit,
    pub expected_outcome: SourcedText,
    pub confidence: f64,
    pub next_steps: Vec<SourcedText>,
    pub analysis_summary: SourcedText,
    pub edited_entity: EditedEntity,
    pub graph: Graph,
    /// Top-level keys outside the schema (statistics, visualizations, ...),
    /// passed through untouched for the visualization client.
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RecommendedEdit {
    pub target: SourcedText,
    pub kind: SourcedText,
    pub details: SourcedText,
    pub rationale: SourcedText,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EditedEntity {
    pub id: String,
    pub label: String,
    pub description: SourcedText,
    pub mutations: Vec<SourcedText>,
    pub confidence: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Graph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl Graph {
    pub fn edited_nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.iter().filter(|node| node.is_edited)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub is_edited: bool,
    pub notes: SourcedText,
    // Annotation keys keep the platform's snake_case spelling on the way out.
    #[serde(
        rename = "relationship_to_edited",
        skip_serializing_if = "Option::is_none"
    )]
    pub relationship_to_edited: Option<SourcedText>,
    #[serde(rename = "role_summary", skip_serializing_if = "Option::is_none")]
    pub role_summary: Option<SourcedText>,
    #[serde(rename = "source_ids", skip_serializing_if = "Vec::is_empty")]
    pub source_ids: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub interaction: SourcedText,
    pub mechanism: SourcedText,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<SourcedText>,
    #[serde(rename = "source_ids", skip_serializing_if = "Vec::is_empty")]
    pub source_ids: Vec<String>,
}
