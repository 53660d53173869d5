//! Schema enforcement for analysis payloads.
//!
//! The agent's reply is untrusted: every field is re-checked here before a
//! result may reach the cache. Checks run in a fixed order and stop at the
//! first failure:
//!
//! 1. structure (required fields present, expected types),
//! 2. `confidence` and `editedEntity.confidence` within `[0.0, 1.0]`,
//! 3. at most [`MAX_GRAPH_NODES`] graph nodes,
//! 4. unique node ids, then every edge endpoint naming an existing node.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::schema::{
    AnalysisResult, EditedEntity, Graph, GraphEdge, GraphNode, RecommendedEdit, SourcedText,
    MAX_GRAPH_NODES,
};

/// A rejected payload: where it failed and which rule it broke.
#[derive(Clone, Debug, PartialEq, Error)]
#[error("{path}: {rule}")]
pub struct ValidationError {
    pub path: String,
    pub rule: ValidationRule,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, rule: ValidationRule) -> Self {
        Self {
            path: path.into(),
            rule,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ValidationRule {
    Missing,
    WrongType { expected: &'static str },
    Empty,
    OutOfRange { value: f64, min: f64, max: f64 },
    TooManyNodes { count: usize, max: usize },
    DuplicateNodeId { id: String },
    DanglingEdgeEndpoint { id: String },
}

impl ValidationRule {
    /// Stable machine-readable name, used in API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            ValidationRule::Missing => "missing",
            ValidationRule::WrongType { .. } => "wrong_type",
            ValidationRule::Empty => "empty",
            ValidationRule::OutOfRange { .. } => "out_of_range",
            ValidationRule::TooManyNodes { .. } => "too_many_nodes",
            ValidationRule::DuplicateNodeId { .. } => "duplicate_node_id",
            ValidationRule::DanglingEdgeEndpoint { .. } => "dangling_edge_endpoint",
        }
    }
}

impl fmt::Display for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationRule::Missing => write!(f, "required field is missing"),
            ValidationRule::WrongType { expected } => write!(f, "expected {expected}"),
            ValidationRule::Empty => write!(f, "must not be empty"),
            ValidationRule::OutOfRange { value, min, max } => {
                write!(f, "{value} is outside [{min}, {max}]")
            }
            ValidationRule::TooManyNodes { count, max } => {
                write!(f, "{count} nodes exceeds the limit of {max}")
            }
            ValidationRule::DuplicateNodeId { id } => write!(f, "node id '{id}' is not unique"),
            ValidationRule::DanglingEdgeEndpoint { id } => {
                write!(f, "'{id}' does not name a node in the graph")
            }
        }
    }
}

/// Top-level keys (canonical and aliases) consumed by the schema; anything
/// else is carried through as an extension.
const KNOWN_KEYS: &[&str] = &[
    "breakthroughSummary",
    "breakthrough_summary",
    "recommendedEdit",
    "recommended_edit",
    "recommended_protein_edit",
    "expectedOutcome",
    "expected_outcome",
    "confidence",
    "nextSteps",
    "next_steps",
    "analysisSummary",
    "analysis_summary",
    "editedEntity",
    "edited_entity",
    "edited_protein",
    "graph",
];

/// Validate a raw payload and build the structured result. Pure: no shared
/// state is read or written.
pub fn validate(raw: &Value) -> Result<AnalysisResult, ValidationError> {
    let result = parse_result(raw)?;

    check_confidence("confidence", result.confidence)?;
    check_confidence("editedEntity.confidence", result.edited_entity.confidence)?;
    check_graph(&result.graph)?;

    Ok(result)
}

fn check_confidence(path: &str, value: f64) -> Result<(), ValidationError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::new(
            path,
            ValidationRule::OutOfRange {
                value,
                min: 0.0,
                max: 1.0,
            },
        ))
    }
}

fn check_graph(graph: &Graph) -> Result<(), ValidationError> {
    if graph.nodes.len() > MAX_GRAPH_NODES {
        return Err(ValidationError::new(
            "graph.nodes",
            ValidationRule::TooManyNodes {
                count: graph.nodes.len(),
                max: MAX_GRAPH_NODES,
            },
        ));
    }

    let mut ids = HashSet::with_capacity(graph.nodes.len());
    for (index, node) in graph.nodes.iter().enumerate() {
        if !ids.insert(node.id.as_str()) {
            return Err(ValidationError::new(
                format!("graph.nodes[{index}].id"),
                ValidationRule::DuplicateNodeId {
                    id: node.id.clone(),
                },
            ));
        }
    }

    for (index, edge) in graph.edges.iter().enumerate() {
        for (field, id) in [("source", &edge.source), ("target", &edge.target)] {
            if !ids.contains(id.as_str()) {
                return Err(ValidationError::new(
                    format!("graph.edges[{index}].{field}"),
                    ValidationRule::DanglingEdgeEndpoint { id: id.clone() },
                ));
            }
        }
    }

    Ok(())
}

fn parse_result(raw: &Value) -> Result<AnalysisResult, ValidationError> {
    let root = Fields::object(raw, "")?;

    let breakthrough_summary = root.text(&["breakthroughSummary", "breakthrough_summary"])?;
    if breakthrough_summary.text.trim().is_empty() {
        return Err(ValidationError::new(
            "breakthroughSummary",
            ValidationRule::Empty,
        ));
    }

    let edit = root.nested(&[
        "recommendedEdit",
        "recommended_edit",
        "recommended_protein_edit",
    ])?;
    let recommended_edit = RecommendedEdit {
        target: edit.text(&["target", "target_protein", "targetProtein"])?,
        kind: edit.text(&["kind", "edit_type", "editType"])?,
        details: edit.text(&["details", "edit_details", "editDetails"])?,
        rationale: edit.text(&["rationale"])?,
    };

    let expected_outcome = root.text(&["expectedOutcome", "expected_outcome"])?;
    let confidence = root.number(&["confidence"])?;
    let next_steps = root.text_list(&["nextSteps", "next_steps"])?;
    let analysis_summary = root.text(&["analysisSummary", "analysis_summary"])?;

    let entity = root.nested(&["editedEntity", "edited_entity", "edited_protein"])?;
    let edited_entity = EditedEntity {
        id: entity.string(&["id"])?,
        label: entity.string(&["label"])?,
        description: entity.text(&["description"])?,
        mutations: entity.text_list(&["mutations"])?,
        confidence: entity.number(&["confidence"])?,
    };

    let graph = parse_graph(&root.nested(&["graph"])?)?;

    let extensions = root
        .map
        .iter()
        .filter(|(key, _)| !KNOWN_KEYS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect::<BTreeMap<_, _>>();

    Ok(AnalysisResult {
        breakthrough_summary,
        recommended_edit,
        expected_outcome,
        confidence,
        next_steps,
        analysis_summary,
        edited_entity,
        graph,
        extensions,
    })
}

fn parse_graph(graph: &Fields<'_>) -> Result<Graph, ValidationError> {
    let (nodes, nodes_path) = graph.array(&["nodes"])?;
    let nodes = nodes
        .iter()
        .enumerate()
        .map(|(index, value)| parse_node(&Fields::object(value, format!("{nodes_path}[{index}]"))?))
        .collect::<Result<Vec<_>, _>>()?;

    let (edges, edges_path) = graph.array(&["edges"])?;
    let edges = edges
        .iter()
        .enumerate()
        .map(|(index, value)| parse_edge(&Fields::object(value, format!("{edges_path}[{index}]"))?))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Graph { nodes, edges })
}

fn parse_node(node: &Fields<'_>) -> Result<GraphNode, ValidationError> {
    Ok(GraphNode {
        id: node.string(&["id"])?,
        label: node.string(&["label"])?,
        kind: node.string(&["type"])?,
        is_edited: node.boolean(&["isEdited", "is_edited"])?,
        notes: node.text(&["notes"])?,
        relationship_to_edited: node
            .optional_text(&["relationship_to_edited", "relationshipToEdited"])?,
        role_summary: node.optional_text(&["role_summary", "roleSummary"])?,
        source_ids: node.source_ids()?,
    })
}

fn parse_edge(edge: &Fields<'_>) -> Result<GraphEdge, ValidationError> {
    Ok(GraphEdge {
        source: edge.string(&["source"])?,
        target: edge.string(&["target"])?,
        interaction: edge.text(&["interaction"])?,
        mechanism: edge.text(&["mechanism"])?,
        explanation: edge.optional_text(&["explanation"])?,
        source_ids: edge.source_ids()?,
    })
}

/// A JSON object plus the path it was reached by.
struct Fields<'a> {
    path: String,
    map: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    fn object(value: &'a Value, path: impl Into<String>) -> Result<Self, ValidationError> {
        let path = path.into();
        match value {
            Value::Object(map) => Ok(Self { path, map }),
            _ => Err(wrong_type(root_label(&path), "object")),
        }
    }

    /// Path for `key`; the first alias in a lookup list is the canonical name.
    fn child(&self, key: &str) -> String {
        if self.path.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.path, key)
        }
    }

    fn lookup(&self, keys: &[&str]) -> Option<&'a Value> {
        keys.iter()
            .filter_map(|key| self.map.get(*key))
            .find(|value| !value.is_null())
    }

    fn required(&self, keys: &[&str]) -> Result<(&'a Value, String), ValidationError> {
        let path = self.child(keys[0]);
        match self.lookup(keys) {
            Some(value) => Ok((value, path)),
            None => Err(ValidationError::new(path, ValidationRule::Missing)),
        }
    }

    fn nested(&self, keys: &[&str]) -> Result<Fields<'a>, ValidationError> {
        let (value, path) = self.required(keys)?;
        Fields::object(value, path)
    }

    fn array(&self, keys: &[&str]) -> Result<(&'a Vec<Value>, String), ValidationError> {
        let (value, path) = self.required(keys)?;
        match value {
            Value::Array(items) => Ok((items, path)),
            _ => Err(wrong_type(path, "array")),
        }
    }

    fn string(&self, keys: &[&str]) -> Result<String, ValidationError> {
        let (value, path) = self.required(keys)?;
        match value {
            Value::String(text) => Ok(text.clone()),
            _ => Err(wrong_type(path, "string")),
        }
    }

    fn number(&self, keys: &[&str]) -> Result<f64, ValidationError> {
        let (value, path) = self.required(keys)?;
        value.as_f64().ok_or_else(|| wrong_type(path, "number"))
    }

    fn boolean(&self, keys: &[&str]) -> Result<bool, ValidationError> {
        let (value, path) = self.required(keys)?;
        value.as_bool().ok_or_else(|| wrong_type(path, "boolean"))
    }

    fn text(&self, keys: &[&str]) -> Result<SourcedText, ValidationError> {
        let (value, path) = self.required(keys)?;
        sourced_text(value, path)
    }

    fn optional_text(&self, keys: &[&str]) -> Result<Option<SourcedText>, ValidationError> {
        match self.lookup(keys) {
            Some(value) => sourced_text(value, self.child(keys[0])).map(Some),
            None => Ok(None),
        }
    }

    fn text_list(&self, keys: &[&str]) -> Result<Vec<SourcedText>, ValidationError> {
        let (items, path) = self.array(keys)?;
        items
            .iter()
            .enumerate()
            .map(|(index, item)| sourced_text(item, format!("{path}[{index}]")))
            .collect()
    }

    fn source_ids(&self) -> Result<Vec<String>, ValidationError> {
        let keys = ["source_ids", "sourceIds"];
        let Some(value) = self.lookup(&keys) else {
            return Ok(Vec::new());
        };
        let path = self.child(keys[0]);
        let Value::Array(items) = value else {
            return Err(wrong_type(path, "array of strings"));
        };
        items
            .iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::String(id) => Ok(id.clone()),
                _ => Err(wrong_type(format!("{path}[{index}]"), "string")),
            })
            .collect()
    }
}

fn sourced_text(value: &Value, path: String) -> Result<SourcedText, ValidationError> {
    match value {
        Value::String(text) => Ok(SourcedText::new(text.clone())),
        Value::Object(_) => {
            let fields = Fields::object(value, path)?;
            Ok(SourcedText {
                text: fields.string(&["text"])?,
                source_ids: fields.source_ids()?,
            })
        }
        _ => Err(wrong_type(path, "text")),
    }
}

fn wrong_type(path: impl Into<String>, expected: &'static str) -> ValidationError {
    ValidationError::new(path, ValidationRule::WrongType { expected })
}

fn root_label(path: &str) -> String {
    if path.is_empty() {
        "$".to_string()
    } else {
        path.to_string()
    }
}
