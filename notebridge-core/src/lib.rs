//! Analysis orchestration and validation for the notebook bridge.
//!
//! The flow is: a notebook save replaces the snapshot in
//! [`NotebookStateStore`]; [`AnalysisOrchestrator::analyze`] sends that
//! snapshot to the agent through [`AgentGateway`], validates the reply with
//! [`validate`] and publishes it to [`ResultCache`], where pollers read it.
//!
//! The external platform sits behind [`AgentBackend`]. Without credentials
//! the bridge runs with [`DisabledBackend`] and every analysis reports
//! "not configured" instead of failing.

mod backend;
mod cache;
mod error;
mod extract;
mod gateway;
mod notebook;
mod orchestrator;
mod schema;
mod session;
mod slot;
mod validate;

pub use backend::{AgentBackend, DisabledBackend};
pub use cache::{PublishedResult, ResultCache};
pub use error::{AnalyzeError, GatewayError, SessionError};
pub use extract::extract_json_object;
pub use gateway::{analysis_prompt, notebook_message, AgentGateway};
pub use notebook::{NotebookDocument, NotebookSnapshot, NotebookStateStore, StoredSnapshot};
pub use orchestrator::{AnalysisOrchestrator, AnalyzeOutcome, RunOutcome, RunState};
pub use schema::{
    AnalysisResult, EditedEntity, Graph, GraphEdge, GraphNode, RecommendedEdit, SourcedText,
    MAX_GRAPH_NODES,
};
pub use session::{AgentSession, AgentSessionManager};
pub use slot::{Slot, Stamped};
pub use validate::{validate, ValidationError, ValidationRule};
