use std::sync::Arc;

use crate::schema::AnalysisResult;
use crate::slot::{Slot, Stamped};

pub type PublishedResult = Stamped<AnalysisResult>;

/// The most recently validated analysis result.
#[derive(Default)]
pub struct ResultCache {
    slot: Slot<AnalysisResult>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, result: AnalysisResult) -> Arc<PublishedResult> {
        let published = self.slot.replace(result);
        tracing::info!(
            nodes = published.value.graph.nodes.len(),
            edges = published.value.graph.edges.len(),
            confidence = published.value.confidence,
            "analysis result published"
        );
        published
    }

    /// `None` until the first successful publish.
    pub fn read(&self) -> Option<Arc<PublishedResult>> {
        self.slot.load()
    }

    pub fn is_empty(&self) -> bool {
        self.slot.is_empty()
    }
}
