use crate::graph::types::VertexId;
use serde::Serialize;
use std::collections::HashMap;

/// Everything one instance needs to join a run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Number of synchronized iterations to execute.
    pub rounds: u32,
    /// Forward adjacency dataset text.
    pub adjacency: String,
    /// Optional reverse adjacency dataset text; derived from the forward
    /// lists when absent.
    pub reverse: Option<String>,
    /// Partition dataset text (one owning ordinal per vertex).
    pub partition: String,
}

/// Structured outcome of one instance's run, success or failure.
///
/// On success `pagerank` holds the owned-vertex values only, so aggregating
/// all instances' reports covers every vertex exactly once.
#[derive(Debug, Serialize)]
pub struct RunReport {
    /// Ordinal identity, if registration got far enough to derive one.
    pub uid: Option<u32>,
    /// Final values of the vertices this instance owns; empty on failure.
    pub pagerank: HashMap<VertexId, f64>,
    /// Protocol violations observed and dropped during the run.
    pub protocol_errors: usize,
    /// Wall-clock duration of the attempt, reported on failure too.
    pub elapsed_ms: u64,
    /// Error description when the run did not complete.
    pub error: Option<String>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
