//! Wire message definitions for cross-instance exchange.
//!
//! Messages are serialized as JSON strings before they reach the broker, so
//! they survive text-only transports without an extra encoding layer.

use crate::error::{Error, Result};
use crate::graph::types::VertexId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Discriminates the payloads peers exchange through the broker.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MessageKind {
    /// Per-vertex value replacements for one round. The only kind the round
    /// engine consumes.
    PagerankUpdate,
    /// A peer finished all configured rounds.
    CalculationDone,
    /// Acknowledgement of a `CalculationDone`.
    CalculationAck,
}

/// One message per (round, destination instance) pair.
///
/// The body is an idempotent full replacement keyed by vertex id, so
/// at-least-once delivery is sufficient: re-applying a duplicate is a no-op.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayMessage {
    pub kind: MessageKind,
    pub round: u32,
    pub body: HashMap<VertexId, f64>,
}

impl RelayMessage {
    /// Builds a round update carrying new values for the given vertices.
    pub fn update(round: u32, body: HashMap<VertexId, f64>) -> Self {
        Self {
            kind: MessageKind::PagerankUpdate,
            round,
            body,
        }
    }

    /// Serializes to the transport-safe JSON form.
    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::Transport(format!("encode failed: {}", e)))
    }

    /// Decodes a payload received from the broker.
    pub fn decode(payload: &str) -> Result<Self> {
        serde_json::from_str(payload)
            .map_err(|e| Error::Transport(format!("decode failed: {}", e)))
    }
}
