//! The round-synchronized computation loop.

use super::types::{MessageKind, RelayMessage};
use crate::error::{Error, Result};
use crate::graph::types::{Subgraph, VertexId};
use crate::relay::OutboundHandle;
use std::collections::{HashMap, VecDeque};
use tokio::sync::mpsc;

/// What a finished run hands back to the coordinator.
#[derive(Debug)]
pub struct EngineOutput {
    /// Final vector over owned and boundary vertices.
    pub pagerank: HashMap<VertexId, f64>,
    /// Protocol violations observed and dropped along the way.
    pub protocol_errors: usize,
}

impl EngineOutput {
    /// Values this instance is authoritative for. Aggregating these across
    /// all instances covers every vertex exactly once.
    pub fn owned_pagerank(&self, subgraph: &Subgraph) -> HashMap<VertexId, f64> {
        self.pagerank
            .iter()
            .filter(|(v, _)| subgraph.owned.contains(v))
            .map(|(&v, &value)| (v, value))
            .collect()
    }
}

/// Owns this instance's PageRank vector and drives it through the configured
/// number of rounds. All cross-instance I/O goes through the relay's local
/// channels; the engine itself suspends only while awaiting boundary values.
pub struct RoundEngine {
    subgraph: Subgraph,
    rounds: u32,
    /// Vector as of the last merged round (all 1.0 before round 1).
    ranks: HashMap<VertexId, f64>,
    /// Early arrivals, keyed by the round they belong to.
    buffer: HashMap<u32, VecDeque<RelayMessage>>,
    protocol_errors: usize,
}

impl RoundEngine {
    pub fn new(subgraph: Subgraph, rounds: u32) -> Self {
        let ranks = subgraph
            .owned
            .iter()
            .chain(subgraph.boundary.iter())
            .map(|&v| (v, 1.0))
            .collect();
        Self {
            subgraph,
            rounds,
            ranks,
            buffer: HashMap::new(),
            protocol_errors: 0,
        }
    }

    /// Runs every configured round to completion.
    ///
    /// A missing expected message blocks indefinitely: there is no timeout on
    /// the critical path, callers that need a bound must impose one outside.
    pub async fn run(
        mut self,
        outbound: &OutboundHandle,
        inbound: &mut mpsc::UnboundedReceiver<RelayMessage>,
    ) -> Result<EngineOutput> {
        for round in 1..=self.rounds {
            tracing::info!(uid = self.subgraph.uid, round, "round start");

            let mut new_ranks = self.compute();
            self.send_updates(round, &new_ranks, outbound)?;
            self.await_boundary(round, &mut new_ranks, inbound).await?;

            // MERGED: the vector is replaced wholesale.
            self.ranks = new_ranks;
            self.check_residue(round);

            tracing::debug!(uid = self.subgraph.uid, round, "round merged");
        }

        // Whatever is still buffered can never be consumed now.
        for (round, messages) in self.buffer.drain() {
            if !messages.is_empty() {
                tracing::error!(round, count = messages.len(), "undeliverable buffered messages");
                self.protocol_errors += messages.len();
            }
        }

        Ok(EngineOutput {
            pagerank: self.ranks,
            protocol_errors: self.protocol_errors,
        })
    }

    /// COMPUTING(r): new value of every owned vertex from the previous
    /// round's vector. Deterministic in the vector and edge data.
    fn compute(&self) -> HashMap<VertexId, f64> {
        let mut new_ranks = HashMap::with_capacity(self.ranks.len());
        for &v in &self.subgraph.owned {
            let mut value = 0.0;
            for c in &self.subgraph.contributors[&v] {
                value += self.ranks[c] / f64::from(self.subgraph.out_degree[c]);
            }
            new_ranks.insert(v, value);
        }
        new_ranks
    }

    /// SENDING(r): one message per destination ordinal in the routing map.
    /// No ordering between destinations is required or assumed.
    fn send_updates(
        &self,
        round: u32,
        new_ranks: &HashMap<VertexId, f64>,
        outbound: &OutboundHandle,
    ) -> Result<()> {
        for (&dest, vertices) in &self.subgraph.routing {
            let body: HashMap<VertexId, f64> =
                vertices.iter().map(|&v| (v, new_ranks[&v])).collect();
            outbound.send(dest, RelayMessage::update(round, body))?;
        }
        Ok(())
    }

    /// AWAITING(r): barrier on the full boundary set.
    ///
    /// Buffered round-r messages are preferred over the channel; anything
    /// consumed for a different round is re-buffered (future) or dropped as a
    /// protocol violation (past). Exit once every boundary vertex has a
    /// value, which merges the peers' contributions into `new_ranks`.
    async fn await_boundary(
        &mut self,
        round: u32,
        new_ranks: &mut HashMap<VertexId, f64>,
        inbound: &mut mpsc::UnboundedReceiver<RelayMessage>,
    ) -> Result<()> {
        let mut pending = self.subgraph.boundary.clone();

        while !pending.is_empty() {
            let message = match self.pop_buffered(round) {
                Some(message) => message,
                None => {
                    let message = inbound.recv().await.ok_or_else(|| {
                        Error::Transport("inbound relay closed mid-round".into())
                    })?;
                    if message.round != round {
                        self.stash(round, message);
                        continue;
                    }
                    message
                }
            };

            if message.kind != MessageKind::PagerankUpdate {
                tracing::warn!(round, kind = ?message.kind, "ignoring non-update message");
                continue;
            }

            for (v, value) in message.body {
                if self.subgraph.boundary.contains(&v) {
                    // Full replacement keyed by vertex id: duplicates from
                    // at-least-once delivery merge idempotently.
                    new_ranks.insert(v, value);
                    pending.remove(&v);
                } else {
                    tracing::warn!(round, vertex = v, "update for vertex outside boundary");
                    self.protocol_errors += 1;
                }
            }
        }

        Ok(())
    }

    fn pop_buffered(&mut self, round: u32) -> Option<RelayMessage> {
        let queue = self.buffer.get_mut(&round)?;
        let message = queue.pop_front();
        if queue.is_empty() {
            self.buffer.remove(&round);
        }
        message
    }

    /// Buffers a future-round message; a past-round message can never be
    /// consumed anymore and is dropped as a protocol violation.
    fn stash(&mut self, current_round: u32, message: RelayMessage) {
        if message.round < current_round {
            tracing::error!(
                current_round,
                message_round = message.round,
                "stale message dropped"
            );
            self.protocol_errors += 1;
            return;
        }
        tracing::debug!(
            current_round,
            message_round = message.round,
            "buffering early message"
        );
        self.buffer.entry(message.round).or_default().push_back(message);
    }

    /// Residual buffered entries for a round that just completed mean a peer
    /// sent more than the boundary required: a protocol violation, logged
    /// without aborting the run.
    fn check_residue(&mut self, round: u32) {
        if let Some(residue) = self.buffer.remove(&round) {
            tracing::error!(round, count = residue.len(), "residual messages after merge");
            self.protocol_errors += residue.len();
        }
    }
}
