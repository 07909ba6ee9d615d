//! Registration, run orchestration, and teardown.

use super::types::{RunConfig, RunReport};
use crate::broker::{Broker, Registration};
use crate::engine::engine::RoundEngine;
use crate::error::{Error, Result};
use crate::graph::builder::{build_subgraph, parse_adjacency, parse_partition, parse_reverse};
use crate::graph::types::{PeerUid, VertexId};
use crate::relay::Relay;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

/// Values an instance completed with, before packaging into a report.
struct RunOutcome {
    pagerank: HashMap<VertexId, f64>,
    protocol_errors: usize,
}

/// Drives one instance from registration to unregistration.
pub struct Coordinator<B: Broker + 'static> {
    broker: Arc<B>,
}

impl<B: Broker + 'static> Coordinator<B> {
    pub fn new(broker: Arc<B>) -> Self {
        Self { broker }
    }

    /// Runs the whole lifecycle and reports the outcome either way.
    ///
    /// This is the outermost error boundary: any failure below it becomes
    /// `error: Some(description)` plus the elapsed duration, leaving
    /// aggregation policy to the caller.
    pub async fn execute(&self, config: RunConfig) -> RunReport {
        let started = Instant::now();
        let mut uid = None;

        let result = self.run(&config, &mut uid).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(outcome) => {
                tracing::info!(?uid, elapsed_ms, "run complete");
                RunReport {
                    uid,
                    pagerank: outcome.pagerank,
                    protocol_errors: outcome.protocol_errors,
                    elapsed_ms,
                    error: None,
                }
            }
            Err(e) => {
                tracing::error!(?uid, elapsed_ms, "run failed: {}", e);
                RunReport {
                    uid,
                    pagerank: HashMap::new(),
                    protocol_errors: 0,
                    elapsed_ms,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    async fn run(&self, config: &RunConfig, uid_out: &mut Option<PeerUid>) -> Result<RunOutcome> {
        // Validate inputs before joining the barrier: a malformed dataset
        // must not consume a registration slot the other peers wait on.
        let adjacency = parse_adjacency(&config.adjacency)?;
        let reverse = config
            .reverse
            .as_deref()
            .map(parse_reverse)
            .transpose()?;
        let partition = parse_partition(&config.partition)?;

        let registration = self.broker.register().await?;
        let uid = registration
            .uid()
            .ok_or_else(|| Error::Registration("own token missing from peer list".into()))?;
        *uid_out = Some(uid);
        tracing::info!(uid, peers = registration.peers.len(), "registered");

        let result = self
            .run_registered(
                &registration,
                uid,
                &adjacency,
                reverse.as_deref(),
                &partition,
                config.rounds,
            )
            .await;

        // Best-effort teardown tail: unregister even when the run failed.
        if let Err(e) = self.broker.unregister(&registration.token).await {
            tracing::warn!(uid, "unregister failed: {}", e);
        }

        result
    }

    async fn run_registered(
        &self,
        registration: &Registration,
        uid: PeerUid,
        adjacency: &[Vec<VertexId>],
        reverse: Option<&[Vec<VertexId>]>,
        partition: &[PeerUid],
        rounds: u32,
    ) -> Result<RunOutcome> {
        let subgraph = build_subgraph(adjacency, reverse, partition, uid)?;

        let (relay, outbound, mut inbound) = Relay::start(
            self.broker.clone(),
            registration.token.clone(),
            registration.peers.clone(),
        );

        let engine = RoundEngine::new(subgraph.clone(), rounds);
        let engine_result = engine.run(&outbound, &mut inbound).await;

        // Drain the outbound channel before stopping the relay so no pending
        // send is lost; the inbound side is abandoned immediately.
        let transport_error = relay.shutdown().await;

        let output = engine_result?;
        if let Some(e) = transport_error {
            return Err(e);
        }

        Ok(RunOutcome {
            pagerank: output.owned_pagerank(&subgraph),
            protocol_errors: output.protocol_errors,
        })
    }
}

/// Strict aggregation: folds all instances' owned-vertex values into one
/// global vector, failing the whole job on any non-success report or on a
/// vertex covered more than once.
pub fn merge_reports<'a, I>(reports: I) -> Result<HashMap<VertexId, f64>>
where
    I: IntoIterator<Item = &'a RunReport>,
{
    let mut merged = HashMap::new();
    for report in reports {
        if let Some(error) = &report.error {
            return Err(Error::Transport(format!(
                "instance {:?} failed: {}",
                report.uid, error
            )));
        }
        for (&vertex, &value) in &report.pagerank {
            if merged.insert(vertex, value).is_some() {
                return Err(Error::Protocol(format!(
                    "vertex {} reported by more than one instance",
                    vertex
                )));
            }
        }
    }
    Ok(merged)
}
