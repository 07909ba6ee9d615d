//! Rendezvous Broker Module
//!
//! The broker is the only network endpoint instances can reach, so it plays
//! two roles: a registration barrier that hands out consistent ordinal
//! identities, and a per-peer mailbox store that relays messages between
//! instances with no direct connectivity.
//!
//! ## Architecture Overview
//! - **`state`**: [`BrokerCore`], the process-wide registry + mailbox map.
//!   The registration barrier is a counter/wait-group: every caller blocks
//!   until the expected peer count has registered, then all of them observe
//!   the same ordered token snapshot. Mailboxes are unbounded FIFOs with a
//!   blocking pop, serialized per destination token and fully parallel across
//!   tokens.
//! - **`protocol`**: HTTP endpoint constants and serde DTOs.
//! - **`handlers`**: axum handlers exposing the core over HTTP.
//! - **`client`**: [`client::HttpBroker`], the reqwest-side of the same
//!   interface, used by worker instances.
//!
//! Everything speaks the [`Broker`] trait, so tests and single-process
//! deployments can wire instances straight to a shared [`BrokerCore`] while
//! production workers go through HTTP.

pub mod client;
pub mod handlers;
pub mod protocol;
pub mod state;


use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Ephemeral session identity, used only when talking to the broker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Token(pub String);

impl Token {
    /// Generates a new random UUID v4-based token.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a completed registration hands back: this instance's token plus the
/// full token list in registration order. List position is the sole source
/// of ordinal identity.
#[derive(Debug, Clone)]
pub struct Registration {
    pub token: Token,
    pub peers: Vec<Token>,
}

impl Registration {
    /// 1-based position of the own token in the peer list, if present.
    pub fn uid(&self) -> Option<u32> {
        self.peers
            .iter()
            .position(|t| t == &self.token)
            .map(|idx| (idx + 1) as u32)
    }
}

/// The rendezvous service as seen by one instance.
///
/// Payloads are opaque transport-safe strings; the relay layer owns the
/// message encoding.
#[async_trait]
pub trait Broker: Send + Sync {
    /// Blocks until the expected peer count has registered, then returns the
    /// own token and the ordered list of all tokens.
    async fn register(&self) -> Result<Registration>;

    /// Removes a registration. Idempotent if the token is already gone.
    async fn unregister(&self, token: &Token) -> Result<()>;

    /// Enqueues a payload onto the destination's mailbox and returns
    /// immediately. FIFO per destination, no delivery guarantee beyond that.
    async fn post(&self, dst: &Token, payload: String) -> Result<()>;

    /// Blocks until the own mailbox is non-empty, then pops one payload.
    async fn retrieve(&self, own: &Token) -> Result<String>;
}
