//! Error taxonomy shared across the crate.
//!
//! Failures fall into four families with very different blast radii:
//!
//! - [`Error::Configuration`]: malformed adjacency/partition input. Fatal
//!   before any round starts, never retried.
//! - [`Error::Registration`]: the broker is unreachable or the registration
//!   barrier never completes. Fatal, never retried.
//! - [`Error::Protocol`]: a peer broke the round contract, either in flight
//!   (stale round, unknown vertex, leftover buffered messages; logged and
//!   dropped so one misbehaving peer cannot deadlock an instance whose other
//!   expected arrivals still complete) or at aggregation time (two instances
//!   claiming the same vertex, which fails the merge).
//! - [`Error::Transport`]: a broker post/retrieve failed. Surfaced to the
//!   caller, not retried by the relay.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed adjacency or partition input.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Broker registration failed or the barrier never completed.
    #[error("registration error: {0}")]
    Registration(String),

    /// A peer violated the round protocol.
    #[error("protocol violation: {0}")]
    Protocol(String),

    /// Broker post/retrieve failure or a torn-down local channel.
    #[error("transport error: {0}")]
    Transport(String),
}

pub type Result<T> = std::result::Result<T, Error>;
