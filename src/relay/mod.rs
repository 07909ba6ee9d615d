//! Transport Relay Module
//!
//! Bridges the round engine's logical send/receive operations to the broker
//! without ever blocking computation on an individual network call.
//!
//! ## Architecture Overview
//! Two indefinitely running background tasks per instance, each independent
//! of the computation task:
//! - **Outbound**: pops `(destination ordinal, message)` pairs from the local
//!   outbound channel, resolves the ordinal to its broker token, and posts
//!   the encoded payload to that mailbox. No batching, no retry.
//! - **Inbound**: issues blocking retrievals against this instance's mailbox
//!   (the wait happens broker-side, with no local timeout), decodes each
//!   payload, and pushes it to the local inbound channel.
//!
//! Both local channels are unbounded and FIFO within their direction; nothing
//! is ordered across directions or across peer pairs. Teardown drains the
//! outbound side before stopping it so no pending send is lost, while the
//! inbound task can be stopped immediately once computation has ended.

pub mod relay;

#[cfg(test)]
mod tests;

pub use relay::{OutboundHandle, Relay, outbound_channel};
