//! Distributed PageRank over a Rendezvous Broker
//!
//! This library lets stateless compute instances with no direct network path
//! to one another jointly execute round-based PageRank over a partitioned
//! graph. Instances can only reach a shared broker, so every cross-instance
//! exchange is relayed through per-peer mailboxes hosted there.
//!
//! ## Architecture Modules
//! The system is composed of five loosely coupled subsystems:
//!
//! - **`broker`**: The rendezvous service. A peer registry with a
//!   registration barrier plus per-peer FIFO mailboxes with blocking
//!   retrieval, exposed both in-process and over HTTP.
//! - **`graph`**: The subgraph builder. Parses adjacency/partition datasets
//!   and derives each instance's owned vertices, incoming contributors,
//!   boundary vertices, and message routing tables.
//! - **`engine`**: The round engine. Drives the compute → send → receive
//!   barrier → merge cycle and owns this instance's PageRank vector.
//! - **`relay`**: The transport relay. Two background tasks bridging the
//!   engine's local channels to the broker so computation never blocks on an
//!   individual network call.
//! - **`lifecycle`**: The coordinator. Orchestrates registration, relay
//!   startup, the engine run, outbound drain, and unregistration, reporting
//!   a structured result either way.

pub mod broker;
pub mod engine;
pub mod error;
pub mod graph;
pub mod lifecycle;
pub mod relay;
