//! Broker HTTP Protocol
//!
//! Defines the API endpoints and Data Transfer Objects (DTOs) the worker
//! instances use to talk to the rendezvous service.
//!
//! Message payloads travel as JSON strings inside the DTOs, which keeps the
//! wire format text-safe end to end.

use super::Token;
use serde::{Deserialize, Serialize};

// --- API Endpoints ---

/// Registration barrier. Blocks until all expected peers have registered.
pub const ENDPOINT_REGISTER: &str = "/register";
/// Removes a registration (query param `src`).
pub const ENDPOINT_UNREGISTER: &str = "/unregister";
/// POST enqueues onto the `dst` mailbox; GET long-polls the `src` mailbox.
pub const ENDPOINT_MESSAGES: &str = "/messages";

// --- Data Transfer Objects ---

/// Response to a completed registration.
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    /// The caller's ephemeral session token.
    pub token: Token,
    /// All tokens in registration order; list position is ordinal identity.
    pub peers: Vec<Token>,
}

/// Query selecting the caller's own mailbox/registration.
#[derive(Debug, Serialize, Deserialize)]
pub struct SourceQuery {
    pub src: Token,
}

/// Query selecting a destination mailbox.
#[derive(Debug, Serialize, Deserialize)]
pub struct DestinationQuery {
    pub dst: Token,
}

/// An opaque relayed payload (the serialized round message).
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageBody {
    pub payload: String,
}

/// Standard acknowledgment for post/unregister operations.
#[derive(Debug, Serialize, Deserialize)]
pub struct AckResponse {
    pub success: bool,
}
