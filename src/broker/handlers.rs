//! Axum handlers exposing [`BrokerCore`] over HTTP.

use super::protocol::*;
use super::state::BrokerCore;
use super::Broker;
use axum::{
    Json, Router,
    extract::{Extension, Query},
    http::StatusCode,
    routing::{delete, get, post},
};
use std::sync::Arc;

/// Builds the broker's HTTP router around a shared core.
pub fn router(core: Arc<BrokerCore>) -> Router {
    Router::new()
        .route(ENDPOINT_REGISTER, get(handle_register))
        .route(ENDPOINT_UNREGISTER, delete(handle_unregister))
        .route(
            ENDPOINT_MESSAGES,
            post(handle_post_message).get(handle_retrieve_message),
        )
        .layer(Extension(core))
}

/// Blocks (server-side barrier) until the expected peer count has
/// registered, then returns the caller's token plus the ordered peer list.
pub async fn handle_register(
    Extension(core): Extension<Arc<BrokerCore>>,
) -> Result<Json<RegisterResponse>, StatusCode> {
    match core.register().await {
        Ok(registration) => {
            tracing::info!(
                token = %registration.token.0,
                peers = registration.peers.len(),
                "registration barrier released"
            );
            Ok(Json(RegisterResponse {
                token: registration.token,
                peers: registration.peers,
            }))
        }
        Err(e) => {
            tracing::error!("registration failed: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

pub async fn handle_unregister(
    Extension(core): Extension<Arc<BrokerCore>>,
    Query(query): Query<SourceQuery>,
) -> (StatusCode, Json<AckResponse>) {
    match core.unregister(&query.src).await {
        Ok(_) => (StatusCode::OK, Json(AckResponse { success: true })),
        Err(e) => {
            tracing::error!("unregister failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(AckResponse { success: false }),
            )
        }
    }
}

/// Enqueues a payload onto the destination mailbox; returns immediately.
pub async fn handle_post_message(
    Extension(core): Extension<Arc<BrokerCore>>,
    Query(query): Query<DestinationQuery>,
    Json(body): Json<MessageBody>,
) -> (StatusCode, Json<AckResponse>) {
    match core.post(&query.dst, body.payload).await {
        Ok(_) => (StatusCode::OK, Json(AckResponse { success: true })),
        Err(e) => {
            tracing::warn!(dst = %query.dst.0, "post failed: {}", e);
            (
                StatusCode::NOT_FOUND,
                Json(AckResponse { success: false }),
            )
        }
    }
}

/// Long-poll: blocks until the caller's mailbox is non-empty, then pops one
/// message (FIFO per mailbox).
pub async fn handle_retrieve_message(
    Extension(core): Extension<Arc<BrokerCore>>,
    Query(query): Query<SourceQuery>,
) -> Result<Json<MessageBody>, StatusCode> {
    match core.retrieve(&query.src).await {
        Ok(payload) => Ok(Json(MessageBody { payload })),
        Err(e) => {
            tracing::warn!(src = %query.src.0, "retrieve failed: {}", e);
            Err(StatusCode::NOT_FOUND)
        }
    }
}

/// Convenience used by the binary: serve the broker on a TCP listener.
pub async fn serve(core: Arc<BrokerCore>, listener: tokio::net::TcpListener) -> anyhow::Result<()> {
    tracing::info!(
        addr = %listener.local_addr()?,
        expected_peers = core.expected_peers(),
        "broker listening"
    );
    axum::serve(listener, router(core)).await?;
    Ok(())
}
