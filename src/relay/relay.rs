//! Background tasks and local channel plumbing.

use crate::broker::{Broker, Token};
use crate::engine::types::RelayMessage;
use crate::error::{Error, Result};
use crate::graph::types::PeerUid;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// How often teardown re-checks the outbound channel while draining.
const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// The engine's sending side of the outbound local channel.
///
/// Tracks in-flight messages so teardown can tell when every accepted send
/// has actually been dispatched to the broker.
#[derive(Clone)]
pub struct OutboundHandle {
    tx: mpsc::UnboundedSender<(PeerUid, RelayMessage)>,
    pending: Arc<AtomicUsize>,
}

impl OutboundHandle {
    /// Hands a message to the outbound task. Never blocks.
    pub fn send(&self, dest: PeerUid, message: RelayMessage) -> Result<()> {
        self.pending.fetch_add(1, Ordering::SeqCst);
        self.tx.send((dest, message)).map_err(|_| {
            self.pending.fetch_sub(1, Ordering::SeqCst);
            Error::Transport("outbound relay task is gone".into())
        })
    }

    /// Messages accepted but not yet handed to the broker.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }
}

/// Creates an outbound channel pair without a running relay.
///
/// The relay uses this internally; engine unit tests use it to observe what
/// the engine emits.
pub fn outbound_channel() -> (
    OutboundHandle,
    mpsc::UnboundedReceiver<(PeerUid, RelayMessage)>,
    Arc<AtomicUsize>,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    let pending = Arc::new(AtomicUsize::new(0));
    (
        OutboundHandle {
            tx,
            pending: pending.clone(),
        },
        rx,
        pending,
    )
}

/// The pair of running background tasks plus teardown state.
pub struct Relay {
    outbound_task: JoinHandle<()>,
    inbound_task: JoinHandle<()>,
    pending: Arc<AtomicUsize>,
    /// First broker failure observed by either task. Surfaced, not retried.
    transport_error: Arc<std::sync::Mutex<Option<Error>>>,
}

impl Relay {
    /// Spawns both relay tasks and returns the engine-facing channel ends.
    ///
    /// `peers` is the full ordered token list from registration; destination
    /// ordinal `d` resolves to `peers[d - 1]`.
    pub fn start<B: Broker + 'static>(
        broker: Arc<B>,
        own_token: Token,
        peers: Vec<Token>,
    ) -> (Self, OutboundHandle, mpsc::UnboundedReceiver<RelayMessage>) {
        let (outbound, mut outbound_rx, pending) = outbound_channel();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let transport_error = Arc::new(std::sync::Mutex::new(None));

        let outbound_task = {
            let broker = broker.clone();
            let pending = pending.clone();
            let error_slot = transport_error.clone();
            tokio::spawn(async move {
                while let Some((dest, message)) = outbound_rx.recv().await {
                    let result = dispatch(&*broker, &peers, dest, &message).await;
                    // Count down regardless of outcome: a failed post is
                    // surfaced through the error slot, never redelivered.
                    pending.fetch_sub(1, Ordering::SeqCst);
                    if let Err(e) = result {
                        tracing::error!(dest, round = message.round, "post failed: {}", e);
                        error_slot.lock().unwrap().get_or_insert(e);
                    }
                }
            })
        };

        let inbound_task = {
            let error_slot = transport_error.clone();
            tokio::spawn(async move {
                loop {
                    let payload = match broker.retrieve(&own_token).await {
                        Ok(payload) => payload,
                        Err(e) => {
                            tracing::error!("retrieve failed: {}", e);
                            error_slot.lock().unwrap().get_or_insert(e);
                            break;
                        }
                    };
                    match RelayMessage::decode(&payload) {
                        Ok(message) => {
                            if inbound_tx.send(message).is_err() {
                                // Engine side dropped; nothing left to feed.
                                break;
                            }
                        }
                        Err(e) => {
                            tracing::warn!("dropping undecodable message: {}", e);
                        }
                    }
                }
            })
        };

        (
            Self {
                outbound_task,
                inbound_task,
                pending,
                transport_error,
            },
            outbound,
            inbound_rx,
        )
    }

    /// Messages still queued for the broker.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// First broker failure seen by either task, if any.
    pub fn transport_error(&self) -> Option<Error> {
        self.transport_error
            .lock()
            .unwrap()
            .as_ref()
            .map(|e| Error::Transport(e.to_string()))
    }

    /// Tears the relay down once the engine has returned.
    ///
    /// Polls until the outbound channel is empty so no pending send is lost,
    /// then stops both tasks. Undelivered inbound data is abandoned safely:
    /// computation has already ended. Returns the first transport failure
    /// observed over the relay's lifetime, if any.
    pub async fn shutdown(self) -> Option<Error> {
        while self.pending() > 0 {
            tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
        }
        self.outbound_task.abort();
        self.inbound_task.abort();
        tracing::debug!("relay stopped");
        self.transport_error.lock().unwrap().take()
    }
}

/// Resolves the destination ordinal and posts one encoded message.
async fn dispatch<B: Broker + ?Sized>(
    broker: &B,
    peers: &[Token],
    dest: PeerUid,
    message: &RelayMessage,
) -> Result<()> {
    if dest == 0 {
        return Err(Error::Transport("destination ordinals are 1-based".into()));
    }
    let token = peers
        .get((dest - 1) as usize)
        .ok_or_else(|| Error::Transport(format!("no peer with ordinal {}", dest)))?;
    broker.post(token, message.encode()?).await
}
