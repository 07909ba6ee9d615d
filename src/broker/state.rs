//! Process-wide broker state: peer registry, registration barrier, mailboxes.

use super::{Broker, Registration, Token};
use crate::error::{Error, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock, mpsc, watch};

/// One peer's unbounded FIFO mailbox.
///
/// The receiver sits behind a `Mutex` so retrievals for the same token are
/// serialized, while distinct tokens are served fully in parallel.
struct Mailbox {
    tx: mpsc::UnboundedSender<String>,
    rx: Mutex<mpsc::UnboundedReceiver<String>>,
}

/// The rendezvous service itself.
///
/// Lives for the broker process lifetime, independent of any instance. Also
/// usable directly as an in-process [`Broker`] when all instances share one
/// process (tests, local runs).
pub struct BrokerCore {
    expected_peers: usize,
    /// Tokens in registration order. Position defines ordinal identity.
    peers: RwLock<Vec<Token>>,
    mailboxes: DashMap<Token, Arc<Mailbox>>,
    /// Registration counter driving the barrier.
    registered: watch::Sender<usize>,
}

impl BrokerCore {
    pub fn new(expected_peers: usize) -> Arc<Self> {
        let (registered, _) = watch::channel(0);
        Arc::new(Self {
            expected_peers,
            peers: RwLock::new(Vec::new()),
            mailboxes: DashMap::new(),
            registered,
        })
    }

    pub fn expected_peers(&self) -> usize {
        self.expected_peers
    }

    /// Number of peers currently registered.
    pub fn registered_count(&self) -> usize {
        *self.registered.borrow()
    }

    fn mailbox(&self, token: &Token) -> Option<Arc<Mailbox>> {
        self.mailboxes.get(token).map(|entry| entry.value().clone())
    }
}

#[async_trait]
impl Broker for BrokerCore {
    async fn register(&self) -> Result<Registration> {
        let token = Token::new();
        let (tx, rx) = mpsc::unbounded_channel();
        self.mailboxes
            .insert(token.clone(), Arc::new(Mailbox { tx, rx: Mutex::new(rx) }));

        {
            let mut peers = self.peers.write().await;
            peers.push(token.clone());
            let count = peers.len();
            self.registered.send_replace(count);
            tracing::debug!(count, expected = self.expected_peers, "peer registered");
        }

        // Barrier: wait until the Nth registration arrives. Every releasee
        // snapshots the same first N tokens in registration order.
        let mut counter = self.registered.subscribe();
        let expected = self.expected_peers;
        counter
            .wait_for(|&count| count >= expected)
            .await
            .map_err(|e| Error::Registration(format!("barrier collapsed: {}", e)))?;

        let peers = self.peers.read().await;
        Ok(Registration {
            token,
            peers: peers[..self.expected_peers].to_vec(),
        })
    }

    async fn unregister(&self, token: &Token) -> Result<()> {
        if self.mailboxes.remove(token).is_none() {
            tracing::warn!(token = %token.0, "unregister for unknown token");
            return Ok(());
        }
        let mut peers = self.peers.write().await;
        peers.retain(|t| t != token);
        tracing::debug!(token = %token.0, "peer unregistered");
        Ok(())
    }

    async fn post(&self, dst: &Token, payload: String) -> Result<()> {
        let mailbox = self
            .mailbox(dst)
            .ok_or_else(|| Error::Transport(format!("unknown destination {}", dst.0)))?;
        mailbox
            .tx
            .send(payload)
            .map_err(|_| Error::Transport(format!("mailbox {} closed", dst.0)))
    }

    async fn retrieve(&self, own: &Token) -> Result<String> {
        let mailbox = self
            .mailbox(own)
            .ok_or_else(|| Error::Transport(format!("unknown token {}", own.0)))?;
        let mut rx = mailbox.rx.lock().await;
        rx.recv()
            .await
            .ok_or_else(|| Error::Transport(format!("mailbox {} closed", own.0)))
    }
}
