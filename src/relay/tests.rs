//! Relay Module Tests
//!
//! Wires real relay tasks to an in-process [`BrokerCore`] and checks both
//! directions plus the drain-before-stop teardown contract.

#[cfg(test)]
mod tests {
    use crate::broker::state::BrokerCore;
    use crate::broker::{Broker, Registration};
    use crate::engine::types::{MessageKind, RelayMessage};
    use crate::relay::Relay;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    async fn register_pair(core: &Arc<BrokerCore>) -> (Registration, Registration) {
        let (a, b) = tokio::join!(core.register(), core.register());
        (a.unwrap(), b.unwrap())
    }

    fn update(round: u32, vertex: u32, value: f64) -> RelayMessage {
        let mut body = HashMap::new();
        body.insert(vertex, value);
        RelayMessage::update(round, body)
    }

    // ============================================================
    // OUTBOUND TESTS
    // ============================================================

    #[tokio::test]
    async fn test_outbound_posts_to_destination_mailbox_in_order() {
        let core = BrokerCore::new(2);
        let (reg_a, reg_b) = register_pair(&core).await;
        let uid_b = reg_b.uid().unwrap();

        let (relay, outbound, _inbound) =
            Relay::start(core.clone(), reg_a.token.clone(), reg_a.peers.clone());

        outbound.send(uid_b, update(1, 7, 0.5)).unwrap();
        outbound.send(uid_b, update(2, 7, 0.25)).unwrap();

        // FIFO within the outbound direction.
        let first = core.retrieve(&reg_b.token).await.unwrap();
        let second = core.retrieve(&reg_b.token).await.unwrap();
        let first = RelayMessage::decode(&first).unwrap();
        let second = RelayMessage::decode(&second).unwrap();

        assert_eq!(first.round, 1);
        assert_eq!(second.round, 2);
        assert_eq!(first.kind, MessageKind::PagerankUpdate);
        assert_eq!(first.body[&7], 0.5);

        relay.shutdown().await;
    }

    #[tokio::test]
    async fn test_pending_drains_to_zero_after_dispatch() {
        let core = BrokerCore::new(2);
        let (reg_a, reg_b) = register_pair(&core).await;

        let (relay, outbound, _inbound) =
            Relay::start(core.clone(), reg_a.token.clone(), reg_a.peers.clone());

        for round in 1..=5 {
            outbound.send(reg_b.uid().unwrap(), update(round, 1, 1.0)).unwrap();
        }

        timeout(Duration::from_secs(2), async {
            while relay.pending() > 0 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("outbound never drained");

        relay.shutdown().await;
    }

    #[tokio::test]
    async fn test_unknown_destination_surfaces_transport_error() {
        let core = BrokerCore::new(2);
        let (reg_a, _reg_b) = register_pair(&core).await;

        let (relay, outbound, _inbound) =
            Relay::start(core.clone(), reg_a.token.clone(), reg_a.peers.clone());

        // Ordinal 9 does not exist in a 2-peer run.
        outbound.send(9, update(1, 1, 1.0)).unwrap();

        timeout(Duration::from_secs(2), async {
            while relay.transport_error().is_none() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("transport error never surfaced");

        relay.shutdown().await;
    }

    // ============================================================
    // INBOUND TESTS
    // ============================================================

    #[tokio::test]
    async fn test_inbound_decodes_and_forwards() {
        let core = BrokerCore::new(2);
        let (reg_a, _reg_b) = register_pair(&core).await;

        let (relay, _outbound, mut inbound) =
            Relay::start(core.clone(), reg_a.token.clone(), reg_a.peers.clone());

        let message = update(3, 11, 0.125);
        core.post(&reg_a.token, message.encode().unwrap())
            .await
            .unwrap();

        let received = timeout(Duration::from_secs(2), inbound.recv())
            .await
            .expect("inbound relay stalled")
            .expect("inbound channel closed");

        assert_eq!(received.round, 3);
        assert_eq!(received.body[&11], 0.125);

        relay.shutdown().await;
    }

    #[tokio::test]
    async fn test_inbound_drops_undecodable_payloads() {
        let core = BrokerCore::new(2);
        let (reg_a, _reg_b) = register_pair(&core).await;

        let (relay, _outbound, mut inbound) =
            Relay::start(core.clone(), reg_a.token.clone(), reg_a.peers.clone());

        core.post(&reg_a.token, "definitely not a message".into())
            .await
            .unwrap();
        core.post(&reg_a.token, update(1, 2, 2.0).encode().unwrap())
            .await
            .unwrap();

        // The garbage payload is logged and skipped; the next one arrives.
        let received = timeout(Duration::from_secs(2), inbound.recv())
            .await
            .expect("inbound relay stalled")
            .expect("inbound channel closed");

        assert_eq!(received.round, 1);

        relay.shutdown().await;
    }

    // ============================================================
    // TEARDOWN TESTS
    // ============================================================

    #[tokio::test]
    async fn test_shutdown_waits_for_outbound_drain() {
        let core = BrokerCore::new(2);
        let (reg_a, reg_b) = register_pair(&core).await;
        let uid_b = reg_b.uid().unwrap();

        let (relay, outbound, _inbound) =
            Relay::start(core.clone(), reg_a.token.clone(), reg_a.peers.clone());

        let sent: u32 = 20;
        for round in 1..=sent {
            outbound.send(uid_b, update(round, 1, f64::from(round))).unwrap();
        }

        // Shutdown must not stop the outbound task before all 20 dispatches.
        relay.shutdown().await;

        for round in 1..=sent {
            let payload = timeout(Duration::from_secs(1), core.retrieve(&reg_b.token))
                .await
                .expect("message lost during teardown")
                .unwrap();
            assert_eq!(RelayMessage::decode(&payload).unwrap().round, round);
        }
    }

    #[tokio::test]
    async fn test_send_after_relay_gone_is_transport_error() {
        let core = BrokerCore::new(2);
        let (reg_a, _reg_b) = register_pair(&core).await;

        let (relay, outbound, _inbound) =
            Relay::start(core.clone(), reg_a.token.clone(), reg_a.peers.clone());
        relay.shutdown().await;

        // The outbound task is gone; give the abort a moment to land.
        tokio::time::sleep(Duration::from_millis(20)).await;
        let result = outbound.send(1, update(1, 1, 1.0));

        assert!(result.is_err());
        assert_eq!(outbound.pending(), 0);
    }
}
