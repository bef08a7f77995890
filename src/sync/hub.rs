//! Per-document broadcast hub
//!
//! One `tokio::sync::broadcast` channel per document id. Members join by
//! subscribing; leaving is implicit when the receiver drops, and empty
//! channels are pruned on disconnect. Publishing is fire-and-forget: no
//! acknowledgement, no retry, no persistence. A member that is offline at
//! publish time catches up from its next full fetch.

use std::collections::HashMap;

use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use super::types::SyncEvent;

/// Identifies one connected client for publisher exclusion
pub type ConnectionId = Uuid;

/// An event plus the connection that published it
///
/// Subscribers drop envelopes whose origin matches their own connection,
/// so a publisher never receives its own broadcast back.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub origin: ConnectionId,
    pub event: SyncEvent,
}

/// Broadcast hub holding one channel per document
pub struct SyncHub {
    channels: RwLock<HashMap<String, broadcast::Sender<Envelope>>>,
    capacity: usize,
}

impl SyncHub {
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
            capacity,
        }
    }

    /// Join a document's channel, creating it on first interest. Joining
    /// again just hands back another receiver; there is nothing else to
    /// reconcile.
    pub async fn join(&self, document_id: &str) -> broadcast::Receiver<Envelope> {
        let mut channels = self.channels.write().await;
        match channels.get(document_id) {
            Some(tx) => tx.subscribe(),
            None => {
                let (tx, rx) = broadcast::channel(self.capacity);
                channels.insert(document_id.to_string(), tx);
                rx
            }
        }
    }

    /// Deliver `event` to every current member of the channel. Returns the
    /// number of receivers the event reached; zero listeners is fine.
    pub async fn publish(
        &self,
        document_id: &str,
        origin: ConnectionId,
        event: SyncEvent,
    ) -> usize {
        let channels = self.channels.read().await;
        let Some(tx) = channels.get(document_id) else {
            tracing::debug!(document_id, "publish to document with no channel");
            return 0;
        };
        match tx.send(Envelope { origin, event }) {
            Ok(count) => count,
            Err(_) => {
                tracing::debug!(document_id, "no members to receive event");
                0
            }
        }
    }

    /// Drop a document's channel once its last member is gone. Called on
    /// connection teardown for each document the connection had joined.
    pub async fn prune(&self, document_id: &str) {
        let mut channels = self.channels.write().await;
        if let Some(tx) = channels.get(document_id) {
            if tx.receiver_count() == 0 {
                channels.remove(document_id);
            }
        }
    }

    /// Current member count for a document's channel
    pub async fn member_count(&self, document_id: &str) -> usize {
        let channels = self.channels.read().await;
        channels
            .get(document_id)
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }

    /// Number of live document channels
    pub async fn channel_count(&self) -> usize {
        self.channels.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::AnchorDescriptor;
    use crate::annotations::Highlight;

    fn event(document_id: &str) -> SyncEvent {
        SyncEvent::Highlight(Highlight::new(
            document_id,
            AnchorDescriptor {
                container_tag_name: "p".to_string(),
                container_snapshot_html: "<p>hello world</p>".to_string(),
                text_content: "hello world".to_string(),
                start_offset: 0,
                end_offset: 5,
            },
            "hello",
        ))
    }

    #[tokio::test]
    async fn test_publish_reaches_other_member() {
        let hub = SyncHub::new(16);
        let publisher = Uuid::new_v4();
        let _own = hub.join("doc-1").await;
        let mut other = hub.join("doc-1").await;

        let reached = hub.publish("doc-1", publisher, event("doc-1")).await;
        assert_eq!(reached, 2);

        let envelope = other.recv().await.unwrap();
        assert_eq!(envelope.origin, publisher);
        assert_eq!(envelope.event.document_id(), "doc-1");
    }

    #[tokio::test]
    async fn test_channels_are_scoped_per_document() {
        let hub = SyncHub::new(16);
        let mut doc_a = hub.join("doc-a").await;
        let mut doc_b = hub.join("doc-b").await;

        hub.publish("doc-a", Uuid::new_v4(), event("doc-a")).await;

        assert_eq!(doc_a.recv().await.unwrap().event.document_id(), "doc-a");
        assert!(matches!(
            doc_b.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test]
    async fn test_publish_without_members_is_silent() {
        let hub = SyncHub::new(16);
        assert_eq!(hub.publish("doc-1", Uuid::new_v4(), event("doc-1")).await, 0);

        // channel exists but every member left
        let rx = hub.join("doc-2").await;
        drop(rx);
        assert_eq!(hub.publish("doc-2", Uuid::new_v4(), event("doc-2")).await, 0);
    }

    #[tokio::test]
    async fn test_join_is_idempotent_beyond_bookkeeping() {
        let hub = SyncHub::new(16);
        let _first = hub.join("doc-1").await;
        let _second = hub.join("doc-1").await;

        assert_eq!(hub.channel_count().await, 1);
        assert_eq!(hub.member_count("doc-1").await, 2);
    }

    #[tokio::test]
    async fn test_prune_removes_empty_channels_only() {
        let hub = SyncHub::new(16);
        let keep = hub.join("doc-keep").await;
        let gone = hub.join("doc-gone").await;
        drop(gone);

        hub.prune("doc-keep").await;
        hub.prune("doc-gone").await;

        assert_eq!(hub.channel_count().await, 1);
        assert_eq!(hub.member_count("doc-keep").await, 1);
        drop(keep);
    }

    #[tokio::test]
    async fn test_late_joiner_misses_earlier_events() {
        let hub = SyncHub::new(16);
        let _anchor_member = hub.join("doc-1").await;
        hub.publish("doc-1", Uuid::new_v4(), event("doc-1")).await;

        let mut late = hub.join("doc-1").await;
        assert!(matches!(
            late.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }
}
