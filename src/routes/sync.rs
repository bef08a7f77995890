//! Live sync endpoint
//!
//! One WebSocket connection per viewer. The client announces the documents
//! it is reading with `join-document` frames and sends `annotation-update`
//! / `highlight-update` frames when it creates records; the hub rebroadcasts
//! those to the other members of the same document channel. The publisher
//! never receives its own frame back. Disconnect is the only way to leave.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use futures::{SinkExt, StreamExt};
use std::collections::HashSet;
use tokio::sync::{broadcast::error::RecvError, mpsc};
use uuid::Uuid;

use crate::anchor::AnchorDescriptor;
use crate::state::AppState;
use crate::sync::{ConnectionId, Envelope, SyncEvent, SyncMessage};

/// Create the sync router
pub fn router() -> Router<AppState> {
    Router::new().route("/ws", get(upgrade))
}

async fn upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| connection(socket, state))
}

async fn connection(socket: WebSocket, state: AppState) {
    let connection_id: ConnectionId = Uuid::new_v4();
    tracing::debug!(%connection_id, "sync connection opened");

    let (mut sink, mut stream) = socket.split();

    // all outbound frames funnel through one writer
    let (out_tx, mut out_rx) = mpsc::channel::<String>(64);
    let writer = tokio::spawn(async move {
        while let Some(frame) = out_rx.recv().await {
            if sink.send(Message::Text(frame)).await.is_err() {
                break;
            }
        }
    });

    let mut joined: HashSet<String> = HashSet::new();
    let mut forwards: Vec<tokio::task::JoinHandle<()>> = Vec::new();

    while let Some(message) = stream.next().await {
        let text = match message {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) | Err(_) => break,
            Ok(_) => continue,
        };

        let frame: SyncMessage = match serde_json::from_str(&text) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(%connection_id, "dropping malformed sync frame: {}", e);
                continue;
            }
        };

        match frame {
            SyncMessage::JoinDocument { document_id } => {
                // joining twice is a no-op beyond the redundant frame
                if !joined.insert(document_id.clone()) {
                    continue;
                }
                let rx = state.hub().join(&document_id).await;
                forwards.push(spawn_forward(rx, connection_id, out_tx.clone()));
                tracing::debug!(%connection_id, document_id, "joined document channel");
            }
            SyncMessage::AnnotationUpdate {
                document_id,
                annotation,
            } => {
                if !frame_is_consistent(
                    &document_id,
                    &annotation.document_id,
                    &annotation.anchor,
                    connection_id,
                ) {
                    continue;
                }
                state
                    .hub()
                    .publish(&document_id, connection_id, SyncEvent::Annotation(annotation))
                    .await;
            }
            SyncMessage::HighlightUpdate {
                document_id,
                highlight,
            } => {
                if !frame_is_consistent(
                    &document_id,
                    &highlight.document_id,
                    &highlight.anchor,
                    connection_id,
                ) {
                    continue;
                }
                state
                    .hub()
                    .publish(&document_id, connection_id, SyncEvent::Highlight(highlight))
                    .await;
            }
        }
    }

    // implicit leave: drop the memberships, then prune empty channels
    for task in forwards {
        task.abort();
    }
    writer.abort();
    for document_id in joined {
        state.hub().prune(&document_id).await;
    }
    tracing::debug!(%connection_id, "sync connection closed");
}

/// Fan channel events out to this connection, excluding its own frames
fn spawn_forward(
    mut rx: tokio::sync::broadcast::Receiver<Envelope>,
    connection_id: ConnectionId,
    out_tx: mpsc::Sender<String>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let envelope = match rx.recv().await {
                Ok(envelope) => envelope,
                Err(RecvError::Lagged(missed)) => {
                    // best-effort delivery; the client reconciles on its
                    // next full fetch
                    tracing::warn!(%connection_id, missed, "sync consumer lagged, events dropped");
                    continue;
                }
                Err(RecvError::Closed) => break,
            };
            if envelope.origin == connection_id {
                continue;
            }
            let frame = match serde_json::to_string(&envelope.event.into_message()) {
                Ok(frame) => frame,
                Err(e) => {
                    tracing::error!("failed to serialize sync frame: {}", e);
                    continue;
                }
            };
            if out_tx.send(frame).await.is_err() {
                break;
            }
        }
    })
}

/// Boundary validation for inbound update frames
fn frame_is_consistent(
    frame_document: &str,
    record_document: &str,
    anchor: &AnchorDescriptor,
    connection_id: ConnectionId,
) -> bool {
    if frame_document != record_document {
        tracing::warn!(
            %connection_id,
            frame_document,
            record_document,
            "dropping frame whose record belongs to another document"
        );
        return false;
    }
    if !anchor.offsets_in_bounds() {
        tracing::warn!(%connection_id, "dropping frame with out-of-bounds anchor offsets");
        return false;
    }
    true
}
