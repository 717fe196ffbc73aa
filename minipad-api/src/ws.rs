//! WebSocket Change Feed
//!
//! Clients connect to `/api/v1/ws` to receive live board updates. A client
//! may pass `?idea_id=<uuid>` to receive only events touching that idea (and
//! its remixes).
//!
//! - Uses a tokio broadcast channel for event distribution
//! - Slow consumers are told how many events they missed and keep going
//! - JSON-serialized events using the `MinipadEvent` enum

use crate::events::MinipadEvent;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use minipad_core::IdeaId;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// Publisher side of the change feed, shared by every route and service.
#[derive(Clone)]
pub struct ChangeFeed {
    tx: broadcast::Sender<MinipadEvent>,
}

impl ChangeFeed {
    /// Create a feed buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an event. Never blocks; with no subscribers the event is
    /// dropped.
    pub fn broadcast(&self, event: MinipadEvent) {
        let event_type = event.event_type();
        match self.tx.send(event) {
            Ok(receiver_count) => {
                debug!(
                    event_type = event_type,
                    receivers = receiver_count,
                    "Broadcast event"
                );
            }
            Err(_) => {
                debug!(event_type = event_type, "No receivers for event");
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MinipadEvent> {
        self.tx.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// Query parameters accepted by the feed endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
pub struct FeedParams {
    /// Only deliver events that touch this idea
    pub idea_id: Option<IdeaId>,
}

/// WebSocket upgrade handler.
///
/// ## Protocol
///
/// 1. Client connects, optionally with `?idea_id=`
/// 2. Server sends a `Connected` event echoing the filter
/// 3. Server streams matching events as JSON text frames
/// 4. On shutdown of the stream the server sends `Disconnected`
///
/// ```text
/// GET /api/v1/ws?idea_id=0191...
/// Upgrade: websocket
/// ```
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(feed): State<Arc<ChangeFeed>>,
    Query(params): Query<FeedParams>,
) -> Response {
    info!(idea_id = ?params.idea_id, "WebSocket connection request");
    ws.on_upgrade(move |socket| handle_socket(socket, feed, params.idea_id))
}

async fn handle_socket(socket: WebSocket, feed: Arc<ChangeFeed>, filter: Option<IdeaId>) {
    info!(idea_id = ?filter, "WebSocket connected");

    let (mut sender, mut receiver) = socket.split();
    let mut rx = feed.subscribe();

    if let Err(e) = send_event(&mut sender, MinipadEvent::Connected { idea_id: filter }).await {
        error!(error = %e, "Failed to send Connected event");
        return;
    }

    // Inbound frames carry nothing; drain them until the client leaves.
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => {
                    debug!("Client sent close frame");
                    break;
                }
                Ok(Message::Text(text)) => {
                    debug!(len = text.len(), "Received text message (ignored)");
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(error = %e, "WebSocket receive error");
                    break;
                }
            }
        }
    });

    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    Ok(event) => {
                        if !should_send_event(&event, filter) {
                            continue;
                        }
                        if let Err(e) = send_event(&mut sender, event).await {
                            error!(error = %e, "Failed to send event, closing connection");
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped = skipped, "Client lagged, some events were dropped");
                        let error_event = MinipadEvent::Error {
                            message: format!("Lagged: {} events dropped", skipped),
                        };
                        if let Err(e) = send_event(&mut sender, error_event).await {
                            error!(error = %e, "Failed to send error event");
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        info!("Broadcast channel closed");
                        break;
                    }
                }
            }

            _ = &mut recv_task => {
                debug!("Receiver task finished");
                break;
            }
        }
    }

    let _ = send_event(
        &mut sender,
        MinipadEvent::Disconnected {
            reason: "Connection closed".to_string(),
        },
    )
    .await;

    info!(idea_id = ?filter, "WebSocket disconnected");
}

async fn send_event(
    sender: &mut futures_util::stream::SplitSink<WebSocket, Message>,
    event: MinipadEvent,
) -> Result<(), axum::Error> {
    let json = serde_json::to_string(&event).map_err(|e| {
        error!(error = %e, "Failed to serialize event");
        axum::Error::new(e)
    })?;

    sender.send(Message::Text(json)).await
}

/// Apply the subscriber's idea filter. Connection events always pass.
fn should_send_event(event: &MinipadEvent, filter: Option<IdeaId>) -> bool {
    match filter {
        None => true,
        Some(idea_id) => event.concerns(idea_id),
    }
}
