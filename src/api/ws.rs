//! WebSocket endpoints: prediction subscription and data ingestion.
//!
//! The subscription stream delivers an initial snapshot, then one frame
//! per prediction, in append order (per-subscriber FIFO via the broadcast
//! channel). Deliveries are bounded: a subscriber whose send does not
//! complete within the timeout, or that lags the channel, is dropped
//! rather than blocking fan-out. The ingest channel acknowledges every
//! message, carrying the rate-gate decision and inference duration.

use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use serde_json::json;
use tokio::sync::broadcast::error::RecvError;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::config::defaults::SUBSCRIBER_SEND_TIMEOUT_SECS;
use crate::error::ServiceError;
use crate::realtime::InferenceOutcome;
use crate::types::RealtimeUpdate;

use super::handlers::ServiceState;

type WsSender = SplitSink<WebSocket, Message>;
type WsReceiver = SplitStream<WebSocket>;

/// GET /ws/predictions — subscribe to the prediction stream.
pub async fn predictions_ws(ws: WebSocketUpgrade, State(state): State<ServiceState>) -> Response {
    ws.on_upgrade(move |socket| handle_predictions(socket, state))
}

/// GET /ws/ingest — push domain updates into the state manager.
pub async fn ingest_ws(ws: WebSocketUpgrade, State(state): State<ServiceState>) -> Response {
    ws.on_upgrade(move |socket| handle_ingest(socket, state))
}

/// Bounded delivery: a send that exceeds the timeout counts as a failure.
async fn send_bounded(sender: &mut WsSender, payload: String) -> bool {
    matches!(
        timeout(
            Duration::from_secs(SUBSCRIBER_SEND_TIMEOUT_SECS),
            sender.send(Message::Text(payload)),
        )
        .await,
        Ok(Ok(()))
    )
}

async fn handle_predictions(socket: WebSocket, state: ServiceState) {
    let (mut sender, mut receiver) = socket.split();
    let (id, mut events, snapshot) = state.realtime.subscribe().await;

    // Initial snapshot: history, trends, latest.
    let init = json!({ "type": "init", "data": snapshot }).to_string();
    if !send_bounded(&mut sender, init).await {
        state.realtime.mark_subscriber_closing(id).await;
        state.realtime.remove_subscriber(id).await;
        return;
    }
    state.realtime.mark_subscriber_active(id).await;

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    let frame = json!({
                        "type": "prediction",
                        "data": event.record,
                        "trends": event.trends,
                    })
                    .to_string();
                    if !send_bounded(&mut sender, frame).await {
                        warn!(subscriber_id = id, "Delivery failed, dropping subscriber");
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(subscriber_id = id, skipped, "Subscriber lagged, dropping");
                    break;
                }
                Err(RecvError::Closed) => break,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    if !handle_control_message(&mut sender, &state, text.trim()).await {
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | None => {
                    debug!(subscriber_id = id, "Peer closed subscription");
                    break;
                }
                Some(Ok(_)) => {} // ping/pong/binary frames: nothing to do
                Some(Err(_)) => break,
            },
        }
    }

    state.realtime.mark_subscriber_closing(id).await;
    state.realtime.remove_subscriber(id).await;
}

/// Handle a subscriber control message. Returns false if the reply failed.
async fn handle_control_message(
    sender: &mut WsSender,
    state: &ServiceState,
    text: &str,
) -> bool {
    let reply = match text {
        "ping" => json!({ "type": "pong" }),
        "get_trends" => json!({ "type": "trends", "data": state.realtime.trend_summary().await }),
        "get_history" => {
            json!({ "type": "history", "data": state.realtime.prediction_history().await })
        }
        _ => return true, // unrecognized control messages are ignored
    };
    send_bounded(sender, reply.to_string()).await
}

async fn handle_ingest(socket: WebSocket, state: ServiceState) {
    let (mut sender, mut receiver) = socket.split();
    while let Some(incoming) = next_text(&mut receiver).await {
        let ack = ingest_one(&state, &incoming).await;
        if !send_bounded(&mut sender, ack.to_string()).await {
            break;
        }
    }
}

/// Next text frame, skipping control frames; `None` on close or error.
async fn next_text(receiver: &mut WsReceiver) -> Option<String> {
    loop {
        match receiver.next().await? {
            Ok(Message::Text(text)) => return Some(text),
            Ok(Message::Close(_)) | Err(_) => return None,
            Ok(_) => {}
        }
    }
}

/// Process one ingest message and build its acknowledgement. Failures are
/// local to the message; the state manager is never aborted.
async fn ingest_one(state: &ServiceState, text: &str) -> serde_json::Value {
    let update: RealtimeUpdate = match serde_json::from_str(text) {
        Ok(update) => update,
        Err(err) => {
            return json!({ "type": "error", "message": format!("invalid update payload: {err}") });
        }
    };

    let changed = match state.realtime.apply_update(&update).await {
        Ok(changed) => changed,
        Err(ServiceError::Validation(message)) => {
            return json!({ "type": "error", "message": message });
        }
        Err(ServiceError::Classifier(_)) => {
            return json!({ "type": "error", "message": "internal inference failure" });
        }
    };

    if !changed {
        return json!({ "type": "ack", "message": "No change detected" });
    }

    match state.realtime.run_inference().await {
        Ok(InferenceOutcome::Predicted(record)) => json!({
            "type": "ack",
            "rate_limited": false,
            "inference_time_ms": record.inference_duration_ms,
        }),
        Ok(InferenceOutcome::RateLimited) => json!({
            "type": "ack",
            "rate_limited": true,
            "message": "Rate limited, prediction skipped",
        }),
        Err(err) => {
            warn!(error = %err, "Real-time inference failed; state manager continues");
            json!({ "type": "error", "message": "internal inference failure" })
        }
    }
}
