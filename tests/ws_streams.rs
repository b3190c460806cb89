//! Streaming-endpoint integration tests.
//!
//! Serves the real app on a loopback listener and drives /ws/predictions
//! and /ws/ingest through actual WebSocket handshakes, asserting the frame
//! vocabulary, the rate-gate acknowledgements, and subscriber cleanup.

use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use civitas::api::{create_app, ServiceState};
use civitas::config::{EngineConfig, RealtimeConfig};
use civitas::engine::CascadingRiskEngine;
use civitas::model::RiskModels;
use civitas::realtime::RealtimeStateManager;
use civitas::warehouse::SeededWarehouse;

type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// Bind the app on an ephemeral loopback port. Returns the ws:// base URL
/// and the state manager for membership assertions.
async fn spawn_server() -> (String, Arc<RealtimeStateManager>) {
    let engine = Arc::new(CascadingRiskEngine::new(
        RiskModels::pretrained().unwrap(),
        EngineConfig::default(),
    ));
    let realtime = Arc::new(RealtimeStateManager::new(engine.clone(), RealtimeConfig::default()));
    let state = ServiceState {
        engine,
        realtime: realtime.clone(),
        warehouse: Arc::new(SeededWarehouse::new()),
    };

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, create_app(state)).await.unwrap();
    });

    (format!("ws://{addr}"), realtime)
}

async fn connect(url: String) -> WsClient {
    let (client, _response) = connect_async(url).await.unwrap();
    client
}

/// Next text frame as JSON, bounded by `RECV_TIMEOUT`.
async fn recv_json(client: &mut WsClient) -> serde_json::Value {
    loop {
        let frame = timeout(RECV_TIMEOUT, client.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("stream closed")
            .expect("stream error");
        if let Message::Text(text) = frame {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

async fn send_text(client: &mut WsClient, text: impl Into<String>) {
    client.send(Message::Text(text.into())).await.unwrap();
}

/// Subscribe, answer a ping, ingest an update, and watch the prediction
/// frame arrive on the subscription in order.
#[tokio::test]
async fn predictions_stream_delivers_init_controls_and_predictions() {
    let (base, _realtime) = spawn_server().await;
    let mut predictions = connect(format!("{base}/ws/predictions")).await;

    // First frame is always the init snapshot.
    let init = recv_json(&mut predictions).await;
    assert_eq!(init["type"], "init");
    assert!(init["data"]["history"].as_array().unwrap().is_empty());
    assert!(init["data"]["latest"].is_null());
    assert_eq!(init["data"]["trends"]["status"], "insufficient_data");

    // Control messages answer before any prediction traffic exists.
    send_text(&mut predictions, "ping").await;
    let pong = recv_json(&mut predictions).await;
    assert_eq!(pong["type"], "pong");

    send_text(&mut predictions, "get_history").await;
    let history = recv_json(&mut predictions).await;
    assert_eq!(history["type"], "history");
    assert!(history["data"].as_array().unwrap().is_empty());

    // Ingest an accepted update; the ack reports the inference run.
    let mut ingest = connect(format!("{base}/ws/ingest")).await;
    send_text(&mut ingest, r#"{"domain": "env", "aqi": 185.0, "temperature": 33.0}"#).await;
    let ack = recv_json(&mut ingest).await;
    assert_eq!(ack["type"], "ack");
    assert_eq!(ack["rate_limited"], false);
    assert!(ack["inference_time_ms"].is_number());

    // The subscriber receives the prediction frame with trends attached.
    let frame = recv_json(&mut predictions).await;
    assert_eq!(frame["type"], "prediction");
    assert!(frame["data"]["resilience_score"].is_number());
    assert!(frame["data"]["overall_confidence"].is_number());
    assert_eq!(
        frame["data"]["cascade_info"]["env_prob_injected_into_health"],
        frame["data"]["environmental"]["probability_of_high"]
    );
    assert!(frame["trends"]["status"].is_string());
}

/// Ten rapid ingest messages: every one is acknowledged, at most two pass
/// the rate gate, and the rejected ones say so.
#[tokio::test]
async fn ingest_acks_carry_the_rate_gate_decision() {
    let (base, _realtime) = spawn_server().await;
    let mut ingest = connect(format!("{base}/ws/ingest")).await;

    let mut predicted = 0;
    let mut rate_limited = 0;
    for i in 0..10 {
        let update = format!(r#"{{"domain": "env", "aqi": {}}}"#, 100.0 + f64::from(i));
        send_text(&mut ingest, update).await;
        let ack = recv_json(&mut ingest).await;
        assert_eq!(ack["type"], "ack", "message {i} not acked: {ack}");
        if ack["rate_limited"] == true {
            rate_limited += 1;
            assert!(ack["inference_time_ms"].is_null());
        } else {
            predicted += 1;
        }
    }

    assert!(predicted >= 1, "the first update must pass the gate");
    assert!(predicted <= 2, "{predicted} inferences in under a second");
    assert_eq!(predicted + rate_limited, 10);
}

/// Malformed payloads and empty merges get structured acknowledgements
/// without killing the channel.
#[tokio::test]
async fn ingest_rejects_malformed_payloads_and_reports_no_change() {
    let (base, _realtime) = spawn_server().await;
    let mut ingest = connect(format!("{base}/ws/ingest")).await;

    send_text(&mut ingest, "{not json").await;
    let error = recv_json(&mut ingest).await;
    assert_eq!(error["type"], "error");

    send_text(&mut ingest, r#"{"aqi": 120.0}"#).await;
    let error = recv_json(&mut ingest).await;
    assert_eq!(error["type"], "error");
    assert!(error["message"].as_str().unwrap().contains("domain"));

    // A domain update carrying none of its fields merges nothing.
    send_text(&mut ingest, r#"{"domain": "health"}"#).await;
    let ack = recv_json(&mut ingest).await;
    assert_eq!(ack["type"], "ack");
    assert_eq!(ack["message"], "No change detected");

    // The channel still works after the errors.
    send_text(&mut ingest, r#"{"domain": "food", "supply_index": 72.0}"#).await;
    let ack = recv_json(&mut ingest).await;
    assert_eq!(ack["type"], "ack");
}

/// Closing the subscription removes the subscriber from the registry.
#[tokio::test]
async fn subscriber_is_removed_on_peer_close() {
    let (base, realtime) = spawn_server().await;
    let mut predictions = connect(format!("{base}/ws/predictions")).await;
    let init = recv_json(&mut predictions).await;
    assert_eq!(init["type"], "init");
    assert_eq!(realtime.subscriber_count().await, 1);

    predictions.close(None).await.unwrap();

    // Cleanup runs in the handler task; poll briefly for the removal.
    let mut removed = false;
    for _ in 0..50 {
        if realtime.subscriber_count().await == 0 {
            removed = true;
            break;
        }
        sleep(Duration::from_millis(100)).await;
    }
    assert!(removed, "subscriber still registered after close");
}
