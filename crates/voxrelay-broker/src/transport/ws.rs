//! WebSocket session handler.
//!
//! Responsibilities:
//! - Upgrade HTTP -> WS
//! - Register the connection and send the greeting
//! - Run connect hooks
//! - Feed inbound text frames to the relay pipeline
//!
//! There are no broker-internal timeouts: heartbeats are the peers'
//! concern, the broker only answers Ping with Pong. A session ends when
//! the socket closes or errors, which degrades that connection only.

use axum::{
    extract::{ws::Message, ws::WebSocket, ws::WebSocketUpgrade, State},
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use voxrelay_core::protocol::{kinds, Envelope};

use crate::app_state::AppState;

/// Outbound queue depth per connection. Replay of a full history ring plus
/// an ack must fit without drops.
const OUTBOUND_QUEUE: usize = 256;

pub async fn ws_upgrade(State(app): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_session(app, socket))
}

async fn run_session(app: AppState, socket: WebSocket) {
    let relay = app.relay();

    let (out_tx, mut out_rx) = mpsc::channel::<Message>(OUTBOUND_QUEUE);
    let conn = relay.registry().register(out_tx);
    relay.metrics().open_connections.inc(&[]);
    tracing::debug!(conn = conn.id(), "connection opened");

    let (mut ws_tx, mut ws_rx) = socket.split();

    // Greeting first, then the host's bootstrap hooks, so a peer always
    // sees the broker speak before application state arrives.
    let greeting = Envelope::from_relay(kinds::INIT, Some("welcome"), serde_json::Value::Null);
    if let Ok(text) = serde_json::to_string(&greeting) {
        conn.try_send(Message::Text(text));
    }
    relay.run_connect_hooks(&conn).await;

    loop {
        tokio::select! {
            // outbound writer
            maybe_out = out_rx.recv() => {
                match maybe_out {
                    Some(m) => {
                        if ws_tx.send(m).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }

            // inbound reader
            incoming = ws_rx.next() => {
                let Some(incoming) = incoming else { break; };
                let Ok(msg) = incoming else { break; };

                match msg {
                    Message::Text(text) => relay.handle_frame(&conn, &text).await,
                    Message::Binary(_) => {
                        tracing::warn!(conn = conn.id(), "binary frame ignored, protocol is JSON text");
                    }
                    Message::Ping(payload) => {
                        conn.try_send(Message::Pong(payload));
                    }
                    Message::Pong(_) => {}
                    Message::Close(_) => break,
                }
            }
        }
    }

    relay.registry().unregister(conn.id());
    relay.metrics().open_connections.dec(&[]);
}
