//! WebSocket transport
//!
//! This file implements the RPC server that exposes the broker to remote
//! callers. Responsibilities:
//! - Accept TCP/WebSocket connections, one task per connection
//! - Decode each text frame into a `Request`, run it against the shared
//!   `Broker` and send back the matching `Response`
//! - Answer malformed frames with an `invalid_argument` error instead of
//!   dropping the connection

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::accept_async;
use tracing::{debug, error, info, warn};
use tungstenite::protocol::Message as WsMessage;
use uuid::Uuid;

use crate::broker::Broker;
use crate::transport::dispatch::dispatch;
use crate::transport::message::{Request, Response};
use crate::utils::BrokerError;

/// Bind `addr` and serve the broker until the listener fails.
pub async fn start_websocket_server(addr: String, broker: Arc<Broker>) -> std::io::Result<()> {
    let listener = TcpListener::bind(&addr).await?;
    serve(listener, broker).await
}

/// Serve the broker on an already bound listener.
pub async fn serve(listener: TcpListener, broker: Arc<Broker>) -> std::io::Result<()> {
    let local = listener.local_addr()?;
    info!("RPC server listening on ws://{local}");

    loop {
        let (stream, peer) = listener.accept().await?;
        let broker = Arc::clone(&broker);
        tokio::spawn(async move {
            handle_connection(stream, peer, broker).await;
        });
    }
}

async fn handle_connection(stream: TcpStream, peer: SocketAddr, broker: Arc<Broker>) {
    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!(%peer, "WebSocket handshake error: {e}");
            return;
        }
    };

    let connection_id = format!("conn-{}", Uuid::new_v4());
    debug!(%peer, connection = %connection_id, "connected");

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    while let Some(frame) = ws_receiver.next().await {
        let msg = match frame {
            Ok(msg) => msg,
            Err(e) => {
                debug!(connection = %connection_id, "read failed: {e}");
                break;
            }
        };

        let text = match msg {
            WsMessage::Text(text) => text,
            WsMessage::Close(_) => break,
            _ => continue,
        };

        let response = handle_text(&broker, text.as_str());
        let json = match serde_json::to_string(&response) {
            Ok(json) => json,
            Err(e) => {
                error!(connection = %connection_id, "Failed to serialize response: {e}");
                continue;
            }
        };

        if let Err(e) = ws_sender.send(WsMessage::text(json)).await {
            warn!(connection = %connection_id, "Failed to send response: {e}");
            break;
        }
    }

    debug!(connection = %connection_id, "disconnected");
}

/// Decode one request frame, run it and build the response.
pub fn handle_text(broker: &Broker, text: &str) -> Response {
    match serde_json::from_str::<Request>(text) {
        Ok(Request { id, call }) => {
            let method = call.method();
            let result = dispatch(broker, call);
            if let Err(err) = &result {
                debug!(method, "call rejected: {err}");
            }
            Response::new(id, result)
        }
        Err(err) => {
            warn!(
                "Invalid client message: {err} | {}",
                text.chars().take(100).collect::<String>()
            );
            Response::new(
                salvage_request_id(text),
                Err(BrokerError::MalformedRequest {
                    reason: err.to_string(),
                }),
            )
        }
    }
}

// Best effort: echo the id back if the frame is JSON with a string id.
fn salvage_request_id(text: &str) -> String {
    serde_json::from_str::<serde_json::Value>(text)
        .ok()
        .and_then(|v| v.get("id")?.as_str().map(str::to_owned))
        .unwrap_or_default()
}
