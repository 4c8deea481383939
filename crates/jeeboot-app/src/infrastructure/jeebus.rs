//! Client for the jeebus backend messaging service.
//!
//! The application registry calls [`BackendClient::connect`] exactly once at
//! startup and never looks at the outcome.  Everything that happens after
//! that call belongs to this module: opening the WebSocket, tracking whether
//! the link is up, and fanning incoming messages out to whoever subscribed.
//!
//! # Wire format
//!
//! The service name is offered as the WebSocket subprotocol
//! (`Sec-WebSocket-Protocol: jeebus`).  Each text frame the server sends is
//! one JSON value.
//!
//! # Failure policy
//!
//! There are no retries.  A failed connection attempt is logged and recorded
//! as [`ConnectionStatus::Failed`]; a later `connect` call may try again.

use futures_util::StreamExt;
use tokio::sync::{broadcast, watch};
use tokio_tungstenite::{
    connect_async,
    tungstenite::{
        client::IntoClientRequest,
        http::{header::SEC_WEBSOCKET_PROTOCOL, HeaderValue},
        Message as WsMessage,
    },
};
use tracing::{debug, info, warn};

use crate::application::backend::{BackendClient, ConnectionStatus};

/// Capacity of the incoming-event broadcast channel.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// WebSocket implementation of [`BackendClient`].
pub struct JeebusClient {
    url: String,
    status_tx: watch::Sender<ConnectionStatus>,
    events_tx: broadcast::Sender<serde_json::Value>,
}

impl JeebusClient {
    /// Creates a client for the backend at `url`.  Nothing is opened until
    /// [`BackendClient::connect`] is called.
    pub fn new(url: impl Into<String>) -> Self {
        let (status_tx, _) = watch::channel(ConnectionStatus::Idle);
        let (events_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            url: url.into(),
            status_tx,
            events_tx,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Receives every JSON message the backend sends from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<serde_json::Value> {
        self.events_tx.subscribe()
    }

    /// Watches link state changes.
    pub fn watch_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status_tx.subscribe()
    }
}

impl BackendClient for JeebusClient {
    fn connect(&self, service: &str) {
        // Fire-and-forget needs a runtime to spawn on; without one the
        // attempt fails immediately instead of panicking.
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                warn!("jeebus: cannot connect to {}: {e}", self.url);
                self.status_tx.send_if_modified(|status| {
                    if status.is_active() {
                        return false;
                    }
                    *status = ConnectionStatus::Failed(e.to_string());
                    true
                });
                return;
            }
        };

        // Test and set under the channel's lock, so only one caller spawns.
        let claimed = self.status_tx.send_if_modified(|status| {
            if status.is_active() {
                return false;
            }
            *status = ConnectionStatus::Connecting;
            true
        });
        if !claimed {
            warn!("jeebus: connect({service}) ignored, a connection is already active");
            return;
        }

        info!("jeebus: connecting to {} as {service:?}", self.url);

        runtime.spawn(run_connection(
            self.url.clone(),
            service.to_string(),
            self.status_tx.clone(),
            self.events_tx.clone(),
        ));
    }

    fn status(&self) -> ConnectionStatus {
        self.status_tx.borrow().clone()
    }
}

// ── Connection task ───────────────────────────────────────────────────────────

/// Opens the WebSocket and pumps incoming frames until the server goes away.
async fn run_connection(
    url: String,
    service: String,
    status_tx: watch::Sender<ConnectionStatus>,
    events_tx: broadcast::Sender<serde_json::Value>,
) {
    let mut ws = match open(&url, &service).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!("jeebus: connection to {url} failed: {e}");
            status_tx.send_replace(ConnectionStatus::Failed(e));
            return;
        }
    };

    info!("jeebus: connected to {url}");
    status_tx.send_replace(ConnectionStatus::Connected);

    while let Some(frame) = ws.next().await {
        match frame {
            Ok(WsMessage::Text(text)) => match serde_json::from_str(&text) {
                // A send error only means nobody is subscribed right now.
                Ok(value) => {
                    let _ = events_tx.send(value);
                }
                Err(e) => debug!("jeebus: ignoring non-JSON frame: {e}"),
            },
            Ok(WsMessage::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                warn!("jeebus: read error: {e}");
                break;
            }
        }
    }

    info!("jeebus: connection to {url} closed");
    status_tx.send_replace(ConnectionStatus::Closed);
}

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

async fn open(url: &str, service: &str) -> Result<WsStream, String> {
    let mut request = url.into_client_request().map_err(|e| e.to_string())?;
    let protocol = HeaderValue::from_str(service).map_err(|e| e.to_string())?;
    request.headers_mut().insert(SEC_WEBSOCKET_PROTOCOL, protocol);

    let (ws, _response) = connect_async(request).await.map_err(|e| e.to_string())?;
    Ok(ws)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use futures_util::SinkExt;
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;
    use tokio_tungstenite::accept_hdr_async;
    use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};

    /// Waits until the status satisfies `pred`, failing after two seconds.
    async fn wait_for(
        rx: &mut watch::Receiver<ConnectionStatus>,
        pred: impl Fn(&ConnectionStatus) -> bool,
    ) -> ConnectionStatus {
        tokio::time::timeout(Duration::from_secs(2), rx.wait_for(|s| pred(s)))
            .await
            .expect("status change timed out")
            .expect("status sender dropped")
            .clone()
    }

    #[test]
    fn test_new_client_is_idle() {
        let client = JeebusClient::new("ws://127.0.0.1:1/ws");
        assert_eq!(client.status(), ConnectionStatus::Idle);
        assert_eq!(client.url(), "ws://127.0.0.1:1/ws");
    }

    #[test]
    fn test_connect_without_runtime_fails_instead_of_panicking() {
        let client = JeebusClient::new("ws://127.0.0.1:1/ws");

        client.connect("jeebus");

        assert!(matches!(client.status(), ConnectionStatus::Failed(_)));
    }

    #[tokio::test]
    async fn test_connect_returns_before_connection_is_established() {
        // Arrange: a listener that never accepts, so the handshake cannot finish
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let client = JeebusClient::new(format!("ws://{addr}/ws"));

        // Act
        client.connect("jeebus");

        // Assert: the call returned while the attempt is still in flight
        assert_eq!(client.status(), ConnectionStatus::Connecting);
        drop(listener);
    }

    #[tokio::test]
    async fn test_connect_to_unreachable_backend_records_failure() {
        // Arrange: bind then drop to get a port nobody listens on
        let addr = {
            let l = TcpListener::bind("127.0.0.1:0").await.unwrap();
            l.local_addr().unwrap()
        };
        let client = JeebusClient::new(format!("ws://{addr}/ws"));
        let mut status = client.watch_status();

        // Act
        client.connect("jeebus");

        // Assert
        let final_status = wait_for(&mut status, |s| !s.is_active()).await;
        assert!(matches!(final_status, ConnectionStatus::Failed(_)));
    }

    #[tokio::test]
    async fn test_connect_offers_service_as_subprotocol_and_forwards_json() {
        // Arrange: a tiny jeebus server that echoes the subprotocol back,
        // reports what it was offered, then sends one JSON message
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (proto_tx, proto_rx) = oneshot::channel::<Option<String>>();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let callback = move |req: &Request, mut resp: Response| {
                let offered = req.headers().get(SEC_WEBSOCKET_PROTOCOL).cloned();
                let _ = proto_tx.send(
                    offered
                        .as_ref()
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string),
                );
                if let Some(v) = offered {
                    resp.headers_mut().insert(SEC_WEBSOCKET_PROTOCOL, v);
                }
                Ok::<_, ErrorResponse>(resp)
            };
            let mut ws = accept_hdr_async(stream, callback).await.unwrap();
            ws.send(WsMessage::Text(r#"{"node":17,"status":"ok"}"#.into()))
                .await
                .unwrap();
            ws.close(None).await.unwrap();
        });

        let client = JeebusClient::new(format!("ws://{addr}/ws"));
        let mut events = client.subscribe();
        let mut status = client.watch_status();

        // Act
        client.connect("jeebus");

        // Assert
        assert_eq!(proto_rx.await.unwrap().as_deref(), Some("jeebus"));
        let event = tokio::time::timeout(Duration::from_secs(2), events.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event["node"], 17);
        let final_status = wait_for(&mut status, |s| *s == ConnectionStatus::Closed).await;
        assert_eq!(final_status, ConnectionStatus::Closed);
    }

    #[tokio::test]
    async fn test_second_connect_while_active_is_ignored() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let client = JeebusClient::new(format!("ws://{addr}/ws"));

        client.connect("jeebus");
        client.connect("jeebus");

        // Still one attempt in flight, no state reset.
        assert_eq!(client.status(), ConnectionStatus::Connecting);
        drop(listener);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_connects_open_one_connection() {
        // Arrange: count every TCP connection the client opens
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let client = std::sync::Arc::new(JeebusClient::new(format!("ws://{addr}/ws")));

        // Act: race several connect calls from different threads
        let barrier = std::sync::Arc::new(tokio::sync::Barrier::new(8));
        let mut callers = Vec::new();
        for _ in 0..8 {
            let client = std::sync::Arc::clone(&client);
            let barrier = std::sync::Arc::clone(&barrier);
            callers.push(tokio::spawn(async move {
                barrier.wait().await;
                client.connect("jeebus");
            }));
        }
        for caller in callers {
            caller.await.unwrap();
        }

        // Assert: one accept succeeds, no second connection arrives
        let first = tokio::time::timeout(Duration::from_secs(2), listener.accept()).await;
        assert!(first.is_ok());
        let second = tokio::time::timeout(Duration::from_millis(200), listener.accept()).await;
        assert!(second.is_err(), "a second connection was opened");
        assert!(client.status().is_active());
    }
}
