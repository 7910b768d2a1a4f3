//! WebSocket [`Transport`] on top of tokio-tungstenite.
//!
//! Each call to [`WsTransport::open`] spawns one session task that performs
//! the handshake and then runs a single `select!` loop:
//!
//! - **Client → Service**: text frames arrive on an unbounded channel and are
//!   written to the WebSocket sink.
//! - **Service → Client**: text frames read from the WebSocket are posted to
//!   the client event loop as [`TransportEvent::Frame`].
//!
//! Whatever ends the loop (a failed handshake, an I/O error, the service
//! closing, or [`WsTransport::close`]) the task posts exactly one
//! [`TransportEvent::Closed`] before it exits.

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{client::IntoClientRequest, handshake::client::Request, Message as WsMessage},
};
use tracing::{debug, info, warn};

use crate::application::ports::{Generation, Transport, TransportError, TransportEvent};
use crate::application::ClientEvent;

/// Commands for the session task.
#[derive(Debug)]
enum Outgoing {
    Text(String),
    Close,
}

/// The live session: its command channel and task.
struct Session {
    generation: Generation,
    outgoing: mpsc::UnboundedSender<Outgoing>,
    task: JoinHandle<()>,
}

/// Production transport.  Must be used from within a tokio runtime.
pub struct WsTransport {
    events: mpsc::UnboundedSender<ClientEvent>,
    session: Option<Session>,
}

impl WsTransport {
    /// Creates a transport that posts its events to `events`.
    pub fn new(events: mpsc::UnboundedSender<ClientEvent>) -> Self {
        Self {
            events,
            session: None,
        }
    }
}

impl Transport for WsTransport {
    fn open(&mut self, url: &str, generation: Generation) -> Result<(), TransportError> {
        self.close();
        let request = client_request(url)?;

        let (outgoing, commands) = mpsc::unbounded_channel();
        let events = self.events.clone();
        let task = tokio::spawn(run_session(request, generation, events, commands));
        debug!(%url, generation, "session task spawned");

        self.session = Some(Session {
            generation,
            outgoing,
            task,
        });
        Ok(())
    }

    fn send(&mut self, text: String) -> Result<(), TransportError> {
        let session = self.session.as_ref().ok_or(TransportError::NotOpen)?;
        session
            .outgoing
            .send(Outgoing::Text(text))
            .map_err(|_| TransportError::Io("session task has ended".to_string()))
    }

    fn close(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        if session.outgoing.send(Outgoing::Close).is_err() && !session.task.is_finished() {
            session.task.abort();
        }
        debug!(generation = session.generation, "session closed");
    }
}

impl Drop for WsTransport {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            session.task.abort();
        }
    }
}

/// Builds the handshake request for `url`, accepting only `ws` and `wss`.
fn client_request(url: &str) -> Result<Request, TransportError> {
    let invalid = |reason: String| TransportError::InvalidUrl {
        url: url.to_string(),
        reason,
    };
    let request = url.into_client_request().map_err(|e| invalid(e.to_string()))?;
    match request.uri().scheme_str() {
        Some("ws") | Some("wss") => Ok(request),
        other => Err(invalid(format!(
            "unsupported scheme {}",
            other.unwrap_or("(none)")
        ))),
    }
}

// ── Session task ──────────────────────────────────────────────────────────────

async fn run_session(
    request: Request,
    generation: Generation,
    events: mpsc::UnboundedSender<ClientEvent>,
    mut commands: mpsc::UnboundedReceiver<Outgoing>,
) {
    let post = |event: TransportEvent| events.send(ClientEvent::Transport(event)).is_ok();

    let ws_stream = match connect_async(request).await {
        Ok((stream, _response)) => stream,
        Err(e) => {
            warn!(generation, "WebSocket handshake failed: {e}");
            post(TransportEvent::Closed {
                generation,
                reason: e.to_string(),
            });
            return;
        }
    };
    info!(generation, "WebSocket session open");
    if !post(TransportEvent::Opened { generation }) {
        return;
    }

    let (mut sink, mut stream) = ws_stream.split();

    let reason = loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(Outgoing::Text(text)) => {
                    if let Err(e) = sink.send(WsMessage::Text(text)).await {
                        break format!("send failed: {e}");
                    }
                }
                Some(Outgoing::Close) | None => {
                    // The peer may already be gone; the close frame is best effort.
                    let _ = sink.send(WsMessage::Close(None)).await;
                    break "closed by client".to_string();
                }
            },
            frame = stream.next() => match frame {
                Some(Ok(WsMessage::Text(text))) => {
                    if !post(TransportEvent::Frame { generation, text }) {
                        break "event loop stopped".to_string();
                    }
                }
                Some(Ok(WsMessage::Close(frame))) => {
                    break match frame {
                        Some(f) => format!("closed by service ({}: {})", f.code, f.reason),
                        None => "closed by service".to_string(),
                    };
                }
                Some(Ok(WsMessage::Binary(bytes))) => {
                    warn!(generation, len = bytes.len(), "binary frame ignored");
                }
                // Ping/Pong are answered by tungstenite itself.
                Some(Ok(_)) => {}
                Some(Err(e)) => break e.to_string(),
                None => break "stream ended".to_string(),
            },
        }
    };

    debug!(generation, %reason, "session task ending");
    post(TransportEvent::Closed { generation, reason });
}

// ── Tests ─────────────────────────────────────────────────────────────────────
