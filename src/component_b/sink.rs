//! sink.rs
//! Delivery sink: drains the final queue and forwards each labeled event to a transport.
//! - exactly one session holds the queue at a time (`SinkHandle::try_acquire`)
//! - a transport write failure or client hang-up ends only that session; the queue is released
//! - the terminal queue state ends the session with a close

use std::{future::Future, sync::Arc};

use axum::{
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use log::{debug, info, warn};
use tokio::{
    select,
    sync::{Mutex, OwnedMutexGuard, mpsc::Receiver},
};

use crate::component_b::router::AppState;
use crate::error::{Error, Result};
use crate::model::event::Event;
use crate::utils::metrics::SharedStats;

/// Per-client write side. Implemented by the WebSocket session and by test doubles.
pub trait EventTransport {
    fn send_event(&mut self, event: &Event) -> impl Future<Output = Result<()>> + Send;

    /// Called once the queue is terminal.
    fn close(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Resolves when the client has gone away. Must be cancel-safe.
    fn disconnected(&mut self) -> impl Future<Output = ()> + Send;
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The delivery queue reached its terminal state.
    Terminal,
    /// A write failed; the queue is still live for the next session.
    TransportFailed,
    /// The client closed the connection; the queue is still live.
    ClientClosed,
}

/// Shared owner of the delivery queue's receive side.
#[derive(Clone)]
pub struct SinkHandle {
    rx: Arc<Mutex<Receiver<Event>>>,
}

impl SinkHandle {
    pub fn new(rx: Receiver<Event>) -> Self {
        Self {
            rx: Arc::new(Mutex::new(rx)),
        }
    }

    /// Exclusive reader access, or `None` while another session holds it.
    pub fn try_acquire(&self) -> Option<OwnedMutexGuard<Receiver<Event>>> {
        self.rx.clone().try_lock_owned().ok()
    }
}

/// Forwards events until the queue is terminal, the transport fails or the client leaves.
pub async fn forward_events<T: EventTransport>(
    rx: &mut Receiver<Event>,
    transport: &mut T,
    stats: &SharedStats,
) -> SessionEnd {
    loop {
        let event = select! {
            biased;
            _ = transport.disconnected() => {
                debug!("[Sink] client hung up");
                return SessionEnd::ClientClosed;
            }
            event = rx.recv() => event,
        };
        let Some(event) = event else { break };

        if let Err(e) = transport.send_event(&event).await {
            warn!("[Sink] failed to write event {}: {}", event.id, e);
            return SessionEnd::TransportFailed;
        }
        stats.record_delivered();
    }

    if let Err(e) = transport.close().await {
        debug!("[Sink] close after end of stream failed: {}", e);
    }
    SessionEnd::Terminal
}

pub struct WsTransport {
    socket: WebSocket,
}

impl WsTransport {
    pub fn new(socket: WebSocket) -> Self {
        Self { socket }
    }
}

impl EventTransport for WsTransport {
    async fn send_event(&mut self, event: &Event) -> Result<()> {
        let json = event.to_json()?;
        self.socket
            .send(Message::Text(json.into()))
            .await
            .map_err(|e| Error::Transport(e.to_string()))
    }

    async fn close(&mut self) -> Result<()> {
        self.socket
            .send(Message::Close(None))
            .await
            .map_err(|e| Error::Transport(e.to_string()))
    }

    async fn disconnected(&mut self) {
        // Inbound frames other than close carry nothing for us.
        loop {
            match self.socket.recv().await {
                None | Some(Err(_)) | Some(Ok(Message::Close(_))) => return,
                Some(Ok(_)) => {}
            }
        }
    }
}

/// `GET /api/v1/ws`: upgrade and stream labeled events to this client.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let Some(mut rx) = state.sink.try_acquire() else {
        warn!("[Sink] rejecting client: another session holds the event stream");
        return (StatusCode::CONFLICT, "event stream already has a consumer").into_response();
    };

    let stats = state.stats.clone();
    ws.on_upgrade(move |socket| async move {
        info!("[Sink] client connected");
        let mut transport = WsTransport::new(socket);
        let end = forward_events(&mut rx, &mut transport, &stats).await;
        info!("[Sink] client disconnected ({:?})", end);
    })
}
