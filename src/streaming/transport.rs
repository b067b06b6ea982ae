//! WebSocket transport driver
//!
//! Owns the persistent socket for one session: binary-only sends on the
//! write half, and a background reader task that forwards everything the
//! server does as typed [`TransportEvent`]s over a channel. The session task
//! is the only consumer, so transcript state never needs a lock.
//!
//! No reconnection: a transport error or close ends the session that owns it.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

use super::StreamError;

/// Timeout for establishing the WebSocket connection
pub(crate) const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Buffer size for the reader task's event channel
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// What the socket delivered, as seen by the session task
#[derive(Debug)]
pub enum TransportEvent {
    /// A binary frame from the server
    Binary(Vec<u8>),
    /// The server closed the connection (or the stream ended)
    Closed,
    /// A socket-level error; terminal for the connection
    Error(String),
}

/// One live connection to the recognition service
pub struct Transport {
    write: futures_util::stream::SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>,
    events: mpsc::Receiver<TransportEvent>,
    reader_task: tokio::task::JoinHandle<()>,
    closed: bool,
}

impl Transport {
    /// Open a WebSocket to `url`, enforcing the connection timeout
    ///
    /// Authentication rides in the URL query parameters; this environment
    /// cannot attach custom headers to the handshake.
    pub async fn connect(url: &str) -> Result<Self, StreamError> {
        let (ws_stream, _response) = timeout(CONNECT_TIMEOUT, connect_async(url))
            .await
            .map_err(|_| StreamError::Connect("connection timeout".to_string()))?
            .map_err(|e| StreamError::Connect(e.to_string()))?;

        log::info!("Transport: WebSocket connected");

        let (write, mut read) = ws_stream.split();
        let (event_tx, events) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let reader_task = tokio::spawn(async move {
            while let Some(msg_result) = read.next().await {
                let event = match msg_result {
                    Ok(Message::Binary(buf)) => TransportEvent::Binary(buf),
                    Ok(Message::Close(_)) => {
                        log::info!("Transport: closed by server");
                        TransportEvent::Closed
                    }
                    Ok(_) => continue, // text/ping/pong carry nothing in this protocol
                    Err(e) => {
                        log::warn!("Transport: socket error: {}", e);
                        TransportEvent::Error(e.to_string())
                    }
                };
                let terminal = !matches!(event, TransportEvent::Binary(_));
                if event_tx.send(event).await.is_err() {
                    log::debug!("Transport: event channel closed");
                    break;
                }
                if terminal {
                    break;
                }
            }
            log::debug!("Transport: reader task exiting");
        });

        Ok(Self {
            write,
            events,
            reader_task,
            closed: false,
        })
    }

    /// Send one encoded frame as a binary message
    pub async fn send(&mut self, bytes: Vec<u8>) -> Result<(), StreamError> {
        if self.closed {
            return Err(StreamError::Send("transport already closed".to_string()));
        }
        self.write
            .send(Message::Binary(bytes))
            .await
            .map_err(|e| StreamError::Send(e.to_string()))
    }

    /// Receive the next transport event
    ///
    /// Returns `None` once the reader task has exited and the channel is
    /// drained.
    pub async fn recv(&mut self) -> Option<TransportEvent> {
        self.events.recv().await
    }

    /// Close the connection; idempotent
    pub async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        if let Err(e) = self.write.close().await {
            log::debug!("Transport: error sending close frame: {}", e);
        }
        self.reader_task.abort();
    }
}

impl Drop for Transport {
    fn drop(&mut self) {
        // Reader task must not outlive the session that owns this transport
        self.reader_task.abort();
    }
}
