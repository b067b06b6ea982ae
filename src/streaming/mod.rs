//! Streaming transcription over the Doubao ASR binary WebSocket protocol
//!
//! This module implements the client side of the recognition service's
//! length-prefixed binary framing protocol: a persistent WebSocket carries
//! bit-packed frames in both directions, the client streams audio at a fixed
//! cadence, and the server answers with cumulative partial transcripts until
//! it flags finality.
//!
//! # Architecture
//!
//! ```text
//! Audio buffer ──▶ AudioChunker (200ms chunks) ──▶ AsrSession
//!                                                     │ frame::encode
//!                                                     ▼
//!                                                 Transport
//!                                                (WebSocket)
//!                                                     │ frame::decode
//!                                                     ▼
//!                                               ServerUpdate ──▶ transcript
//! ```
//!
//! # Failure model
//!
//! A session never reconnects: a dropped connection, malformed frame, server
//! error frame, or timeout is terminal for that attempt. The façade in
//! [`crate::transcriber`] maps every terminal failure to the deterministic
//! fallback transcript.

mod chunker;
mod frame;
mod protocol;
mod session;
mod transport;

pub use chunker::{chunk_size_bytes, AudioChunk, AudioChunker, DEFAULT_CHUNK_DURATION_MS};
pub use frame::{decode, encode, Compression, Flags, Frame, MessageType, Serialization};
pub use protocol::{ClientRequest, ServerUpdate, Utterance, MODEL_NAME};
pub use session::{AsrSession, Phase};
pub use transport::{Transport, TransportEvent};

/// Errors that can occur during a streaming transcription attempt
#[derive(Debug, Clone)]
pub enum StreamError {
    /// Required service credentials are absent
    ConfigMissing,
    /// WebSocket failed to open, or the open timed out
    Connect(String),
    /// Write to an already-closed or erroring socket
    Send(String),
    /// Structural violation in a received frame (size mismatch, unknown enumerant)
    Malformed(String),
    /// The service returned an explicit error frame
    Server(String),
    /// No final response arrived within the response timeout
    ResponseTimeout,
}

impl std::fmt::Display for StreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamError::ConfigMissing => {
                write!(f, "Recognition service credentials not configured")
            }
            StreamError::Connect(e) => write!(f, "Failed to connect to recognition service: {}", e),
            StreamError::Send(e) => write!(f, "Failed to send frame: {}", e),
            StreamError::Malformed(e) => write!(f, "Malformed frame: {}", e),
            StreamError::Server(e) => write!(f, "Recognition service error: {}", e),
            StreamError::ResponseTimeout => {
                write!(f, "Timed out waiting for the final recognition result")
            }
        }
    }
}

impl std::error::Error for StreamError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_error_display() {
        let err = StreamError::ConfigMissing;
        assert!(err.to_string().contains("not configured"));

        let err = StreamError::Connect("connection timeout".to_string());
        assert!(err.to_string().contains("connection timeout"));

        let err = StreamError::Server("quota exceeded".to_string());
        assert!(err.to_string().contains("quota exceeded"));

        let err = StreamError::Malformed("payload size mismatch".to_string());
        assert!(err.to_string().contains("payload size mismatch"));
    }

    #[test]
    fn test_stream_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<StreamError>();
    }
}
