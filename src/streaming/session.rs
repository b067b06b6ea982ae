//! Session state machine for one transcription attempt
//!
//! An [`AsrSession`] owns the transport for exactly one attempt and walks the
//! protocol's phases:
//!
//! ```text
//! Idle → Connecting → Configuring → Streaming → AwaitingFinal → Completed
//!                                                      │
//!                                  (any error/timeout) ▼
//!                                                    Failed
//! ```
//!
//! The configuration frame is fire-and-forget; audio chunks are paced at the
//! chunk duration to approximate a live microphone; server responses are
//! treated as cumulative transcripts (last non-empty write wins). `Completed`
//! and `Failed` are terminal: the transport is closed exactly once and no
//! further frames are sent or accepted.

use std::time::Duration;

use tokio::time::{timeout, Instant};

use super::chunker::{chunk_size_bytes, AudioChunker, DEFAULT_CHUNK_DURATION_MS};
use super::frame::{self, Frame};
use super::protocol::{ClientRequest, ServerUpdate};
use super::transport::{Transport, TransportEvent};
use super::StreamError;
use crate::config::{AsrConfig, AudioFormat, RecognitionOptions};

/// Deadline for the final recognition result once streaming is done
pub(crate) const RESPONSE_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Connecting,
    Configuring,
    Streaming,
    AwaitingFinal,
    Completed,
    Failed,
}

impl Phase {
    /// Terminal phases accept no further frames in either direction
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Completed | Phase::Failed)
    }
}

/// One live transcription attempt
pub struct AsrSession {
    transport: Transport,
    phase: Phase,
    /// Per-session correlation token, also sent as `connect_id`/`uid`
    connect_id: String,
    /// Cumulative transcript; only this task writes it
    transcript: String,
    chunk_size: usize,
    chunk_duration: Duration,
    closed: bool,
}

impl AsrSession {
    /// Open the transport and enter `Configuring`
    ///
    /// Connection failures and the connect timeout surface as
    /// [`StreamError::Connect`]; no session value exists afterwards, so the
    /// attempt is terminal by construction.
    pub async fn connect(config: &AsrConfig) -> Result<Self, StreamError> {
        let connect_id = AsrConfig::new_connect_id();
        let url = config.connect_url(&connect_id);

        log::info!("Session {}: connecting to recognition service", connect_id);
        let transport = Transport::connect(&url).await?;

        Ok(Self {
            transport,
            phase: Phase::Configuring,
            connect_id,
            transcript: String::new(),
            chunk_size: 0,
            chunk_duration: Duration::from_millis(DEFAULT_CHUNK_DURATION_MS),
            closed: false,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn connect_id(&self) -> &str {
        &self.connect_id
    }

    /// Send the configuration frame and enter `Streaming`
    ///
    /// Fire-and-forget: the session does not wait for an acknowledgment
    /// before audio may flow.
    pub async fn send_config(
        &mut self,
        format: &AudioFormat,
        options: &RecognitionOptions,
    ) -> Result<(), StreamError> {
        self.expect_phase(Phase::Configuring)?;

        let request = ClientRequest::new(&self.connect_id, format, options);
        let payload = request.to_payload().map_err(|e| self.fail(e))?;
        let encoded = frame::encode(&Frame::client_request(payload));
        self.transport.send(encoded).await.map_err(|e| self.fail(e))?;

        self.chunk_size = chunk_size_bytes(
            format.sample_rate,
            format.bits_per_sample,
            format.channels,
            self.chunk_duration.as_millis() as u64,
        );
        self.phase = Phase::Streaming;
        log::info!(
            "Session {}: configured ({}Hz/{}bit/{}ch, {} byte chunks)",
            self.connect_id,
            format.sample_rate,
            format.bits_per_sample,
            format.channels,
            self.chunk_size
        );
        Ok(())
    }

    /// Stream the audio buffer as paced `AudioOnlyRequest` chunks
    ///
    /// Suspends for the chunk duration between non-final chunks; the final
    /// chunk carries `LastPacket` and is sent without a trailing delay.
    /// Enters `AwaitingFinal` once the last chunk is on the wire.
    pub async fn stream_audio(&mut self, audio: &[u8]) -> Result<(), StreamError> {
        self.expect_phase(Phase::Streaming)?;

        let mut chunks_sent: u64 = 0;
        let mut chunker = AudioChunker::new(audio, self.chunk_size);
        loop {
            let Some(chunk) = chunker.next() else { break };

            let encoded = frame::encode(&Frame::audio_chunk(chunk.data.to_vec(), chunk.is_last));
            if let Err(e) = self.transport.send(encoded).await {
                return Err(self.fail(e));
            }
            chunks_sent += 1;

            if chunk.is_last {
                self.phase = Phase::AwaitingFinal;
                break;
            }
            tokio::time::sleep(self.chunk_duration).await;
        }

        log::debug!(
            "Session {}: streamed {} chunks ({} bytes)",
            self.connect_id,
            chunks_sent,
            audio.len()
        );
        Ok(())
    }

    /// Consume server responses until finality, a failure, or the response
    /// deadline
    ///
    /// Each response's non-empty `result.text` replaces the accumulated
    /// transcript. A transport close with a non-empty transcript counts as
    /// completion; with nothing accumulated it is a failure.
    pub async fn await_final(&mut self) -> Result<String, StreamError> {
        self.expect_phase(Phase::AwaitingFinal)?;

        let deadline = Instant::now() + RESPONSE_TIMEOUT;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let event = match timeout(remaining, self.transport.recv()).await {
                Err(_) => {
                    log::warn!("Session {}: response timeout", self.connect_id);
                    return Err(self.fail(StreamError::ResponseTimeout));
                }
                Ok(event) => event,
            };

            match event {
                Some(TransportEvent::Binary(buf)) => {
                    let frame = frame::decode(&buf).map_err(|e| self.fail(e))?;
                    let update = ServerUpdate::from_frame(frame).map_err(|e| self.fail(e))?;

                    if let Some(text) = update.text {
                        if !text.is_empty() {
                            self.transcript = text;
                        }
                    }
                    if update.is_final {
                        log::info!(
                            "Session {}: final response (seq {}, {} chars)",
                            self.connect_id,
                            update.sequence,
                            self.transcript.len()
                        );
                        return Ok(self.complete().await);
                    }
                }
                Some(TransportEvent::Closed) | None => {
                    if self.transcript.is_empty() {
                        return Err(self.fail(StreamError::Connect(
                            "connection closed before any result".to_string(),
                        )));
                    }
                    log::info!(
                        "Session {}: closed by server with {} chars accumulated",
                        self.connect_id,
                        self.transcript.len()
                    );
                    return Ok(self.complete().await);
                }
                Some(TransportEvent::Error(e)) => {
                    return Err(self.fail(StreamError::Connect(e)));
                }
            }
        }
    }

    /// Tear the session down; idempotent, closes the transport exactly once
    ///
    /// A non-terminal session being closed (the façade's unconditional
    /// cleanup after an error) ends up `Failed`.
    pub async fn close(&mut self) {
        if !self.phase.is_terminal() {
            self.phase = Phase::Failed;
        }
        if self.closed {
            return;
        }
        self.closed = true;
        self.transport.close().await;
        log::debug!("Session {}: closed ({:?})", self.connect_id, self.phase);
    }

    async fn complete(&mut self) -> String {
        self.phase = Phase::Completed;
        self.close().await;
        self.transcript.clone()
    }

    fn fail(&mut self, error: StreamError) -> StreamError {
        self.phase = Phase::Failed;
        error
    }

    fn expect_phase(&mut self, expected: Phase) -> Result<(), StreamError> {
        if self.phase == expected {
            return Ok(());
        }
        let err = StreamError::Send(format!(
            "session in phase {:?}, expected {:?}",
            self.phase, expected
        ));
        // A session that already finished stays in its terminal phase
        if !self.phase.is_terminal() {
            self.phase = Phase::Failed;
        }
        Err(err)
    }
}
