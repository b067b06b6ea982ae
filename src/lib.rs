//! Streaming speech-to-text client for the Doubao ASR binary WebSocket
//! protocol
//!
//! This crate is the transcription core of the MindFlow voice-journaling
//! application: it turns a captured audio buffer into text by speaking the
//! recognition service's length-prefixed binary framing protocol over a
//! persistent WebSocket, and degrades to a deterministic placeholder
//! transcript when the service is unreachable or unconfigured.
//!
//! # Usage
//!
//! ```no_run
//! use mindflow_transcribe::Transcriber;
//!
//! # async fn example(audio: Vec<u8>) {
//! let transcriber = Transcriber::from_env();
//! let text = transcriber.transcribe(&audio).await; // never fails
//! # }
//! ```
//!
//! Credentials are read from `DOUBAO_ASR_APP_KEY`, `DOUBAO_ASR_ACCESS_TOKEN`,
//! and `DOUBAO_ASR_RESOURCE_ID`; the endpoint may be overridden with
//! `DOUBAO_ASR_ENDPOINT`.

pub mod config;
pub mod fallback;
pub mod streaming;
pub mod transcriber;

pub use config::{AsrConfig, AudioFormat, RecognitionOptions};
pub use fallback::fallback_transcript;
pub use streaming::StreamError;
pub use transcriber::Transcriber;
