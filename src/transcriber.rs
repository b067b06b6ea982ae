//! Transcription façade
//!
//! The single public entry point: `transcribe(audio) -> text`, which never
//! fails. One call drives one independent session end to end (connect,
//! configure, stream, await finality), and every internal error is caught
//! here, logged for diagnostics, and converted into the fallback transcript.
//! The session's transport is released on every exit path.

use crate::config::{AsrConfig, AudioFormat, RecognitionOptions};
use crate::fallback::fallback_transcript;
use crate::streaming::{AsrSession, StreamError};

/// Converts captured audio recordings into text
///
/// Holds the immutable per-call parameters; each `transcribe` call owns its
/// own session and connection, so concurrent calls are fully independent.
pub struct Transcriber {
    config: Option<AsrConfig>,
    audio_format: AudioFormat,
    options: RecognitionOptions,
}

impl Transcriber {
    pub fn new(
        config: Option<AsrConfig>,
        audio_format: AudioFormat,
        options: RecognitionOptions,
    ) -> Self {
        Self {
            config,
            audio_format,
            options,
        }
    }

    /// Build a transcriber from the process environment with default audio
    /// parameters (16kHz/16-bit/mono PCM)
    pub fn from_env() -> Self {
        let config = AsrConfig::from_env();
        if config.is_none() {
            log::warn!(
                "Recognition service not configured (missing: {}); transcriptions will use the \
                 placeholder transcript",
                AsrConfig::missing_env_keys().join(", ")
            );
        }
        Self::new(config, AudioFormat::default(), RecognitionOptions::default())
    }

    /// Whether live recognition credentials are present
    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    /// Transcribe a captured audio buffer; always returns text
    ///
    /// Missing configuration short-circuits to the fallback without touching
    /// the network. A failed live attempt is logged and also answered with
    /// the fallback; the error taxonomy stays internal.
    pub async fn transcribe(&self, audio: &[u8]) -> String {
        let Some(config) = &self.config else {
            log::info!("Transcriber: no credentials, using placeholder transcript");
            return fallback_transcript(audio).await;
        };

        match self.transcribe_live(config, audio).await {
            Ok(text) => {
                log::info!("Transcriber: live transcription succeeded ({} chars)", text.len());
                text
            }
            Err(e) => {
                log::warn!("Transcriber: live transcription failed, using placeholder: {}", e);
                fallback_transcript(audio).await
            }
        }
    }

    /// One live protocol attempt; the session is closed on every exit path
    async fn transcribe_live(
        &self,
        config: &AsrConfig,
        audio: &[u8],
    ) -> Result<String, StreamError> {
        let mut session = AsrSession::connect(config).await?;
        let result = self.run_session(&mut session, audio).await;
        session.close().await;
        result
    }

    async fn run_session(
        &self,
        session: &mut AsrSession,
        audio: &[u8],
    ) -> Result<String, StreamError> {
        session.send_config(&self.audio_format, &self.options).await?;
        session.stream_audio(audio).await?;
        session.await_final().await
    }
}
