//! Deterministic placeholder transcript
//!
//! Used when credentials are absent at call time or a live recognition
//! attempt ends in failure. The caller of [`crate::Transcriber::transcribe`]
//! must always get a usable string back: a journaling app never blocks a
//! recording on a transcription outage.

use std::time::Duration;

/// Artificial delay before the placeholder is returned, so the caller's UX
/// resembles a round trip to the service
pub(crate) const FALLBACK_DELAY: Duration = Duration::from_millis(400);

const FALLBACK_TEXT: &str = "This is a simulated speech-to-text result. \
Configure the recognition service credentials to enable live transcription.";

/// Produce the placeholder transcript for a recording
///
/// Deterministic and infallible: the same buffer always yields the same
/// non-empty string.
pub async fn fallback_transcript(audio: &[u8]) -> String {
    log::debug!(
        "Fallback: returning placeholder transcript for {} byte recording",
        audio.len()
    );
    tokio::time::sleep(FALLBACK_DELAY).await;
    FALLBACK_TEXT.to_string()
}
