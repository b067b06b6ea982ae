//! JSON payload schema carried inside binary frames
//!
//! The wire frames (see [`super::frame`]) are opaque byte containers; this
//! module gives their JSON payloads a concrete shape. Client side: the
//! session-opening configuration request. Server side: recognition results
//! and explicit error messages, folded into [`ServerUpdate`].

use serde::{Deserialize, Serialize};

use super::frame::{Frame, MessageType};
use super::StreamError;
use crate::config::{AudioFormat, RecognitionOptions};

/// Fixed recognition model identifier expected by the service
pub const MODEL_NAME: &str = "bigmodel";

/// Platform tag reported in the configuration request
const PLATFORM: &str = "desktop";

/// Payload of the session-opening `FullClientRequest` frame
#[derive(Debug, Clone, Serialize)]
pub struct ClientRequest {
    user: UserMeta,
    audio: AudioMeta,
    request: RequestMeta,
}

#[derive(Debug, Clone, Serialize)]
struct UserMeta {
    uid: String,
    platform: String,
}

#[derive(Debug, Clone, Serialize)]
struct AudioMeta {
    format: String,
    codec: String,
    rate: u32,
    bits: u16,
    channel: u16,
}

#[derive(Debug, Clone, Serialize)]
struct RequestMeta {
    model_name: String,
    enable_itn: bool,
    enable_punc: bool,
    enable_ddc: bool,
    result_type: String,
}

impl ClientRequest {
    /// Build the configuration request for one session
    pub fn new(uid: &str, format: &AudioFormat, options: &RecognitionOptions) -> Self {
        Self {
            user: UserMeta {
                uid: uid.to_string(),
                platform: PLATFORM.to_string(),
            },
            audio: AudioMeta {
                format: format.format.clone(),
                codec: format.codec.clone(),
                rate: format.sample_rate,
                bits: format.bits_per_sample,
                channel: format.channels,
            },
            request: RequestMeta {
                model_name: MODEL_NAME.to_string(),
                enable_itn: options.enable_itn,
                enable_punc: options.enable_punc,
                enable_ddc: options.enable_ddc,
                result_type: options.result_type.clone(),
            },
        }
    }

    /// Serialize to the frame payload bytes
    pub fn to_payload(&self) -> Result<Vec<u8>, StreamError> {
        serde_json::to_vec(self).map_err(|e| StreamError::Send(e.to_string()))
    }
}

/// `FullServerResponse` payload
#[derive(Debug, Clone, Deserialize)]
struct ServerResponse {
    #[serde(default)]
    result: Option<RecognitionResult>,
}

#[derive(Debug, Clone, Deserialize)]
struct RecognitionResult {
    #[serde(default)]
    text: String,
    #[serde(default)]
    utterances: Vec<Utterance>,
}

/// One recognized segment with timing, as reported by the service
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Utterance {
    #[serde(default)]
    pub text: String,
    /// Segment start offset in milliseconds
    #[serde(default)]
    pub start_time: u64,
    /// Segment end offset in milliseconds
    #[serde(default)]
    pub end_time: u64,
    /// Whether the segment text is settled or may still be revised
    #[serde(default)]
    pub definite: bool,
}

/// `ErrorMessage` payload
#[derive(Debug, Deserialize)]
struct ServerErrorPayload {
    #[serde(default)]
    message: String,
}

/// One server message, decoded from a received frame
///
/// Explicit `ErrorMessage` frames never produce a `ServerUpdate`; they
/// surface as [`StreamError::Server`] so the error text cannot be mistaken
/// for a transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerUpdate {
    /// Cumulative transcript so far, when the response carried one
    pub text: Option<String>,
    /// Per-segment timing, when reported
    pub utterances: Vec<Utterance>,
    /// Server sequence number of the frame
    pub sequence: u32,
    /// Whether the frame's flags mark the response stream as finished
    pub is_final: bool,
}

impl ServerUpdate {
    /// Interpret a decoded frame as a server message
    pub fn from_frame(frame: Frame) -> Result<ServerUpdate, StreamError> {
        match frame.message_type {
            MessageType::FullServerResponse => {
                let response: ServerResponse = serde_json::from_slice(&frame.payload)
                    .map_err(|e| StreamError::Malformed(format!("response payload: {}", e)))?;
                let (text, utterances) = match response.result {
                    Some(result) => (Some(result.text), result.utterances),
                    None => (None, Vec::new()),
                };
                Ok(ServerUpdate {
                    text,
                    utterances,
                    sequence: frame.sequence,
                    is_final: frame.flags.is_final(),
                })
            }
            MessageType::ErrorMessage => {
                let message = match serde_json::from_slice::<ServerErrorPayload>(&frame.payload) {
                    Ok(payload) if !payload.message.is_empty() => payload.message,
                    // Keep whatever the server sent, even if it is not the
                    // documented JSON shape
                    _ => String::from_utf8_lossy(&frame.payload).into_owned(),
                };
                Err(StreamError::Server(message))
            }
            MessageType::FullClientRequest | MessageType::AudioOnlyRequest => {
                Err(StreamError::Malformed(format!(
                    "unexpected client-originated frame from server: {:?}",
                    frame.message_type
                )))
            }
        }
    }
}
