//! Binary frame codec for the Doubao ASR wire protocol
//!
//! Every message on the wire is one frame: a 4-byte bit-packed header, an
//! optional big-endian sequence number (server frames only), a big-endian
//! payload size, and the payload bytes.
//!
//! # Header Layout
//!
//! ```text
//! byte 0: | protocol version (4 bits) | header size in words (4 bits) |
//! byte 1: | message type     (4 bits) | flags                (4 bits) |
//! byte 2: | serialization    (4 bits) | compression          (4 bits) |
//! byte 3: | reserved, zero on encode, ignored on decode               |
//! ```
//!
//! Server-originated frames (`FullServerResponse`, `ErrorMessage`) carry a
//! u32 sequence number between the header and the payload size. Client
//! request frames do not emit one; the service numbers only its own side of
//! the conversation.
//!
//! Pure functions, no I/O: `decode(encode(frame)) == frame` for every valid
//! frame.

use super::StreamError;

/// Protocol version carried in the high nibble of header byte 0
pub const PROTOCOL_VERSION: u8 = 0b0001;

/// Header length in 4-byte words, carried in the low nibble of byte 0
pub const HEADER_SIZE_WORDS: u8 = 0b0001;

/// Discriminates the four frame kinds on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    /// Client configuration request (JSON payload), first frame of a session
    FullClientRequest = 0b0001,
    /// Raw audio chunk from the client
    AudioOnlyRequest = 0b0010,
    /// Recognition result from the server (JSON payload)
    FullServerResponse = 0b1001,
    /// Explicit error from the server (JSON payload with a message string)
    ErrorMessage = 0b1111,
}

impl MessageType {
    fn from_nibble(nibble: u8) -> Option<Self> {
        match nibble {
            0b0001 => Some(MessageType::FullClientRequest),
            0b0010 => Some(MessageType::AudioOnlyRequest),
            0b1001 => Some(MessageType::FullServerResponse),
            0b1111 => Some(MessageType::ErrorMessage),
            _ => None,
        }
    }

    /// Server-originated frames carry a sequence number field
    pub fn carries_sequence(&self) -> bool {
        matches!(
            self,
            MessageType::FullServerResponse | MessageType::ErrorMessage
        )
    }
}

/// Sequencing flags: whether a frame is intermediate or final in its stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flags {
    None = 0b0000,
    PositiveSequence = 0b0001,
    /// Final frame of a sequence
    LastPacket = 0b0010,
    /// Final frame, negative-sequence convention
    NegativeSequence = 0b0011,
}

impl Flags {
    fn from_nibble(nibble: u8) -> Option<Self> {
        match nibble {
            0b0000 => Some(Flags::None),
            0b0001 => Some(Flags::PositiveSequence),
            0b0010 => Some(Flags::LastPacket),
            0b0011 => Some(Flags::NegativeSequence),
            _ => None,
        }
    }

    /// Whether these flags signal the end of the sequence
    pub fn is_final(&self) -> bool {
        matches!(self, Flags::LastPacket | Flags::NegativeSequence)
    }
}

/// How the payload bytes are to be interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Serialization {
    /// Opaque bytes (audio)
    None = 0b0000,
    /// UTF-8 JSON text
    Json = 0b0001,
}

impl Serialization {
    fn from_nibble(nibble: u8) -> Option<Self> {
        match nibble {
            0b0000 => Some(Serialization::None),
            0b0001 => Some(Serialization::Json),
            _ => None,
        }
    }
}

/// Payload compression. Gzip is part of the wire format but this client
/// never emits it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None = 0b0000,
    Gzip = 0b0001,
}

impl Compression {
    fn from_nibble(nibble: u8) -> Option<Self> {
        match nibble {
            0b0000 => Some(Compression::None),
            0b0001 => Some(Compression::Gzip),
            _ => None,
        }
    }
}

/// One decoded wire frame
///
/// `sequence` is only meaningful on server-originated frames; client frames
/// keep it at zero and do not encode it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub message_type: MessageType,
    pub flags: Flags,
    pub serialization: Serialization,
    pub compression: Compression,
    pub sequence: u32,
    pub payload: Vec<u8>,
}

impl Frame {
    /// Build the session-opening configuration frame (JSON payload)
    pub fn client_request(payload: Vec<u8>) -> Self {
        Self {
            message_type: MessageType::FullClientRequest,
            flags: Flags::None,
            serialization: Serialization::Json,
            compression: Compression::None,
            sequence: 0,
            payload,
        }
    }

    /// Build an audio chunk frame; the final chunk is flagged `LastPacket`
    pub fn audio_chunk(payload: Vec<u8>, is_last: bool) -> Self {
        Self {
            message_type: MessageType::AudioOnlyRequest,
            flags: if is_last { Flags::LastPacket } else { Flags::None },
            serialization: Serialization::None,
            compression: Compression::None,
            sequence: 0,
            payload,
        }
    }
}

/// Serialize a frame into its wire representation
pub fn encode(frame: &Frame) -> Vec<u8> {
    let sequence_len = if frame.message_type.carries_sequence() {
        4
    } else {
        0
    };
    let mut buf = Vec::with_capacity(4 + sequence_len + 4 + frame.payload.len());

    buf.push((PROTOCOL_VERSION << 4) | HEADER_SIZE_WORDS);
    buf.push(((frame.message_type as u8) << 4) | frame.flags as u8);
    buf.push(((frame.serialization as u8) << 4) | frame.compression as u8);
    buf.push(0); // reserved

    if frame.message_type.carries_sequence() {
        buf.extend_from_slice(&frame.sequence.to_be_bytes());
    }
    buf.extend_from_slice(&(frame.payload.len() as u32).to_be_bytes());
    buf.extend_from_slice(&frame.payload);

    buf
}

/// Parse a received buffer back into a frame
///
/// Fails with [`StreamError::Malformed`] when the buffer is truncated, a
/// header nibble holds an unrecognized value, or the declared payload size
/// does not match the remaining byte count.
pub fn decode(buf: &[u8]) -> Result<Frame, StreamError> {
    if buf.len() < 4 {
        return Err(StreamError::Malformed(format!(
            "frame shorter than header: {} bytes",
            buf.len()
        )));
    }

    let message_type = MessageType::from_nibble(buf[1] >> 4).ok_or_else(|| {
        StreamError::Malformed(format!("unknown message type nibble 0x{:x}", buf[1] >> 4))
    })?;
    let flags = Flags::from_nibble(buf[1] & 0x0f).ok_or_else(|| {
        StreamError::Malformed(format!("unknown flags nibble 0x{:x}", buf[1] & 0x0f))
    })?;
    let serialization = Serialization::from_nibble(buf[2] >> 4).ok_or_else(|| {
        StreamError::Malformed(format!("unknown serialization nibble 0x{:x}", buf[2] >> 4))
    })?;
    let compression = Compression::from_nibble(buf[2] & 0x0f).ok_or_else(|| {
        StreamError::Malformed(format!("unknown compression nibble 0x{:x}", buf[2] & 0x0f))
    })?;
    // byte 0 (version/header size) and byte 3 (reserved) are ignored on decode

    let mut offset = 4;
    let sequence = if message_type.carries_sequence() {
        let bytes = read_u32(buf, offset, "sequence number")?;
        offset += 4;
        bytes
    } else {
        0
    };

    let payload_size = read_u32(buf, offset, "payload size")? as usize;
    offset += 4;

    let remaining = buf.len() - offset;
    if payload_size != remaining {
        return Err(StreamError::Malformed(format!(
            "payload size mismatch: declared {}, {} remaining",
            payload_size, remaining
        )));
    }

    Ok(Frame {
        message_type,
        flags,
        serialization,
        compression,
        sequence,
        payload: buf[offset..].to_vec(),
    })
}

fn read_u32(buf: &[u8], offset: usize, field: &str) -> Result<u32, StreamError> {
    let bytes: [u8; 4] = buf
        .get(offset..offset + 4)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| StreamError::Malformed(format!("frame truncated before {}", field)))?;
    Ok(u32::from_be_bytes(bytes))
}
