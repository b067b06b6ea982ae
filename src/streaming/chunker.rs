//! Splits a captured audio buffer into fixed-duration byte chunks
//!
//! The chunker is a pure, single-pass iterator; the real-time pacing between
//! chunks is done by the session's streaming loop so iteration stays free of
//! suspension points.

/// Default chunk duration used when streaming a recording
pub const DEFAULT_CHUNK_DURATION_MS: u64 = 200;

/// Byte size of one chunk of the given duration, truncated to an integer
///
/// `rate * bytes-per-sample * channels * duration / 1000`. A 16kHz/16-bit
/// mono stream at 200ms yields 6400 bytes per chunk.
pub fn chunk_size_bytes(
    sample_rate_hz: u32,
    bits_per_sample: u16,
    channels: u16,
    chunk_duration_ms: u64,
) -> usize {
    let bytes_per_second =
        sample_rate_hz as u64 * (bits_per_sample as u64 / 8) * channels as u64;
    (bytes_per_second * chunk_duration_ms / 1000) as usize
}

/// A byte-range view into the input buffer, plus the end-of-stream marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioChunk<'a> {
    pub data: &'a [u8],
    pub is_last: bool,
}

/// Lazy single-pass iterator over the chunks of an audio buffer
///
/// The last chunk is whatever remains (possibly shorter than the nominal
/// size) and is the only one marked `is_last`. An empty buffer still yields
/// one empty last chunk so the outbound stream is always terminated.
#[derive(Debug)]
pub struct AudioChunker<'a> {
    remaining: &'a [u8],
    chunk_size: usize,
    done: bool,
}

impl<'a> AudioChunker<'a> {
    /// Create a chunker over `audio` with the given chunk byte size
    ///
    /// A zero `chunk_size` (degenerate audio parameters) is clamped to one
    /// byte so iteration always terminates.
    pub fn new(audio: &'a [u8], chunk_size: usize) -> Self {
        Self {
            remaining: audio,
            chunk_size: chunk_size.max(1),
            done: false,
        }
    }
}

impl<'a> Iterator for AudioChunker<'a> {
    type Item = AudioChunk<'a>;

    fn next(&mut self) -> Option<AudioChunk<'a>> {
        if self.done {
            return None;
        }

        if self.remaining.len() <= self.chunk_size {
            self.done = true;
            return Some(AudioChunk {
                data: std::mem::take(&mut self.remaining),
                is_last: true,
            });
        }

        let (chunk, rest) = self.remaining.split_at(self.chunk_size);
        self.remaining = rest;
        Some(AudioChunk {
            data: chunk,
            is_last: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_size_bytes() {
        // 16kHz, 16-bit, mono, 200ms
        assert_eq!(chunk_size_bytes(16000, 16, 1, 200), 6400);
        // 48kHz, 16-bit, stereo, 100ms
        assert_eq!(chunk_size_bytes(48000, 16, 2, 100), 19200);
        // 8kHz, 8-bit, mono, 125ms
        assert_eq!(chunk_size_bytes(8000, 8, 1, 125), 1000);
    }

    #[test]
    fn test_concatenation_reproduces_buffer() {
        let audio: Vec<u8> = (0..=255).cycle().take(10_000).map(|b| b as u8).collect();
        let mut rebuilt = Vec::new();
        let mut last_count = 0;

        for chunk in AudioChunker::new(&audio, 777) {
            rebuilt.extend_from_slice(chunk.data);
            if chunk.is_last {
                last_count += 1;
            }
        }

        assert_eq!(rebuilt, audio);
        assert_eq!(last_count, 1);
    }

    #[test]
    fn test_exact_multiple_of_chunk_size() {
        // 3.2s of 16kHz/16-bit/mono = 102400 bytes, 200ms chunks of 6400 bytes
        let audio = vec![0u8; 102_400];
        let chunk_size = chunk_size_bytes(16000, 16, 1, 200);
        let chunks: Vec<_> = AudioChunker::new(&audio, chunk_size).collect();

        assert_eq!(chunks.len(), 16);
        assert!(chunks[..15].iter().all(|c| c.data.len() == 6400 && !c.is_last));
        assert_eq!(chunks[15].data.len(), 6400);
        assert!(chunks[15].is_last);
    }

    #[test]
    fn test_trailing_remainder_is_last() {
        let audio = vec![7u8; 1000];
        let chunks: Vec<_> = AudioChunker::new(&audio, 300).collect();

        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[3].data.len(), 100);
        assert!(chunks[3].is_last);
        assert!(!chunks[2].is_last);
    }

    #[test]
    fn test_buffer_smaller_than_one_chunk() {
        let audio = vec![1u8; 10];
        let chunks: Vec<_> = AudioChunker::new(&audio, 6400).collect();

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].data, &audio[..]);
        assert!(chunks[0].is_last);
    }

    #[test]
    fn test_empty_buffer_yields_one_last_chunk() {
        let chunks: Vec<_> = AudioChunker::new(&[], 6400).collect();

        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].data.is_empty());
        assert!(chunks[0].is_last);
    }

    #[test]
    fn test_zero_chunk_size_terminates() {
        let audio = vec![1u8; 5];
        let chunks: Vec<_> = AudioChunker::new(&audio, 0).collect();

        // Clamped to 1-byte chunks
        assert_eq!(chunks.len(), 5);
        assert!(chunks[4].is_last);
    }
}
