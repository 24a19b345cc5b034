//! Incremental MJPEG frame demultiplexer
//!
//! Extracts complete JPEG images from an unbounded, chunked byte stream by
//! scanning for the start-of-image / end-of-image markers directly. No
//! multipart boundary headers are parsed and no image decoding is attempted;
//! whatever sits between a marker pair is emitted as one opaque frame.

use bytes::Bytes;

use crate::{Error, Result};

/// JPEG start-of-image marker
pub const SOI_MARKER: [u8; 2] = [0xFF, 0xD8];

/// JPEG end-of-image marker
pub const EOI_MARKER: [u8; 2] = [0xFF, 0xD9];

/// Default cap on bytes buffered while waiting for an end marker (8 MiB)
pub const DEFAULT_MAX_BUFFER: usize = 8 * 1024 * 1024;

/// One complete JPEG image cut from the stream, markers included
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    data: Bytes,
}

impl Frame {
    pub(crate) fn new(data: Vec<u8>) -> Self {
        Self {
            data: Bytes::from(data),
        }
    }

    /// Raw frame bytes, starting with `0xFFD8` and ending with `0xFFD9`
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Frame length in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the frame holds no bytes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Consume the frame, yielding its backing buffer
    #[must_use]
    pub fn into_bytes(self) -> Bytes {
        self.data
    }
}

/// Stateful demultiplexer turning raw chunks into complete frames
///
/// One instance serves exactly one stream: `feed` must be called
/// sequentially with chunks in arrival order. Restart by calling `reset`
/// (or dropping the instance) when the underlying stream is replaced.
pub struct FrameDemuxer {
    buf: Vec<u8>,
    max_buffer: usize,
}

impl FrameDemuxer {
    /// Create a demuxer with the default buffer cap
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_buffer(DEFAULT_MAX_BUFFER)
    }

    /// Create a demuxer with an explicit buffer cap
    #[must_use]
    pub const fn with_max_buffer(max_buffer: usize) -> Self {
        Self {
            buf: Vec::new(),
            max_buffer,
        }
    }

    /// Append a chunk and extract every complete frame it closes
    ///
    /// A single call may emit zero, one, or many frames. Bytes belonging to
    /// an emitted frame are removed and never re-scanned; bytes before a
    /// found start marker are discarded, since they can never begin a valid
    /// frame. Unmatched trailing bytes stay buffered so a marker split
    /// across a chunk boundary is found on the next call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StreamCorrupt`] if the retained bytes exceed the
    /// buffer cap, which bounds memory under a pathological sender. The
    /// demuxer is unusable afterwards until `reset`.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<Frame>> {
        self.buf.extend_from_slice(chunk);

        let mut frames = Vec::new();
        loop {
            let Some(start) = find_marker(&self.buf, SOI_MARKER) else {
                break;
            };
            // Anything before the start marker can never open a frame.
            if start > 0 {
                self.buf.drain(..start);
            }

            let Some(end) = find_marker(&self.buf[SOI_MARKER.len()..], EOI_MARKER) else {
                break;
            };

            let frame_len = SOI_MARKER.len() + end + EOI_MARKER.len();
            let frame: Vec<u8> = self.buf.drain(..frame_len).collect();
            frames.push(Frame::new(frame));
        }

        if self.buf.len() > self.max_buffer {
            return Err(Error::StreamCorrupt(format!(
                "unterminated frame data exceeded {} buffered bytes",
                self.max_buffer
            )));
        }

        Ok(frames)
    }

    /// Number of bytes currently retained between frame boundaries
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Discard all internal state, making the demuxer fresh for a new stream
    pub fn reset(&mut self) {
        self.buf.clear();
    }
}

impl Default for FrameDemuxer {
    fn default() -> Self {
        Self::new()
    }
}

/// Find the first occurrence of a two-byte marker
fn find_marker(haystack: &[u8], marker: [u8; 2]) -> Option<usize> {
    haystack.windows(2).position(|w| w == marker)
}
