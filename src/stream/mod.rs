//! Live MJPEG stream handling
//!
//! The demuxer is the protocol-facing leaf: it knows nothing about HTTP and
//! only cuts complete JPEG payloads out of a byte stream. The session owns
//! the connection, the demuxer instance, and the single-slot latest frame.

mod demuxer;
mod session;

pub use demuxer::{DEFAULT_MAX_BUFFER, EOI_MARKER, Frame, FrameDemuxer, SOI_MARKER};
pub use session::{StreamOptions, StreamSession};
