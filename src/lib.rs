//! Spectacle - voice-driven assistant client for live camera streams
//!
//! This library provides the core functionality for the spectacle client:
//! - MJPEG frame demultiplexing from a chunked byte stream
//! - UDP broadcast discovery of the camera's stream endpoint
//! - Question detection over finalized speech transcripts
//! - Capture orchestration (frame snapshot + question upload + spoken answer)
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  UDP beacon   ┌──────────────────┐
//! │    Camera    │──────────────▶│ DiscoveryService │
//! │  (MJPEG/TCP) │               └────────┬─────────┘
//! └──────┬───────┘                        │ endpoint
//!        │ chunked HTTP          ┌────────▼─────────┐
//!        └───────────────────────▶  StreamSession   │
//!                                │  (FrameDemuxer)  │
//!                                └────────┬─────────┘
//!  speech ──▶ Recognizer ──┐              │ latest frame
//!                          ▼              ▼
//!                    ┌──────────────────────────┐
//!                    │   CaptureOrchestrator    │──▶ Uploader ──▶ Speaker
//!                    └──────────────────────────┘
//! ```

pub mod capture;
pub mod config;
pub mod daemon;
pub mod discovery;
pub mod error;
pub mod stream;
pub mod upload;
pub mod voice;

pub use capture::{CaptureOrchestrator, CaptureRequest, SessionState};
pub use config::Config;
pub use daemon::{Command, Daemon, DaemonHandle};
pub use discovery::{DISCOVERY_PORT, DiscoveryService, Endpoint, decode_beacon};
pub use error::{Error, Result};
pub use stream::{Frame, FrameDemuxer, StreamOptions, StreamSession};
pub use upload::Uploader;
pub use voice::{
    ConsoleRecognizer, NullSpeaker, ProcessSpeaker, Recognizer, Speaker, SpeechEvent, is_question,
};
