//! Speech-recognition capability contract
//!
//! The client treats speech recognition as an external capability that
//! yields text. Platform recognizers (or test fakes) implement
//! [`Recognizer`] and push transcript events over a channel, keeping the
//! coordination loop free of audio concerns.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::Result;

/// Event emitted by a speech recognizer while a recording is active
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechEvent {
    /// In-progress hypothesis; may be revised by later events
    Partial(String),
    /// Completed utterance; no further revision expected
    Final(String),
    /// Recognizer failure; the recording ends
    Error(String),
}

/// Capability contract for a speech recognizer
#[async_trait]
pub trait Recognizer: Send + Sync {
    /// Begin recognizing speech, pushing events into `events`
    ///
    /// Recognition runs until [`stop`](Self::stop) is called or a
    /// [`SpeechEvent::Final`] / [`SpeechEvent::Error`] is delivered.
    ///
    /// # Errors
    ///
    /// Returns error if recognition cannot start (already running, audio
    /// capture unavailable).
    async fn start(&self, events: mpsc::Sender<SpeechEvent>) -> Result<()>;

    /// Stop recognizing and release audio resources
    ///
    /// Safe to call when not recognizing.
    ///
    /// # Errors
    ///
    /// Returns error if the recognizer fails to shut down cleanly.
    async fn stop(&self) -> Result<()>;
}
