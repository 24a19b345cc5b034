//! Capture orchestration state machine
//!
//! Decides when a spoken utterance becomes a capture-and-upload cycle and
//! serializes recording, capturing, and cooldown. The state machine is pure
//! (no I/O, no timers); the daemon drives it from channel events and owns
//! the cooldown clock, the frame snapshot, and the upload dispatch.

use chrono::{DateTime, Utc};

use crate::stream::Frame;
use crate::voice::is_question;

/// Where the orchestrator currently is in the question/capture cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing in progress; a start-recording command is accepted
    Idle,
    /// Accumulating a live transcript from the recognizer
    Listening,
    /// A question fired; the capture request is being handed off
    Processing,
    /// Quiescent interval after dispatch; no new capture can start
    Cooldown,
}

/// One frame plus its question, handed to the uploader exactly once
#[derive(Debug, Clone)]
pub struct CaptureRequest {
    /// Snapshot of the latest decoded frame at question time
    pub frame: Frame,
    /// The finalized, classified question text
    pub question: String,
    /// When the capture was taken
    pub timestamp: DateTime<Utc>,
}

impl CaptureRequest {
    /// Build a request stamped with the current time
    #[must_use]
    pub fn new(frame: Frame, question: String) -> Self {
        Self {
            frame,
            question,
            timestamp: Utc::now(),
        }
    }

    /// Upload filename: ISO-8601 timestamp with `:` replaced for filesystem safety
    #[must_use]
    pub fn filename(&self) -> String {
        format!("frame-{}.jpg", self.timestamp.format("%Y-%m-%dT%H-%M-%S%.3fZ"))
    }
}

/// Serializes recording, capturing, and cooldown
///
/// Transitions:
///
/// ```text
/// Idle --start--> Listening --final(question)--> Processing --dispatch--> Cooldown --timeout--> Idle
///                     |
///                     +--final(non-question) / stop / recognizer error--> Idle
/// ```
///
/// Re-entry into Processing is impossible until `Cooldown -> Idle`, so at
/// most one capture request is in flight per question event.
pub struct CaptureOrchestrator {
    state: SessionState,
    transcript: String,
}

impl CaptureOrchestrator {
    /// Create an orchestrator in `Idle`
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: SessionState::Idle,
            transcript: String::new(),
        }
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Transcript currently surfaced for display
    #[must_use]
    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    /// Start-recording command: `Idle -> Listening`
    ///
    /// Returns whether recording actually started; the command is a no-op
    /// in every other state (notably Processing and Cooldown).
    pub fn start_listening(&mut self) -> bool {
        if self.state == SessionState::Idle {
            self.state = SessionState::Listening;
            self.transcript.clear();
            true
        } else {
            false
        }
    }

    /// Stop-recording command: `Listening -> Idle`, transcript discarded
    pub fn stop_listening(&mut self) {
        if self.state == SessionState::Listening {
            self.state = SessionState::Idle;
            self.transcript.clear();
        }
    }

    /// Partial transcript update, surfaced for display; state is unchanged
    ///
    /// Returns whether the update was accepted (only while Listening).
    pub fn update_transcript(&mut self, text: &str) -> bool {
        if self.state == SessionState::Listening {
            self.transcript.clear();
            self.transcript.push_str(text);
            true
        } else {
            false
        }
    }

    /// Final transcript delivery
    ///
    /// If the text classifies as a question, transitions to Processing and
    /// returns the question for the caller to capture and dispatch.
    /// Otherwise the transcript is discarded and the state returns to Idle.
    pub fn finalize_transcript(&mut self, text: &str) -> Option<String> {
        if self.state != SessionState::Listening {
            return None;
        }

        let text = text.trim();
        if is_question(text) {
            self.state = SessionState::Processing;
            self.transcript.clear();
            self.transcript.push_str(text);
            Some(text.to_string())
        } else {
            self.state = SessionState::Idle;
            self.transcript.clear();
            None
        }
    }

    /// Capture request handed to the uploader: `Processing -> Cooldown`
    ///
    /// The orchestrator does not wait for the upload to complete.
    pub fn dispatched(&mut self) {
        if self.state == SessionState::Processing {
            self.state = SessionState::Cooldown;
        }
    }

    /// Cooldown interval elapsed: `Cooldown -> Idle`, indicators cleared
    pub fn cooldown_elapsed(&mut self) {
        if self.state == SessionState::Cooldown {
            self.state = SessionState::Idle;
            self.transcript.clear();
        }
    }

    /// Recognizer failure while recording: `Listening -> Idle`
    pub fn recognition_failed(&mut self) {
        if self.state == SessionState::Listening {
            self.state = SessionState::Idle;
            self.transcript.clear();
        }
    }
}

impl Default for CaptureOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}
