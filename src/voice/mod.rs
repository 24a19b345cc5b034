//! Voice input/output seams
//!
//! Speech recognition and speech output are injected capabilities; only the
//! question heuristic lives here as real logic.

mod console;
mod question;
mod recognizer;
mod speaker;

pub use console::ConsoleRecognizer;
pub use question::is_question;
pub use recognizer::{Recognizer, SpeechEvent};
pub use speaker::{NullSpeaker, ProcessSpeaker, Speaker};
