//! Speech-output capability contract

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::{Error, Result};

/// Capability contract for a text-to-speech sink
#[async_trait]
pub trait Speaker: Send + Sync {
    /// Speak `text` using the given BCP-47 language tag (e.g. "en-US")
    ///
    /// # Errors
    ///
    /// Returns error if the sink cannot produce output.
    async fn speak(&self, text: &str, lang: &str) -> Result<()>;
}

/// Speaker that only logs; used when no audio output is wired up
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSpeaker;

#[async_trait]
impl Speaker for NullSpeaker {
    async fn speak(&self, text: &str, lang: &str) -> Result<()> {
        tracing::info!(text, lang, "answer (no speech sink configured)");
        Ok(())
    }
}

/// Speaker that pipes text to an external TTS command
///
/// The command (e.g. `espeak`, `say`, `piper`) receives the language tag as
/// its single argument and the text on stdin.
pub struct ProcessSpeaker {
    program: String,
}

impl ProcessSpeaker {
    /// Create a speaker backed by an external command
    #[must_use]
    pub const fn new(program: String) -> Self {
        Self { program }
    }
}

#[async_trait]
impl Speaker for ProcessSpeaker {
    async fn speak(&self, text: &str, lang: &str) -> Result<()> {
        let mut child = Command::new(&self.program)
            .arg(lang)
            .stdin(std::process::Stdio::piped())
            .spawn()
            .map_err(|e| Error::Speech(format!("failed to spawn {}: {e}", self.program)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(text.as_bytes())
                .await
                .map_err(|e| Error::Speech(format!("failed to write to {}: {e}", self.program)))?;
        }

        let status = child
            .wait()
            .await
            .map_err(|e| Error::Speech(e.to_string()))?;
        if !status.success() {
            return Err(Error::Speech(format!(
                "{} exited with {status}",
                self.program
            )));
        }

        tracing::debug!(lang, chars = text.len(), "spoke answer");
        Ok(())
    }
}
