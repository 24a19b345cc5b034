//! Console-backed recognizer
//!
//! Development stand-in for a platform speech recognizer: each recording
//! reads one line from stdin and delivers it as the finalized utterance.
//! Lets the full capture pipeline run on machines without speech input.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;

use super::recognizer::{Recognizer, SpeechEvent};
use crate::{Error, Result};

/// Reads typed questions from stdin in place of spoken ones
#[derive(Default)]
pub struct ConsoleRecognizer {
    task: Mutex<Option<JoinHandle<()>>>,
}

impl ConsoleRecognizer {
    /// Create a console recognizer
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Recognizer for ConsoleRecognizer {
    async fn start(&self, events: mpsc::Sender<SpeechEvent>) -> Result<()> {
        let mut guard = self.task.lock().await;
        if guard.is_some() {
            return Err(Error::Speech("recognizer already started".to_string()));
        }

        *guard = Some(tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let _ = events.send(SpeechEvent::Final(line)).await;
                }
                Ok(None) => {
                    tracing::debug!("stdin closed, no utterance");
                }
                Err(e) => {
                    let _ = events.send(SpeechEvent::Error(e.to_string())).await;
                }
            }
        }));

        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        if let Some(task) = self.task.lock().await.take() {
            task.abort();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_double_start_is_rejected() {
        let recognizer = ConsoleRecognizer::new();
        let (tx, _rx) = mpsc::channel(4);

        recognizer.start(tx.clone()).await.unwrap();
        assert!(recognizer.start(tx).await.is_err());

        recognizer.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_stop_without_start_is_ok() {
        let recognizer = ConsoleRecognizer::new();
        assert!(recognizer.stop().await.is_ok());
    }

    #[tokio::test]
    async fn test_restart_after_stop() {
        let recognizer = ConsoleRecognizer::new();
        let (tx, _rx) = mpsc::channel(4);

        recognizer.start(tx.clone()).await.unwrap();
        recognizer.stop().await.unwrap();
        assert!(recognizer.start(tx).await.is_ok());

        recognizer.stop().await.unwrap();
    }
}
