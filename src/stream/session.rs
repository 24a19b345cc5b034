//! Long-lived MJPEG stream session
//!
//! Opens a chunked HTTP connection to the camera, feeds arriving bytes to a
//! [`FrameDemuxer`], and republishes the latest decoded frame into a
//! single-slot channel. The session reconnects with exponential backoff on
//! any failure (transport error, idle timeout, corrupt stream, orderly EOF)
//! and keeps the last good frame on display across reconnects.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::StreamExt as _;

use super::demuxer::{DEFAULT_MAX_BUFFER, Frame, FrameDemuxer};
use crate::{Error, Result};

/// Tuning knobs for a stream session
#[derive(Debug, Clone)]
pub struct StreamOptions {
    /// Longest gap between chunks before the connection is abandoned
    pub idle_timeout: Duration,
    /// First reconnect delay
    pub initial_backoff: Duration,
    /// Ceiling for the reconnect delay
    pub max_backoff: Duration,
    /// Demuxer buffer cap, see [`FrameDemuxer::with_max_buffer`]
    pub max_buffer: usize,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(10),
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(30),
            max_buffer: DEFAULT_MAX_BUFFER,
        }
    }
}

/// Owns the stream connection and the latest decoded frame
pub struct StreamSession {
    frame_rx: watch::Receiver<Option<Frame>>,
    task: JoinHandle<()>,
}

impl StreamSession {
    /// Connect to a stream URL and start demultiplexing in the background
    #[must_use]
    pub fn connect(url: String, options: StreamOptions) -> Self {
        let (tx, rx) = watch::channel(None);
        let task = tokio::spawn(run(url, options, tx));

        Self { frame_rx: rx, task }
    }

    /// Snapshot of the most recently decoded frame, if any
    #[must_use]
    pub fn latest_frame(&self) -> Option<Frame> {
        self.frame_rx.borrow().clone()
    }

    /// Subscribe to frame updates
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Frame>> {
        self.frame_rx.clone()
    }

    /// Stop the session, closing the connection promptly
    pub fn stop(&self) {
        self.task.abort();
    }
}

impl Drop for StreamSession {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Reconnect loop around individual stream attempts
async fn run(url: String, options: StreamOptions, tx: watch::Sender<Option<Frame>>) {
    let client = match reqwest::Client::builder()
        .connect_timeout(options.idle_timeout)
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "failed to build stream HTTP client");
            return;
        }
    };

    let mut backoff = options.initial_backoff;
    loop {
        match stream_once(&client, &url, &options, &tx).await {
            Ok(frames) => {
                tracing::info!(url, frames, "stream ended");
                if frames > 0 {
                    backoff = options.initial_backoff;
                }
            }
            Err(e) => {
                tracing::warn!(url, error = %e, "stream attempt failed");
            }
        }

        tracing::debug!(url, ?backoff, "reconnecting");
        tokio::time::sleep(backoff).await;
        backoff = (backoff * 2).min(options.max_backoff);
    }
}

/// One connection attempt; returns the number of frames it emitted
async fn stream_once(
    client: &reqwest::Client,
    url: &str,
    options: &StreamOptions,
    tx: &watch::Sender<Option<Frame>>,
) -> Result<u64> {
    let response = client.get(url).send().await?.error_for_status()?;
    tracing::debug!(url, status = %response.status(), "stream connected");

    let mut body = response.bytes_stream();
    let mut demuxer = FrameDemuxer::with_max_buffer(options.max_buffer);
    let mut emitted = 0u64;

    loop {
        let chunk = match tokio::time::timeout(options.idle_timeout, body.next()).await {
            Err(_) => {
                return Err(Error::Stream(format!(
                    "no stream data for {:?}",
                    options.idle_timeout
                )));
            }
            Ok(None) => break,
            Ok(Some(chunk)) => chunk?,
        };

        for frame in demuxer.feed(&chunk)? {
            emitted += 1;
            tx.send_replace(Some(frame));
        }
    }

    // Any partially buffered, unterminated frame is discarded, never yielded.
    Ok(emitted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = StreamOptions::default();
        assert_eq!(options.idle_timeout, Duration::from_secs(10));
        assert_eq!(options.initial_backoff, Duration::from_millis(500));
        assert_eq!(options.max_backoff, Duration::from_secs(30));
        assert_eq!(options.max_buffer, DEFAULT_MAX_BUFFER);
    }

    #[tokio::test]
    async fn test_session_starts_without_frame() {
        let session = StreamSession::connect(
            "http://127.0.0.1:1/never".to_string(),
            StreamOptions::default(),
        );
        assert!(session.latest_frame().is_none());
        session.stop();
    }
}
