//! The spectacle daemon - orchestrates discovery, streaming, speech, and upload
//!
//! All state mutation happens on one coordination loop: background I/O
//! (UDP beacons, the HTTP stream, uploads) runs on its own tasks and feeds
//! the loop through channels, so ordering is explicit and nothing blocks
//! the question/capture cycle.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::time::Instant;

use crate::capture::{CaptureOrchestrator, CaptureRequest, SessionState};
use crate::config::Config;
use crate::discovery::{DiscoveryService, Endpoint};
use crate::stream::StreamSession;
use crate::upload::Uploader;
use crate::voice::{Recognizer, Speaker, SpeechEvent};
use crate::Result;

/// Commands accepted by a running daemon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Begin a recording (no-op unless the orchestrator is idle)
    StartRecording,
    /// End the current recording, discarding the transcript
    StopRecording,
    /// Stop the daemon
    Shutdown,
}

/// Handle for sending commands into a running daemon
#[derive(Clone)]
pub struct DaemonHandle {
    commands: mpsc::Sender<Command>,
}

impl DaemonHandle {
    /// Request that recording starts; ignored if the daemon has exited
    pub async fn start_recording(&self) {
        let _ = self.commands.send(Command::StartRecording).await;
    }

    /// Request that recording stops; ignored if the daemon has exited
    pub async fn stop_recording(&self) {
        let _ = self.commands.send(Command::StopRecording).await;
    }

    /// Request daemon shutdown; ignored if the daemon has exited
    pub async fn shutdown(&self) {
        let _ = self.commands.send(Command::Shutdown).await;
    }
}

/// The spectacle daemon
pub struct Daemon {
    config: Config,
    recognizer: Arc<dyn Recognizer>,
    speaker: Arc<dyn Speaker>,
    uploader: Arc<Uploader>,
    commands: mpsc::Receiver<Command>,
}

impl Daemon {
    /// Create a daemon and the handle that controls it
    ///
    /// # Errors
    ///
    /// Returns error if the upload client cannot be built.
    pub fn new(
        config: Config,
        recognizer: Arc<dyn Recognizer>,
        speaker: Arc<dyn Speaker>,
    ) -> Result<(Self, DaemonHandle)> {
        let uploader = Arc::new(Uploader::new(
            &config.upload.base_url,
            config.upload.timeout(),
        )?);
        let (tx, rx) = mpsc::channel(16);

        Ok((
            Self {
                config,
                recognizer,
                speaker,
                uploader,
                commands: rx,
            },
            DaemonHandle { commands: tx },
        ))
    }

    /// Run until shutdown
    ///
    /// # Errors
    ///
    /// Returns error if the discovery socket cannot be bound.
    #[allow(clippy::too_many_lines)]
    pub async fn run(self) -> Result<()> {
        let Self {
            config,
            recognizer,
            speaker,
            uploader,
            mut commands,
        } = self;

        // Resolve the stream source: fixed URL, else discovery, else none.
        let mut session: Option<StreamSession> = None;
        let mut current_endpoint: Option<Endpoint> = None;
        let mut discovery: Option<DiscoveryService> = None;
        let mut endpoint_rx: Option<watch::Receiver<Option<Endpoint>>> = None;

        if let Some(url) = config.stream.url.clone() {
            tracing::info!(url, "using fixed stream URL");
            session = Some(StreamSession::connect(url, config.stream.options()));
        } else if config.discovery.enabled {
            let service = DiscoveryService::bind(config.discovery.port).await?;
            endpoint_rx = Some(service.subscribe());
            discovery = Some(service);
        } else {
            tracing::warn!("no stream URL and discovery disabled; captures will have no frame");
        }

        let (speech_tx, mut speech_rx) = mpsc::channel::<SpeechEvent>(32);
        let mut orchestrator = CaptureOrchestrator::new();
        let mut cooldown_deadline: Option<Instant> = None;

        if config.voice.auto_listen {
            arm_listening(&mut orchestrator, recognizer.as_ref(), &speech_tx).await;
        }

        loop {
            tokio::select! {
                cmd = commands.recv() => match cmd {
                    None | Some(Command::Shutdown) => break,
                    Some(Command::StartRecording) => {
                        arm_listening(&mut orchestrator, recognizer.as_ref(), &speech_tx).await;
                    }
                    Some(Command::StopRecording) => {
                        if orchestrator.state() == SessionState::Listening {
                            if let Err(e) = recognizer.stop().await {
                                tracing::warn!(error = %e, "recognizer stop failed");
                            }
                            orchestrator.stop_listening();
                            tracing::info!("recording stopped");
                        }
                    }
                },

                Some(event) = speech_rx.recv() => match event {
                    SpeechEvent::Partial(text) => {
                        if orchestrator.update_transcript(&text) {
                            tracing::debug!(%text, "partial transcript");
                        }
                    }
                    SpeechEvent::Final(text) => {
                        if let Err(e) = recognizer.stop().await {
                            tracing::warn!(error = %e, "recognizer stop failed");
                        }
                        if let Some(question) = orchestrator.finalize_transcript(&text) {
                            tracing::info!(%question, "question detected");
                            match session.as_ref().and_then(StreamSession::latest_frame) {
                                Some(frame) => spawn_upload(
                                    Arc::clone(&uploader),
                                    Arc::clone(&speaker),
                                    CaptureRequest::new(frame, question),
                                    config.voice.language.clone(),
                                ),
                                None => tracing::warn!("no frame available, question dropped"),
                            }
                            orchestrator.dispatched();
                            cooldown_deadline = Some(Instant::now() + config.voice.cooldown());
                        } else {
                            tracing::debug!(%text, "final transcript was not a question");
                            if config.voice.auto_listen {
                                arm_listening(&mut orchestrator, recognizer.as_ref(), &speech_tx)
                                    .await;
                            }
                        }
                    }
                    SpeechEvent::Error(e) => {
                        tracing::warn!(error = %e, "transcription failed");
                        if let Err(e) = recognizer.stop().await {
                            tracing::warn!(error = %e, "recognizer stop failed");
                        }
                        orchestrator.recognition_failed();
                        if config.voice.auto_listen {
                            arm_listening(&mut orchestrator, recognizer.as_ref(), &speech_tx).await;
                        }
                    }
                },

                () = wait_until(cooldown_deadline) => {
                    cooldown_deadline = None;
                    orchestrator.cooldown_elapsed();
                    tracing::debug!("cooldown complete");
                    if config.voice.auto_listen {
                        arm_listening(&mut orchestrator, recognizer.as_ref(), &speech_tx).await;
                    }
                },

                endpoint = next_endpoint(&mut endpoint_rx) => {
                    if current_endpoint.as_ref() != Some(&endpoint) {
                        tracing::info!(%endpoint, "stream endpoint resolved");
                        if let Some(old) = session.take() {
                            old.stop();
                        }
                        session = Some(StreamSession::connect(
                            endpoint.stream_url(),
                            config.stream.options(),
                        ));
                        current_endpoint = Some(endpoint);
                    }
                },
            }
        }

        if let Err(e) = recognizer.stop().await {
            tracing::debug!(error = %e, "recognizer stop on shutdown failed");
        }
        if let Some(service) = discovery.take() {
            service.stop();
        }
        if let Some(session) = session.take() {
            session.stop();
        }
        tracing::info!("daemon stopped");
        Ok(())
    }
}

/// Start a recording if the orchestrator accepts it
async fn arm_listening(
    orchestrator: &mut CaptureOrchestrator,
    recognizer: &dyn Recognizer,
    speech_tx: &mpsc::Sender<SpeechEvent>,
) {
    if !orchestrator.start_listening() {
        tracing::debug!(state = ?orchestrator.state(), "start-recording ignored");
        return;
    }

    if let Err(e) = recognizer.start(speech_tx.clone()).await {
        tracing::warn!(error = %e, "recognizer failed to start");
        orchestrator.recognition_failed();
    } else {
        tracing::info!("listening");
    }
}

/// Fire the upload exchange without blocking the coordination loop
fn spawn_upload(
    uploader: Arc<Uploader>,
    speaker: Arc<dyn Speaker>,
    request: CaptureRequest,
    language: String,
) {
    tokio::spawn(async move {
        match uploader.explain(&request).await {
            Ok(Some(message)) => {
                tracing::info!(%message, "inference answer received");
                if let Err(e) = speaker.speak(&message, &language).await {
                    tracing::warn!(error = %e, "failed to speak answer");
                }
            }
            Ok(None) => tracing::warn!("inference response had no message"),
            Err(e) => tracing::warn!(error = %e, "upload failed"),
        }
    });
}

/// Sleep until the cooldown deadline; pending forever when there is none
async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => futures::future::pending().await,
    }
}

/// Next resolved endpoint from discovery; pending forever without discovery
async fn next_endpoint(rx: &mut Option<watch::Receiver<Option<Endpoint>>>) -> Endpoint {
    let Some(rx) = rx.as_mut() else {
        return futures::future::pending().await;
    };

    loop {
        if rx.changed().await.is_err() {
            return futures::future::pending().await;
        }
        let endpoint = rx.borrow_and_update().clone();
        if let Some(endpoint) = endpoint {
            return endpoint;
        }
    }
}
