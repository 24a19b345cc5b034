//! Client configuration
//!
//! A TOML file at `~/.config/spectacle/config.toml` overlays the built-in
//! defaults; every field is optional there. CLI flags and environment
//! variables override on top (applied in `main`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::discovery::DISCOVERY_PORT;
use crate::stream::{DEFAULT_MAX_BUFFER, StreamOptions};
use crate::{Error, Result};

/// Top-level client configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Endpoint discovery settings
    pub discovery: DiscoveryConfig,

    /// Stream connection settings
    pub stream: StreamConfig,

    /// Inference-service upload settings
    pub upload: UploadConfig,

    /// Voice interaction settings
    pub voice: VoiceConfig,
}

/// Endpoint discovery settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Listen for camera beacons (ignored when a fixed stream URL is set)
    pub enabled: bool,

    /// UDP port beacons are broadcast on
    pub port: u16,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: DISCOVERY_PORT,
        }
    }
}

/// Stream connection settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Fixed stream URL; set to bypass discovery entirely
    pub url: Option<String>,

    /// Seconds without stream data before the connection is abandoned
    pub idle_timeout_secs: u64,

    /// First reconnect delay in milliseconds
    pub initial_backoff_ms: u64,

    /// Reconnect delay ceiling in seconds
    pub max_backoff_secs: u64,

    /// Demuxer buffer cap in bytes
    pub max_buffer_bytes: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            url: None,
            idle_timeout_secs: 10,
            initial_backoff_ms: 500,
            max_backoff_secs: 30,
            max_buffer_bytes: DEFAULT_MAX_BUFFER,
        }
    }
}

impl StreamConfig {
    /// Session options derived from this config
    #[must_use]
    pub const fn options(&self) -> StreamOptions {
        StreamOptions {
            idle_timeout: Duration::from_secs(self.idle_timeout_secs),
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            max_backoff: Duration::from_secs(self.max_backoff_secs),
            max_buffer: self.max_buffer_bytes,
        }
    }
}

/// Inference-service upload settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Base URL of the inference service
    pub base_url: String,

    /// Request timeout in seconds for the upload exchange
    pub timeout_secs: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 30,
        }
    }
}

impl UploadConfig {
    /// Upload request timeout
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Voice interaction settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// Language tag handed to the speech sink
    pub language: String,

    /// Quiescent seconds after a capture before listening can resume
    pub cooldown_secs: u64,

    /// Re-arm listening automatically whenever the orchestrator is idle
    pub auto_listen: bool,

    /// External TTS command to pipe answers to; log-only when unset
    pub speaker_command: Option<String>,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            language: "en-US".to_string(),
            cooldown_secs: 2,
            auto_listen: true,
            speaker_command: None,
        }
    }
}

impl VoiceConfig {
    /// Cooldown interval after a capture
    #[must_use]
    pub const fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }
}

impl Config {
    /// Load configuration
    ///
    /// With an explicit path the file must exist and parse. Without one,
    /// the standard path is tried best-effort and defaults fill in.
    ///
    /// # Errors
    ///
    /// Returns error if an explicitly given file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            let content = std::fs::read_to_string(path).map_err(|e| {
                Error::Config(format!("cannot read {}: {e}", path.display()))
            })?;
            let config = toml::from_str(&content)?;
            tracing::info!(path = %path.display(), "loaded config file");
            return Ok(config);
        }

        let Some(path) = Self::default_path() else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Ok(Self::default());
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => {
                    tracing::info!(path = %path.display(), "loaded config file");
                    Ok(config)
                }
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "failed to parse config file, using defaults"
                    );
                    Ok(Self::default())
                }
            },
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to read config file, using defaults"
                );
                Ok(Self::default())
            }
        }
    }

    /// Standard config path: `~/.config/spectacle/config.toml`
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        directories::BaseDirs::new().map(|d| d.config_dir().join("spectacle").join("config.toml"))
    }
}
