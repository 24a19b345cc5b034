use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use spectacle::voice::{ConsoleRecognizer, NullSpeaker, ProcessSpeaker, Speaker};
use spectacle::{Config, Daemon};

/// Spectacle - voice-driven assistant client for live camera streams
#[derive(Parser)]
#[command(name = "spectacle", version, about)]
struct Cli {
    /// Config file path (default: ~/.config/spectacle/config.toml)
    #[arg(short, long, env = "SPECTACLE_CONFIG")]
    config: Option<PathBuf>,

    /// Fixed stream URL, bypassing UDP discovery
    #[arg(long, env = "SPECTACLE_STREAM_URL")]
    stream_url: Option<String>,

    /// Inference service base URL
    #[arg(long, env = "SPECTACLE_API_URL")]
    api_url: Option<String>,

    /// UDP port to listen on for camera beacons
    #[arg(long, env = "SPECTACLE_DISCOVERY_PORT")]
    discovery_port: Option<u16>,

    /// Language tag for spoken answers
    #[arg(long, env = "SPECTACLE_LANGUAGE")]
    language: Option<String>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,spectacle=info",
        1 => "info,spectacle=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;

    // CLI/env overrides on top of the file overlay
    if cli.stream_url.is_some() {
        config.stream.url = cli.stream_url;
    }
    if let Some(api_url) = cli.api_url {
        config.upload.base_url = api_url;
    }
    if let Some(port) = cli.discovery_port {
        config.discovery.port = port;
    }
    if let Some(language) = cli.language {
        config.voice.language = language;
    }

    tracing::info!(
        stream_url = ?config.stream.url,
        discovery_port = config.discovery.port,
        api_url = config.upload.base_url,
        "starting spectacle client"
    );

    let recognizer = Arc::new(ConsoleRecognizer::new());
    let speaker: Arc<dyn Speaker> = match config.voice.speaker_command.clone() {
        Some(program) => Arc::new(ProcessSpeaker::new(program)),
        None => Arc::new(NullSpeaker),
    };

    let (daemon, handle) = Daemon::new(config, recognizer, speaker)?;

    // Ctrl-C triggers an orderly shutdown
    let shutdown_handle = handle.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, shutting down");
            shutdown_handle.shutdown().await;
        }
    });

    tracing::info!("spectacle ready - type a question and press enter");
    daemon.run().await?;

    Ok(())
}
