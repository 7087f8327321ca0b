use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use live_scribe::{
    create_router, export, AppState, CaptureSource, Config, LiveApiTranscriber, RecordingSession,
    SessionConfig, SessionState, Transcriber,
};

#[derive(Parser)]
#[command(
    name = "live-scribe",
    about = "Capture audio and stream it to a real-time transcription service"
)]
struct Cli {
    /// Config file (TOML, extension optional)
    #[arg(long, default_value = "config/live-scribe")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP control API
    Serve,

    /// Record one session and print the transcript as it arrives
    Record {
        /// Audio source: mic, system, or file
        #[arg(long, default_value = "mic")]
        source: String,

        /// Media file to transcribe (required for --source file)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Override the configured transcript language
        #[arg(long)]
        language: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)?;

    match cli.command {
        Command::Serve => serve(cfg).await,
        Command::Record {
            source,
            path,
            language,
        } => record(cfg, &source, path, language).await,
    }
}

async fn serve(cfg: Config) -> Result<()> {
    let api_key = cfg.api_key()?;
    let transcriber: Arc<dyn Transcriber> = Arc::new(LiveApiTranscriber::new(
        cfg.transcriber.ws_url.clone(),
        api_key,
    ));

    let name = cfg.service.name.clone();
    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let state = AppState::new(cfg, transcriber);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("{} listening on {}", name, addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn record(
    cfg: Config,
    source: &str,
    path: Option<PathBuf>,
    language: Option<String>,
) -> Result<()> {
    let source = match source {
        "mic" => CaptureSource::Microphone,
        "system" => CaptureSource::SystemAudio,
        "file" => CaptureSource::File(path.unwrap_or_default()),
        other => anyhow::bail!("unknown source: {other} (expected mic, system, or file)"),
    };

    let api_key = cfg.api_key()?;
    let transcriber: Arc<dyn Transcriber> = Arc::new(LiveApiTranscriber::new(
        cfg.transcriber.ws_url.clone(),
        api_key,
    ));

    let mut session_config = SessionConfig::new(source);
    session_config.model = cfg.transcriber.model.clone();
    session_config.language = language.unwrap_or_else(|| cfg.transcriber.language.clone());
    session_config.sample_rate = cfg.audio.sample_rate;
    session_config.frame_samples = cfg.audio.frame_samples;
    session_config.capture_device = cfg.audio.capture_device.clone();
    session_config.output_dir = PathBuf::from(&cfg.audio.output_dir);

    let session = Arc::new(RecordingSession::new(session_config, transcriber));
    Arc::clone(&session).start().await?;

    info!("Recording - press Ctrl+C to stop");

    // Echo fragments as they arrive, until Ctrl+C or the source runs out
    let mut printed = 0usize;
    let mut poll = tokio::time::interval(std::time::Duration::from_millis(250));
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = poll.tick() => {
                let fragments = session.transcript_fragments().await;
                for fragment in &fragments[printed..] {
                    print!("{}", fragment.text);
                    std::io::Write::flush(&mut std::io::stdout()).ok();
                }
                printed = fragments.len();
                if session.state() == SessionState::Idle {
                    break;
                }
            }
        }
    }

    let stats = session.stop().await?;
    println!();
    info!(
        "Recorded {} ({} frames sent, {} fragments received)",
        export::format_duration(stats.elapsed_secs),
        stats.frames_sent,
        stats.fragments_received
    );

    let transcript_path = session.export_transcript().await?;
    info!("Transcript saved to {}", transcript_path.display());

    Ok(())
}
