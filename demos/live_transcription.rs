// Live Transcription Demo: microphone to streaming speech-to-text
//
// This demonstrates the complete pipeline at the library level:
// 1. cpal captures microphone audio, resampled to 16kHz mono
// 2. Sample blocks are converted to 16-bit PCM and Base64-encoded
// 3. Frames stream to the transcription service over a duplex WebSocket
// 4. Transcript fragments print as they arrive
//
// Prerequisites:
// - A working microphone
// - The service API key exported, e.g.: export GEMINI_API_KEY=...
//
// Usage: cargo run --example live_transcription

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use live_scribe::{
    export, CaptureSource, Config, LiveApiTranscriber, RecordingSession, SessionConfig,
    SessionState, Transcriber,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cfg = Config::load("config/live-scribe")?;
    let transcriber: Arc<dyn Transcriber> = Arc::new(LiveApiTranscriber::new(
        cfg.transcriber.ws_url.clone(),
        cfg.api_key()?,
    ));

    let mut session_config = SessionConfig::new(CaptureSource::Microphone);
    session_config.model = cfg.transcriber.model.clone();
    session_config.language = cfg.transcriber.language.clone();

    let session = Arc::new(RecordingSession::new(session_config, transcriber));
    Arc::clone(&session).start().await?;

    info!("Speak into your microphone - recording for 30 seconds");

    let mut printed = 0usize;
    for _ in 0..120 {
        tokio::time::sleep(Duration::from_millis(250)).await;

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

    let stats = session.stop().await?;
    println!();
    info!(
        "Done: {} recorded, {} fragments",
        export::format_duration(stats.elapsed_secs),
        stats.fragments_received
    );

    Ok(())
}
