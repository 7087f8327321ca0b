use anyhow::{Context, Result};
use chrono::Utc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::config::SessionConfig;
use super::state::{SessionState, StateCell};
use super::stats::SessionStats;
use super::transcript::{TranscriptBuffer, TranscriptFragment};
use crate::audio::{CaptureBackend, CaptureBackendFactory, CaptureConfig};
use crate::error::SessionError;
use crate::export;
use crate::pcm::PcmFrame;
use crate::transcribe::{system_instruction, SessionSetup, Transcriber, TranscriberEvent};

/// A recording session: owns the audio source, the transcription connection,
/// the transcript buffer, and every live resource in between.
///
/// Manual stop, a service-side close or error, and a file source reaching
/// its natural end all funnel into the single idempotent `stop`.
pub struct RecordingSession {
    config: SessionConfig,

    /// Connection seam to the external transcription service
    transcriber: Arc<dyn Transcriber>,

    /// Lifecycle state; all transitions go through this cell
    state: StateCell,

    /// When the current recording started
    started_at: std::sync::Mutex<chrono::DateTime<Utc>>,

    /// Whole seconds spent recording (1-second ticker)
    elapsed_secs: AtomicU64,

    /// Encoded frames handed to the transcriber
    frames_sent: AtomicUsize,

    /// Accumulated transcript fragments
    transcript: Mutex<TranscriptBuffer>,

    /// Raw captured PCM for export (live-capture modes only)
    captured: Mutex<Vec<i16>>,

    /// The active capture backend
    backend: Mutex<Option<Box<dyn CaptureBackend>>>,

    /// Handle for the audio pump task
    pump_task: Mutex<Option<JoinHandle<()>>>,

    /// Handle for the transcriber event task
    event_task: Mutex<Option<JoinHandle<()>>>,

    /// Handle for the elapsed-seconds ticker
    ticker_task: Mutex<Option<JoinHandle<()>>>,
}

impl RecordingSession {
    pub fn new(config: SessionConfig, transcriber: Arc<dyn Transcriber>) -> Self {
        Self {
            config,
            transcriber,
            state: StateCell::new(),
            started_at: std::sync::Mutex::new(Utc::now()),
            elapsed_secs: AtomicU64::new(0),
            frames_sent: AtomicUsize::new(0),
            transcript: Mutex::new(TranscriptBuffer::new()),
            captured: Mutex::new(Vec::new()),
            backend: Mutex::new(None),
            pump_task: Mutex::new(None),
            event_task: Mutex::new(None),
            ticker_task: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state.current()
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs.load(Ordering::SeqCst)
    }

    /// Start recording
    ///
    /// Validates preconditions, acquires the audio source, opens the
    /// transcription session, and installs the frame pump. Any acquisition
    /// failure releases what was acquired and rolls the state back to idle.
    pub async fn start(self: Arc<Self>) -> Result<()> {
        if !self
            .state
            .transition(SessionState::Idle, SessionState::Starting)
        {
            return Err(SessionError::InvalidTransition(format!(
                "cannot start while {}",
                self.state.current()
            ))
            .into());
        }

        info!("Starting recording session: {}", self.config.session_id);

        match Arc::clone(&self).acquire_and_run().await {
            Ok(()) => {
                info!("Recording session started: {}", self.config.session_id);
                Ok(())
            }
            Err(e) => {
                // Release partially-acquired resources, roll back to idle
                if let Some(mut backend) = self.backend.lock().await.take() {
                    let _ = backend.stop().await;
                }
                self.state
                    .transition(SessionState::Starting, SessionState::Idle);
                Err(e)
            }
        }
    }

    async fn acquire_and_run(self: Arc<Self>) -> Result<()> {
        let capture_config = CaptureConfig {
            sample_rate: self.config.sample_rate,
            frame_samples: self.config.frame_samples,
            device: self.config.capture_device.clone(),
            ..CaptureConfig::default()
        };

        // Precondition failures (no file selected) surface here, before any
        // resource is touched
        let mut backend = CaptureBackendFactory::create(&self.config.source, capture_config)?;
        let mut blocks = backend
            .start()
            .await
            .context("failed to acquire audio source")?;
        *self.backend.lock().await = Some(backend);

        let setup = SessionSetup::new(
            self.config.model.clone(),
            system_instruction(&self.config.source, &self.config.language),
        );
        let session = self
            .transcriber
            .open(setup)
            .await
            .context("failed to open transcription session")?;
        let frames = session.frames;
        let mut events = session.events;

        // Fresh recording: transcript and counters reset on entry
        self.transcript.lock().await.clear();
        self.captured.lock().await.clear();
        self.elapsed_secs.store(0, Ordering::SeqCst);
        self.frames_sent.store(0, Ordering::SeqCst);
        *self.started_at.lock().unwrap() = Utc::now();

        let entered = self
            .state
            .transition(SessionState::Starting, SessionState::Recording);
        debug_assert!(entered);

        // Audio pump: sample blocks -> 16-bit PCM -> Base64 -> frame queue.
        // Sends are fire-and-forget; a full queue drops the frame.
        let pump_session = Arc::clone(&self);
        let capture_audio = self.config.source.is_live();
        let pump = tokio::spawn(async move {
            while let Some(block) = blocks.recv().await {
                if !pump_session.state.is(SessionState::Recording) {
                    break;
                }

                let frame = PcmFrame::from_f32(&block.samples);
                if capture_audio {
                    pump_session
                        .captured
                        .lock()
                        .await
                        .extend_from_slice(&frame.samples);
                }

                match frames.try_send(frame.encode()) {
                    Ok(()) => {
                        pump_session.frames_sent.fetch_add(1, Ordering::SeqCst);
                    }
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        warn!("Frame queue full - dropping frame");
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => break,
                }
            }

            // The source ended on its own (file playback reached the end)
            // or the backend was stopped under us
            if pump_session.state.is(SessionState::Recording) {
                info!("Audio source ended; stopping session");
                let session = Arc::clone(&pump_session);
                tokio::spawn(async move {
                    if let Err(e) = session.stop().await {
                        error!("Auto-stop after source end failed: {}", e);
                    }
                });
            }
        });
        *self.pump_task.lock().await = Some(pump);

        // Event task: transcript fragments append in arrival order; a
        // service error or close forces a stop
        let event_session = Arc::clone(&self);
        let event = tokio::spawn(async move {
            let mut stop_session = false;
            while let Some(event) = events.recv().await {
                match event {
                    TranscriberEvent::Transcript(text) => {
                        event_session.transcript.lock().await.push(text);
                    }
                    TranscriberEvent::Error(message) => {
                        error!("Transcription service error: {}", message);
                        stop_session = true;
                        break;
                    }
                    TranscriberEvent::Closed => {
                        stop_session = true;
                        break;
                    }
                }
            }

            if stop_session && event_session.state.is(SessionState::Recording) {
                info!("Transcription session closed; stopping");
                let session = Arc::clone(&event_session);
                tokio::spawn(async move {
                    let _ = session.stop().await;
                });
            }
        });
        *self.event_task.lock().await = Some(event);

        // Elapsed-seconds ticker; freezes the moment the state leaves
        // Recording
        let ticker_session = Arc::clone(&self);
        let ticker = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            interval.tick().await;
            loop {
                interval.tick().await;
                if !ticker_session.state.is(SessionState::Recording) {
                    break;
                }
                ticker_session.elapsed_secs.fetch_add(1, Ordering::SeqCst);
            }
        });
        *self.ticker_task.lock().await = Some(ticker);

        Ok(())
    }

    /// Stop recording
    ///
    /// Safe to call from any state and idempotent: only the caller that wins
    /// the Recording -> Stopping transition performs teardown, everyone else
    /// just gets the current stats back. The state flips before any resource
    /// is released, so a late audio tick cannot send on a closed session.
    pub async fn stop(&self) -> Result<SessionStats> {
        if !self
            .state
            .transition(SessionState::Recording, SessionState::Stopping)
        {
            return Ok(self.stats().await);
        }

        info!("Stopping recording session: {}", self.config.session_id);

        // Stop the capture backend; its channel closes and the pump drains
        if let Some(mut backend) = self.backend.lock().await.take() {
            if let Err(e) = backend.stop().await {
                error!("Failed to stop capture backend: {}", e);
            }
        }

        // Wait for the pump; dropping its frame sender closes the
        // transcriber connection
        if let Some(task) = self.pump_task.lock().await.take() {
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    error!("Audio pump task panicked: {}", e);
                }
            }
        }

        if let Some(task) = self.ticker_task.lock().await.take() {
            task.abort();
        }

        // The transcript is frozen once we are stopping; late fragments are
        // discarded with the event task
        if let Some(task) = self.event_task.lock().await.take() {
            task.abort();
        }

        // Package the captured audio for the user (live-capture modes only)
        if self.config.source.is_live() {
            let captured = self.captured.lock().await;
            if !captured.is_empty() {
                let filename = export::recording_filename(
                    self.config.source.label(),
                    self.elapsed_secs.load(Ordering::SeqCst),
                );
                match export::save_audio_wav(
                    &self.config.output_dir,
                    &filename,
                    &captured,
                    self.config.sample_rate,
                ) {
                    Ok(path) => info!("Captured audio exported to {}", path.display()),
                    Err(e) => error!("Failed to export captured audio: {}", e),
                }
            }
        }

        let finished = self
            .state
            .transition(SessionState::Stopping, SessionState::Idle);
        debug_assert!(finished);

        info!("Recording session stopped: {}", self.config.session_id);
        Ok(self.stats().await)
    }

    /// Current session statistics
    pub async fn stats(&self) -> SessionStats {
        let started_at = *self.started_at.lock().unwrap();
        SessionStats {
            session_id: self.config.session_id.clone(),
            state: self.state.current(),
            source: self.config.source.label().to_string(),
            started_at,
            elapsed_secs: self.elapsed_secs.load(Ordering::SeqCst),
            frames_sent: self.frames_sent.load(Ordering::SeqCst),
            fragments_received: self.transcript.lock().await.len(),
        }
    }

    /// The accumulated transcript as one string
    pub async fn transcript_text(&self) -> String {
        self.transcript.lock().await.text()
    }

    /// The accumulated transcript fragments
    pub async fn transcript_fragments(&self) -> Vec<TranscriptFragment> {
        self.transcript.lock().await.fragments().to_vec()
    }

    /// Write the transcript to a text file in the configured output
    /// directory; returns the path.
    pub async fn export_transcript(&self) -> Result<std::path::PathBuf> {
        let text = self.transcript_text().await;
        export::save_transcript_txt(&self.config.output_dir, &self.config.session_id, &text)
    }
}
