// Integration tests for the recording lifecycle
//
// These drive a full RecordingSession against a file source and a fake
// transcriber: start/stop transitions, precondition failures, natural
// end-of-file stops, transcript accumulation, and stop idempotence.

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc;

use live_scribe::pcm::EncodedFrame;
use live_scribe::{
    CaptureSource, RecordingSession, SessionConfig, SessionError, SessionSetup, SessionState,
    Transcriber, TranscriberEvent, TranscriberSession,
};

/// In-memory transcriber; the test holds the service side of the channels
#[derive(Clone, Default)]
struct FakeTranscriber {
    remote: Arc<StdMutex<Option<FakeRemote>>>,
}

struct FakeRemote {
    #[allow(dead_code)]
    frames: mpsc::Receiver<EncodedFrame>,
    events: mpsc::Sender<TranscriberEvent>,
}

impl FakeTranscriber {
    fn new() -> Self {
        Self::default()
    }

    fn was_opened(&self) -> bool {
        self.remote.lock().unwrap().is_some()
    }

    fn take_remote(&self) -> FakeRemote {
        self.remote
            .lock()
            .unwrap()
            .take()
            .expect("transcriber session was never opened")
    }
}

#[async_trait::async_trait]
impl Transcriber for FakeTranscriber {
    async fn open(&self, _setup: SessionSetup) -> Result<TranscriberSession> {
        let (frame_tx, frame_rx) = mpsc::channel(64);
        let (event_tx, event_rx) = mpsc::channel(64);
        *self.remote.lock().unwrap() = Some(FakeRemote {
            frames: frame_rx,
            events: event_tx,
        });
        Ok(TranscriberSession {
            frames: frame_tx,
            events: event_rx,
        })
    }
}

/// Write a mono 16kHz silence fixture of the given duration
fn write_wav_fixture(dir: &Path, name: &str, seconds: f64) -> PathBuf {
    let path = dir.join(name);
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 16000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec).unwrap();
    for _ in 0..(16000.0 * seconds) as usize {
        writer.write_sample(0i16).unwrap();
    }
    writer.finalize().unwrap();
    path
}

fn file_session(
    path: PathBuf,
    output_dir: &Path,
    transcriber: &FakeTranscriber,
) -> Arc<RecordingSession> {
    let mut config = SessionConfig::new(CaptureSource::File(path));
    config.output_dir = output_dir.to_path_buf();
    Arc::new(RecordingSession::new(config, Arc::new(transcriber.clone())))
}

/// Poll until the session reaches the given state or the timeout elapses
async fn wait_for_state(session: &RecordingSession, state: SessionState, timeout_ms: u64) -> bool {
    let deadline = tokio::time::Instant::now() + Duration::from_millis(timeout_ms);
    while tokio::time::Instant::now() < deadline {
        if session.state() == state {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    session.state() == state
}

#[tokio::test]
async fn test_start_with_no_file_selected_keeps_state_idle() {
    let temp_dir = TempDir::new().unwrap();
    let transcriber = FakeTranscriber::new();
    let session = file_session(PathBuf::new(), temp_dir.path(), &transcriber);

    let err = Arc::clone(&session).start().await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<SessionError>(),
        Some(SessionError::PreconditionNotMet(_))
    ));
    // No resources acquired, state unchanged
    assert_eq!(session.state(), SessionState::Idle);
    assert!(!transcriber.was_opened());
}

#[tokio::test]
async fn test_start_with_missing_file_is_source_unavailable() {
    let temp_dir = TempDir::new().unwrap();
    let transcriber = FakeTranscriber::new();
    let session = file_session(
        temp_dir.path().join("does-not-exist.wav"),
        temp_dir.path(),
        &transcriber,
    );

    let err = Arc::clone(&session).start().await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<SessionError>(),
        Some(SessionError::SourceUnavailable(_))
    ));
    assert_eq!(session.state(), SessionState::Idle);
    assert!(!transcriber.was_opened());
}

#[tokio::test]
async fn test_file_session_stops_at_natural_end() {
    let temp_dir = TempDir::new().unwrap();
    let fixture = write_wav_fixture(temp_dir.path(), "short.wav", 0.5);
    let transcriber = FakeTranscriber::new();
    let session = file_session(fixture, temp_dir.path(), &transcriber);

    Arc::clone(&session).start().await.unwrap();
    assert_eq!(session.state(), SessionState::Recording);

    // Playback is ~0.5s; the session must return to idle on its own
    assert!(
        wait_for_state(&session, SessionState::Idle, 5000).await,
        "session did not stop at end of file"
    );

    let stats = session.stats().await;
    assert!(stats.frames_sent >= 1, "no frames were sent");
}

#[tokio::test]
async fn test_stop_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let fixture = write_wav_fixture(temp_dir.path(), "take.wav", 2.0);
    let transcriber = FakeTranscriber::new();
    let session = file_session(fixture, temp_dir.path(), &transcriber);

    Arc::clone(&session).start().await.unwrap();

    let first = session.stop().await.unwrap();
    assert_eq!(first.state, SessionState::Idle);

    // A second stop (e.g. a late service close) must not error or
    // double-release anything
    let second = session.stop().await.unwrap();
    assert_eq!(second.state, SessionState::Idle);
}

#[tokio::test]
async fn test_stop_after_natural_end_is_a_no_op() {
    let temp_dir = TempDir::new().unwrap();
    let fixture = write_wav_fixture(temp_dir.path(), "short.wav", 0.5);
    let transcriber = FakeTranscriber::new();
    let session = file_session(fixture, temp_dir.path(), &transcriber);

    Arc::clone(&session).start().await.unwrap();
    assert!(wait_for_state(&session, SessionState::Idle, 5000).await);

    let stats = session.stop().await.unwrap();
    assert_eq!(stats.state, SessionState::Idle);
}

#[tokio::test]
async fn test_transcript_accumulates_fragments_in_arrival_order() {
    let temp_dir = TempDir::new().unwrap();
    let fixture = write_wav_fixture(temp_dir.path(), "speech.wav", 3.0);
    let transcriber = FakeTranscriber::new();
    let session = file_session(fixture, temp_dir.path(), &transcriber);

    Arc::clone(&session).start().await.unwrap();
    let remote = transcriber.take_remote();

    remote
        .events
        .send(TranscriberEvent::Transcript("hel".to_string()))
        .await
        .unwrap();
    remote
        .events
        .send(TranscriberEvent::Transcript("lo world".to_string()))
        .await
        .unwrap();

    // Fragments arrive asynchronously relative to audio ticks
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while session.stats().await.fragments_received < 2 {
        assert!(
            tokio::time::Instant::now() < deadline,
            "fragments never arrived"
        );
        tokio::time::sleep(Duration::from_millis(25)).await;
    }

    assert_eq!(session.transcript_text().await, "hello world");

    session.stop().await.unwrap();
}

#[tokio::test]
async fn test_service_close_stops_the_session() {
    let temp_dir = TempDir::new().unwrap();
    let fixture = write_wav_fixture(temp_dir.path(), "speech.wav", 5.0);
    let transcriber = FakeTranscriber::new();
    let session = file_session(fixture, temp_dir.path(), &transcriber);

    Arc::clone(&session).start().await.unwrap();
    let remote = transcriber.take_remote();

    remote.events.send(TranscriberEvent::Closed).await.unwrap();

    assert!(
        wait_for_state(&session, SessionState::Idle, 5000).await,
        "service close did not stop the session"
    );
}

#[tokio::test]
async fn test_service_error_stops_the_session() {
    let temp_dir = TempDir::new().unwrap();
    let fixture = write_wav_fixture(temp_dir.path(), "speech.wav", 5.0);
    let transcriber = FakeTranscriber::new();
    let session = file_session(fixture, temp_dir.path(), &transcriber);

    Arc::clone(&session).start().await.unwrap();
    let remote = transcriber.take_remote();

    remote
        .events
        .send(TranscriberEvent::Error("quota exceeded".to_string()))
        .await
        .unwrap();

    assert!(
        wait_for_state(&session, SessionState::Idle, 5000).await,
        "service error did not stop the session"
    );
}

#[tokio::test]
async fn test_elapsed_counter_freezes_after_stop() {
    let temp_dir = TempDir::new().unwrap();
    let fixture = write_wav_fixture(temp_dir.path(), "take.wav", 4.0);
    let transcriber = FakeTranscriber::new();
    let session = file_session(fixture, temp_dir.path(), &transcriber);

    Arc::clone(&session).start().await.unwrap();
    tokio::time::sleep(Duration::from_millis(1200)).await;
    session.stop().await.unwrap();

    let frozen = session.elapsed_secs();
    assert!(frozen <= 3, "elapsed ran ahead: {frozen}");

    // No further increments once idle
    tokio::time::sleep(Duration::from_millis(1200)).await;
    assert_eq!(session.elapsed_secs(), frozen);
}

#[tokio::test]
async fn test_second_start_is_rejected_while_recording() {
    let temp_dir = TempDir::new().unwrap();
    let fixture = write_wav_fixture(temp_dir.path(), "take.wav", 3.0);
    let transcriber = FakeTranscriber::new();
    let session = file_session(fixture, temp_dir.path(), &transcriber);

    Arc::clone(&session).start().await.unwrap();

    let err = Arc::clone(&session).start().await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SessionError>(),
        Some(SessionError::InvalidTransition(_))
    ));

    // The original recording is unaffected
    assert_eq!(session.state(), SessionState::Recording);
    session.stop().await.unwrap();
}

#[tokio::test]
async fn test_transcript_resets_on_new_recording() {
    let temp_dir = TempDir::new().unwrap();
    let fixture = write_wav_fixture(temp_dir.path(), "take.wav", 2.0);
    let transcriber = FakeTranscriber::new();
    let session = file_session(fixture, temp_dir.path(), &transcriber);

    Arc::clone(&session).start().await.unwrap();
    let remote = transcriber.take_remote();
    remote
        .events
        .send(TranscriberEvent::Transcript("first take".to_string()))
        .await
        .unwrap();

    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while session.stats().await.fragments_received < 1 {
        assert!(tokio::time::Instant::now() < deadline);
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    session.stop().await.unwrap();
    assert_eq!(session.transcript_text().await, "first take");

    // Starting again clears the buffer
    Arc::clone(&session).start().await.unwrap();
    assert_eq!(session.transcript_text().await, "");
    session.stop().await.unwrap();
}
