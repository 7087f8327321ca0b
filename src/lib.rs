pub mod audio;
pub mod config;
pub mod error;
pub mod export;
pub mod http;
pub mod pcm;
pub mod session;
pub mod transcribe;

pub use audio::{
    CaptureBackend, CaptureBackendFactory, CaptureConfig, CaptureSource, SampleBlock,
};
pub use config::Config;
pub use error::SessionError;
pub use http::{create_router, AppState};
pub use pcm::{EncodedFrame, PcmFrame, FRAME_SAMPLES, PCM_MIME_TYPE, SAMPLE_RATE};
pub use session::{
    RecordingSession, SessionConfig, SessionState, SessionStats, TranscriptBuffer,
    TranscriptFragment,
};
pub use transcribe::{
    LiveApiTranscriber, SessionSetup, Transcriber, TranscriberEvent, TranscriberSession,
};
