use std::path::PathBuf;

use crate::audio::CaptureSource;
use crate::pcm::{FRAME_SAMPLES, SAMPLE_RATE};

/// Configuration for a recording session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Unique session identifier
    pub session_id: String,

    /// Where the audio comes from
    pub source: CaptureSource,

    /// Model identifier sent to the transcription service
    pub model: String,

    /// Spoken language the transcript should be produced in
    pub language: String,

    /// Sample rate for the pipeline (the service expects 16kHz)
    pub sample_rate: u32,

    /// Samples per PCM frame
    pub frame_samples: usize,

    /// Optional capture device name (substring match)
    pub capture_device: Option<String>,

    /// Directory exported recordings and transcripts are written to
    pub output_dir: PathBuf,
}

impl SessionConfig {
    pub fn new(source: CaptureSource) -> Self {
        Self {
            session_id: format!("session-{}", uuid::Uuid::new_v4()),
            source,
            model: "models/gemini-2.0-flash-live-001".to_string(),
            language: "English".to_string(),
            sample_rate: SAMPLE_RATE,
            frame_samples: FRAME_SAMPLES,
            capture_device: None,
            output_dir: PathBuf::from("recordings"),
        }
    }
}
