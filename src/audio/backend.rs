use anyhow::Result;
use std::path::PathBuf;
use tokio::sync::mpsc;

use crate::error::SessionError;
use crate::pcm::{FRAME_SAMPLES, SAMPLE_RATE};

/// Audio source selected by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureSource {
    /// Microphone input
    Microphone,
    /// System audio loopback (whatever is playing on this machine)
    SystemAudio,
    /// Decoded media file
    File(PathBuf),
}

impl CaptureSource {
    /// Short label used in log lines and export filenames
    pub fn label(&self) -> &'static str {
        match self {
            CaptureSource::Microphone => "mic",
            CaptureSource::SystemAudio => "system",
            CaptureSource::File(_) => "file",
        }
    }

    /// Whether this source records live audio (as opposed to replaying a file)
    pub fn is_live(&self) -> bool {
        !matches!(self, CaptureSource::File(_))
    }
}

/// A fixed-size block of floating-point mono samples
#[derive(Debug, Clone)]
pub struct SampleBlock {
    /// Mono samples in [-1.0, 1.0], exactly `frame_samples` long
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Milliseconds since capture started
    pub timestamp_ms: u64,
}

/// Configuration for capture backends
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Target sample rate (backends resample if the device differs)
    pub sample_rate: u32,
    /// Samples per emitted block
    pub frame_samples: usize,
    /// Capacity of the block channel; overflow drops blocks with a warning
    pub channel_capacity: usize,
    /// Optional capture device name (substring match); None = default device
    pub device: Option<String>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            sample_rate: SAMPLE_RATE,
            frame_samples: FRAME_SAMPLES,
            channel_capacity: 32,
            device: None,
        }
    }
}

/// Audio capture backend trait
///
/// Implementations:
/// - `MicBackend`: cpal input device capture
/// - `SystemAudioBackend`: cpal loopback/monitor device capture
/// - `FileBackend`: whole-file decode, replayed at real-time pace
#[async_trait::async_trait]
pub trait CaptureBackend: Send + Sync {
    /// Start capturing audio
    ///
    /// Returns a channel receiver that will receive fixed-size sample blocks.
    /// The channel closes when the source ends (file playback reaching EOF)
    /// or after `stop`.
    async fn start(&mut self) -> Result<mpsc::Receiver<SampleBlock>>;

    /// Stop capturing audio; safe to call more than once
    async fn stop(&mut self) -> Result<()>;

    /// Check if backend is currently capturing
    fn is_capturing(&self) -> bool;

    /// Get backend name for logging
    fn name(&self) -> &str;
}

/// Capture backend factory
pub struct CaptureBackendFactory;

impl CaptureBackendFactory {
    /// Create a capture backend for the selected source
    pub fn create(
        source: &CaptureSource,
        config: CaptureConfig,
    ) -> Result<Box<dyn CaptureBackend>> {
        match source {
            CaptureSource::Microphone => {
                let backend = super::capture::MicBackend::new(config);
                Ok(Box::new(backend))
            }
            CaptureSource::SystemAudio => {
                let backend = super::capture::SystemAudioBackend::new(config);
                Ok(Box::new(backend))
            }
            CaptureSource::File(path) => {
                if path.as_os_str().is_empty() {
                    return Err(SessionError::PreconditionNotMet(
                        "no file selected".to_string(),
                    )
                    .into());
                }
                let backend = super::file::FileBackend::new(path.clone(), config);
                Ok(Box::new(backend))
            }
        }
    }
}
