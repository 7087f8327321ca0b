//! PCM frame conversion and encoding
//!
//! The transcription service consumes fixed-size blocks of 16-bit signed PCM,
//! Base64-encoded for transport. Capture backends deliver floating-point
//! samples in [-1.0, 1.0]; conversion scales by 32768 and saturates rather
//! than letting out-of-range samples wrap.

use base64::Engine;

/// Samples per frame (mono, 16kHz: one frame every ~256ms)
pub const FRAME_SAMPLES: usize = 4096;

/// Sample rate the pipeline operates at
pub const SAMPLE_RATE: u32 = 16000;

/// Mimetype tag attached to every transmitted frame
pub const PCM_MIME_TYPE: &str = "audio/pcm;rate=16000";

/// A fixed-size block of signed 16-bit samples
#[derive(Debug, Clone)]
pub struct PcmFrame {
    pub samples: Vec<i16>,
}

/// Base64 text representation of a PCM frame, ready for transmission
#[derive(Debug, Clone)]
pub struct EncodedFrame {
    /// Base64-encoded little-endian PCM bytes
    pub data: String,
    /// Mimetype with embedded sample rate
    pub mime_type: &'static str,
}

/// Convert one floating-point sample to i16, saturating at the rails
pub fn sample_to_i16(sample: f32) -> i16 {
    let scaled = sample * 32768.0;
    scaled.clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

impl PcmFrame {
    /// Convert a block of floating-point samples into 16-bit PCM
    pub fn from_f32(samples: &[f32]) -> Self {
        Self {
            samples: samples.iter().copied().map(sample_to_i16).collect(),
        }
    }

    /// Raw little-endian byte representation
    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    /// Base64-encode this frame for transmission
    pub fn encode(&self) -> EncodedFrame {
        EncodedFrame {
            data: base64::engine::general_purpose::STANDARD.encode(self.to_le_bytes()),
            mime_type: PCM_MIME_TYPE,
        }
    }
}
