pub mod backend;
pub mod capture;
pub mod file;
pub mod resample;

pub use backend::{
    CaptureBackend, CaptureBackendFactory, CaptureConfig, CaptureSource, SampleBlock,
};
pub use capture::{MicBackend, SystemAudioBackend};
pub use file::{decode_file, DecodedAudio, FileBackend};
pub use resample::{FrameChunker, LinearResampler};
