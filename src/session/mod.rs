//! Recording session management
//!
//! This module provides the `RecordingSession` abstraction that manages:
//! - Audio source acquisition (microphone, system loopback, file)
//! - PCM conversion and Base64 frame encoding
//! - The streaming transcription connection
//! - Transcript accumulation and session statistics
//! - The explicit idle/starting/recording/stopping lifecycle

mod config;
mod session;
mod state;
mod stats;
mod transcript;

pub use config::SessionConfig;
pub use session::RecordingSession;
pub use state::{SessionState, StateCell};
pub use stats::SessionStats;
pub use transcript::{TranscriptBuffer, TranscriptFragment};
