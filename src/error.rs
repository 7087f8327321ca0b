//! Error types for the recording pipeline

use thiserror::Error;

/// Errors surfaced by the recording lifecycle
#[derive(Error, Debug)]
pub enum SessionError {
    /// The user asked to start without the required input (e.g. no file selected)
    #[error("Precondition not met: {0}")]
    PreconditionNotMet(String),

    /// The requested audio source could not be acquired
    #[error("Audio source unavailable: {0}")]
    SourceUnavailable(String),

    /// The requested operation is not legal in the current lifecycle state
    #[error("Invalid state transition: {0}")]
    InvalidTransition(String),

    /// The transcription service connection failed
    #[error("Transcriber transport error: {0}")]
    Transport(String),
}
