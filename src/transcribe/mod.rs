//! Connection to the external real-time transcription service
//!
//! The service owns speech recognition; this module owns the duplex
//! connection: session setup, frame transmission, and the event stream of
//! transcript fragments coming back.

pub mod client;
pub mod messages;

pub use client::{
    LiveApiTranscriber, Transcriber, TranscriberEvent, TranscriberSession, FRAME_QUEUE_CAPACITY,
};
pub use messages::SessionSetup;

use crate::audio::CaptureSource;

/// Build the natural-language system instruction for a session, naming the
/// audio source context and the target spoken language.
pub fn system_instruction(source: &CaptureSource, language: &str) -> String {
    let context = match source {
        CaptureSource::Microphone => "a live conversation picked up by the user's microphone",
        CaptureSource::SystemAudio => {
            "audio playing on this machine, such as a lecture or a video"
        }
        CaptureSource::File(_) => "an uploaded audio or video recording",
    };

    format!(
        "You are transcribing {context}. Produce a real-time transcription of the \
         speech in {language}, smoothing the text with surrounding context. \
         Output only the transcription."
    )
}
