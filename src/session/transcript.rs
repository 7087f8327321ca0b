//! Transcript accumulation
//!
//! Fragments append strictly in arrival order; the displayed transcript is
//! their concatenation with no added separators. The buffer is cleared only
//! on the transition into a new recording.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single incremental fragment from the transcription service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptFragment {
    /// Transcribed text
    pub text: String,

    /// When this fragment arrived
    pub received_at: DateTime<Utc>,
}

/// Append-only ordered sequence of transcript fragments
#[derive(Debug, Default)]
pub struct TranscriptBuffer {
    fragments: Vec<TranscriptFragment>,
}

impl TranscriptBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one fragment, stamped with its arrival time
    pub fn push(&mut self, text: impl Into<String>) {
        self.fragments.push(TranscriptFragment {
            text: text.into(),
            received_at: Utc::now(),
        });
    }

    /// Reset for a new recording
    pub fn clear(&mut self) {
        self.fragments.clear();
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn fragments(&self) -> &[TranscriptFragment] {
        &self.fragments
    }

    /// The full transcript: fragments concatenated in arrival order
    pub fn text(&self) -> String {
        self.fragments
            .iter()
            .map(|fragment| fragment.text.as_str())
            .collect()
    }
}
