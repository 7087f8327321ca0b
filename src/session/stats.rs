use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::state::SessionState;

/// Statistics about a recording session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    /// Session identifier
    pub session_id: String,

    /// Current lifecycle state
    pub state: SessionState,

    /// Source label ("mic", "system", "file")
    pub source: String,

    /// When the recording started
    pub started_at: DateTime<Utc>,

    /// Whole seconds elapsed while recording
    pub elapsed_secs: u64,

    /// Encoded frames handed to the transcriber
    pub frames_sent: usize,

    /// Transcript fragments received so far
    pub fragments_received: usize,
}
