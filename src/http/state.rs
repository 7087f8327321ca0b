use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::session::RecordingSession;
use crate::transcribe::Transcriber;

/// Shared application state for HTTP handlers
///
/// At most one recording session exists at a time; a finished session stays
/// in the slot so its transcript remains queryable until the next start.
#[derive(Clone)]
pub struct AppState {
    pub active: Arc<RwLock<Option<Arc<RecordingSession>>>>,
    pub transcriber: Arc<dyn Transcriber>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config, transcriber: Arc<dyn Transcriber>) -> Self {
        Self {
            active: Arc::new(RwLock::new(None)),
            transcriber,
            config: Arc::new(config),
        }
    }
}
