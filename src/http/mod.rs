//! HTTP API server for external control
//!
//! This module provides a REST API for controlling the recording session:
//! - POST /record/start - Start recording from a source
//! - POST /record/stop - Stop the active recording
//! - GET /status - Query session status
//! - GET /transcript - Get the accumulated transcript
//! - POST /transcript/export - Write the transcript to a text file
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
