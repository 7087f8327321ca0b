use super::state::AppState;
use crate::audio::CaptureSource;
use crate::session::{RecordingSession, SessionConfig, SessionState, SessionStats, TranscriptFragment};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StartRecordingRequest {
    /// Audio source: "mic", "system", or "file"
    pub source: String,

    /// Path to the media file (file source only)
    pub path: Option<String>,

    /// Optional language override
    pub language: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StartRecordingResponse {
    pub session_id: String,
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct StopRecordingResponse {
    pub session_id: String,
    pub status: String,
    pub stats: SessionStats,
}

#[derive(Debug, Serialize)]
pub struct TranscriptResponse {
    pub session_id: String,
    pub text: String,
    pub fragments: Vec<TranscriptFragment>,
}

#[derive(Debug, Serialize)]
pub struct ExportResponse {
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /record/start
/// Start a new recording session
pub async fn start_recording(
    State(state): State<AppState>,
    Json(req): Json<StartRecordingRequest>,
) -> impl IntoResponse {
    let source = match req.source.as_str() {
        "mic" => CaptureSource::Microphone,
        "system" => CaptureSource::SystemAudio,
        "file" => CaptureSource::File(PathBuf::from(req.path.unwrap_or_default())),
        other => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: format!("unknown source: {other}"),
                }),
            )
                .into_response();
        }
    };

    // Hold the write lock across the whole start so two concurrent requests
    // cannot both create a session
    let mut active = state.active.write().await;
    if let Some(session) = active.as_ref() {
        if session.state() != SessionState::Idle {
            return (
                StatusCode::CONFLICT,
                Json(ErrorResponse {
                    error: "a recording session is already active".to_string(),
                }),
            )
                .into_response();
        }
    }

    let mut config = SessionConfig::new(source);
    config.model = state.config.transcriber.model.clone();
    config.language = req
        .language
        .unwrap_or_else(|| state.config.transcriber.language.clone());
    config.sample_rate = state.config.audio.sample_rate;
    config.frame_samples = state.config.audio.frame_samples;
    config.capture_device = state.config.audio.capture_device.clone();
    config.output_dir = PathBuf::from(&state.config.audio.output_dir);

    let session = Arc::new(RecordingSession::new(config, Arc::clone(&state.transcriber)));
    let session_id = session.config().session_id.clone();

    info!("Starting recording session: {}", session_id);

    if let Err(e) = Arc::clone(&session).start().await {
        error!("Failed to start recording: {:#}", e);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: format!("Failed to start recording: {e:#}"),
            }),
        )
            .into_response();
    }

    *active = Some(session);

    (
        StatusCode::OK,
        Json(StartRecordingResponse {
            session_id: session_id.clone(),
            status: "recording".to_string(),
            message: format!("Recording started: {session_id}"),
        }),
    )
        .into_response()
}

/// POST /record/stop
/// Stop the active recording session
pub async fn stop_recording(State(state): State<AppState>) -> impl IntoResponse {
    let session = {
        let active = state.active.read().await;
        active.clone()
    };

    match session {
        Some(session) => match session.stop().await {
            Ok(stats) => (
                StatusCode::OK,
                Json(StopRecordingResponse {
                    session_id: session.config().session_id.clone(),
                    status: "stopped".to_string(),
                    stats,
                }),
            )
                .into_response(),
            Err(e) => {
                error!("Failed to stop recording: {:#}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: format!("Failed to stop recording: {e:#}"),
                    }),
                )
                    .into_response()
            }
        },
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "no recording session".to_string(),
            }),
        )
            .into_response(),
    }
}

/// GET /status
/// Get status of the current session
pub async fn get_status(State(state): State<AppState>) -> impl IntoResponse {
    let active = state.active.read().await;

    match active.as_ref() {
        Some(session) => (StatusCode::OK, Json(session.stats().await)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "no recording session".to_string(),
            }),
        )
            .into_response(),
    }
}

/// GET /transcript
/// Get the accumulated transcript
pub async fn get_transcript(State(state): State<AppState>) -> impl IntoResponse {
    let active = state.active.read().await;

    match active.as_ref() {
        Some(session) => (
            StatusCode::OK,
            Json(TranscriptResponse {
                session_id: session.config().session_id.clone(),
                text: session.transcript_text().await,
                fragments: session.transcript_fragments().await,
            }),
        )
            .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "no recording session".to_string(),
            }),
        )
            .into_response(),
    }
}

/// POST /transcript/export
/// Write the transcript to a text file in the output directory
pub async fn export_transcript(State(state): State<AppState>) -> impl IntoResponse {
    let session = {
        let active = state.active.read().await;
        active.clone()
    };

    match session {
        Some(session) => match session.export_transcript().await {
            Ok(path) => (
                StatusCode::OK,
                Json(ExportResponse {
                    path: path.display().to_string(),
                }),
            )
                .into_response(),
            Err(e) => {
                error!("Failed to export transcript: {:#}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: format!("Failed to export transcript: {e:#}"),
                    }),
                )
                    .into_response()
            }
        },
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "no recording session".to_string(),
            }),
        )
            .into_response(),
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
