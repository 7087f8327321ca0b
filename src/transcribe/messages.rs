use serde::{Deserialize, Serialize};

use crate::pcm::EncodedFrame;

// ============================================================================
// Outbound messages
// ============================================================================

/// First message on a new connection; configures the session
#[derive(Debug, Serialize)]
pub struct SetupMessage {
    pub setup: SessionSetup,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSetup {
    /// Model identifier understood by the service
    pub model: String,
    pub generation_config: GenerationConfig,
    /// Presence of this field enables transcription of the input audio
    pub input_audio_transcription: InputAudioTranscription,
    pub system_instruction: SystemInstruction,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_modalities: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct InputAudioTranscription {}

#[derive(Debug, Clone, Serialize)]
pub struct SystemInstruction {
    pub parts: Vec<TextPart>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextPart {
    pub text: String,
}

impl SessionSetup {
    pub fn new(model: impl Into<String>, instruction: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            generation_config: GenerationConfig {
                response_modalities: vec!["AUDIO".to_string()],
            },
            input_audio_transcription: InputAudioTranscription::default(),
            system_instruction: SystemInstruction {
                parts: vec![TextPart {
                    text: instruction.into(),
                }],
            },
        }
    }
}

/// One encoded PCM frame, tagged with its mimetype and sample rate
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeInputMessage {
    pub realtime_input: RealtimeInput,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeInput {
    pub media_chunks: Vec<MediaChunk>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaChunk {
    pub data: String,
    pub mime_type: String,
}

impl RealtimeInputMessage {
    pub fn from_frame(frame: &EncodedFrame) -> Self {
        Self {
            realtime_input: RealtimeInput {
                media_chunks: vec![MediaChunk {
                    data: frame.data.clone(),
                    mime_type: frame.mime_type.to_string(),
                }],
            },
        }
    }
}

// ============================================================================
// Inbound messages
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerMessage {
    #[serde(default)]
    pub server_content: Option<ServerContent>,
    #[serde(default)]
    pub error: Option<ServerError>,
    #[serde(default)]
    pub setup_complete: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerContent {
    /// Incremental transcription of the audio we are sending
    #[serde(default)]
    pub input_transcription: Option<TranscriptionPayload>,
    #[serde(default)]
    pub turn_complete: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct TranscriptionPayload {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ServerError {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}
