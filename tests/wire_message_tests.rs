// Tests for the transcription service wire messages
//
// The service speaks camelCase JSON; these pin the field names the session
// setup and realtime frames must carry, and the shapes we parse back.

use live_scribe::transcribe::messages::{
    RealtimeInputMessage, ServerMessage, SessionSetup, SetupMessage,
};
use live_scribe::PcmFrame;

#[test]
fn test_setup_message_serialization() {
    let setup = SessionSetup::new("models/test-live", "Transcribe the audio.");
    let json = serde_json::to_string(&SetupMessage { setup }).unwrap();

    assert!(json.contains("\"setup\""));
    assert!(json.contains("\"model\":\"models/test-live\""));
    assert!(json.contains("\"generationConfig\""));
    assert!(json.contains("\"responseModalities\":[\"AUDIO\"]"));
    assert!(json.contains("\"inputAudioTranscription\":{}"));
    assert!(json.contains("\"systemInstruction\""));
    assert!(json.contains("Transcribe the audio."));
}

#[test]
fn test_realtime_input_carries_mime_type_and_data() {
    let frame = PcmFrame::from_f32(&[0.0; 8]).encode();
    let message = RealtimeInputMessage::from_frame(&frame);
    let json = serde_json::to_string(&message).unwrap();

    assert!(json.contains("\"realtimeInput\""));
    assert!(json.contains("\"mediaChunks\""));
    assert!(json.contains("\"mimeType\":\"audio/pcm;rate=16000\""));
    assert!(json.contains(&format!("\"data\":\"{}\"", frame.data)));
}

#[test]
fn test_server_transcription_parses() {
    let json = r#"{
        "serverContent": {
            "inputTranscription": { "text": "hello world" }
        }
    }"#;

    let message: ServerMessage = serde_json::from_str(json).unwrap();
    let text = message
        .server_content
        .and_then(|content| content.input_transcription)
        .and_then(|transcription| transcription.text);

    assert_eq!(text.as_deref(), Some("hello world"));
}

#[test]
fn test_server_message_tolerates_unknown_fields() {
    // The service sends plenty we do not consume; parsing must not break
    let json = r#"{
        "serverContent": {
            "turnComplete": true,
            "modelTurn": { "parts": [{ "text": "ignored" }] }
        },
        "usageMetadata": { "totalTokenCount": 42 }
    }"#;

    let message: ServerMessage = serde_json::from_str(json).unwrap();
    let content = message.server_content.unwrap();
    assert_eq!(content.turn_complete, Some(true));
    assert!(content.input_transcription.is_none());
}

#[test]
fn test_server_error_parses() {
    let json = r#"{ "error": { "code": 8, "message": "resource exhausted" } }"#;

    let message: ServerMessage = serde_json::from_str(json).unwrap();
    let error = message.error.unwrap();
    assert_eq!(error.code, Some(8));
    assert_eq!(error.message.as_deref(), Some("resource exhausted"));
}
