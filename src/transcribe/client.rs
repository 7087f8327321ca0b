//! Streaming transcription session
//!
//! `LiveApiTranscriber` opens a duplex WebSocket to the external speech
//! service: encoded PCM frames go out, incremental transcript fragments come
//! back. The frame queue between the encoder and the socket writer is
//! bounded; when it fills, new frames are dropped with a warning instead of
//! buffering without limit. Connection failures after setup surface as
//! `Error`/`Closed` events and are never retried here.

use anyhow::Result;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{error, info, warn};

use super::messages::{RealtimeInputMessage, ServerMessage, SessionSetup, SetupMessage};
use crate::error::SessionError;
use crate::pcm::EncodedFrame;

/// Frames queued between the encoder and the socket writer (~8s of audio)
pub const FRAME_QUEUE_CAPACITY: usize = 32;

/// Events emitted by an open transcription session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriberEvent {
    /// An incremental transcript fragment, in arrival order
    Transcript(String),
    /// The service reported an error; the session is no longer usable
    Error(String),
    /// The connection closed (expected or not)
    Closed,
}

/// Handles to an open session: a bounded frame sender and an event receiver
pub struct TranscriberSession {
    pub frames: mpsc::Sender<EncodedFrame>,
    pub events: mpsc::Receiver<TranscriberEvent>,
}

/// Connection seam to the external transcription service
#[async_trait::async_trait]
pub trait Transcriber: Send + Sync {
    /// Open a duplex session configured with `setup`
    async fn open(&self, setup: SessionSetup) -> Result<TranscriberSession>;
}

/// WebSocket implementation against the live speech API
pub struct LiveApiTranscriber {
    ws_url: String,
    api_key: String,
}

impl LiveApiTranscriber {
    pub fn new(ws_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            ws_url: ws_url.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait::async_trait]
impl Transcriber for LiveApiTranscriber {
    async fn open(&self, setup: SessionSetup) -> Result<TranscriberSession> {
        let url = format!("{}?key={}", self.ws_url, self.api_key);

        let (ws, _) = connect_async(url.as_str())
            .await
            .map_err(|e| SessionError::Transport(format!("connect failed: {e}")))?;
        info!("Connected to transcription service");

        let (mut write, mut read) = ws.split();

        let setup_json = serde_json::to_string(&SetupMessage { setup })?;
        write
            .send(Message::Text(setup_json))
            .await
            .map_err(|e| SessionError::Transport(format!("setup send failed: {e}")))?;

        let (frame_tx, mut frame_rx) = mpsc::channel::<EncodedFrame>(FRAME_QUEUE_CAPACITY);
        let (event_tx, event_rx) = mpsc::channel::<TranscriberEvent>(64);

        // Writer: drains the frame queue in order; a dropped sender ends the
        // session with a close handshake
        tokio::spawn(async move {
            while let Some(frame) = frame_rx.recv().await {
                let message = RealtimeInputMessage::from_frame(&frame);
                let json = match serde_json::to_string(&message) {
                    Ok(json) => json,
                    Err(e) => {
                        error!("Failed to serialize audio frame: {}", e);
                        break;
                    }
                };
                if let Err(e) = write.send(Message::Text(json)).await {
                    error!("Failed to send audio frame: {}", e);
                    break;
                }
            }
            let _ = write.send(Message::Close(None)).await;
        });

        // Reader: maps service messages to events until the socket ends
        tokio::spawn(async move {
            while let Some(message) = read.next().await {
                match message {
                    Ok(Message::Text(text)) => {
                        for event in events_from_payload(text.as_bytes()) {
                            if event_tx.send(event).await.is_err() {
                                return;
                            }
                        }
                    }
                    Ok(Message::Binary(data)) => {
                        for event in events_from_payload(&data) {
                            if event_tx.send(event).await.is_err() {
                                return;
                            }
                        }
                    }
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        let _ = event_tx.send(TranscriberEvent::Error(e.to_string())).await;
                        break;
                    }
                }
            }
            let _ = event_tx.send(TranscriberEvent::Closed).await;
        });

        Ok(TranscriberSession {
            frames: frame_tx,
            events: event_rx,
        })
    }
}

/// Parse one service payload into session events
fn events_from_payload(payload: &[u8]) -> Vec<TranscriberEvent> {
    let message: ServerMessage = match serde_json::from_slice(payload) {
        Ok(message) => message,
        Err(e) => {
            warn!("Unparseable server message: {}", e);
            return Vec::new();
        }
    };

    let mut events = Vec::new();

    if let Some(error) = message.error {
        let detail = error
            .message
            .unwrap_or_else(|| "unspecified service error".to_string());
        events.push(TranscriberEvent::Error(detail));
    }

    if let Some(text) = message
        .server_content
        .and_then(|content| content.input_transcription)
        .and_then(|transcription| transcription.text)
    {
        if !text.is_empty() {
            events.push(TranscriberEvent::Transcript(text));
        }
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_event_from_server_content() {
        let payload = br#"{"serverContent":{"inputTranscription":{"text":"hello"}}}"#;
        let events = events_from_payload(payload);
        assert_eq!(events, vec![TranscriberEvent::Transcript("hello".to_string())]);
    }

    #[test]
    fn test_error_event_from_error_payload() {
        let payload = br#"{"error":{"code":13,"message":"internal"}}"#;
        let events = events_from_payload(payload);
        assert_eq!(events, vec![TranscriberEvent::Error("internal".to_string())]);
    }

    #[test]
    fn test_unrelated_payload_yields_no_events() {
        assert!(events_from_payload(br#"{"setupComplete":{}}"#).is_empty());
        assert!(events_from_payload(br#"{"serverContent":{"turnComplete":true}}"#).is_empty());
        assert!(events_from_payload(b"not json").is_empty());
    }

    #[test]
    fn test_empty_transcript_fragment_is_skipped() {
        let payload = br#"{"serverContent":{"inputTranscription":{"text":""}}}"#;
        assert!(events_from_payload(payload).is_empty());
    }
}
