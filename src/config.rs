use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub audio: AudioConfig,
    pub transcriber: TranscriberConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioConfig {
    pub sample_rate: u32,
    pub frame_samples: usize,
    pub output_dir: String,
    pub capture_device: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranscriberConfig {
    /// WebSocket endpoint of the transcription service
    pub ws_url: String,
    pub model: String,
    pub language: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("service.name", "live-scribe")?
            .set_default("service.http.bind", "127.0.0.1")?
            .set_default("service.http.port", 8750)?
            .set_default("audio.sample_rate", 16000)?
            .set_default("audio.frame_samples", 4096)?
            .set_default("audio.output_dir", "recordings")?
            .set_default(
                "transcriber.ws_url",
                "wss://generativelanguage.googleapis.com/ws/google.ai.generativelanguage.v1beta.GenerativeService.BidiGenerateContent",
            )?
            .set_default("transcriber.model", "models/gemini-2.0-flash-live-001")?
            .set_default("transcriber.language", "English")?
            .set_default("transcriber.api_key_env", "GEMINI_API_KEY")?
            .add_source(config::File::with_name(path).required(false))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Resolve the service API key from the configured environment variable
    pub fn api_key(&self) -> Result<String> {
        std::env::var(&self.transcriber.api_key_env).with_context(|| {
            format!(
                "transcription API key not set: export {}",
                self.transcriber.api_key_env
            )
        })
    }
}
