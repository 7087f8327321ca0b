//! File playback backend
//!
//! Decodes the entire file up front into an in-memory mono buffer at the
//! pipeline rate, then replays it as fixed-size blocks paced at real time.
//! The block channel closes at end-of-file, which the session treats as a
//! natural stop.

use anyhow::{Context, Result};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as DecodeError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::backend::{CaptureBackend, CaptureConfig, SampleBlock};
use super::resample::LinearResampler;
use crate::error::SessionError;

/// Fully decoded audio content, mono at the pipeline rate
#[derive(Debug)]
pub struct DecodedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub duration_seconds: f64,
}

/// Decode a media file's full audio content into memory
pub fn decode_file(path: &Path, target_rate: u32) -> Result<DecodedAudio> {
    info!("Decoding audio file: {}", path.display());

    let src = File::open(path).map_err(|e| {
        SessionError::SourceUnavailable(format!("cannot open {}: {e}", path.display()))
    })?;
    let mss = MediaSourceStream::new(Box::new(src), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| SessionError::SourceUnavailable(format!("unrecognized media format: {e}")))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| {
            SessionError::SourceUnavailable("file contains no decodable audio track".to_string())
        })?;
    let track_id = track.id;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| SessionError::SourceUnavailable(format!("unsupported codec: {e}")))?;

    let mut source_rate = track.codec_params.sample_rate.unwrap_or(target_rate);
    let mut mono: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(DecodeError::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(DecodeError::ResetRequired) => break,
            Err(e) => return Err(e).context("failed to read media packet"),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(DecodeError::DecodeError(e)) => {
                warn!("Skipping undecodable packet: {}", e);
                continue;
            }
            Err(e) => return Err(e).context("failed to decode audio packet"),
        };

        let spec = *decoded.spec();
        source_rate = spec.rate;
        let channels = spec.channels.count();

        let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        buf.copy_interleaved_ref(decoded);

        if channels > 1 {
            mono.extend(
                buf.samples()
                    .chunks(channels)
                    .map(|frame| frame.iter().sum::<f32>() / channels as f32),
            );
        } else {
            mono.extend_from_slice(buf.samples());
        }
    }

    if mono.is_empty() {
        return Err(
            SessionError::SourceUnavailable("file decoded to zero audio samples".to_string())
                .into(),
        );
    }

    let samples = if source_rate == target_rate {
        mono
    } else {
        LinearResampler::new(source_rate, target_rate).process(&mono)
    };

    let duration_seconds = samples.len() as f64 / target_rate as f64;
    info!(
        "Audio file decoded: {:.1}s, {} samples at {} Hz",
        duration_seconds,
        samples.len(),
        target_rate
    );

    Ok(DecodedAudio {
        samples,
        sample_rate: target_rate,
        duration_seconds,
    })
}

/// Capture backend that replays a decoded file in real time
pub struct FileBackend {
    path: PathBuf,
    config: CaptureConfig,
    running: Arc<AtomicBool>,
    task: Option<tokio::task::JoinHandle<()>>,
}

impl FileBackend {
    pub fn new(path: PathBuf, config: CaptureConfig) -> Self {
        Self {
            path,
            config,
            running: Arc::new(AtomicBool::new(false)),
            task: None,
        }
    }
}

#[async_trait::async_trait]
impl CaptureBackend for FileBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<SampleBlock>> {
        // Entire-file decode before playback begins
        let decoded = decode_file(&self.path, self.config.sample_rate)?;

        let frame_samples = self.config.frame_samples;
        let sample_rate = self.config.sample_rate;
        let frame_ms = frame_samples as u64 * 1000 / sample_rate as u64;

        // Split into fixed-size blocks; the final partial block is padded
        // with silence
        let blocks: Vec<Vec<f32>> = decoded
            .samples
            .chunks(frame_samples)
            .map(|chunk| {
                let mut block = chunk.to_vec();
                block.resize(frame_samples, 0.0);
                block
            })
            .collect();

        let (tx, rx) = mpsc::channel(self.config.channel_capacity);
        self.running.store(true, Ordering::SeqCst);
        let running = Arc::clone(&self.running);

        self.task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_millis(frame_ms));

            for (index, samples) in blocks.into_iter().enumerate() {
                ticker.tick().await;
                if !running.load(Ordering::SeqCst) {
                    break;
                }

                let block = SampleBlock {
                    samples,
                    sample_rate,
                    timestamp_ms: index as u64 * frame_ms,
                };
                if tx.send(block).await.is_err() {
                    break;
                }
            }
            // tx drops here: the closed channel is the end-of-file signal
        }));

        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        self.running.store(false, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            task.abort();
        }
        info!("File playback stopped");
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "file-playback"
    }
}
