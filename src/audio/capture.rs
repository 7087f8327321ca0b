//! Live audio capture backends built on cpal
//!
//! Two variants share the same capture worker: `MicBackend` reads an input
//! device, `SystemAudioBackend` reads a loopback/monitor device so that
//! whatever is playing on the machine (browser tab, video player) can be
//! transcribed. The cpal stream is owned by a dedicated thread because it is
//! not `Send`; blocks are handed to the async side over a bounded channel.

use anyhow::{Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, SampleRate, StreamConfig};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use super::backend::{CaptureBackend, CaptureConfig, SampleBlock};
use super::resample::{FrameChunker, LinearResampler};
use crate::error::SessionError;

/// Device names that identify a loopback/monitor capture source
const LOOPBACK_HINTS: &[&str] = &["monitor", "loopback", "stereo mix", "blackhole", "soundflower"];

/// Microphone capture backend
pub struct MicBackend {
    config: CaptureConfig,
    running: Arc<AtomicBool>,
    worker: Option<std::thread::JoinHandle<()>>,
}

impl MicBackend {
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            running: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }
}

#[async_trait::async_trait]
impl CaptureBackend for MicBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<SampleBlock>> {
        let host = cpal::default_host();

        let device = if let Some(ref name) = self.config.device {
            find_input_device(&host, name)?
        } else {
            host.default_input_device().ok_or_else(|| {
                SessionError::SourceUnavailable("no audio input device available".to_string())
            })?
        };

        let device_name = device.name().unwrap_or_else(|_| "unknown".to_string());
        info!("Using microphone device: {}", device_name);

        let (tx, rx) = mpsc::channel(self.config.channel_capacity);
        self.running.store(true, Ordering::SeqCst);
        match spawn_capture_worker(device, self.config.clone(), Arc::clone(&self.running), tx) {
            Ok(worker) => self.worker = Some(worker),
            Err(e) => {
                self.running.store(false, Ordering::SeqCst);
                return Err(e);
            }
        }

        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        self.running.store(false, Ordering::SeqCst);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
        info!("Microphone capture stopped");
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "cpal-mic"
    }
}

/// System audio (loopback) capture backend
///
/// Requires the host to expose a monitor or virtual loopback device; fails
/// with `SourceUnavailable` otherwise, mirroring a declined share dialog.
pub struct SystemAudioBackend {
    config: CaptureConfig,
    running: Arc<AtomicBool>,
    worker: Option<std::thread::JoinHandle<()>>,
}

impl SystemAudioBackend {
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            running: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }
}

#[async_trait::async_trait]
impl CaptureBackend for SystemAudioBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<SampleBlock>> {
        let host = cpal::default_host();

        let device = if let Some(ref name) = self.config.device {
            find_input_device(&host, name)?
        } else {
            find_loopback_device(&host)?
        };

        let device_name = device.name().unwrap_or_else(|_| "unknown".to_string());
        info!("Using system audio device: {}", device_name);

        let (tx, rx) = mpsc::channel(self.config.channel_capacity);
        self.running.store(true, Ordering::SeqCst);
        match spawn_capture_worker(device, self.config.clone(), Arc::clone(&self.running), tx) {
            Ok(worker) => self.worker = Some(worker),
            Err(e) => {
                self.running.store(false, Ordering::SeqCst);
                return Err(e);
            }
        }

        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        self.running.store(false, Ordering::SeqCst);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
        info!("System audio capture stopped");
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "cpal-loopback"
    }
}

fn find_input_device(host: &cpal::Host, name: &str) -> Result<Device> {
    let devices = host
        .input_devices()
        .map_err(|e| SessionError::SourceUnavailable(format!("cannot list input devices: {e}")))?;

    for device in devices {
        if let Ok(device_name) = device.name() {
            if device_name.to_lowercase().contains(&name.to_lowercase()) {
                return Ok(device);
            }
        }
    }

    Err(SessionError::SourceUnavailable(format!("capture device not found: {name}")).into())
}

fn find_loopback_device(host: &cpal::Host) -> Result<Device> {
    let devices = host
        .input_devices()
        .map_err(|e| SessionError::SourceUnavailable(format!("cannot list input devices: {e}")))?;

    for device in devices {
        if let Ok(device_name) = device.name() {
            let lower = device_name.to_lowercase();
            if LOOPBACK_HINTS.iter().any(|hint| lower.contains(hint)) {
                return Ok(device);
            }
        }
    }

    Err(SessionError::SourceUnavailable(
        "no loopback/monitor capture device available; route system audio through a \
         virtual device or name one in the config"
            .to_string(),
    )
    .into())
}

/// Pick a stream configuration for the device, preferring the target rate
/// and f32 samples; falls back to the device maximum and resamples.
fn select_stream_config(device: &Device, target_rate: u32) -> Result<(StreamConfig, u32, usize)> {
    let supported = device
        .supported_input_configs()
        .context("failed to query device configurations")?;

    let target = SampleRate(target_rate);
    let mut best = None;

    for range in supported {
        if range.sample_format() != SampleFormat::F32 {
            continue;
        }
        if range.min_sample_rate() <= target && target <= range.max_sample_rate() {
            best = Some(range.with_sample_rate(target));
            break;
        }
        if best.is_none() {
            best = Some(range.with_max_sample_rate());
        }
    }

    let chosen = best.ok_or_else(|| {
        SessionError::SourceUnavailable("device has no f32 input configuration".to_string())
    })?;

    let device_rate = chosen.sample_rate().0;
    let channels = chosen.channels() as usize;
    info!(
        "Capture config: {} channels @ {} Hz (target: {} Hz)",
        channels, device_rate, target_rate
    );

    Ok((chosen.config(), device_rate, channels))
}

/// Run the cpal stream on its own thread; samples are mono-folded, resampled
/// to the target rate, re-blocked to the frame size, and pushed to `tx`.
fn spawn_capture_worker(
    device: Device,
    config: CaptureConfig,
    running: Arc<AtomicBool>,
    tx: mpsc::Sender<SampleBlock>,
) -> Result<std::thread::JoinHandle<()>> {
    let (stream_config, device_rate, channels) = select_stream_config(&device, config.sample_rate)?;

    let handle = std::thread::spawn(move || {
        let mut resampler = LinearResampler::new(device_rate, config.sample_rate);
        let mut chunker = FrameChunker::new(config.frame_samples);
        let mut emitted: u64 = 0;
        let frame_ms = config.frame_samples as u64 * 1000 / config.sample_rate as u64;
        let target_rate = config.sample_rate;

        let running_cb = Arc::clone(&running);
        let data_cb = move |data: &[f32], _: &cpal::InputCallbackInfo| {
            if !running_cb.load(Ordering::Relaxed) {
                return;
            }

            let mono: Vec<f32> = if channels > 1 {
                data.chunks(channels)
                    .map(|frame| frame.iter().sum::<f32>() / channels as f32)
                    .collect()
            } else {
                data.to_vec()
            };

            let resampled = resampler.process(&mono);
            for samples in chunker.push(&resampled) {
                let block = SampleBlock {
                    samples,
                    sample_rate: target_rate,
                    timestamp_ms: emitted * frame_ms,
                };
                emitted += 1;
                if tx.try_send(block).is_err() {
                    warn!("Capture channel full - dropping audio block");
                }
            }
        };

        let stream = match device.build_input_stream(
            &stream_config,
            data_cb,
            |err| error!("Audio stream error: {}", err),
            None,
        ) {
            Ok(stream) => stream,
            Err(e) => {
                error!("Failed to build input stream: {}", e);
                return;
            }
        };

        if let Err(e) = stream.play() {
            error!("Failed to start input stream: {}", e);
            return;
        }

        while running.load(Ordering::Relaxed) {
            std::thread::park_timeout(Duration::from_millis(50));
        }

        drop(stream);
    });

    Ok(handle)
}
