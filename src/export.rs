//! Export utilities: captured audio to WAV, transcript to text
//!
//! Filenames for captured audio embed the source mode and the recording
//! duration, e.g. `mic-recording-02m34s.wav`.

use anyhow::{Context, Result};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Format a whole-second count as `MM:SS`
pub fn format_duration(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Filename for an exported recording, embedding source mode and duration
pub fn recording_filename(mode: &str, secs: u64) -> String {
    format!("{}-recording-{:02}m{:02}s.wav", mode, secs / 60, secs % 60)
}

/// Write captured PCM samples as a mono 16-bit WAV file; returns the path
pub fn save_audio_wav(
    output_dir: &Path,
    filename: &str,
    samples: &[i16],
    sample_rate: u32,
) -> Result<PathBuf> {
    fs::create_dir_all(output_dir).context("Failed to create output directory")?;
    let path = output_dir.join(filename);

    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(&path, spec)
        .with_context(|| format!("Failed to create WAV file: {}", path.display()))?;
    for &sample in samples {
        writer
            .write_sample(sample)
            .context("Failed to write sample to WAV")?;
    }
    writer.finalize().context("Failed to finalize WAV file")?;

    info!(
        "Saved {} samples ({}) to {}",
        samples.len(),
        format_duration(samples.len() as u64 / sample_rate as u64),
        path.display()
    );

    Ok(path)
}

/// Write the transcript to `<session_id>.txt`; returns the path
pub fn save_transcript_txt(output_dir: &Path, session_id: &str, text: &str) -> Result<PathBuf> {
    fs::create_dir_all(output_dir).context("Failed to create output directory")?;
    let path = output_dir.join(format!("{session_id}.txt"));

    fs::write(&path, text)
        .with_context(|| format!("Failed to write transcript: {}", path.display()))?;

    info!("Saved transcript ({} chars) to {}", text.len(), path.display());

    Ok(path)
}
