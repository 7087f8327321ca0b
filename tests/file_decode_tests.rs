// Integration tests for file decoding
//
// These verify the entire-file decode path: WAV fixtures written with hound
// come back as mono f32 at the pipeline rate, with stereo folding and
// resampling applied when the source differs.

use anyhow::Result;
use live_scribe::audio::decode_file;
use live_scribe::SessionError;
use std::path::Path;
use tempfile::TempDir;

fn write_wav(
    path: &Path,
    channels: u16,
    sample_rate: u32,
    frames: usize,
    sample_fn: impl Fn(usize, u16) -> i16,
) {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for frame in 0..frames {
        for channel in 0..channels {
            writer.write_sample(sample_fn(frame, channel)).unwrap();
        }
    }
    writer.finalize().unwrap();
}

#[test]
fn test_decode_mono_16khz_passthrough() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("mono.wav");
    write_wav(&path, 1, 16000, 16000, |_, _| 8192); // 1s of constant 0.25

    let decoded = decode_file(&path, 16000)?;

    assert_eq!(decoded.sample_rate, 16000);
    assert_eq!(decoded.samples.len(), 16000);
    assert!((decoded.duration_seconds - 1.0).abs() < 0.01);
    assert!((decoded.samples[100] - 0.25).abs() < 0.01);

    Ok(())
}

#[test]
fn test_decode_folds_stereo_to_mono() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("stereo.wav");
    // Left at +0.5, right at -0.5: the mono fold lands near zero
    write_wav(&path, 2, 16000, 8000, |_, channel| {
        if channel == 0 {
            16384
        } else {
            -16384
        }
    });

    let decoded = decode_file(&path, 16000)?;

    assert_eq!(decoded.samples.len(), 8000);
    assert!(decoded.samples.iter().all(|s| s.abs() < 0.01));

    Ok(())
}

#[test]
fn test_decode_resamples_to_pipeline_rate() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("hifi.wav");
    write_wav(&path, 1, 48000, 48000, |_, _| 4096); // 1s at 48kHz

    let decoded = decode_file(&path, 16000)?;

    // 1 second of audio at the pipeline rate, within a frame of slack
    assert!((decoded.samples.len() as i64 - 16000).abs() < 100);
    assert!((decoded.duration_seconds - 1.0).abs() < 0.01);

    Ok(())
}

#[test]
fn test_decode_missing_file_is_source_unavailable() {
    let err = decode_file(Path::new("no/such/file.wav"), 16000).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<SessionError>(),
        Some(SessionError::SourceUnavailable(_))
    ));
}

#[test]
fn test_decode_garbage_is_source_unavailable() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("garbage.wav");
    std::fs::write(&path, b"this is not audio")?;

    let err = decode_file(&path, 16000).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SessionError>(),
        Some(SessionError::SourceUnavailable(_))
    ));

    Ok(())
}
