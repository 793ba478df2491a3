//! In-process prosody extraction: autocorrelation F0 and RMS intensity over
//! short frames of a WAV file.

use std::path::Path;

use anyhow::{Context, Result};
use hound::{SampleFormat, WavReader};

use super::trace::ProsodyTrace;

pub const FRAME_MS: u32 = 40;
pub const HOP_MS: u32 = 10;
pub const F0_MIN: u32 = 75;
pub const F0_MAX: u32 = 500;
/// Reference pressure for intensity in dB
const REFERENCE: f64 = 2e-5;

/// Read a WAV file as normalized mono samples (first channel).
pub fn read_wav(path: &Path) -> Result<(Vec<f64>, u32)> {
    let reader = WavReader::open(path)
        .with_context(|| format!("Failed to open WAV file: {}", path.display()))?;

    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let samples: Vec<f64> = match spec.sample_format {
        SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f64;
            reader
                .into_samples::<i32>()
                .step_by(channels)
                .map(|s| s.map(|v| v as f64 / max_val))
                .collect::<std::result::Result<Vec<_>, _>>()
                .context("Failed to read WAV samples")?
        }
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .step_by(channels)
            .map(|s| s.map(|v| v as f64))
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("Failed to read WAV samples")?,
    };

    Ok((samples, spec.sample_rate))
}

pub fn compute_rms(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = samples.iter().map(|s| s * s).sum();
    (sum_sq / samples.len() as f64).sqrt()
}

/// Intensity in dB re 2e-5, 0 for silence.
pub fn intensity_db(samples: &[f64]) -> f64 {
    let rms = compute_rms(samples);
    if rms < 1e-10 {
        return 0.0;
    }
    20.0 * (rms / REFERENCE).log10()
}

/// Estimate F0 (Hz) by normalized autocorrelation.
///
/// Picks the first lag peak above 0.3 within `[f0_min, f0_max]`.
/// Returns `None` for silence or unvoiced frames.
pub fn estimate_f0(samples: &[f64], sr: u32, f0_min: u32, f0_max: u32) -> Option<f64> {
    if samples.len() < 2 || f0_min == 0 || f0_max == 0 {
        return None;
    }
    if compute_rms(samples) < 1e-6 {
        return None;
    }

    let lag_min = (sr / f0_max).max(1) as usize;
    let lag_max = ((sr / f0_min) as usize).min(samples.len() - 1);
    if lag_min >= lag_max {
        return None;
    }

    let mean: f64 = samples.iter().sum::<f64>() / samples.len() as f64;
    let x: Vec<f64> = samples.iter().map(|s| s - mean).collect();

    let energy: f64 = x.iter().map(|v| v * v).sum();
    if energy < 1e-12 {
        return None;
    }

    let autocorr: Vec<f64> = (lag_min..=lag_max)
        .map(|lag| {
            let sum: f64 = x[..x.len() - lag]
                .iter()
                .zip(x[lag..].iter())
                .map(|(a, b)| a * b)
                .sum();
            sum / energy
        })
        .collect();

    let threshold = 0.3;

    if autocorr.len() >= 2 && autocorr[0] >= threshold && autocorr[0] >= autocorr[1] {
        return Some(sr as f64 / lag_min as f64);
    }

    (1..autocorr.len().saturating_sub(1))
        .find(|&i| {
            autocorr[i] >= threshold
                && autocorr[i] >= autocorr[i - 1]
                && autocorr[i] >= autocorr[i + 1]
        })
        .map(|i| sr as f64 / (lag_min + i) as f64)
}

/// Pitch and intensity every `hop_ms` over 40 ms frames.
///
/// Sample times are frame starts. Unvoiced frames get pitch 0.
pub fn extract_trace(samples: &[f64], sr: u32, hop_ms: u32) -> ProsodyTrace {
    let mut trace = ProsodyTrace::new();
    let frame = (sr as usize * FRAME_MS as usize) / 1000;
    let hop = (sr as usize * hop_ms as usize) / 1000;
    if frame == 0 || hop == 0 || samples.len() < frame {
        return trace;
    }

    let n_frames = (samples.len() - frame) / hop + 1;
    for i in 0..n_frames {
        let start = i * hop;
        let window = &samples[start..start + frame];
        let pitch = estimate_f0(window, sr, F0_MIN, F0_MAX).unwrap_or(0.0);
        trace.insert(start as f64 / sr as f64, pitch, intensity_db(window));
    }
    trace
}

pub fn extract_from_wav(path: &Path) -> Result<ProsodyTrace> {
    let (samples, sr) = read_wav(path)?;
    log::debug!(
        "Extracting prosody from {} ({:.2}s at {} Hz)",
        path.display(),
        samples.len() as f64 / sr.max(1) as f64,
        sr
    );
    Ok(extract_trace(&samples, sr, HOP_MS))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f64, sr: u32, seconds: f64, amplitude: f64) -> Vec<f64> {
        let n = (sr as f64 * seconds) as usize;
        (0..n)
            .map(|i| amplitude * (i as f64 / sr as f64 * freq * std::f64::consts::TAU).sin())
            .collect()
    }

    #[test]
    fn test_compute_rms() {
        assert_eq!(compute_rms(&[]), 0.0);
        assert!((compute_rms(&[0.5; 100]) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_intensity_silence_is_zero() {
        assert_eq!(intensity_db(&[0.0; 640]), 0.0);
        // full-scale DC: 20*log10(1 / 2e-5) ≈ 93.98 dB
        assert!((intensity_db(&[1.0; 640]) - 93.979).abs() < 0.01);
    }

    #[test]
    fn test_estimate_f0_sine() {
        let samples = sine(200.0, 16000, 0.04, 0.5);
        let f0 = estimate_f0(&samples, 16000, F0_MIN, F0_MAX).unwrap();
        assert!((f0 - 200.0).abs() < 5.0, "got {}", f0);
    }

    #[test]
    fn test_estimate_f0_silence() {
        assert!(estimate_f0(&[0.0; 640], 16000, F0_MIN, F0_MAX).is_none());
        assert!(estimate_f0(&[], 16000, F0_MIN, F0_MAX).is_none());
    }

    #[test]
    fn test_extract_trace() {
        let mut samples = sine(150.0, 16000, 0.3, 0.5);
        samples.extend(vec![0.0; 16000 / 5]);
        let trace = extract_trace(&samples, 16000, HOP_MS);
        assert!(!trace.is_empty());

        let voiced: Vec<f64> = trace.samples_in(0.0, 0.2).map(|s| s.pitch).collect();
        assert!(voiced.iter().all(|p| (p - 150.0).abs() < 5.0), "{:?}", voiced);

        let silent: Vec<_> = trace.samples_in(0.35, 0.45).collect();
        assert!(!silent.is_empty());
        assert!(silent.iter().all(|s| s.pitch == 0.0 && s.intensity == 0.0));
    }

    #[test]
    fn test_extract_trace_short_input() {
        assert!(extract_trace(&[0.1; 10], 16000, HOP_MS).is_empty());
    }

    #[test]
    fn test_extract_from_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 16000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for s in sine(220.0, 16000, 0.2, 0.5) {
            let v = (s * 32767.0) as i16;
            writer.write_sample(v).unwrap();
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();

        let (samples, sr) = read_wav(&path).unwrap();
        assert_eq!(sr, 16000);
        assert_eq!(samples.len(), 3200);

        let trace = extract_from_wav(&path).unwrap();
        let first = trace.iter().next().unwrap();
        assert!((first.pitch - 220.0).abs() < 6.0, "got {}", first.pitch);
    }
}
