//! Time-indexed pitch/intensity samples and their file readers.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::analysis;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProsodySample {
    /// Seconds, at centisecond resolution
    pub time: f64,
    /// F0 in Hz, 0 when unvoiced
    pub pitch: f64,
    /// Loudness / intensity, 0 when silent
    pub intensity: f64,
}

/// Prosody samples keyed by centisecond.
#[derive(Debug, Clone, Default)]
pub struct ProsodyTrace {
    samples: BTreeMap<i64, (f64, f64)>,
}

fn centis(t: f64) -> i64 {
    (t * 100.0).round() as i64
}

impl ProsodyTrace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sample. A sample landing on an occupied centisecond is dropped
    /// and `false` returned.
    pub fn insert(&mut self, time: f64, pitch: f64, intensity: f64) -> bool {
        let key = centis(time);
        if self.samples.contains_key(&key) {
            return false;
        }
        self.samples.insert(key, (pitch, intensity));
        true
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    fn sample((key, (pitch, intensity)): (&i64, &(f64, f64))) -> ProsodySample {
        ProsodySample {
            time: *key as f64 / 100.0,
            pitch: *pitch,
            intensity: *intensity,
        }
    }

    /// All samples in time order.
    pub fn iter(&self) -> impl Iterator<Item = ProsodySample> + '_ {
        self.samples.iter().map(Self::sample)
    }

    /// Samples with `start <= t <= end`.
    pub fn samples_in(&self, start: f64, end: f64) -> impl Iterator<Item = ProsodySample> + '_ {
        let lo = centis(start);
        let hi = (centis(end) + 1).max(lo);
        self.samples.range(lo..hi).map(Self::sample)
    }
}

/// Parse OpenSmile CSV output (`name;frameTime;voicingProb;F0;loudness`).
///
/// The first line is a header. Pitch comes from F0, intensity from loudness.
pub fn parse_opensmile_csv(text: &str) -> ProsodyTrace {
    let mut trace = ProsodyTrace::new();
    for (n, line) in text.lines().enumerate().skip(1) {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(';').map(str::trim).collect();
        let parsed = (fields.len() >= 5)
            .then(|| {
                let time = fields[1].parse::<f64>().ok()?;
                let f0 = fields[3].parse::<f64>().ok()?;
                let loudness = fields[4].parse::<f64>().ok()?;
                Some((time, f0, loudness))
            })
            .flatten();
        match parsed {
            Some((time, f0, loudness)) => {
                trace.insert(time, f0, loudness);
            }
            None => log::debug!("Skipping prosody CSV line {}", n + 1),
        }
    }
    trace
}

/// Parse a whitespace table of `time pitch [intensity]` rows.
///
/// Rows whose time doesn't parse (headers) are skipped. Non-numeric values
/// such as Praat's `--undefined--` read as 0.
pub fn parse_pitch_table(text: &str) -> ProsodyTrace {
    let mut trace = ProsodyTrace::new();
    for (n, line) in text.lines().enumerate() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 2 {
            continue;
        }
        let Ok(time) = fields[0].parse::<f64>() else {
            log::debug!("Skipping pitch table line {}", n + 1);
            continue;
        };
        let value = |i: usize| {
            fields
                .get(i)
                .and_then(|v| v.parse::<f64>().ok())
                .filter(|v| v.is_finite())
                .unwrap_or(0.0)
        };
        trace.insert(time, value(1), value(2));
    }
    trace
}

/// Load a prosody trace, choosing the reader by file extension:
/// `.csv` OpenSmile, `.wav` in-process extraction, anything else a table.
pub fn read_trace(path: &Path) -> Result<ProsodyTrace> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let trace = if ext == "wav" {
        analysis::extract_from_wav(path)?
    } else {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read prosody file: {}", path.display()))?;
        if ext == "csv" {
            parse_opensmile_csv(&text)
        } else {
            parse_pitch_table(&text)
        }
    };

    log::info!("Read {} prosody samples from {}", trace.len(), path.display());
    Ok(trace)
}
