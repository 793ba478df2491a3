//! Per-category prosody statistics over a phoneme timeline.
//!
//! Vowels and consonants are tracked separately. For each category and
//! feature we keep the global min/mean/max of voiced samples plus the mean
//! inside fixed-width time windows, used to modulate viseme weights.

use serde::{Deserialize, Serialize};

use crate::config::ProsodyFeature;
use crate::phoneme::Phoneme;
use crate::range::transform;
use crate::types::PhonemeSegment;

use super::trace::{ProsodySample, ProsodyTrace};

/// Lower bound of [`ratio`].
pub const MIN_RATIO: f64 = 0.2;

/// Mean of the non-zero values, with voiced and total counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureMean {
    pub mean: f64,
    pub voiced: usize,
    pub total: usize,
}

pub fn feature_mean(values: impl IntoIterator<Item = f64>) -> FeatureMean {
    let mut sum = 0.0;
    let mut out = FeatureMean::default();
    for v in values {
        out.total += 1;
        if v != 0.0 {
            sum += v;
            out.voiced += 1;
        }
    }
    if out.voiced > 0 {
        out.mean = sum / out.voiced as f64;
    }
    out
}

/// Position of `mean` within `[min, max]`, clamped to `[0.2, 1]`.
pub fn ratio(min: f64, mean: f64, max: f64) -> f64 {
    transform(mean, min, max, 0.0, 1.0).clamp(MIN_RATIO, 1.0)
}

/// Median, 0 for no values.
pub fn median(values: &mut [f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureRange {
    pub min: f64,
    pub mean: f64,
    pub max: f64,
    /// Mean per window, indexed by `floor(t * 1000 / window_ms)`
    pub mean_per_window: Vec<f64>,
}

impl FeatureRange {
    /// True when no voiced sample contributed.
    pub fn is_empty(&self) -> bool {
        self.max == 0.0 && self.min == 0.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryRanges {
    pub pitch: FeatureRange,
    pub intensity: FeatureRange,
}

impl CategoryRanges {
    pub fn feature(&self, feature: ProsodyFeature) -> &FeatureRange {
        match feature {
            ProsodyFeature::Pitch => &self.pitch,
            ProsodyFeature::Intensity => &self.intensity,
        }
    }
}

/// Statistics for a whole timeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProsodyRanges {
    pub window_ms: u32,
    pub vowel: CategoryRanges,
    pub consonant: CategoryRanges,
    /// Median of every voiced pitch sample in the trace
    pub pitch_median: f64,
}

impl ProsodyRanges {
    pub fn window_index(&self, t: f64) -> usize {
        window_index(t, self.window_ms)
    }

    /// Ranges of the phoneme's category, if it has one.
    pub fn category(&self, phoneme: Phoneme) -> Option<&CategoryRanges> {
        if phoneme.is_vowel() {
            Some(&self.vowel)
        } else if phoneme.is_voiced_category() {
            Some(&self.consonant)
        } else {
            None
        }
    }

    /// Window mean of a feature for the category of `phoneme` at time `t`.
    /// Missing windows read as 0.
    pub fn window_mean(&self, phoneme: Phoneme, feature: ProsodyFeature, t: f64) -> f64 {
        self.category(phoneme)
            .and_then(|c| c.feature(feature).mean_per_window.get(self.window_index(t)).copied())
            .unwrap_or(0.0)
    }
}

fn window_index(t: f64, window_ms: u32) -> usize {
    if t <= 0.0 || window_ms == 0 {
        return 0;
    }
    (t * 1000.0 / window_ms as f64).floor() as usize
}

/// Accumulates voiced samples of one category/feature.
#[derive(Default)]
struct Accumulator {
    min: f64,
    max: f64,
    sum: f64,
    count: usize,
    windows: Vec<(f64, usize)>,
}

impl Accumulator {
    fn add(&mut self, t: f64, value: f64, window_ms: u32) {
        if value == 0.0 {
            return;
        }
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.sum += value;
        self.count += 1;

        let w = window_index(t, window_ms);
        if self.windows.len() <= w {
            self.windows.resize(w + 1, (0.0, 0));
        }
        self.windows[w].0 += value;
        self.windows[w].1 += 1;
    }

    fn finish(self) -> FeatureRange {
        if self.count == 0 {
            return FeatureRange::default();
        }
        FeatureRange {
            min: self.min,
            mean: self.sum / self.count as f64,
            max: self.max,
            mean_per_window: self
                .windows
                .into_iter()
                .map(|(sum, n)| if n == 0 { 0.0 } else { sum / n as f64 })
                .collect(),
        }
    }
}

#[derive(Default)]
struct CategoryAccumulator {
    pitch: Accumulator,
    intensity: Accumulator,
}

impl CategoryAccumulator {
    fn finish(self) -> CategoryRanges {
        CategoryRanges {
            pitch: self.pitch.finish(),
            intensity: self.intensity.finish(),
        }
    }
}

/// Set a segment's mean pitch and intensity from its samples and return them.
pub fn assign_segment_means(seg: &mut PhonemeSegment, trace: &ProsodyTrace) -> Vec<ProsodySample> {
    let samples: Vec<ProsodySample> = trace.samples_in(seg.start, seg.end).collect();
    seg.mean_pitch = feature_mean(samples.iter().map(|s| s.pitch)).mean;
    seg.mean_intensity = feature_mean(samples.iter().map(|s| s.intensity)).mean;
    samples
}

/// Compute segment means and category ranges.
///
/// Sets `mean_pitch` / `mean_intensity` on every vowel and consonant segment
/// from the samples with `start <= t <= end`.
pub fn compute(segments: &mut [PhonemeSegment], trace: &ProsodyTrace, window_ms: u32) -> ProsodyRanges {
    let mut vowel = CategoryAccumulator::default();
    let mut consonant = CategoryAccumulator::default();

    for seg in segments.iter_mut() {
        let acc = if seg.phoneme.is_vowel() {
            &mut vowel
        } else if seg.phoneme.is_voiced_category() {
            &mut consonant
        } else {
            continue;
        };

        let samples = assign_segment_means(seg, trace);
        for s in &samples {
            acc.pitch.add(s.time, s.pitch, window_ms);
            acc.intensity.add(s.time, s.intensity, window_ms);
        }
    }

    let mut voiced: Vec<f64> = trace.iter().map(|s| s.pitch).filter(|p| *p != 0.0).collect();

    let ranges = ProsodyRanges {
        window_ms,
        vowel: vowel.finish(),
        consonant: consonant.finish(),
        pitch_median: median(&mut voiced),
    };
    log::info!(
        "Prosody: vowel pitch {:.1}-{:.1} Hz, consonant pitch {:.1}-{:.1} Hz, median {:.1} Hz",
        ranges.vowel.pitch.min,
        ranges.vowel.pitch.max,
        ranges.consonant.pitch.min,
        ranges.consonant.pitch.max,
        ranges.pitch_median
    );
    ranges
}
