use serde::{Deserialize, Serialize};

use crate::phoneme::{map_label, Phoneme};
use crate::range::round_centis;

/// Neighbour-pair category used to resolve coarticulation influence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum InfluenceCategory {
    /// vowel over consonant
    VC,
    /// vowel over vowel
    VV,
    /// consonant over vowel
    CV,
    /// consonant over consonant
    CC,
    #[default]
    NA,
}

/// A single viseme interval on the timeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PhonemeSegment {
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    pub phoneme: Phoneme,
    /// Rise phase has completed (playback only)
    #[serde(skip)]
    pub apex: bool,
    /// Decay phase has completed (playback only)
    #[serde(skip)]
    pub animation_ended: bool,
    /// Class-derived influence, fixed at construction
    pub influence: f64,
    pub backward_influence: f64,
    pub forward_influence: f64,
    pub influence_back: InfluenceCategory,
    pub influence_forward: InfluenceCategory,
    /// Mean voiced pitch (Hz) over the segment, 0 when unset
    pub mean_pitch: f64,
    /// Mean voiced intensity (dB) over the segment, 0 when unset
    pub mean_intensity: f64,
    /// Mean per-phoneme duration of the containing word (seconds)
    pub onset_offset: f64,
}

impl PhonemeSegment {
    /// Create a segment. Times are rounded to centiseconds.
    pub fn new(start: f64, end: f64, phoneme: Phoneme) -> Self {
        Self {
            start: round_centis(start),
            end: round_centis(end),
            phoneme,
            apex: false,
            animation_ended: false,
            influence: phoneme.base_influence(),
            backward_influence: 0.0,
            forward_influence: 0.0,
            influence_back: InfluenceCategory::NA,
            influence_forward: InfluenceCategory::NA,
            mean_pitch: 0.0,
            mean_intensity: 0.0,
            onset_offset: 0.0,
        }
    }

    /// Create a segment from a raw aligner label.
    pub fn from_label(start: f64, end: f64, label: &str) -> Self {
        Self::new(start, end, map_label(label))
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    pub fn midpoint(&self) -> f64 {
        (self.start + self.end) / 2.0
    }

    /// Clear the transient playback flags.
    pub fn reset_playback(&mut self) {
        self.apex = false;
        self.animation_ended = false;
    }
}

/// Half a centisecond.
const CONTAINS_TOLERANCE: f64 = 0.005;

/// Word with timing from the aligner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WordSpan {
    pub text: String,
    pub start: f64,
    pub end: f64,
    /// Canonical pronunciation, when the aligner supplies one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pronunciation: Option<String>,
    /// Number of aligned phonemes inside the word
    #[serde(default)]
    pub phoneme_count: usize,
}

impl WordSpan {
    pub fn new(start: f64, end: f64, text: &str) -> Self {
        Self {
            text: text.to_string(),
            start,
            end,
            pronunciation: None,
            phoneme_count: 0,
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// True if `[start, end]` lies inside this word, allowing for
    /// centisecond rounding of segment times.
    pub fn contains(&self, start: f64, end: f64) -> bool {
        self.start <= start + CONTAINS_TOLERANCE && self.end + CONTAINS_TOLERANCE >= end
    }
}

/// Parsed aligner output: words plus raw phoneme segments in time order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlignmentResult {
    pub words: Vec<WordSpan>,
    pub phonemes: Vec<PhonemeSegment>,
}

impl AlignmentResult {
    /// Count the phonemes contained in each word.
    pub fn count_word_phonemes(&mut self) {
        for word in &mut self.words {
            word.phoneme_count = self
                .phonemes
                .iter()
                .filter(|p| word.contains(p.start, p.end))
                .count();
        }
    }

    /// Full transcript, words joined by spaces.
    pub fn transcript(&self) -> String {
        self.words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// One blendshape driven by a viseme or emotion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BlendShapeTarget {
    pub index: usize,
    /// Target weight in [0, 100]
    pub weight: f64,
    /// Last weight written during the rise phase
    #[serde(skip)]
    pub current_weight: f64,
}

impl BlendShapeTarget {
    pub fn new(index: usize, weight: f64) -> Self {
        Self {
            index,
            weight,
            current_weight: 0.0,
        }
    }
}
