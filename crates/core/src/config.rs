//! Lip-sync configuration: influence sliders, timing constants, prosody and
//! playback options, plus the viseme / diphone / emotion mappings.
//!
//! Loaded from JSON. Every section has defaults, so a partial file works.
//! [`LipSyncConfig::validate`] must pass before the configuration drives a
//! pipeline or an animator; [`LipSyncConfig::load`] runs it for you.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::animation::emotion::Emotion;
use crate::error::LipSyncError;
use crate::phoneme::Phoneme;
use crate::types::BlendShapeTarget;

/// User-tunable blend influence sliders, each in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InfluenceSliders {
    pub vowel_over_vowel: f64,
    pub vowel_over_consonant: f64,
    pub consonant_over_vowel: f64,
    pub consonant_over_consonant: f64,
}

impl Default for InfluenceSliders {
    fn default() -> Self {
        Self {
            vowel_over_vowel: 0.5,
            vowel_over_consonant: 0.6,
            consonant_over_vowel: 0.4,
            consonant_over_consonant: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Onset offsets above this (seconds) use the fixed widening offsets
    pub onset_threshold: f64,
    /// Max gap (seconds) across which identical phonemes merge
    pub duplicate_gap: f64,
    /// Fixed widening for lip-heavy visemes (seconds)
    pub lip_heavy_offset: f64,
    /// Fixed widening for all other visemes (seconds)
    pub default_offset: f64,
    /// Reduce very short vowels to Schwa and drop short h/t releases
    pub reduce_short_phonemes: bool,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            onset_threshold: 0.05,
            duplicate_gap: 1.0,
            lip_heavy_offset: 0.15,
            default_offset: 0.12,
            reduce_short_phonemes: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoarticulationConfig {
    /// Animate alveolars on their own track and substitute them in the main one
    pub alveolar_layer: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modulation {
    /// Static viseme weights
    #[default]
    None,
    /// Asymmetric remap around the category's window mean
    Range,
    /// Scale by the clamped position within the category range
    Ratio,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProsodyFeature {
    #[default]
    Pitch,
    Intensity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProsodyConfig {
    /// Width of the statistics window in milliseconds
    pub window_ms: u32,
    pub modulation: Modulation,
    pub feature: ProsodyFeature,
}

impl Default for ProsodyConfig {
    fn default() -> Self {
        Self {
            window_ms: 1000,
            modulation: Modulation::None,
            feature: ProsodyFeature::Pitch,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Easing {
    #[default]
    Quadratic,
    Exponential,
}

/// Which weight the decay phase scales down from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecaySource {
    /// The weight the rise phase actually reached
    #[default]
    Current,
    /// The configured target weight
    Target,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub easing: Easing,
    pub decay_source: DecaySource,
    /// Fixed simulation rate used when rendering offline
    pub tick_rate_hz: f64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            easing: Easing::Quadratic,
            decay_source: DecaySource::Current,
            tick_rate_hz: 50.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmotionConfig {
    /// Pick the emotion from the voiced pitch median
    pub from_pitch: bool,
    /// Emotion used when `from_pitch` is off
    pub default: Emotion,
    /// Ramp speed of emotion blendshapes (1/s)
    pub blend_speed: f64,
}

impl Default for EmotionConfig {
    fn default() -> Self {
        Self {
            from_pitch: false,
            default: Emotion::Neutral,
            blend_speed: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LipSyncConfig {
    pub sliders: InfluenceSliders,
    pub timing: TimingConfig,
    pub coarticulation: CoarticulationConfig,
    pub prosody: ProsodyConfig,
    pub playback: PlaybackConfig,
    pub emotion: EmotionConfig,
    pub visemes: BTreeMap<Phoneme, Vec<BlendShapeTarget>>,
    pub diphones: BTreeMap<Phoneme, [Phoneme; 2]>,
    pub emotions: BTreeMap<Emotion, Vec<BlendShapeTarget>>,
}

impl Default for LipSyncConfig {
    fn default() -> Self {
        Self {
            sliders: InfluenceSliders::default(),
            timing: TimingConfig::default(),
            coarticulation: CoarticulationConfig::default(),
            prosody: ProsodyConfig::default(),
            playback: PlaybackConfig::default(),
            emotion: EmotionConfig::default(),
            visemes: default_visemes(),
            diphones: default_diphones(),
            emotions: BTreeMap::new(),
        }
    }
}

/// One blendshape per playable viseme, at full weight, indexed in catalog order.
pub fn default_visemes() -> BTreeMap<Phoneme, Vec<BlendShapeTarget>> {
    Phoneme::ALL
        .iter()
        .enumerate()
        .filter(|(_, p)| !p.is_diphone() && !p.is_rest())
        .map(|(i, p)| (*p, vec![BlendShapeTarget::new(i, 100.0)]))
        .collect()
}

pub fn default_diphones() -> BTreeMap<Phoneme, [Phoneme; 2]> {
    use Phoneme::*;
    [
        (DiphoneAI, [AHH, IEE]),
        (DiphoneAU, [AHH, UUU]),
        (DiphoneOI, [OHH, IEE]),
        (DiphoneOU, [OHH, UUU]),
        (DiphoneEI, [EHH, IEE]),
        (DiphoneX, [GK, SSS]),
        (DiphoneIA, [IEE, Schwa]),
        (DiphoneUA, [UUU, Schwa]),
        (DiphoneEA, [EHH, Schwa]),
    ]
    .into_iter()
    .collect()
}

fn check_unit(field: &'static str, value: f64) -> Result<(), LipSyncError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(LipSyncError::invalid(field, format!("{} is outside [0, 1]", value)));
    }
    Ok(())
}

fn check_non_negative(field: &'static str, value: f64) -> Result<(), LipSyncError> {
    if !value.is_finite() || value < 0.0 {
        return Err(LipSyncError::invalid(field, format!("{} must be >= 0", value)));
    }
    Ok(())
}

fn check_targets(field: &'static str, targets: &[BlendShapeTarget]) -> Result<(), LipSyncError> {
    for t in targets {
        if !(0.0..=100.0).contains(&t.weight) {
            return Err(LipSyncError::invalid(
                field,
                format!("blendshape {} weight {} is outside [0, 100]", t.index, t.weight),
            ));
        }
    }
    Ok(())
}

impl LipSyncConfig {
    /// Read a JSON configuration file and validate it.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: LipSyncConfig = serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config: {}", path.display()))?;
        log::debug!(
            "Loaded config {}: {} visemes, {} diphones, {} emotions",
            path.display(),
            config.visemes.len(),
            config.diphones.len(),
            config.emotions.len()
        );
        Ok(config)
    }

    /// Write the configuration as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    /// Explicit validation pass, run once before any playback.
    pub fn validate(&self) -> Result<(), LipSyncError> {
        let s = &self.sliders;
        check_unit("sliders.vowel_over_vowel", s.vowel_over_vowel)?;
        check_unit("sliders.vowel_over_consonant", s.vowel_over_consonant)?;
        check_unit("sliders.consonant_over_vowel", s.consonant_over_vowel)?;
        check_unit("sliders.consonant_over_consonant", s.consonant_over_consonant)?;

        let t = &self.timing;
        check_non_negative("timing.onset_threshold", t.onset_threshold)?;
        check_non_negative("timing.duplicate_gap", t.duplicate_gap)?;
        check_non_negative("timing.lip_heavy_offset", t.lip_heavy_offset)?;
        check_non_negative("timing.default_offset", t.default_offset)?;

        if self.prosody.window_ms == 0 {
            return Err(LipSyncError::invalid("prosody.window_ms", "must be > 0"));
        }
        if !(self.playback.tick_rate_hz > 0.0) {
            return Err(LipSyncError::invalid("playback.tick_rate_hz", "must be > 0"));
        }
        check_non_negative("emotion.blend_speed", self.emotion.blend_speed)?;

        for (phoneme, targets) in &self.visemes {
            if phoneme.is_diphone() {
                return Err(LipSyncError::invalid(
                    "visemes",
                    format!("{} is a diphone and is never played directly", phoneme),
                ));
            }
            check_targets("visemes", targets)?;
        }
        for targets in self.emotions.values() {
            check_targets("emotions", targets)?;
        }

        for (diphone, pair) in &self.diphones {
            if !diphone.is_diphone() {
                return Err(LipSyncError::invalid(
                    "diphones",
                    format!("{} is not a diphone", diphone),
                ));
            }
            if pair.iter().any(|p| p.is_diphone() || p.is_rest()) {
                return Err(LipSyncError::invalid(
                    "diphones",
                    format!("{} must map to two playable phonemes", diphone),
                ));
            }
        }
        Ok(())
    }

    /// Blendshapes for a phoneme, if mapped.
    pub fn viseme(&self, phoneme: Phoneme) -> Option<&[BlendShapeTarget]> {
        self.visemes.get(&phoneme).map(|v| v.as_slice())
    }
}
