//! Clock-driven viseme playback.
//!
//! Each segment rises to its target weight over the first 75% of its
//! interval and decays back to zero over the rest. Several segments from one
//! or more tracks may be active at once; their weights are combined per
//! blendshape with `max` and written to a [`BlendShapeSink`] once per tick.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::config::{DecaySource, LipSyncConfig, Modulation, ProsodyFeature};
use crate::error::LipSyncError;
use crate::prosody::stats::{ratio, ProsodyRanges};
use crate::range::transform;
use crate::types::{BlendShapeTarget, PhonemeSegment};

use super::emotion::Emotion;
use super::sink::{BlendShapeSink, RecordingSink};

/// Share of a segment spent rising.
pub const RISE_FRACTION: f64 = 0.75;
pub const MAX_WEIGHT: f64 = 100.0;

/// Target weight of one blendshape for `segment`, after prosody modulation.
pub fn modulated_weight(
    base: f64,
    segment: &PhonemeSegment,
    ranges: Option<&ProsodyRanges>,
    config: &LipSyncConfig,
) -> f64 {
    let modulation = config.prosody.modulation;
    if modulation == Modulation::None {
        return base;
    }
    let feature = config.prosody.feature;
    let value = match feature {
        ProsodyFeature::Pitch => segment.mean_pitch,
        ProsodyFeature::Intensity => segment.mean_intensity,
    };
    let Some((ranges, category)) = ranges.and_then(|r| Some((r, r.category(segment.phoneme)?))) else {
        return base;
    };
    let range = category.feature(feature);
    if value == 0.0 || range.is_empty() {
        return base;
    }

    let weight = match modulation {
        Modulation::Range => {
            let mut mid = ranges.window_mean(segment.phoneme, feature, segment.midpoint());
            if mid == 0.0 {
                mid = range.mean;
            }
            if value < mid {
                transform(value, range.min, mid, 0.0, base)
            } else {
                transform(value, mid, range.max, base, MAX_WEIGHT)
            }
        }
        Modulation::Ratio => base * ratio(range.min, value, range.max),
        Modulation::None => base,
    };
    weight.clamp(0.0, MAX_WEIGHT)
}

/// A segment currently driving blendshapes.
struct ActiveSegment {
    index: usize,
    targets: Vec<BlendShapeTarget>,
}

struct Track {
    segments: Vec<PhonemeSegment>,
    cursor: usize,
    active: Vec<ActiveSegment>,
}

impl Track {
    fn new(mut segments: Vec<PhonemeSegment>) -> Self {
        segments.sort_by(|a, b| a.start.total_cmp(&b.start));
        Self {
            segments,
            cursor: 0,
            active: Vec::new(),
        }
    }

    fn reset(&mut self) {
        self.cursor = 0;
        self.active.clear();
        for seg in &mut self.segments {
            seg.reset_playback();
        }
    }
}

/// Weights written during one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub time: f64,
    pub weights: BTreeMap<usize, f64>,
}

pub struct PlaybackAnimator {
    config: LipSyncConfig,
    tracks: Vec<Track>,
    ranges: Option<ProsodyRanges>,
    emotion: Vec<BlendShapeTarget>,
    mapped: BTreeSet<usize>,
    last_time: Option<f64>,
}

impl PlaybackAnimator {
    /// Build an animator over one or more tracks.
    ///
    /// Fails if the configuration is invalid or a non-Rest phoneme in any
    /// track has no blendshape mapping.
    pub fn new(
        config: &LipSyncConfig,
        tracks: Vec<Vec<PhonemeSegment>>,
        ranges: Option<ProsodyRanges>,
        emotion: Emotion,
    ) -> Result<Self, LipSyncError> {
        config.validate()?;
        for seg in tracks.iter().flatten() {
            if !seg.phoneme.is_rest() && config.viseme(seg.phoneme).is_none() {
                return Err(LipSyncError::MissingViseme(seg.phoneme));
            }
        }

        let mapped: BTreeSet<usize> = config
            .visemes
            .values()
            .chain(config.emotions.values())
            .flatten()
            .map(|t| t.index)
            .collect();

        let emotion_targets = config.emotions.get(&emotion).cloned().unwrap_or_default();
        if emotion_targets.is_empty() && emotion != Emotion::Neutral {
            log::warn!("No blendshapes configured for emotion {}", emotion);
        }

        log::debug!(
            "Animator: {} tracks, {} segments, emotion {}",
            tracks.len(),
            tracks.iter().map(Vec::len).sum::<usize>(),
            emotion
        );

        Ok(Self {
            config: config.clone(),
            tracks: tracks.into_iter().map(Track::new).collect(),
            ranges,
            emotion: emotion_targets,
            mapped,
            last_time: None,
        })
    }

    /// Segments of a track with their current playback flags.
    pub fn segments(&self, track: usize) -> &[PhonemeSegment] {
        self.tracks
            .get(track)
            .map(|t| t.segments.as_slice())
            .unwrap_or(&[])
    }

    /// End of the last segment across all tracks.
    pub fn duration(&self) -> f64 {
        self.tracks
            .iter()
            .flat_map(|t| t.segments.iter())
            .map(|s| s.end)
            .fold(0.0, f64::max)
    }

    /// Number of segments currently animating.
    pub fn active_count(&self) -> usize {
        self.tracks.iter().map(|t| t.active.len()).sum()
    }

    /// Advance playback to `t` seconds and write the resulting weights.
    ///
    /// A clock earlier than the previous tick restarts playback.
    pub fn tick(&mut self, t: f64, sink: &mut dyn BlendShapeSink) {
        if self.last_time.is_some_and(|last| t < last) {
            log::debug!("Clock went back to {:.3}s, restarting playback", t);
            self.stop(sink);
        }
        self.last_time = Some(t);

        let easing = self.config.playback.easing;
        let decay_source = self.config.playback.decay_source;
        let mut weights: BTreeMap<usize, f64> = BTreeMap::new();

        for track in &mut self.tracks {
            while track.cursor < track.segments.len() && track.segments[track.cursor].start <= t {
                let index = track.cursor;
                track.cursor += 1;
                let seg = &track.segments[index];
                if seg.phoneme.is_rest() {
                    continue;
                }
                let targets = self
                    .config
                    .viseme(seg.phoneme)
                    .unwrap_or(&[])
                    .iter()
                    .map(|b| {
                        let w = modulated_weight(b.weight, seg, self.ranges.as_ref(), &self.config);
                        BlendShapeTarget::new(b.index, w)
                    })
                    .collect();
                log::trace!("{:.3}s: {} starts", t, seg.phoneme);
                track.active.push(ActiveSegment { index, targets });
            }

            for active in &mut track.active {
                let seg = &mut track.segments[active.index];
                let rise_end = seg.start + RISE_FRACTION * seg.duration();

                if !seg.apex {
                    let window = rise_end - seg.start;
                    let step = if window <= 0.0 {
                        1.0
                    } else {
                        easing.ease_in((t - seg.start) / window)
                    };
                    for target in &mut active.targets {
                        target.current_weight = target.weight * step;
                        combine(&mut weights, target.index, target.current_weight);
                    }
                    if t >= rise_end {
                        seg.apex = true;
                    }
                } else {
                    let window = seg.end - rise_end;
                    let step = if window <= 0.0 {
                        0.0
                    } else {
                        easing.ease_out((t - rise_end) / window)
                    };
                    for target in &active.targets {
                        let source = match decay_source {
                            DecaySource::Current => target.current_weight,
                            DecaySource::Target => target.weight,
                        };
                        combine(&mut weights, target.index, source * step);
                    }
                    if t >= seg.end {
                        seg.animation_ended = true;
                    }
                }
            }

            let segments = &track.segments;
            track
                .active
                .retain(|a| !segments[a.index].animation_ended);
        }

        let ramp = (t * self.config.emotion.blend_speed).clamp(0.0, 1.0);
        for target in &self.emotion {
            combine(&mut weights, target.index, target.weight * ramp);
        }

        for (index, weight) in weights {
            sink.set_blend_shape_weight(index, weight.clamp(0.0, MAX_WEIGHT));
        }
    }

    /// Rewind to the start and zero every mapped blendshape.
    pub fn stop(&mut self, sink: &mut dyn BlendShapeSink) {
        for track in &mut self.tracks {
            track.reset();
        }
        self.last_time = None;
        for &index in &self.mapped {
            sink.set_blend_shape_weight(index, 0.0);
        }
    }

    /// Play the whole timeline at a fixed rate, one frame per tick.
    ///
    /// Runs one tick past the last segment end so every viseme settles.
    /// A non-positive rate yields no frames.
    pub fn render(&mut self, tick_rate_hz: f64) -> Vec<Frame> {
        let mut sink = RecordingSink::new();
        self.stop(&mut sink);
        if !(tick_rate_hz > 0.0) {
            log::warn!("Cannot render at {} Hz", tick_rate_hz);
            return Vec::new();
        }

        let dt = 1.0 / tick_rate_hz;
        let last = self.duration() + dt;
        let n_ticks = (last / dt).ceil() as usize + 1;

        let mut frames = Vec::with_capacity(n_ticks);
        for i in 0..n_ticks {
            let t = i as f64 * dt;
            let mut sink = RecordingSink::new();
            self.tick(t, &mut sink);
            frames.push(Frame {
                time: t,
                weights: sink.weights,
            });
        }
        log::info!("Rendered {} frames at {} Hz", frames.len(), tick_rate_hz);
        frames
    }
}

fn combine(weights: &mut BTreeMap<usize, f64>, index: usize, weight: f64) {
    let entry = weights.entry(index).or_insert(weight);
    *entry = entry.max(weight);
}
