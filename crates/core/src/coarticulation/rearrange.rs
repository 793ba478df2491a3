//! Boundary widening so neighbouring visemes overlap during playback.

use crate::config::TimingConfig;
use crate::types::PhonemeSegment;

/// Widen every segment once.
///
/// Segments whose onset offset exceeds the threshold get a fixed symmetric
/// offset. Otherwise each boundary moves by the onset offset scaled by the
/// influence on that side. Start never goes below zero.
pub fn rearrange(segments: &mut [PhonemeSegment], timing: &TimingConfig) {
    for seg in segments.iter_mut() {
        let (back, forward) = if seg.onset_offset > timing.onset_threshold {
            let fixed = if seg.phoneme.is_lip_heavy() {
                timing.lip_heavy_offset
            } else {
                timing.default_offset
            };
            (fixed, fixed)
        } else {
            (
                seg.onset_offset * seg.backward_influence,
                seg.onset_offset * seg.forward_influence,
            )
        };

        seg.start = (seg.start - back).max(0.0);
        seg.end += forward;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phoneme::Phoneme;

    fn seg(start: f64, end: f64, phoneme: Phoneme, offset: f64) -> PhonemeSegment {
        let mut s = PhonemeSegment::new(start, end, phoneme);
        s.onset_offset = offset;
        s.backward_influence = 0.5;
        s.forward_influence = 0.25;
        s
    }

    #[test]
    fn test_fixed_offsets_above_threshold() {
        let timing = TimingConfig::default();
        let mut segments = vec![
            seg(1.0, 1.2, Phoneme::OHH, 0.1),
            seg(1.2, 1.4, Phoneme::AAA, 0.1),
        ];
        rearrange(&mut segments, &timing);
        assert!((segments[0].start - 0.85).abs() < 1e-9);
        assert!((segments[0].end - 1.35).abs() < 1e-9);
        assert!((segments[1].start - 1.08).abs() < 1e-9);
        assert!((segments[1].end - 1.52).abs() < 1e-9);
    }

    #[test]
    fn test_influence_scaled_offsets() {
        let timing = TimingConfig::default();
        let mut segments = vec![seg(1.0, 1.2, Phoneme::AAA, 0.04)];
        rearrange(&mut segments, &timing);
        assert!((segments[0].start - 0.98).abs() < 1e-9);
        assert!((segments[0].end - 1.21).abs() < 1e-9);
    }

    #[test]
    fn test_start_clamped_at_zero() {
        let timing = TimingConfig::default();
        let mut segments = vec![seg(0.05, 0.2, Phoneme::UUU, 0.2)];
        rearrange(&mut segments, &timing);
        assert_eq!(segments[0].start, 0.0);
    }

    #[test]
    fn test_never_collapses_segments() {
        let timing = TimingConfig::default();
        let offsets = [0.0, 0.01, 0.05, 0.051, 0.3];
        let phonemes = [Phoneme::AAA, Phoneme::SSH, Phoneme::T, Phoneme::Schwa];
        for &offset in &offsets {
            for &p in &phonemes {
                let mut segments = vec![seg(0.02, 0.03, p, offset)];
                rearrange(&mut segments, &timing);
                assert!(segments[0].end > segments[0].start, "{} @ {}", p, offset);
            }
        }
    }
}
