//! Directional influence between neighbouring visemes.

use crate::config::InfluenceSliders;
use crate::phoneme::Phoneme;
use crate::types::{InfluenceCategory, PhonemeSegment};

/// Lip-heavy visemes push this much harder on their neighbours.
pub const LIP_HEAVY_BOOST: f64 = 1.2;

/// Category of a phoneme relative to one neighbour.
pub fn classify(phoneme: Phoneme, neighbor: Phoneme) -> InfluenceCategory {
    match (
        phoneme.is_vowel(),
        phoneme.is_consonant(),
        neighbor.is_vowel(),
        neighbor.is_consonant(),
    ) {
        (true, _, _, true) => InfluenceCategory::VC,
        (true, _, true, _) => InfluenceCategory::VV,
        (_, true, _, true) => InfluenceCategory::CC,
        (_, true, true, _) => InfluenceCategory::CV,
        _ => InfluenceCategory::NA,
    }
}

/// Slider-weighted influence of `segment` in the given category.
pub fn influence_weight(
    category: InfluenceCategory,
    sliders: &InfluenceSliders,
    segment: &PhonemeSegment,
) -> f64 {
    let w = if segment.phoneme.is_lip_heavy() {
        LIP_HEAVY_BOOST
    } else {
        1.0
    };
    match category {
        InfluenceCategory::CC => sliders.consonant_over_consonant * w,
        InfluenceCategory::CV => sliders.consonant_over_vowel * w,
        InfluenceCategory::VC => sliders.vowel_over_consonant * w,
        InfluenceCategory::VV => sliders.vowel_over_vowel * w * segment.influence,
        InfluenceCategory::NA => segment.influence,
    }
}

/// Fill in backward/forward categories and influences for every segment.
pub fn resolve(segments: &mut [PhonemeSegment], sliders: &InfluenceSliders) {
    let phonemes: Vec<Phoneme> = segments.iter().map(|s| s.phoneme).collect();

    for (i, seg) in segments.iter_mut().enumerate() {
        let prev = i.checked_sub(1).map(|j| phonemes[j]);
        let next = phonemes.get(i + 1).copied();

        seg.influence_back = prev
            .map(|p| classify(seg.phoneme, p))
            .unwrap_or_default();
        seg.influence_forward = next
            .map(|p| classify(seg.phoneme, p))
            .unwrap_or_default();
        seg.backward_influence = influence_weight(seg.influence_back, sliders, seg);
        seg.forward_influence = influence_weight(seg.influence_forward, sliders, seg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(classify(Phoneme::AAA, Phoneme::T), InfluenceCategory::VC);
        assert_eq!(classify(Phoneme::AAA, Phoneme::IEE), InfluenceCategory::VV);
        assert_eq!(classify(Phoneme::T, Phoneme::SSS), InfluenceCategory::CC);
        assert_eq!(classify(Phoneme::T, Phoneme::AAA), InfluenceCategory::CV);
        assert_eq!(classify(Phoneme::T, Phoneme::Rest), InfluenceCategory::NA);
        assert_eq!(classify(Phoneme::Rest, Phoneme::AAA), InfluenceCategory::NA);
    }

    #[test]
    fn test_influence_weight() {
        let sliders = InfluenceSliders::default();
        let aaa = PhonemeSegment::new(0.0, 0.1, Phoneme::AAA);
        let ohh = PhonemeSegment::new(0.0, 0.1, Phoneme::OHH);
        let ssh = PhonemeSegment::new(0.0, 0.1, Phoneme::SSH);

        assert!((influence_weight(InfluenceCategory::VV, &sliders, &aaa) - 0.35).abs() < 1e-9);
        assert!((influence_weight(InfluenceCategory::VC, &sliders, &aaa) - 0.6).abs() < 1e-9);
        // lip-heavy boost
        assert!((influence_weight(InfluenceCategory::VC, &sliders, &ohh) - 0.72).abs() < 1e-9);
        assert!((influence_weight(InfluenceCategory::VV, &sliders, &ohh) - 0.5 * 1.2 * 1.0).abs() < 1e-9);
        assert!((influence_weight(InfluenceCategory::CC, &sliders, &ssh) - 0.36).abs() < 1e-9);
        assert!((influence_weight(InfluenceCategory::CV, &sliders, &ssh) - 0.48).abs() < 1e-9);
        assert_eq!(influence_weight(InfluenceCategory::NA, &sliders, &aaa), 0.7);
    }

    #[test]
    fn test_resolve_neighbours() {
        let sliders = InfluenceSliders::default();
        let mut segments = vec![
            PhonemeSegment::new(0.0, 0.1, Phoneme::MMM),
            PhonemeSegment::new(0.1, 0.3, Phoneme::AAA),
            PhonemeSegment::new(0.3, 0.4, Phoneme::T),
        ];
        resolve(&mut segments, &sliders);

        assert_eq!(segments[0].influence_back, InfluenceCategory::NA);
        assert_eq!(segments[0].backward_influence, 0.5);
        assert_eq!(segments[0].influence_forward, InfluenceCategory::CV);
        assert!((segments[0].forward_influence - 0.4).abs() < 1e-9);

        assert_eq!(segments[1].influence_back, InfluenceCategory::VC);
        assert_eq!(segments[1].influence_forward, InfluenceCategory::VC);

        assert_eq!(segments[2].influence_back, InfluenceCategory::CV);
        assert_eq!(segments[2].influence_forward, InfluenceCategory::NA);
        assert_eq!(segments[2].forward_influence, 0.5);
    }
}
