//! Alveolar layer: tongue visemes animated on their own track.
//!
//! R, L, N and G/K barely shape the lips, so the main track borrows the
//! shape of a neighbouring vowel while the alveolar itself plays on a
//! secondary track on top.

use crate::phoneme::Phoneme;
use crate::types::PhonemeSegment;

use super::timeline::remove_duplicates;

/// Split alveolar segments out of `segments`.
///
/// Returns `(main, alveolar)`. In `main` every alveolar takes the phoneme of
/// the previous segment if that is a vowel (after its own substitution), else of the next segment if that
/// is a vowel, else Schwa. Substituted runs are merged again.
pub fn split_alveolars(
    segments: &[PhonemeSegment],
    gap_threshold: f64,
) -> (Vec<PhonemeSegment>, Vec<PhonemeSegment>) {
    let alveolar: Vec<PhonemeSegment> = segments
        .iter()
        .filter(|s| s.phoneme.is_alveolar())
        .cloned()
        .collect();

    let mut main = segments.to_vec();
    for i in 0..main.len() {
        if !main[i].phoneme.is_alveolar() {
            continue;
        }
        // Earlier alveolars in a run already carry their donor vowel.
        let prev = i.checked_sub(1).map(|j| &main[j]);
        let next = segments.get(i + 1);
        let donor = prev
            .filter(|p| p.phoneme.is_vowel())
            .or_else(|| next.filter(|n| n.phoneme.is_vowel()))
            .map(|d| (d.phoneme, d.influence, d.mean_pitch, d.mean_intensity));

        let target = &mut main[i];
        match donor {
            Some((phoneme, influence, mean_pitch, mean_intensity)) => {
                target.phoneme = phoneme;
                target.influence = influence;
                target.mean_pitch = mean_pitch;
                target.mean_intensity = mean_intensity;
            }
            None => {
                target.phoneme = Phoneme::Schwa;
                target.influence = Phoneme::Schwa.base_influence();
            }
        }
    }

    let main = remove_duplicates(&main, gap_threshold);
    log::debug!(
        "Alveolar layer: {} main segments, {} alveolar segments",
        main.len(),
        alveolar.len()
    );
    (main, alveolar)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(start: f64, end: f64, phoneme: Phoneme) -> PhonemeSegment {
        PhonemeSegment::new(start, end, phoneme)
    }

    #[test]
    fn test_substitute_with_previous_vowel() {
        let mut vowel = seg(0.0, 0.2, Phoneme::AAA);
        vowel.mean_pitch = 140.0;
        let input = vec![vowel, seg(0.2, 0.3, Phoneme::L), seg(0.3, 0.4, Phoneme::T)];
        let (main, alveolar) = split_alveolars(&input, 1.0);

        // L becomes AAA and merges into the vowel
        assert_eq!(main.len(), 2);
        assert_eq!(main[0].phoneme, Phoneme::AAA);
        assert_eq!(main[0].end, 0.3);
        assert_eq!(main[1].phoneme, Phoneme::T);

        assert_eq!(alveolar.len(), 1);
        assert_eq!(alveolar[0].phoneme, Phoneme::L);
        assert_eq!(alveolar[0].start, 0.2);
    }

    #[test]
    fn test_substitute_with_next_vowel() {
        let input = vec![
            seg(0.0, 0.1, Phoneme::T),
            seg(0.1, 0.2, Phoneme::N),
            seg(0.2, 0.4, Phoneme::OHH),
        ];
        let (main, _) = split_alveolars(&input, 1.0);
        assert_eq!(main[1].phoneme, Phoneme::OHH);
        assert_eq!(main[1].influence, 1.0);
        assert_eq!(main.len(), 2);
    }

    #[test]
    fn test_substitute_with_schwa() {
        let input = vec![
            seg(0.0, 0.1, Phoneme::SSS),
            seg(0.1, 0.2, Phoneme::RRR),
            seg(0.2, 0.3, Phoneme::T),
        ];
        let (main, alveolar) = split_alveolars(&input, 1.0);
        assert_eq!(main[1].phoneme, Phoneme::Schwa);
        assert_eq!(main[1].influence, 1.0);
        assert_eq!(alveolar[0].phoneme, Phoneme::RRR);
    }

    #[test]
    fn test_consecutive_alveolars_follow_previous_vowel() {
        let input = vec![
            seg(0.0, 0.2, Phoneme::AAA),
            seg(0.2, 0.3, Phoneme::L),
            seg(0.3, 0.4, Phoneme::N),
            seg(0.4, 0.5, Phoneme::T),
        ];
        let (main, alveolar) = split_alveolars(&input, 1.0);
        assert_eq!(main.len(), 2);
        assert_eq!(main[0].phoneme, Phoneme::AAA);
        assert_eq!(main[0].end, 0.4);
        assert_eq!(main[1].phoneme, Phoneme::T);
        assert_eq!(alveolar.len(), 2);
    }

    #[test]
    fn test_consecutive_alveolars_without_previous_vowel() {
        let input = vec![
            seg(0.0, 0.1, Phoneme::SSS),
            seg(0.1, 0.2, Phoneme::L),
            seg(0.2, 0.3, Phoneme::N),
            seg(0.3, 0.5, Phoneme::AAA),
        ];
        let (main, _) = split_alveolars(&input, 1.0);
        // L has no vowel on either side; N then follows the Schwa written into L
        let phonemes: Vec<Phoneme> = main.iter().map(|s| s.phoneme).collect();
        assert_eq!(phonemes, vec![Phoneme::SSS, Phoneme::Schwa, Phoneme::AAA]);
        assert_eq!(main[1].end, 0.3);
    }

    #[test]
    fn test_no_alveolars_is_identity() {
        let input = vec![seg(0.0, 0.1, Phoneme::MMM), seg(0.1, 0.3, Phoneme::AAA)];
        let (main, alveolar) = split_alveolars(&input, 1.0);
        assert_eq!(main, input);
        assert!(alveolar.is_empty());
    }
}
