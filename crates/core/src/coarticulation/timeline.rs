//! Interval timeline passes: diphone expansion, duplicate merging, word onset
//! offsets and retargeting onto reference word timings.

use std::collections::BTreeMap;

use crate::error::LipSyncError;
use crate::phoneme::Phoneme;
use crate::range::transform;
use crate::types::{PhonemeSegment, WordSpan};

/// Share of a diphone's duration given to its first half before a consonant.
pub const CONSONANT_SPLIT: f64 = 0.75;
/// Share given to the first half otherwise.
pub const DEFAULT_SPLIT: f64 = 0.5;
/// Onset offset for segments in words with no counted phonemes (seconds).
pub const EMPTY_WORD_OFFSET: f64 = 0.12;

/// Split every diphone segment into its two configured phonemes.
///
/// The first phoneme gets 75% of the duration when the next segment is a
/// consonant, half otherwise (including a diphone at the end). Other
/// segments pass through unchanged.
pub fn expand_diphones(
    segments: &[PhonemeSegment],
    pairs: &BTreeMap<Phoneme, [Phoneme; 2]>,
) -> Result<Vec<PhonemeSegment>, LipSyncError> {
    let mut out = Vec::with_capacity(segments.len() + segments.len() / 4);

    for (i, seg) in segments.iter().enumerate() {
        if !seg.phoneme.is_diphone() {
            out.push(seg.clone());
            continue;
        }

        let [first, second] = *pairs
            .get(&seg.phoneme)
            .ok_or(LipSyncError::MissingDiphonePair(seg.phoneme))?;

        let before_consonant = segments
            .get(i + 1)
            .is_some_and(|next| next.phoneme.is_consonant());
        let weight = if before_consonant {
            CONSONANT_SPLIT
        } else {
            DEFAULT_SPLIT
        };

        let split = seg.start + seg.duration() * weight;
        out.push(PhonemeSegment::new(seg.start, split, first));
        out.push(PhonemeSegment::new(split, seg.end, second));
    }

    Ok(out)
}

/// Drop degenerate segments and merge runs of the same phoneme.
///
/// A segment extends the previous kept one when both share a phoneme and the
/// gap between them is at most `gap_threshold` seconds.
pub fn remove_duplicates(segments: &[PhonemeSegment], gap_threshold: f64) -> Vec<PhonemeSegment> {
    segments
        .iter()
        .filter(|s| s.end > s.start)
        .fold(Vec::with_capacity(segments.len()), |mut kept, seg| {
            match kept.last_mut() {
                Some(last)
                    if last.phoneme == seg.phoneme && seg.start - last.end <= gap_threshold =>
                {
                    last.end = last.end.max(seg.end);
                }
                _ => kept.push(seg.clone()),
            }
            kept
        })
}

/// Set each segment's onset offset from the mean phoneme duration of the
/// word containing it. Segments outside every word keep their offset.
pub fn assign_onset_offsets(segments: &mut [PhonemeSegment], words: &[WordSpan]) {
    for seg in segments.iter_mut() {
        if let Some(word) = words.iter().find(|w| w.contains(seg.start, seg.end)) {
            seg.onset_offset = if word.phoneme_count == 0 {
                EMPTY_WORD_OFFSET
            } else {
                word.duration() / word.phoneme_count as f64
            };
        }
    }
}

/// Move a synthesized timeline onto the word timings of another recording.
///
/// Rest segments are dropped. Each remaining segment inside synthesized word
/// `i` is remapped linearly into reference word `i`.
pub fn retarget_to_words(
    segments: &[PhonemeSegment],
    synth_words: &[WordSpan],
    reference_words: &[WordSpan],
) -> Vec<PhonemeSegment> {
    if synth_words.len() != reference_words.len() {
        log::warn!(
            "Word count mismatch: {} synthesized vs {} reference",
            synth_words.len(),
            reference_words.len()
        );
    }

    segments
        .iter()
        .filter(|s| !s.phoneme.is_rest())
        .map(|seg| {
            let mut seg = seg.clone();
            let index = synth_words
                .iter()
                .position(|w| w.contains(seg.start, seg.end));
            if let Some((from, to)) = index.and_then(|i| Some((&synth_words[i], reference_words.get(i)?))) {
                seg.start = transform(seg.start, from.start, from.end, to.start, to.end);
                seg.end = transform(seg.end, from.start, from.end, to.start, to.end);
            }
            seg
        })
        .collect()
}
