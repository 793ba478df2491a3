//! Batch pipeline: alignment in, playable session out.
//!
//! Stages, in order: diphone expansion, optional retargeting onto reference
//! word timings, duplicate merge, influence resolution, optional alveolar
//! split, word onset offsets, boundary rearrangement, prosody statistics and
//! emotion selection.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::alignment;
use crate::animation::{select_emotion, Emotion, PlaybackAnimator};
use crate::coarticulation::{
    assign_onset_offsets, expand_diphones, influence, rearrange, remove_duplicates,
    retarget_to_words, split_alveolars,
};
use crate::config::LipSyncConfig;
use crate::error::LipSyncError;
use crate::prosody::{self, stats, ProsodyRanges, ProsodyTrace};
use crate::types::{AlignmentResult, PhonemeSegment, WordSpan};

/// Everything playback needs, ready to serialize.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    pub words: Vec<WordSpan>,
    /// Main viseme track
    pub timeline: Vec<PhonemeSegment>,
    /// Alveolar track, when the alveolar layer is enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alveolar_track: Option<Vec<PhonemeSegment>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ranges: Option<ProsodyRanges>,
    pub emotion: Emotion,
}

impl Session {
    /// Build an animator over the main and alveolar tracks.
    pub fn animator(&self, config: &LipSyncConfig) -> Result<PlaybackAnimator, LipSyncError> {
        let mut tracks = vec![self.timeline.clone()];
        if let Some(alveolar) = &self.alveolar_track {
            tracks.push(alveolar.clone());
        }
        PlaybackAnimator::new(config, tracks, self.ranges.clone(), self.emotion)
    }
}

/// Reference words inheriting the phoneme counts of the synthesized words.
fn reference_with_counts(synth: &[WordSpan], reference: &[WordSpan]) -> Vec<WordSpan> {
    reference
        .iter()
        .enumerate()
        .map(|(i, w)| {
            let mut w = w.clone();
            w.phoneme_count = synth.get(i).map(|s| s.phoneme_count).unwrap_or(0);
            w
        })
        .collect()
}

/// Run every stage over parsed alignment data.
pub fn build_session(
    alignment: AlignmentResult,
    trace: Option<&ProsodyTrace>,
    reference_words: Option<&[WordSpan]>,
    config: &LipSyncConfig,
) -> Result<Session, LipSyncError> {
    config.validate()?;
    log::debug!("Transcript: {}", alignment.transcript());
    let AlignmentResult { words, phonemes } = alignment;

    let mut segments = expand_diphones(&phonemes, &config.diphones)?;
    log::debug!("Expanded {} raw segments to {}", phonemes.len(), segments.len());

    let words = match reference_words {
        Some(reference) => {
            segments = retarget_to_words(&segments, &words, reference);
            log::info!("Retargeted timeline onto {} reference words", reference.len());
            reference_with_counts(&words, reference)
        }
        None => words,
    };

    let mut timeline = remove_duplicates(&segments, config.timing.duplicate_gap);
    influence::resolve(&mut timeline, &config.sliders);

    let mut alveolar_track = None;
    if config.coarticulation.alveolar_layer {
        let (main, alveolar) = split_alveolars(&timeline, config.timing.duplicate_gap);
        timeline = main;
        alveolar_track = Some(alveolar);
    }

    for track in std::iter::once(&mut timeline).chain(alveolar_track.as_mut()) {
        assign_onset_offsets(track, &words);
        rearrange(track, &config.timing);
        // Fixed word offsets can pull a segment ahead of its predecessors.
        track.sort_by(|a, b| a.start.total_cmp(&b.start));
    }

    let ranges = trace.map(|trace| {
        if let Some(alveolar) = alveolar_track.as_mut() {
            for seg in alveolar.iter_mut() {
                stats::assign_segment_means(seg, trace);
            }
        }
        prosody::compute(&mut timeline, trace, config.prosody.window_ms)
    });

    let emotion = if config.emotion.from_pitch {
        select_emotion(ranges.as_ref().map(|r| r.pitch_median).unwrap_or(0.0))
    } else {
        config.emotion.default
    };

    log::info!(
        "Session: {} words, {} segments{}, emotion {}",
        words.len(),
        timeline.len(),
        alveolar_track
            .as_ref()
            .map(|a| format!(" + {} alveolar", a.len()))
            .unwrap_or_default(),
        emotion
    );

    Ok(Session {
        words,
        timeline,
        alveolar_track,
        ranges,
        emotion,
    })
}

/// File-level inputs of the pipeline.
#[derive(Debug, Clone, Default)]
pub struct PipelineInputs<'a> {
    pub alignment: Option<&'a Path>,
    /// `auto`, `cerevoice` or `textgrid`
    pub format: &'a str,
    pub prosody: Option<&'a Path>,
    pub reference_words: Option<&'a Path>,
}

/// Read the input files and run the pipeline.
pub fn run(inputs: &PipelineInputs<'_>, config: &LipSyncConfig) -> Result<Session> {
    let alignment_path = inputs.alignment.context("No alignment file given")?;
    let format = if inputs.format.is_empty() { "auto" } else { inputs.format };

    let parsed = alignment::read_file(alignment_path, format, config.timing.reduce_short_phonemes)?;
    let trace = inputs.prosody.map(prosody::read_trace).transpose()?;
    let reference = inputs
        .reference_words
        .map(alignment::read_word_timings)
        .transpose()?;

    let session = build_session(parsed, trace.as_ref(), reference.as_deref(), config)
        .with_context(|| format!("Pipeline failed for {}", alignment_path.display()))?;
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::RecordingSink;
    use crate::phoneme::Phoneme;

    fn alignment() -> AlignmentResult {
        let mut result = AlignmentResult {
            words: vec![WordSpan::new(0.1, 0.6, "light")],
            phonemes: vec![
                PhonemeSegment::from_label(0.0, 0.1, "sil"),
                PhonemeSegment::from_label(0.1, 0.2, "l"),
                PhonemeSegment::from_label(0.2, 0.5, "ai"),
                PhonemeSegment::from_label(0.5, 0.6, "t"),
                PhonemeSegment::from_label(0.6, 0.7, "sil"),
            ],
        };
        result.count_word_phonemes();
        result
    }

    fn phonemes(segments: &[PhonemeSegment]) -> Vec<Phoneme> {
        segments.iter().map(|s| s.phoneme).collect()
    }

    #[test]
    fn test_build_session_default() {
        let config = LipSyncConfig::default();
        let session = build_session(alignment(), None, None, &config).unwrap();

        assert_eq!(
            phonemes(&session.timeline),
            vec![Phoneme::Rest, Phoneme::L, Phoneme::AHH, Phoneme::IEE, Phoneme::T, Phoneme::Rest]
        );
        assert!(session.alveolar_track.is_none());
        assert!(session.ranges.is_none());
        assert_eq!(session.emotion, Emotion::Neutral);

        let ahh = &session.timeline[2];
        assert!(ahh.onset_offset > 0.0);
        assert!(session.timeline.iter().all(|s| s.end > s.start));
        assert!(session.timeline.iter().all(|s| s.start >= 0.0));
    }

    #[test]
    fn test_build_session_alveolar_layer() {
        let mut config = LipSyncConfig::default();
        config.coarticulation.alveolar_layer = true;
        let session = build_session(alignment(), None, None, &config).unwrap();

        // L has no vowel before it, so it takes the following AHH
        assert_eq!(
            phonemes(&session.timeline),
            vec![Phoneme::Rest, Phoneme::AHH, Phoneme::IEE, Phoneme::T, Phoneme::Rest]
        );
        let alveolar = session.alveolar_track.as_ref().unwrap();
        assert_eq!(phonemes(alveolar), vec![Phoneme::L]);
        assert!(alveolar[0].onset_offset > 0.0);
    }

    #[test]
    fn test_build_session_with_prosody() {
        let mut trace = ProsodyTrace::new();
        for i in 0..60 {
            let t = i as f64 * 0.01;
            trace.insert(t, 230.0 + i as f64, 60.0);
        }
        let mut config = LipSyncConfig::default();
        config.emotion.from_pitch = true;
        let session = build_session(alignment(), Some(&trace), None, &config).unwrap();

        let ranges = session.ranges.as_ref().unwrap();
        assert!(ranges.vowel.pitch.max > ranges.vowel.pitch.min);
        assert!(ranges.pitch_median > 220.0);
        assert_eq!(session.emotion, Emotion::Angry);
        assert!(session.timeline[2].mean_pitch > 0.0);
        // silence is not analysed
        assert_eq!(session.timeline[0].mean_pitch, 0.0);
    }

    #[test]
    fn test_build_session_retargets() {
        let config = LipSyncConfig::default();
        let reference = vec![WordSpan::new(1.0, 2.0, "light")];
        let session = build_session(alignment(), None, Some(&reference), &config).unwrap();

        assert!(session.timeline.iter().all(|s| !s.phoneme.is_rest()));
        assert!(session.timeline[0].start >= 0.8);
        assert_eq!(session.words[0].start, 1.0);
        assert_eq!(session.words[0].phoneme_count, 3);
    }

    #[test]
    fn test_build_session_keeps_tracks_time_ordered() {
        let mut parsed = AlignmentResult {
            words: vec![WordSpan::new(0.0, 0.25, "tata"), WordSpan::new(0.25, 0.65, "om")],
            phonemes: vec![
                PhonemeSegment::new(0.0, 0.05, Phoneme::T),
                PhonemeSegment::new(0.05, 0.1, Phoneme::AAA),
                PhonemeSegment::new(0.1, 0.15, Phoneme::T),
                PhonemeSegment::new(0.15, 0.2, Phoneme::AAA),
                PhonemeSegment::new(0.2, 0.25, Phoneme::T),
                PhonemeSegment::new(0.25, 0.45, Phoneme::OHH),
                PhonemeSegment::new(0.45, 0.65, Phoneme::MMM),
            ],
        };
        parsed.count_word_phonemes();
        let config = LipSyncConfig::default();
        let session = build_session(parsed, None, None, &config).unwrap();

        // OHH gets the fixed lip-heavy offset and starts before the last T
        let ohh = session
            .timeline
            .iter()
            .position(|s| s.phoneme == Phoneme::OHH)
            .unwrap();
        assert!((session.timeline[ohh].start - 0.1).abs() < 1e-9);
        assert!(session.timeline.windows(2).all(|w| w[0].start <= w[1].start));

        let index = config.viseme(Phoneme::OHH).unwrap()[0].index;
        let mut animator = session.animator(&config).unwrap();
        let mut sink = RecordingSink::new();
        for t in [0.0, 0.05, 0.1, 0.15, 0.17] {
            animator.tick(t, &mut sink);
        }
        assert!(sink.weight(index) > 0.0);
    }

    #[test]
    fn test_build_session_missing_diphone_pair() {
        let mut config = LipSyncConfig::default();
        config.diphones.remove(&Phoneme::DiphoneAI);
        let err = build_session(alignment(), None, None, &config).unwrap_err();
        assert!(matches!(err, LipSyncError::MissingDiphonePair(Phoneme::DiphoneAI)));
    }

    #[test]
    fn test_session_plays() {
        let mut config = LipSyncConfig::default();
        config.coarticulation.alveolar_layer = true;
        let session = build_session(alignment(), None, None, &config).unwrap();
        let mut animator = session.animator(&config).unwrap();
        let frames = animator.render(config.playback.tick_rate_hz);
        assert!(!frames.is_empty());

        let mut sink = RecordingSink::new();
        animator.stop(&mut sink);
        assert!(sink.weights.values().all(|w| *w == 0.0));
    }

    #[test]
    fn test_session_json_roundtrip() {
        let config = LipSyncConfig::default();
        let session = build_session(alignment(), None, None, &config).unwrap();
        let json = serde_json::to_string(&session).unwrap();
        assert!(!json.contains("alveolar_track"));
        let back: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(phonemes(&back.timeline), phonemes(&session.timeline));
        for (a, b) in back.timeline.iter().zip(&session.timeline) {
            assert!((a.start - b.start).abs() < 1e-9 && (a.end - b.end).abs() < 1e-9);
        }
    }

    #[test]
    fn test_run_reads_files() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("speech.log");
        std::fs::write(
            &log,
            "INFO: wav_mk 0, wav_done 48000\nINFO: word: 0.1 0.6 light\nINFO: phoneme: 0.1 0.2 l\nINFO: phoneme: 0.2 0.5 ai\nINFO: phoneme: 0.5 0.6 t\n",
        )
        .unwrap();
        let pitch = dir.path().join("pitch.txt");
        std::fs::write(&pitch, "time pitch\n0.3 150\n0.35 160\n").unwrap();

        let inputs = PipelineInputs {
            alignment: Some(log.as_path()),
            format: "auto",
            prosody: Some(pitch.as_path()),
            reference_words: None,
        };
        let session = run(&inputs, &LipSyncConfig::default()).unwrap();
        assert_eq!(session.words.len(), 1);
        assert!(session.ranges.is_some());

        let missing = PipelineInputs {
            alignment: None,
            ..inputs
        };
        assert!(run(&missing, &LipSyncConfig::default()).is_err());
    }
}
