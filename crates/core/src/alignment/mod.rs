//! Alignment readers and backends.
//!
//! Turns aligner/TTS output into words plus raw phoneme segments:
//! - CereVoiceReader: CereVoice callback log (`INFO: phoneme: ...` lines)
//! - TextGridReader: MAUS TextGrid with ORT / KAN / MAU tiers

pub mod cerevoice;
pub mod textgrid;
pub mod words;

use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::phoneme::{map_label, map_label_with_duration};
use crate::types::{AlignmentResult, PhonemeSegment};

pub use cerevoice::CereVoiceReader;
pub use textgrid::TextGridReader;
pub use words::{parse_word_timings, read_word_timings};

/// Alignment reader trait.
pub trait AlignmentReader: Send + Sync {
    /// Backend name for logging/display.
    fn name(&self) -> &str;

    /// Parse the full text of an alignment file.
    fn parse(&self, text: &str) -> Result<AlignmentResult>;
}

/// Picks TextGrid or CereVoice per input.
pub struct AutoReader {
    pub reduce_short_phonemes: bool,
}

impl AlignmentReader for AutoReader {
    fn name(&self) -> &str {
        "auto"
    }

    fn parse(&self, text: &str) -> Result<AlignmentResult> {
        let format = detect_format(text);
        log::debug!("Auto-detected {} alignment", format);
        get_reader(format, self.reduce_short_phonemes)?.parse(text)
    }
}

/// Guess the alignment format from its contents.
pub fn detect_format(text: &str) -> &'static str {
    if text.contains("IntervalTier") {
        "textgrid"
    } else {
        "cerevoice"
    }
}

/// Get an alignment reader by name.
///
/// Modes:
/// - "cerevoice": CereVoice callback log.
/// - "textgrid": MAUS TextGrid.
/// - "auto": TextGrid if the input has interval tiers, else CereVoice.
pub fn get_reader(name: &str, reduce_short_phonemes: bool) -> Result<Box<dyn AlignmentReader>> {
    match name {
        "auto" => Ok(Box::new(AutoReader {
            reduce_short_phonemes,
        })),
        "cerevoice" => Ok(Box::new(CereVoiceReader {
            reduce_short_phonemes,
            ..CereVoiceReader::default()
        })),
        "textgrid" => Ok(Box::new(TextGridReader {
            reduce_short_phonemes,
        })),
        _ => bail!(
            "Unknown alignment format: '{}'. Available: cerevoice, textgrid, auto",
            name
        ),
    }
}

/// Read and parse an alignment file.
pub fn read_file(path: &Path, format: &str, reduce_short_phonemes: bool) -> Result<AlignmentResult> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read alignment: {}", path.display()))?;
    let reader = get_reader(format, reduce_short_phonemes)?;
    let result = reader
        .parse(&text)
        .with_context(|| format!("Failed to parse alignment: {}", path.display()))?;
    log::info!(
        "Read {} words, {} phonemes from {} ({})",
        result.words.len(),
        result.phonemes.len(),
        path.display(),
        reader.name()
    );
    Ok(result)
}

/// Build a raw segment from an aligner label.
pub(crate) fn labelled_segment(start: f64, end: f64, label: &str, reduce: bool) -> PhonemeSegment {
    let phoneme = if reduce {
        map_label_with_duration(label, end - start)
    } else {
        map_label(label)
    };
    PhonemeSegment::new(start, end, phoneme)
}
