//! CereVoice callback log reader.
//!
//! The TTS callback appends one block per synthesized audio part:
//!
//! ```text
//! INFO: wav_mk 0, wav_done 33600
//! INFO: word: 0.05 0.41 hello
//! INFO: phoneme: 0.05 0.12 h
//! ```
//!
//! Record times are relative to their part, so parts after the first are
//! shifted by the total duration of the parts before them.

use anyhow::Result;

use crate::types::{AlignmentResult, WordSpan};

use super::{labelled_segment, AlignmentReader};

pub const DEFAULT_SAMPLE_RATE: u32 = 48000;

pub struct CereVoiceReader {
    /// Sample rate used to convert `wav_done` counts to seconds
    pub sample_rate: u32,
    pub reduce_short_phonemes: bool,
}

impl Default for CereVoiceReader {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            reduce_short_phonemes: false,
        }
    }
}

/// Parse `<start> <end> <text>` out of a record's fields.
fn parse_record<'a>(fields: &[&'a str]) -> Option<(f64, f64, &'a str)> {
    if fields.len() < 3 {
        return None;
    }
    let start = fields[0].parse::<f64>().ok()?;
    let end = fields[1].parse::<f64>().ok()?;
    Some((start, end, fields[2]))
}

impl AlignmentReader for CereVoiceReader {
    fn name(&self) -> &str {
        "cerevoice"
    }

    fn parse(&self, text: &str) -> Result<AlignmentResult> {
        let mut result = AlignmentResult::default();
        let mut offset = 0.0;
        let mut part_duration = 0.0;

        for (n, line) in text.lines().enumerate() {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.first() != Some(&"INFO:") || tokens.len() < 2 {
                continue;
            }

            match tokens[1] {
                "wav_mk" => {
                    let samples = tokens.get(4).and_then(|t| t.parse::<f64>().ok());
                    match samples {
                        Some(samples) => {
                            offset += part_duration;
                            part_duration = samples / self.sample_rate as f64;
                        }
                        None => log::debug!("Skipping malformed part header on line {}", n + 1),
                    }
                }
                "word:" => match parse_record(&tokens[2..]) {
                    Some((start, end, word)) => {
                        result
                            .words
                            .push(WordSpan::new(start + offset, end + offset, word));
                    }
                    None => log::debug!("Skipping malformed word record on line {}", n + 1),
                },
                "phoneme:" => match parse_record(&tokens[2..]) {
                    Some((start, end, label)) => {
                        result.phonemes.push(labelled_segment(
                            start + offset,
                            end + offset,
                            label,
                            self.reduce_short_phonemes,
                        ));
                    }
                    None => log::debug!("Skipping malformed phoneme record on line {}", n + 1),
                },
                _ => {}
            }
        }

        result.count_word_phonemes();
        Ok(result)
    }
}
