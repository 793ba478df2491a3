//! Reference word timings, one `word start end` entry per line.
//! Words are lower-cased.

use std::path::Path;

use anyhow::{Context, Result};

use crate::types::WordSpan;

/// Parse word timings. Lines that don't parse are skipped.
pub fn parse_word_timings(text: &str) -> Vec<WordSpan> {
    let mut words = Vec::new();
    for (n, line) in text.lines().enumerate() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        let parsed = match fields.as_slice() {
            [word, start, end, ..] => start
                .parse::<f64>()
                .ok()
                .zip(end.parse::<f64>().ok())
                .map(|(s, e)| WordSpan::new(s, e, &word.to_lowercase())),
            _ => None,
        };
        match parsed {
            Some(w) => words.push(w),
            None => log::debug!("Skipping word timing line {}: {:?}", n + 1, line),
        }
    }
    words
}

pub fn read_word_timings(path: &Path) -> Result<Vec<WordSpan>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read word timings: {}", path.display()))?;
    let words = parse_word_timings(&text);
    log::info!("Read {} reference words from {}", words.len(), path.display());
    Ok(words)
}
