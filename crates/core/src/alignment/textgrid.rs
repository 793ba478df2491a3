//! MAUS TextGrid reader (long text format).
//!
//! Tier name prefixes select the content: `ORT` words, `KAN` canonical
//! pronunciations, `MAU` phonemes (X-SAMPA).

use anyhow::Result;

use crate::types::{AlignmentResult, WordSpan};

use super::{labelled_segment, AlignmentReader};

/// Bounds closer than this are considered identical.
const BOUND_EPSILON: f64 = 1e-6;

pub struct TextGridReader {
    pub reduce_short_phonemes: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Tier {
    Words,
    Pronunciations,
    Phonemes,
    Other,
}

impl Tier {
    fn from_name(name: &str) -> Self {
        if name.starts_with("ORT") {
            Tier::Words
        } else if name.starts_with("KAN") {
            Tier::Pronunciations
        } else if name.starts_with("MAU") {
            Tier::Phonemes
        } else {
            Tier::Other
        }
    }
}

#[derive(Default)]
struct Interval {
    xmin: Option<f64>,
    xmax: Option<f64>,
}

/// Split `key = value` and unquote string values.
fn key_value(line: &str) -> Option<(&str, String)> {
    let (key, value) = line.split_once('=')?;
    let value = value.trim();
    let value = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .map(|v| v.replace("\"\"", "\""))
        .unwrap_or_else(|| value.to_string());
    Some((key.trim(), value))
}

impl AlignmentReader for TextGridReader {
    fn name(&self) -> &str {
        "textgrid"
    }

    fn parse(&self, text: &str) -> Result<AlignmentResult> {
        let mut result = AlignmentResult::default();
        let mut pronunciations: Vec<(f64, f64, String)> = Vec::new();
        let mut tier = Tier::Other;
        let mut interval: Option<Interval> = None;

        for (n, raw) in text.lines().enumerate() {
            let line = raw.trim();

            if line.starts_with("item [") {
                interval = None;
                continue;
            }
            if line.starts_with("intervals [") {
                interval = Some(Interval::default());
                continue;
            }

            let Some((key, value)) = key_value(line) else {
                continue;
            };

            if key == "name" {
                tier = Tier::from_name(&value);
                log::debug!("TextGrid tier '{}' -> {:?}", value, tier);
                continue;
            }

            let Some(current) = interval.as_mut() else {
                continue;
            };
            match key {
                "xmin" => current.xmin = value.parse().ok(),
                "xmax" => current.xmax = value.parse().ok(),
                "text" => {
                    let (Some(start), Some(end)) = (current.xmin, current.xmax) else {
                        log::debug!("Skipping interval with bad bounds on line {}", n + 1);
                        interval = None;
                        continue;
                    };
                    interval = None;
                    if value.is_empty() {
                        continue;
                    }
                    match tier {
                        Tier::Words => result
                            .words
                            .push(WordSpan::new(start, end, &value.to_lowercase())),
                        Tier::Pronunciations => pronunciations.push((start, end, value)),
                        Tier::Phonemes => result.phonemes.push(labelled_segment(
                            start,
                            end,
                            &value,
                            self.reduce_short_phonemes,
                        )),
                        Tier::Other => {}
                    }
                }
                _ => {}
            }
        }

        for (start, end, kan) in pronunciations {
            if let Some(word) = result.words.iter_mut().find(|w| {
                (w.start - start).abs() < BOUND_EPSILON && (w.end - end).abs() < BOUND_EPSILON
            }) {
                word.pronunciation = Some(kan);
            }
        }

        result
            .phonemes
            .sort_by(|a, b| a.start.total_cmp(&b.start));
        result.count_word_phonemes();
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phoneme::Phoneme;

    const GRID: &str = r#"File type = "ooTextFile"
Object class = "TextGrid"

xmin = 0
xmax = 0.9
tiers? <exists>
size = 3
item []:
    item [1]:
        class = "IntervalTier"
        name = "ORT-MAU"
        xmin = 0
        xmax = 0.9
        intervals: size = 3
        intervals [1]:
            xmin = 0
            xmax = 0.1
            text = ""
        intervals [2]:
            xmin = 0.1
            xmax = 0.5
            text = "Hello"
        intervals [3]:
            xmin = 0.5
            xmax = 0.9
            text = "world"
    item [2]:
        class = "IntervalTier"
        name = "KAN-MAU"
        xmin = 0
        xmax = 0.9
        intervals: size = 2
        intervals [1]:
            xmin = 0.1
            xmax = 0.5
            text = "h@l@U"
        intervals [2]:
            xmin = 0.5
            xmax = 0.9
            text = "w3:ld"
    item [3]:
        class = "IntervalTier"
        name = "MAU"
        xmin = 0
        xmax = 0.9
        intervals: size = 4
        intervals [1]:
            xmin = 0
            xmax = 0.1
            text = "<p:>"
        intervals [2]:
            xmin = 0.1
            xmax = 0.2
            text = "h"
        intervals [3]:
            xmin = 0.2
            xmax = 0.5
            text = "@U"
        intervals [4]:
            xmin = 0.5
            xmax = 0.9
            text = "w"
"#;

    fn reader() -> TextGridReader {
        TextGridReader {
            reduce_short_phonemes: false,
        }
    }

    #[test]
    fn test_words_are_lowercased_and_empty_skipped() {
        let result = reader().parse(GRID).unwrap();
        let texts: Vec<&str> = result.words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, vec!["hello", "world"]);
        assert_eq!(result.words[0].start, 0.1);
        assert_eq!(result.words[0].end, 0.5);
    }

    #[test]
    fn test_pronunciations_attached() {
        let result = reader().parse(GRID).unwrap();
        assert_eq!(result.words[0].pronunciation.as_deref(), Some("h@l@U"));
        assert_eq!(result.words[1].pronunciation.as_deref(), Some("w3:ld"));
    }

    #[test]
    fn test_phonemes_mapped() {
        let result = reader().parse(GRID).unwrap();
        let phonemes: Vec<Phoneme> = result.phonemes.iter().map(|p| p.phoneme).collect();
        assert_eq!(
            phonemes,
            vec![Phoneme::Rest, Phoneme::GK, Phoneme::DiphoneOU, Phoneme::UUU]
        );
        assert_eq!(result.words[0].phoneme_count, 2);
        assert_eq!(result.words[1].phoneme_count, 1);
    }

    #[test]
    fn test_tier_prefixes() {
        assert_eq!(Tier::from_name("ORT-MAU"), Tier::Words);
        assert_eq!(Tier::from_name("KAN"), Tier::Pronunciations);
        assert_eq!(Tier::from_name("MAU"), Tier::Phonemes);
        assert_eq!(Tier::from_name("TRN"), Tier::Other);
    }

    #[test]
    fn test_bad_bounds_skipped() {
        let text = "name = \"MAU\"\nintervals [1]:\nxmin = oops\nxmax = 0.2\ntext = \"t\"\nintervals [2]:\nxmin = 0.2\nxmax = 0.3\ntext = \"s\"\n";
        let result = reader().parse(text).unwrap();
        assert_eq!(result.phonemes.len(), 1);
        assert_eq!(result.phonemes[0].phoneme, Phoneme::SSS);
    }

    #[test]
    fn test_key_value_unquotes() {
        assert_eq!(key_value("text = \"a\"\"b\"").unwrap().1, "a\"b");
        assert_eq!(key_value("xmin = 0.5").unwrap(), ("xmin", "0.5".to_string()));
        assert!(key_value("intervals [1]:").is_none());
    }
}
