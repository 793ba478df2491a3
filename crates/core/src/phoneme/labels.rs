//! Raw aligner label → viseme phoneme mapping.
//!
//! Covers the CereVoice phone set and the X-SAMPA labels emitted by MAUS.
//! Labels are case-sensitive: `t` and `T` are different X-SAMPA phones that
//! happen to share a viseme, while `s` and `S` do not.

use std::collections::HashMap;

use super::catalog::Phoneme;

/// Phones at or below this duration (seconds) are candidates for reduction.
pub const REDUCTION_THRESHOLD: f64 = 0.03;

lazy_static::lazy_static! {
    static ref LABELS: HashMap<&'static str, Phoneme> = {
        let table: &[(&str, Phoneme)] = &[
            // CereVoice
            ("@", Phoneme::Schwa), ("@@", Phoneme::Schwa),
            ("a", Phoneme::AHH), ("aa", Phoneme::AHH),
            ("ai", Phoneme::DiphoneAI), ("au", Phoneme::DiphoneAU),
            ("b", Phoneme::MMM), ("ch", Phoneme::SSH),
            ("d", Phoneme::T), ("dh", Phoneme::TH),
            ("e", Phoneme::EHH), ("ei", Phoneme::DiphoneEI),
            ("f", Phoneme::FFF), ("g", Phoneme::GK), ("h", Phoneme::GK),
            ("i", Phoneme::IEE), ("ii", Phoneme::IEE),
            ("jh", Phoneme::SSH), ("k", Phoneme::GK), ("l", Phoneme::L),
            ("m", Phoneme::MMM), ("n", Phoneme::N), ("ng", Phoneme::GK),
            ("o", Phoneme::OHH), ("oi", Phoneme::DiphoneOI),
            ("oo", Phoneme::OHH), ("ou", Phoneme::DiphoneOU),
            ("p", Phoneme::MMM), ("r", Phoneme::RRR), ("s", Phoneme::SSS),
            ("sh", Phoneme::SSH), ("t", Phoneme::T), ("th", Phoneme::TH),
            ("u", Phoneme::UUU), ("uh", Phoneme::UUU), ("uu", Phoneme::UUU),
            ("v", Phoneme::FFF), ("w", Phoneme::UUU), ("x", Phoneme::DiphoneX),
            ("y", Phoneme::IEE), ("z", Phoneme::SSS), ("zh", Phoneme::SSH),
            // X-SAMPA consonants
            ("D", Phoneme::TH), ("dZ", Phoneme::SSH), ("h\\", Phoneme::GK),
            ("j", Phoneme::UUU), ("l=", Phoneme::L), ("m=", Phoneme::MMM),
            ("n=", Phoneme::N), ("N", Phoneme::GK), ("S", Phoneme::SSH),
            ("r\\", Phoneme::RRR), ("R", Phoneme::RRR), ("tS", Phoneme::SSH),
            ("T", Phoneme::T), ("Z", Phoneme::SSH),
            // X-SAMPA vowels
            ("@U", Phoneme::DiphoneOU), ("{", Phoneme::AAA),
            ("aI", Phoneme::DiphoneAI), ("aU", Phoneme::DiphoneAU),
            ("A:", Phoneme::AAA), ("eI", Phoneme::DiphoneEI),
            ("e@", Phoneme::DiphoneEA), ("3:", Phoneme::EHH),
            ("6", Phoneme::Schwa), ("E", Phoneme::EHH), ("3`", Phoneme::EHH),
            ("i:", Phoneme::IEE), ("I", Phoneme::IEE), ("I@", Phoneme::DiphoneIA),
            ("O:", Phoneme::OHH), ("OI", Phoneme::DiphoneOI), ("Q", Phoneme::AAA),
            ("u:", Phoneme::UUU), ("U", Phoneme::UUU), ("U@", Phoneme::DiphoneUA),
            ("V", Phoneme::Schwa),
        ];
        table.iter().copied().collect()
    };
}

/// Map a raw aligner label to its viseme. Unknown labels are silence.
pub fn map_label(label: &str) -> Phoneme {
    LABELS.get(label).copied().unwrap_or(Phoneme::Rest)
}

/// Map a label, reducing very short phones.
///
/// Vowels shorter than [`REDUCTION_THRESHOLD`] collapse to Schwa and short
/// `h`/`t` releases are dropped to Rest. Everything else maps normally.
pub fn map_label_with_duration(label: &str, duration: f64) -> Phoneme {
    let phoneme = map_label(label);
    if duration > REDUCTION_THRESHOLD {
        return phoneme;
    }
    if phoneme.is_vowel() {
        return Phoneme::Schwa;
    }
    match label {
        "h" | "h\\" | "t" | "T" => Phoneme::Rest,
        _ => phoneme,
    }
}
