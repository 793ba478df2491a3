//! Viseme phoneme set and its static classification tables.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical viseme categories driven by the animator.
///
/// `Diphone*` variants are compound visemes that the timeline splits into two
/// phonemes before playback. `Rest` is silence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Phoneme {
    AAA,
    AHH,
    UUU,
    RRR,
    T,
    TH,
    FFF,
    EHH,
    OHH,
    IEE,
    SSS,
    SSH,
    MMM,
    Schwa,
    L,
    N,
    GK,
    DiphoneAI,
    DiphoneAU,
    DiphoneOI,
    DiphoneOU,
    DiphoneEI,
    DiphoneX,
    DiphoneIA,
    DiphoneUA,
    DiphoneEA,
    Rest,
}

impl Phoneme {
    pub const ALL: [Phoneme; 27] = [
        Phoneme::AAA,
        Phoneme::AHH,
        Phoneme::UUU,
        Phoneme::RRR,
        Phoneme::T,
        Phoneme::TH,
        Phoneme::FFF,
        Phoneme::EHH,
        Phoneme::OHH,
        Phoneme::IEE,
        Phoneme::SSS,
        Phoneme::SSH,
        Phoneme::MMM,
        Phoneme::Schwa,
        Phoneme::L,
        Phoneme::N,
        Phoneme::GK,
        Phoneme::DiphoneAI,
        Phoneme::DiphoneAU,
        Phoneme::DiphoneOI,
        Phoneme::DiphoneOU,
        Phoneme::DiphoneEI,
        Phoneme::DiphoneX,
        Phoneme::DiphoneIA,
        Phoneme::DiphoneUA,
        Phoneme::DiphoneEA,
        Phoneme::Rest,
    ];

    pub fn is_vowel(self) -> bool {
        VOWELS.contains(&self)
    }

    pub fn is_consonant(self) -> bool {
        CONSONANTS.contains(&self)
    }

    /// Visemes with strong lip rounding or protrusion.
    pub fn is_lip_heavy(self) -> bool {
        LIP_HEAVY.contains(&self)
    }

    /// Nasals, tongue-only visemes and obstruents with little lip shape.
    pub fn is_lip_light(self) -> bool {
        LIP_LIGHT.contains(&self)
    }

    pub fn is_plosive_fricative(self) -> bool {
        PLOSIVE_FRICATIVE.contains(&self)
    }

    pub fn is_alveolar(self) -> bool {
        ALVEOLAR.contains(&self)
    }

    pub fn is_diphone(self) -> bool {
        DIPHONES.contains(&self)
    }

    pub fn is_rest(self) -> bool {
        self == Phoneme::Rest
    }

    /// True for phonemes whose audio contributes to prosody statistics.
    pub fn is_voiced_category(self) -> bool {
        self.is_vowel() || self.is_consonant() || self.is_plosive_fricative()
    }

    /// Base coarticulation influence of the phoneme class, in `[0, 1]`.
    ///
    /// Lip-heavy visemes dominate their neighbours, lip-light ones yield.
    /// Vowels follow a sonority ordering.
    pub fn base_influence(self) -> f64 {
        if self.is_lip_heavy() {
            1.0
        } else if self.is_lip_light() {
            0.5
        } else if self == Phoneme::Schwa {
            1.0
        } else if self.is_vowel() {
            match self {
                Phoneme::UUU => 0.9,
                Phoneme::OHH => 0.85,
                Phoneme::IEE => 0.8,
                Phoneme::EHH => 0.75,
                _ => 0.7,
            }
        } else if self.is_consonant() {
            0.1
        } else {
            0.0
        }
    }
}

impl fmt::Display for Phoneme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

lazy_static::lazy_static! {
    static ref VOWELS: HashSet<Phoneme> = [
        Phoneme::AAA, Phoneme::AHH, Phoneme::UUU, Phoneme::EHH,
        Phoneme::OHH, Phoneme::IEE, Phoneme::Schwa,
    ].into_iter().collect();

    static ref CONSONANTS: HashSet<Phoneme> = [
        Phoneme::RRR, Phoneme::T, Phoneme::TH, Phoneme::FFF, Phoneme::SSS,
        Phoneme::SSH, Phoneme::MMM, Phoneme::L, Phoneme::N, Phoneme::GK,
    ].into_iter().collect();

    static ref LIP_HEAVY: HashSet<Phoneme> = [
        Phoneme::UUU, Phoneme::OHH, Phoneme::SSH,
    ].into_iter().collect();

    static ref LIP_LIGHT: HashSet<Phoneme> = [
        Phoneme::T, Phoneme::TH, Phoneme::GK, Phoneme::FFF,
        Phoneme::MMM, Phoneme::N, Phoneme::L,
    ].into_iter().collect();

    static ref PLOSIVE_FRICATIVE: HashSet<Phoneme> = [
        // fricatives
        Phoneme::SSS, Phoneme::FFF, Phoneme::SSH, Phoneme::TH,
        // plosives
        Phoneme::MMM, Phoneme::T, Phoneme::GK,
    ].into_iter().collect();

    static ref ALVEOLAR: HashSet<Phoneme> = [
        Phoneme::RRR, Phoneme::L, Phoneme::N, Phoneme::GK,
    ].into_iter().collect();

    static ref DIPHONES: HashSet<Phoneme> = [
        Phoneme::DiphoneAI, Phoneme::DiphoneAU, Phoneme::DiphoneOI,
        Phoneme::DiphoneOU, Phoneme::DiphoneEI, Phoneme::DiphoneX,
        Phoneme::DiphoneIA, Phoneme::DiphoneUA, Phoneme::DiphoneEA,
    ].into_iter().collect();
}
