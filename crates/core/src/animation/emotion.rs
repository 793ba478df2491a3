//! Facial emotions layered on top of the visemes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Median pitch above this reads as angry.
pub const ANGRY_PITCH: f64 = 220.0;
/// Median pitch below this reads as sad.
pub const SAD_PITCH: f64 = 180.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Emotion {
    SmileLaugh,
    SmileLeft,
    SmileRight,
    SmileOnly,
    OpenMouth,
    Hesitation,
    Surprised,
    Sad,
    Angry,
    Flirting,
    #[default]
    Neutral,
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Pick an emotion from the voiced pitch median (0 = no voiced pitch).
pub fn select_emotion(pitch_median: f64) -> Emotion {
    if pitch_median <= 0.0 || !pitch_median.is_finite() {
        Emotion::Neutral
    } else if pitch_median > ANGRY_PITCH {
        Emotion::Angry
    } else if pitch_median < SAD_PITCH {
        Emotion::Sad
    } else {
        Emotion::SmileOnly
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_emotion() {
        assert_eq!(select_emotion(0.0), Emotion::Neutral);
        assert_eq!(select_emotion(240.0), Emotion::Angry);
        assert_eq!(select_emotion(150.0), Emotion::Sad);
        assert_eq!(select_emotion(200.0), Emotion::SmileOnly);
        // thresholds are exclusive
        assert_eq!(select_emotion(220.0), Emotion::SmileOnly);
        assert_eq!(select_emotion(180.0), Emotion::SmileOnly);
    }

    #[test]
    fn test_emotion_serde() {
        let json = serde_json::to_string(&Emotion::SmileLaugh).unwrap();
        assert_eq!(json, "\"SmileLaugh\"");
        assert_eq!(Emotion::default(), Emotion::Neutral);
    }
}
