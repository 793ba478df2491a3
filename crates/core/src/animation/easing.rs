//! Rise and decay easing curves over a normalized step `s` in [0, 1].

use std::f64::consts::E;

use crate::config::Easing;
use crate::range::transform;

impl Easing {
    /// Rise curve, 0 at `s = 0` and 1 at `s = 1`.
    pub fn ease_in(self, s: f64) -> f64 {
        let s = s.clamp(0.0, 1.0);
        match self {
            Easing::Quadratic => s * s,
            Easing::Exponential => transform(s.exp(), 1.0, E, 0.0, 1.0),
        }
    }

    /// Decay curve, 1 at `s = 0` and 0 at `s = 1`.
    pub fn ease_out(self, s: f64) -> f64 {
        let s = s.clamp(0.0, 1.0);
        match self {
            Easing::Quadratic => {
                let r = 1.0 - s;
                r * (2.0 - r)
            }
            Easing::Exponential => transform((1.0 - s).exp(), 1.0, E, 0.0, 1.0),
        }
    }
}
