//! Prosody: pitch/intensity traces and the statistics that modulate viseme
//! weights.

pub mod analysis;
pub mod stats;
pub mod trace;

pub use stats::{compute, feature_mean, ratio, FeatureMean, FeatureRange, ProsodyRanges};
pub use trace::{read_trace, ProsodySample, ProsodyTrace};
