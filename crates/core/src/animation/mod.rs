//! Playback: easing curves, emotions, the blendshape sink and the animator.

pub mod animator;
pub mod easing;
pub mod emotion;
pub mod sink;

pub use animator::{modulated_weight, Frame, PlaybackAnimator};
pub use emotion::{select_emotion, Emotion};
pub use sink::{BlendShapeSink, RecordingSink};
