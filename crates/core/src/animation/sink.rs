//! Output boundary of the animator.

use std::collections::BTreeMap;

/// Receives blendshape weights, e.g. a skinned mesh renderer.
pub trait BlendShapeSink {
    /// Set blendshape `index` to `weight` in [0, 100].
    fn set_blend_shape_weight(&mut self, index: usize, weight: f64);
}

/// Keeps the latest weight per blendshape and counts writes.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub weights: BTreeMap<usize, f64>,
    pub writes: usize,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last weight written to `index`, 0 if never written.
    pub fn weight(&self, index: usize) -> f64 {
        self.weights.get(&index).copied().unwrap_or(0.0)
    }
}

impl BlendShapeSink for RecordingSink {
    fn set_blend_shape_weight(&mut self, index: usize, weight: f64) {
        self.weights.insert(index, weight);
        self.writes += 1;
    }
}
