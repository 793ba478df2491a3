//! Typed failures raised by configuration and mapping validation.

use thiserror::Error;

use crate::phoneme::Phoneme;

#[derive(Debug, Error)]
pub enum LipSyncError {
    /// A diphone reached expansion without a configured phoneme pair.
    #[error("no phoneme pair configured for diphone {0}")]
    MissingDiphonePair(Phoneme),

    /// A phoneme in a playback track has no blendshape mapping.
    #[error("no blendshape mapping configured for phoneme {0}")]
    MissingViseme(Phoneme),

    /// A configuration value failed validation.
    #[error("invalid configuration: {field}: {message}")]
    InvalidConfig {
        field: &'static str,
        message: String,
    },
}

impl LipSyncError {
    pub(crate) fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            message: message.into(),
        }
    }
}
