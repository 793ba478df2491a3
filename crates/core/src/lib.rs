//! visemer-core: phoneme timing to blendshape animation.
//!
//! Aligner output is cleaned up into a viseme timeline, widened by
//! coarticulation rules, optionally annotated with prosody statistics, and
//! finally played back as rise/decay blendshape curves.

pub mod alignment;
pub mod animation;
pub mod coarticulation;
pub mod config;
pub mod error;
pub mod phoneme;
pub mod pipeline;
pub mod prosody;
pub mod range;
pub mod types;

pub use config::LipSyncConfig;
pub use error::LipSyncError;
pub use phoneme::Phoneme;
pub use pipeline::{build_session, Session};
