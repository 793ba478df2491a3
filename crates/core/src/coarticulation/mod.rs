//! Coarticulation: timeline cleanup, neighbour influence, alveolar layering
//! and boundary rearrangement.

pub mod alveolar;
pub mod influence;
pub mod rearrange;
pub mod timeline;

pub use alveolar::split_alveolars;
pub use influence::{classify, influence_weight, resolve};
pub use rearrange::rearrange;
pub use timeline::{assign_onset_offsets, expand_diphones, remove_duplicates, retarget_to_words};
