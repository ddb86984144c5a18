//! vsep-sep library - vocal/melody separation
//!
//! Decodes an input mix, runs it through a pretrained 4-stem separation model,
//! and writes a vocals track plus a melody track (drums + bass + other).

pub mod audio;
pub mod model;
pub mod separator;
pub mod trim;

pub use audio::AudioBuffer;
pub use model::{DemucsCli, SeparationModel, StemKind, StemSet};
pub use separator::{SeparationOutputs, Separator};
pub use trim::{FfmpegTrimmer, Trimmer};
