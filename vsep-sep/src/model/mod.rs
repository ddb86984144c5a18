//! Pretrained source separation model seam
//!
//! The model is a black box that turns one mix into four stems in the fixed
//! order drums, bass, other, vocals. [`DemucsCli`] drives the demucs command
//! line tool; tests plug in their own [`SeparationModel`].

mod demucs;

pub use demucs::DemucsCli;

use crate::audio::AudioBuffer;
use vsep_common::{Error, Result};

/// Stems produced by a 4-source model, in model output order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StemKind {
    Drums,
    Bass,
    Other,
    Vocals,
}

impl StemKind {
    /// All stems in model output order
    pub const ALL: [StemKind; 4] = [
        StemKind::Drums,
        StemKind::Bass,
        StemKind::Other,
        StemKind::Vocals,
    ];

    /// Position in the model output
    pub fn index(&self) -> usize {
        match self {
            StemKind::Drums => 0,
            StemKind::Bass => 1,
            StemKind::Other => 2,
            StemKind::Vocals => 3,
        }
    }

    /// Short name used for stem file names
    pub fn short_name(&self) -> &'static str {
        match self {
            StemKind::Drums => "drums",
            StemKind::Bass => "bass",
            StemKind::Other => "other",
            StemKind::Vocals => "vocals",
        }
    }
}

/// Exactly four stems from one separation call.
///
/// Every stem has the mix's sample rate, channel count and frame count.
#[derive(Debug, Clone)]
pub struct StemSet {
    stems: [AudioBuffer; 4],
}

impl StemSet {
    /// Build a stem set, checking every stem against the mix shape.
    pub fn new(mix: &AudioBuffer, stems: [AudioBuffer; 4]) -> Result<Self> {
        for kind in StemKind::ALL {
            let stem = &stems[kind.index()];
            if !stem.same_shape(mix) {
                return Err(Error::Model(format!(
                    "{} stem is {}ch x {} @ {}Hz, mix is {}ch x {} @ {}Hz",
                    kind.short_name(),
                    stem.channel_count(),
                    stem.frames(),
                    stem.sample_rate(),
                    mix.channel_count(),
                    mix.frames(),
                    mix.sample_rate(),
                )));
            }
        }
        Ok(Self { stems })
    }

    pub fn get(&self, kind: StemKind) -> &AudioBuffer {
        &self.stems[kind.index()]
    }

    /// The vocals stem, unmodified
    pub fn vocals(&self) -> &AudioBuffer {
        self.get(StemKind::Vocals)
    }

    /// Everything except vocals: drums + bass + other, element-wise
    pub fn melody(&self) -> Result<AudioBuffer> {
        AudioBuffer::sum(&[
            self.get(StemKind::Drums),
            self.get(StemKind::Bass),
            self.get(StemKind::Other),
        ])
    }
}

/// A pretrained multi-source separation model
pub trait SeparationModel: Send + Sync {
    /// Model name for logging
    fn name(&self) -> &str;

    /// Separate `mix` into drums, bass, other and vocals.
    fn apply(&self, mix: &AudioBuffer) -> Result<StemSet>;
}
