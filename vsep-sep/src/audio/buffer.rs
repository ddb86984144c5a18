//! Planar multi-channel sample buffer

use vsep_common::{Error, Result};

/// Decoded audio in (channels, frames) layout.
///
/// Every channel holds the same number of frames. Samples are nominally in
/// [-1.0, 1.0] but sums of stems may exceed that until post-processing.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
}

impl AudioBuffer {
    /// Build from planar channel data.
    ///
    /// # Errors
    /// - zero sample rate
    /// - no channels
    /// - channels of unequal length
    pub fn new(sample_rate: u32, channels: Vec<Vec<f32>>) -> Result<Self> {
        if sample_rate == 0 {
            return Err(Error::InvalidInput("sample rate must be positive".to_string()));
        }
        let Some(first) = channels.first() else {
            return Err(Error::InvalidInput("audio has no channels".to_string()));
        };
        let frames = first.len();
        if channels.iter().any(|c| c.len() != frames) {
            return Err(Error::InvalidInput(
                "channels have different lengths".to_string(),
            ));
        }
        Ok(Self {
            sample_rate,
            channels,
        })
    }

    /// Build from interleaved samples (frame-major, as decoders produce them).
    ///
    /// Mono input becomes a single channel; a trailing partial frame is dropped.
    pub fn from_interleaved(
        samples: &[f32],
        channel_count: usize,
        sample_rate: u32,
    ) -> Result<Self> {
        if channel_count == 0 {
            return Err(Error::InvalidInput("audio has no channels".to_string()));
        }
        let frames = samples.len() / channel_count;
        let mut channels = vec![Vec::with_capacity(frames); channel_count];
        for frame in samples.chunks_exact(channel_count) {
            for (channel, sample) in channels.iter_mut().zip(frame) {
                channel.push(*sample);
            }
        }
        Self::new(sample_rate, channels)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Samples per channel
    pub fn frames(&self) -> usize {
        self.channels[0].len()
    }

    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Same sample rate, channel count and frame count.
    pub fn same_shape(&self, other: &AudioBuffer) -> bool {
        self.sample_rate == other.sample_rate
            && self.channel_count() == other.channel_count()
            && self.frames() == other.frames()
    }

    /// Interleaved copy, frame-major.
    pub fn interleaved(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.frames() * self.channel_count());
        for i in 0..self.frames() {
            for channel in &self.channels {
                out.push(channel[i]);
            }
        }
        out
    }

    /// Largest absolute sample value across all channels.
    ///
    /// NaN samples are ignored by `f32::max`; callers that care check
    /// [`AudioBuffer::all_finite`] first.
    pub fn peak(&self) -> f32 {
        self.samples().fold(0.0f32, |peak, s| peak.max(s.abs()))
    }

    pub fn all_finite(&self) -> bool {
        self.samples().all(|s| s.is_finite())
    }

    /// Apply `f` to every sample in place.
    pub fn map_in_place(&mut self, f: impl Fn(f32) -> f32) {
        for channel in &mut self.channels {
            for sample in channel.iter_mut() {
                *sample = f(*sample);
            }
        }
    }

    /// Element-wise sum of equally shaped buffers.
    pub fn sum(buffers: &[&AudioBuffer]) -> Result<AudioBuffer> {
        let (first, rest) = buffers
            .split_first()
            .ok_or_else(|| Error::InvalidInput("nothing to sum".to_string()))?;

        let mut total = (*first).clone();
        for buffer in rest {
            if !total.same_shape(buffer) {
                return Err(Error::InvalidInput(format!(
                    "cannot sum buffers of different shape ({}ch x {} @ {}Hz vs {}ch x {} @ {}Hz)",
                    total.channel_count(),
                    total.frames(),
                    total.sample_rate(),
                    buffer.channel_count(),
                    buffer.frames(),
                    buffer.sample_rate(),
                )));
            }
            for (acc, add) in total.channels.iter_mut().zip(&buffer.channels) {
                for (a, b) in acc.iter_mut().zip(add) {
                    *a += *b;
                }
            }
        }
        Ok(total)
    }

    fn samples(&self) -> impl Iterator<Item = f32> + '_ {
        self.channels.iter().flat_map(|c| c.iter().copied())
    }
}
