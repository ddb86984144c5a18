//! Output track post-processing
//!
//! Peak-normalizes a track to 1.0 and then hard-clips it to ±[`CLIP_LEVEL`]
//! so the written file cannot clip again downstream.
//!
//! Post-processing fails open: a track that cannot be processed is handed
//! back unmodified (and the reason logged) instead of failing the separation.

use super::AudioBuffer;
use tracing::warn;

/// Absolute sample ceiling after post-processing
pub const CLIP_LEVEL: f32 = 0.9;

/// Outcome of [`enhance`]
#[derive(Debug, Clone, PartialEq)]
pub enum PostProcessed {
    /// Normalized and clipped track
    Processed(AudioBuffer),
    /// Processing was not possible; the original track is returned untouched
    Fallback {
        original: AudioBuffer,
        reason: String,
    },
}

impl PostProcessed {
    /// The buffer to write, whichever branch was taken.
    pub fn into_buffer(self) -> AudioBuffer {
        match self {
            PostProcessed::Processed(buffer) => buffer,
            PostProcessed::Fallback { original, .. } => original,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, PostProcessed::Fallback { .. })
    }
}

/// Normalize to unit peak, then clip to ±[`CLIP_LEVEL`].
///
/// A silent track (peak 0) skips normalization. A track containing NaN or
/// infinite samples cannot be normalized and falls back to the original.
pub fn enhance(buffer: AudioBuffer) -> PostProcessed {
    if !buffer.all_finite() {
        let reason = "track contains non-finite samples".to_string();
        warn!("Post-processing skipped: {}", reason);
        return PostProcessed::Fallback {
            original: buffer,
            reason,
        };
    }

    let mut processed = buffer;
    let peak = processed.peak();
    if peak > 0.0 {
        processed.map_in_place(|s| s / peak);
    }
    processed.map_in_place(|s| s.clamp(-CLIP_LEVEL, CLIP_LEVEL));

    PostProcessed::Processed(processed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(channels: Vec<Vec<f32>>) -> AudioBuffer {
        AudioBuffer::new(44100, channels).unwrap()
    }

    #[test]
    fn test_peak_never_exceeds_clip_level() {
        let inputs = vec![
            buffer(vec![vec![0.01, -0.02, 0.005]]),
            buffer(vec![vec![3.0, -7.5, 2.0], vec![0.1, 0.2, -0.3]]),
            buffer(vec![vec![1.0; 16], vec![-1.0; 16]]),
            buffer(vec![vec![0.95, 0.5, -0.2]]),
        ];

        for input in inputs {
            let out = enhance(input).into_buffer();
            assert!(out.peak() <= CLIP_LEVEL, "peak {}", out.peak());
        }
    }

    #[test]
    fn test_normalizes_before_clipping() {
        let out = enhance(buffer(vec![vec![0.2, -0.1, 0.05]])).into_buffer();
        // 0.2 is the peak: becomes 1.0, then clipped to 0.9
        assert_eq!(out.channels()[0][0], CLIP_LEVEL);
        assert!((out.channels()[0][1] + 0.5).abs() < 1e-6);
        assert!((out.channels()[0][2] - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_shape_is_preserved() {
        let input = buffer(vec![vec![0.3; 10], vec![-0.6; 10]]);
        let out = enhance(input.clone()).into_buffer();
        assert!(out.same_shape(&input));
    }

    #[test]
    fn test_silent_track_stays_silent() {
        let result = enhance(buffer(vec![vec![0.0; 8], vec![0.0; 8]]));
        assert!(!result.is_fallback());
        let out = result.into_buffer();
        assert!(out.channels().iter().flatten().all(|s| *s == 0.0));
    }

    #[test]
    fn test_non_finite_samples_fall_back_to_original() {
        let input = buffer(vec![vec![0.5, f32::NAN, 0.25]]);
        let result = enhance(input.clone());
        match &result {
            PostProcessed::Fallback { original, reason } => {
                assert_eq!(original.channels()[0][0], 0.5);
                assert!(original.channels()[0][1].is_nan());
                assert!(reason.contains("non-finite"));
            }
            other => panic!("expected fallback, got {:?}", other),
        }
        assert!(result.is_fallback());
    }
}
