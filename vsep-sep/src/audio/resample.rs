//! Shape conformance using rubato
//!
//! External models may hand back stems at their own native rate and channel
//! layout (demucs always produces 44.1 kHz stereo). [`conform`] brings such a
//! buffer back to the shape of the mix it came from.

use super::AudioBuffer;
use rubato::{FastFixedIn, PolynomialDegree, Resampler as RubatoResampler};
use tracing::debug;
use vsep_common::{Error, Result};

/// Resample, remix and pad/truncate `buffer` to match `target`'s shape.
pub fn conform(buffer: AudioBuffer, target: &AudioBuffer) -> Result<AudioBuffer> {
    if buffer.same_shape(target) {
        return Ok(buffer);
    }

    let resampled = resample(buffer, target.sample_rate())?;
    let remixed = remix(resampled, target.channel_count())?;
    fit_frames(remixed, target.frames())
}

/// Resample every channel to `output_rate`.
pub fn resample(buffer: AudioBuffer, output_rate: u32) -> Result<AudioBuffer> {
    let input_rate = buffer.sample_rate();
    if input_rate == output_rate {
        return Ok(buffer);
    }

    debug!(
        "Resampling from {}Hz to {}Hz ({} channels)",
        input_rate,
        output_rate,
        buffer.channel_count()
    );

    let mut resampler = FastFixedIn::<f32>::new(
        output_rate as f64 / input_rate as f64,
        1.0,
        PolynomialDegree::Septic,
        buffer.frames(),
        buffer.channel_count(),
    )
    .map_err(|e| Error::Decode(format!("Failed to create resampler: {}", e)))?;

    let planar_output = resampler
        .process(buffer.channels(), None)
        .map_err(|e| Error::Decode(format!("Resampling failed: {}", e)))?;

    AudioBuffer::new(output_rate, planar_output)
}

/// Convert to `channel_count` channels.
///
/// Downmixing to mono averages all channels; other changes repeat or drop
/// channels in order.
pub fn remix(buffer: AudioBuffer, channel_count: usize) -> Result<AudioBuffer> {
    let current = buffer.channel_count();
    if current == channel_count {
        return Ok(buffer);
    }
    if channel_count == 0 {
        return Err(Error::InvalidInput("cannot remix to zero channels".to_string()));
    }

    let channels: Vec<Vec<f32>> = if channel_count == 1 {
        let frames = buffer.frames();
        let mut mono = vec![0.0f32; frames];
        for channel in buffer.channels() {
            for (acc, s) in mono.iter_mut().zip(channel) {
                *acc += *s / current as f32;
            }
        }
        vec![mono]
    } else {
        (0..channel_count)
            .map(|i| buffer.channels()[i % current].clone())
            .collect()
    };

    AudioBuffer::new(buffer.sample_rate(), channels)
}

/// Zero-pad or truncate every channel to exactly `frames`.
pub fn fit_frames(buffer: AudioBuffer, frames: usize) -> Result<AudioBuffer> {
    if buffer.frames() == frames {
        return Ok(buffer);
    }
    let rate = buffer.sample_rate();
    let channels = buffer
        .channels()
        .iter()
        .map(|c| {
            let mut c = c.clone();
            c.resize(frames, 0.0);
            c
        })
        .collect();
    AudioBuffer::new(rate, channels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remix_stereo_to_mono_averages() {
        let stereo = AudioBuffer::new(100, vec![vec![0.5, 1.0], vec![0.25, 0.0]]).unwrap();
        let mono = remix(stereo, 1).unwrap();
        assert_eq!(mono.channels(), &[vec![0.375, 0.5]]);
    }

    #[test]
    fn test_remix_mono_to_stereo_duplicates() {
        let mono = AudioBuffer::new(100, vec![vec![0.5, -0.5]]).unwrap();
        let stereo = remix(mono, 2).unwrap();
        assert_eq!(stereo.channels()[0], stereo.channels()[1]);
    }

    #[test]
    fn test_fit_frames_pads_and_truncates() {
        let buf = AudioBuffer::new(100, vec![vec![1.0, 1.0, 1.0]]).unwrap();
        assert_eq!(
            fit_frames(buf.clone(), 5).unwrap().channels()[0],
            vec![1.0, 1.0, 1.0, 0.0, 0.0]
        );
        assert_eq!(fit_frames(buf, 2).unwrap().channels()[0], vec![1.0, 1.0]);
    }

    #[test]
    fn test_conform_matches_target_shape() {
        let stem = AudioBuffer::new(44100, vec![vec![0.1; 4410], vec![0.1; 4410]]).unwrap();
        let target = AudioBuffer::new(22050, vec![vec![0.0; 2205]]).unwrap();

        let out = conform(stem, &target).unwrap();
        assert!(out.same_shape(&target));
    }

    #[test]
    fn test_conform_same_shape_is_identity() {
        let stem = AudioBuffer::new(8000, vec![vec![0.3; 10]]).unwrap();
        let out = conform(stem.clone(), &stem).unwrap();
        assert_eq!(out, stem);
    }
}
