//! WAV output via hound

use super::AudioBuffer;
use hound::{SampleFormat, WavSpec, WavWriter};
use std::path::Path;
use vsep_common::{Error, Result};

fn encode_error(path: &Path, e: hound::Error) -> Error {
    Error::Encode(format!("{}: {}", path.display(), e))
}

fn spec_for(
    buffer: &AudioBuffer,
    bits_per_sample: u16,
    sample_format: SampleFormat,
) -> Result<WavSpec> {
    let channels = u16::try_from(buffer.channel_count())
        .map_err(|_| Error::Encode(format!("too many channels: {}", buffer.channel_count())))?;
    Ok(WavSpec {
        channels,
        sample_rate: buffer.sample_rate(),
        bits_per_sample,
        sample_format,
    })
}

/// Write `buffer` as 16-bit PCM WAV at its own sample rate.
///
/// Samples are clamped to [-1.0, 1.0] before quantization.
pub fn write_wav_pcm16(path: &Path, buffer: &AudioBuffer) -> Result<()> {
    let spec = spec_for(buffer, 16, SampleFormat::Int)?;
    let mut writer = WavWriter::create(path, spec).map_err(|e| encode_error(path, e))?;

    for sample in buffer.interleaved() {
        let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16;
        writer
            .write_sample(value)
            .map_err(|e| encode_error(path, e))?;
    }
    writer.finalize().map_err(|e| encode_error(path, e))?;
    Ok(())
}

/// Write `buffer` as 32-bit float WAV (lossless hand-off to external tools).
pub fn write_wav_f32(path: &Path, buffer: &AudioBuffer) -> Result<()> {
    let spec = spec_for(buffer, 32, SampleFormat::Float)?;
    let mut writer = WavWriter::create(path, spec).map_err(|e| encode_error(path, e))?;

    for sample in buffer.interleaved() {
        writer
            .write_sample(sample)
            .map_err(|e| encode_error(path, e))?;
    }
    writer.finalize().map_err(|e| encode_error(path, e))?;
    Ok(())
}
