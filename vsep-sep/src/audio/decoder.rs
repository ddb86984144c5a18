//! Audio decoder using symphonia
//!
//! Decodes WAV, MP3, M4A/AAC and FLAC input into an [`AudioBuffer`].

use super::AudioBuffer;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};
use vsep_common::{Error, Result};

/// Open and probe a media file, returning its format reader.
fn open_format(path: &Path) -> Result<Box<dyn FormatReader>> {
    let file = std::fs::File::open(path)
        .map_err(|e| Error::Decode(format!("Failed to open file {}: {}", path.display(), e)))?;

    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    // Create a hint to help the format registry guess the format
    let mut hint = Hint::new();
    if let Some(ext_str) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext_str);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| Error::Decode(format!("Failed to probe format: {}", e)))?;

    Ok(probed.format)
}

/// Decode an entire audio file.
///
/// Mono and multi-channel sources both come back in (channels, frames) layout.
///
/// # Errors
/// - Failed to open file
/// - Unsupported audio format
/// - No decodable audio track, or the track decoded to nothing
pub fn decode_file(path: &Path) -> Result<AudioBuffer> {
    debug!("Decoding entire file: {}", path.display());

    let mut format = open_format(path)?;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| Error::Decode("No audio track found".to_string()))?;

    let track_id = track.id;
    let codec_params = track.codec_params.clone();

    let mut sample_rate = codec_params.sample_rate.unwrap_or(0);
    let mut channels = codec_params.channels.map(|c| c.count()).unwrap_or(0);

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| Error::Decode(format!("Failed to create decoder: {}", e)))?;

    let mut samples: Vec<f32> = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                debug!("Reached end of file");
                break;
            }
            Err(e) => {
                warn!("Error reading packet: {}", e);
                break;
            }
        };

        // Skip packets for other tracks
        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                sample_rate = spec.rate;
                channels = spec.channels.count();

                let buf = sample_buf.get_or_insert_with(|| {
                    SampleBuffer::<f32>::new(decoded.capacity() as u64, spec)
                });
                if buf.capacity() < decoded.capacity() * channels {
                    *buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                }
                buf.copy_interleaved_ref(decoded);
                samples.extend_from_slice(buf.samples());
            }
            Err(SymphoniaError::DecodeError(e)) => {
                warn!("Decode error: {}", e);
                continue;
            }
            Err(e) => {
                return Err(Error::Decode(format!("Decoder failed: {}", e)));
            }
        }
    }

    if samples.is_empty() || channels == 0 || sample_rate == 0 {
        return Err(Error::Decode(format!(
            "No audio decoded from {}",
            path.display()
        )));
    }

    debug!(
        "Decoded {} frames, sample_rate={}, channels={}",
        samples.len() / channels,
        sample_rate,
        channels
    );

    AudioBuffer::from_interleaved(&samples, channels, sample_rate)
}

/// Track duration in whole seconds (rounded down).
///
/// Uses container metadata when available and falls back to a full decode.
pub fn probe_duration_secs(path: &Path) -> Result<u32> {
    let format = open_format(path)?;
    let params = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .map(|t| t.codec_params.clone())
        .ok_or_else(|| Error::Decode("No audio track found".to_string()))?;

    if let (Some(frames), Some(rate)) = (params.n_frames, params.sample_rate) {
        if rate > 0 {
            return Ok((frames / rate as u64) as u32);
        }
    }

    debug!("No frame count in container, decoding {} for duration", path.display());
    let buffer = decode_file(path)?;
    Ok(buffer.duration_secs().floor() as u32)
}
