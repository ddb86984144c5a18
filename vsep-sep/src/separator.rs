//! Separation orchestration
//!
//! One call decodes the input, runs the model once on the full mix, derives
//! the vocals and melody tracks, post-processes both and writes them next to
//! the input. The call is all-or-nothing: any failure is logged and returned,
//! and nothing is retried.

use crate::audio::{decode_file, enhance, write_wav_pcm16, AudioBuffer};
use crate::model::SeparationModel;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};
use vsep_common::naming::{output_base_for, track_file_name};
use vsep_common::Result;

/// Paths written by one separation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeparationOutputs {
    /// Sanitized base name both files share
    pub base_name: String,
    pub vocals: PathBuf,
    pub melody: PathBuf,
}

/// Vocals/melody separator around a pretrained model
#[derive(Clone)]
pub struct Separator {
    model: Arc<dyn SeparationModel>,
}

impl Separator {
    pub fn new(model: Arc<dyn SeparationModel>) -> Self {
        Self { model }
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Separate `input` into `{base}_vocals.wav` and `{base}_melody.wav`.
    ///
    /// `output_base` defaults to the input file stem; either way it is
    /// sanitized. Outputs go to the input's directory (created if missing)
    /// as 16-bit PCM at the input sample rate.
    pub fn separate(&self, input: &Path, output_base: Option<&str>) -> Result<SeparationOutputs> {
        self.run(input, output_base).map_err(|e| {
            error!(input = %input.display(), "Separation failed: {}", e);
            e
        })
    }

    fn run(&self, input: &Path, output_base: Option<&str>) -> Result<SeparationOutputs> {
        let base_name = output_base_for(input, output_base);

        let input_abs = if input.is_absolute() {
            input.to_path_buf()
        } else {
            std::env::current_dir()?.join(input)
        };
        let output_dir = input_abs
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        std::fs::create_dir_all(&output_dir)?;

        let vocals_path = output_dir.join(track_file_name(&base_name, "vocals"));
        let melody_path = output_dir.join(track_file_name(&base_name, "melody"));

        let mix = decode_file(input)?;
        info!(
            input = %input.display(),
            sample_rate = mix.sample_rate(),
            channels = mix.channel_count(),
            seconds = mix.duration_secs(),
            "Decoded mix"
        );

        info!(model = self.model.name(), "Separating vocals...");
        let stems = self.model.apply(&mix)?;

        info!("Separating melody (everything except vocals)...");
        let vocals = stems.vocals().clone();
        let melody = stems.melody()?;

        let vocals = finish_track("vocals", vocals);
        let melody = finish_track("melody", melody);

        write_wav_pcm16(&vocals_path, &vocals)?;
        write_wav_pcm16(&melody_path, &melody)?;

        info!(
            vocals = %vocals_path.display(),
            melody = %melody_path.display(),
            "Done!"
        );

        Ok(SeparationOutputs {
            base_name,
            vocals: vocals_path,
            melody: melody_path,
        })
    }
}

fn finish_track(track: &str, buffer: AudioBuffer) -> AudioBuffer {
    let result = enhance(buffer);
    if result.is_fallback() {
        warn!(track, "Writing {} track without post-processing", track);
    }
    result.into_buffer()
}
