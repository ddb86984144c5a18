//! demucs command line backend
//!
//! Hands the mix to `demucs` as a float WAV in a scratch directory and reads
//! the four stem files back. demucs writes `OUT/<model>/<track>/<stem>.wav`
//! at its own native rate and channel count, so stems are conformed back to
//! the mix shape before being returned.

use super::{SeparationModel, StemKind, StemSet};
use crate::audio::{decode_file, resample::conform, write_wav_f32, AudioBuffer};
use std::path::{Path, PathBuf};
use tracing::info;
use vsep_common::config::{ModelSection, ToolsSection};
use vsep_common::tool::run_tool;
use vsep_common::{Error, Result};

/// File stem of the mix handed to demucs (names the per-track output folder)
const MIX_STEM: &str = "mix";

/// Separation via the demucs CLI
#[derive(Debug, Clone)]
pub struct DemucsCli {
    program: String,
    model_name: String,
    device: String,
}

impl DemucsCli {
    pub fn new(
        program: impl Into<String>,
        model_name: impl Into<String>,
        device: impl Into<String>,
    ) -> Self {
        Self {
            program: program.into(),
            model_name: model_name.into(),
            device: device.into(),
        }
    }

    pub fn from_config(tools: &ToolsSection, model: &ModelSection) -> Self {
        Self::new(&tools.demucs, &model.name, &model.device)
    }

    fn command_args(&self, mix_path: &Path, out_dir: &Path) -> Vec<String> {
        vec![
            "-n".to_string(),
            self.model_name.clone(),
            "-d".to_string(),
            self.device.clone(),
            "-o".to_string(),
            out_dir.display().to_string(),
            mix_path.display().to_string(),
        ]
    }

    fn stem_path(&self, out_dir: &Path, kind: StemKind) -> PathBuf {
        out_dir
            .join(&self.model_name)
            .join(MIX_STEM)
            .join(format!("{}.wav", kind.short_name()))
    }

    fn read_stem(&self, out_dir: &Path, kind: StemKind, mix: &AudioBuffer) -> Result<AudioBuffer> {
        let path = self.stem_path(out_dir, kind);
        if !path.exists() {
            return Err(Error::Model(format!(
                "{} did not produce {}",
                self.program,
                path.display()
            )));
        }
        conform(decode_file(&path)?, mix)
    }
}

impl SeparationModel for DemucsCli {
    fn name(&self) -> &str {
        &self.model_name
    }

    fn apply(&self, mix: &AudioBuffer) -> Result<StemSet> {
        // Dropped (and deleted) on every return path
        let scratch = tempfile::Builder::new().prefix("vsep-demucs-").tempdir()?;
        let mix_path = scratch.path().join(format!("{}.wav", MIX_STEM));
        let out_dir = scratch.path().join("separated");

        write_wav_f32(&mix_path, mix)?;

        info!(
            model = %self.model_name,
            device = %self.device,
            frames = mix.frames(),
            "Running demucs"
        );
        run_tool(&self.program, self.command_args(&mix_path, &out_dir))?;

        let stems = [
            self.read_stem(&out_dir, StemKind::Drums, mix)?,
            self.read_stem(&out_dir, StemKind::Bass, mix)?,
            self.read_stem(&out_dir, StemKind::Other, mix)?,
            self.read_stem(&out_dir, StemKind::Vocals, mix)?,
        ];
        StemSet::new(mix, stems)
    }
}
