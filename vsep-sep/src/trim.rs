//! Segment trimming via ffmpeg
//!
//! Extracts `[start, start + duration)` of an input file into a new file.
//! Same-container trims use stream copy; anything else is re-encoded by
//! ffmpeg with the output container's default codec.

use std::path::Path;
use tracing::info;
use vsep_common::config::ToolsSection;
use vsep_common::tool::run_tool;
use vsep_common::{Error, Result};

/// Containers ffmpeg can stream-copy into themselves without re-encoding
const COPY_SAFE_EXTENSIONS: &[&str] = &["wav", "flac", "mp3", "m4a", "aac", "ogg", "opus"];

/// Extracts a time range of an audio file into a new file
pub trait Trimmer: Send + Sync {
    fn trim(
        &self,
        input: &Path,
        output: &Path,
        start_secs: u32,
        duration_secs: u32,
    ) -> Result<()>;
}

/// How the trimmed audio is produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrimMode {
    /// `-c copy`, no re-encoding
    StreamCopy,
    /// Let ffmpeg encode with the output container's default codec
    Reencode,
}

impl TrimMode {
    pub fn for_paths(input: &Path, output: &Path) -> Self {
        let ext = |p: &Path| {
            p.extension()
                .and_then(|e| e.to_str())
                .map(|e| e.to_ascii_lowercase())
        };
        match (ext(input), ext(output)) {
            (Some(a), Some(b)) if a == b && COPY_SAFE_EXTENSIONS.contains(&a.as_str()) => {
                TrimMode::StreamCopy
            }
            _ => TrimMode::Reencode,
        }
    }
}

/// [`Trimmer`] backed by the ffmpeg binary
#[derive(Debug, Clone)]
pub struct FfmpegTrimmer {
    program: String,
}

impl FfmpegTrimmer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn from_config(tools: &ToolsSection) -> Self {
        Self::new(&tools.ffmpeg)
    }

    fn command_args(
        input: &Path,
        output: &Path,
        start_secs: u32,
        duration_secs: u32,
    ) -> Vec<String> {
        let mut args = vec![
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-y".to_string(),
            "-ss".to_string(),
            start_secs.to_string(),
            "-t".to_string(),
            duration_secs.to_string(),
            "-i".to_string(),
            input.display().to_string(),
        ];
        if TrimMode::for_paths(input, output) == TrimMode::StreamCopy {
            args.push("-c".to_string());
            args.push("copy".to_string());
        }
        args.push(output.display().to_string());
        args
    }
}

impl Trimmer for FfmpegTrimmer {
    fn trim(&self, input: &Path, output: &Path, start_secs: u32, duration_secs: u32) -> Result<()> {
        if duration_secs == 0 {
            return Err(Error::InvalidInput("trim duration must be positive".to_string()));
        }

        info!(
            input = %input.display(),
            output = %output.display(),
            start_secs,
            duration_secs,
            "Trimming segment"
        );
        run_tool(
            &self.program,
            Self::command_args(input, output, start_secs, duration_secs),
        )?;
        Ok(())
    }
}
