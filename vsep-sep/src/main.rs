//! vsep-sep - batch vocal/melody separation
//!
//! Separates one audio file into `{base}_vocals.wav` and `{base}_melody.wav`
//! next to the input. Exits 0 on success and 1 on any error.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use vsep_common::config::load_config;
use vsep_sep::{DemucsCli, Separator};

/// Command-line arguments for vsep-sep
#[derive(Parser, Debug)]
#[command(name = "vsep-sep")]
#[command(about = "Separate vocals and melody from a song")]
#[command(version)]
struct Args {
    /// Path to the input audio file
    input_file: PathBuf,

    /// Base name for output files (default: input filename without extension)
    #[arg(long)]
    output: Option<String>,

    /// Config file (default: $VSEP_CONFIG, then ~/.config/vsep/vsep.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Pretrained model name passed to demucs
    #[arg(long, env = "VSEP_MODEL")]
    model: Option<String>,

    /// Compute device passed to demucs (cpu, cuda, mps)
    #[arg(long, env = "VSEP_DEVICE")]
    device: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let loaded = load_config(args.config.as_deref());

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| loaded.config.log_level.as_str().into()),
        )
        .init();
    loaded.log_source();

    let mut config = loaded.config;
    if let Some(model) = args.model {
        config.model.name = model;
    }
    if let Some(device) = args.device {
        config.model.device = device;
    }

    let model = DemucsCli::from_config(&config.tools, &config.model);
    let separator = Separator::new(Arc::new(model));

    let outputs = separator
        .separate(&args.input_file, args.output.as_deref())
        .with_context(|| format!("Failed to separate {}", args.input_file.display()))?;

    info!("Saved vocals to: {}", outputs.vocals.display());
    info!("Saved melody to: {}", outputs.melody.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_positional_and_output() {
        let args = Args::try_parse_from(["vsep-sep", "song.mp3", "--output", "take one"]).unwrap();
        assert_eq!(args.input_file, PathBuf::from("song.mp3"));
        assert_eq!(args.output.as_deref(), Some("take one"));
    }

    #[test]
    fn test_args_require_input() {
        assert!(Args::try_parse_from(["vsep-sep"]).is_err());
    }
}
