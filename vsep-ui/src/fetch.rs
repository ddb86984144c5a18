//! Remote media fetching
//!
//! Links are resolved by `yt-dlp`, which downloads the best audio stream and
//! converts it to WAV inside the caller's directory.

use std::path::{Path, PathBuf};

use tracing::info;
use vsep_common::config::ToolsSection;
use vsep_common::tool::run_tool;
use vsep_common::{Error, Result};

/// A downloaded audio file and its human-readable title
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedMedia {
    pub path: PathBuf,
    pub title: String,
}

/// Downloads the audio behind a link into a directory the caller owns
pub trait MediaFetcher: Send + Sync {
    fn fetch(&self, url: &str, dest_dir: &Path) -> Result<FetchedMedia>;
}

/// `yt-dlp` command-line fetcher
#[derive(Debug, Clone)]
pub struct YtDlpFetcher {
    program: String,
}

impl YtDlpFetcher {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn from_config(tools: &ToolsSection) -> Self {
        Self::new(tools.ytdlp.clone())
    }

    fn args(url: &str, dest_dir: &Path) -> Vec<String> {
        let template = dest_dir.join("%(id)s.%(ext)s");
        vec![
            "--no-playlist".to_string(),
            "--no-progress".to_string(),
            "-x".to_string(),
            "--audio-format".to_string(),
            "wav".to_string(),
            "-o".to_string(),
            template.to_string_lossy().into_owned(),
            "--no-simulate".to_string(),
            "--print".to_string(),
            "after_move:%(title)s\t%(filepath)s".to_string(),
            url.to_string(),
        ]
    }
}

/// Parse the `title<TAB>filepath` line printed after post-processing.
///
/// Only the last non-empty line counts; earlier lines may be warnings.
fn parse_printed(stdout: &str) -> Option<FetchedMedia> {
    let line = stdout.lines().rev().find(|l| !l.trim().is_empty())?;
    let (title, path) = line.rsplit_once('\t')?;
    let path = path.trim();
    if path.is_empty() {
        return None;
    }
    Some(FetchedMedia {
        path: PathBuf::from(path),
        title: title.trim().to_string(),
    })
}

impl MediaFetcher for YtDlpFetcher {
    fn fetch(&self, url: &str, dest_dir: &Path) -> Result<FetchedMedia> {
        if url.trim().is_empty() {
            return Err(Error::InvalidInput("Empty link".to_string()));
        }

        info!(url = %url, "Fetching audio from link");
        let output = run_tool(&self.program, Self::args(url, dest_dir))?;

        let media = parse_printed(&output.stdout).ok_or_else(|| Error::Tool {
            tool: self.program.clone(),
            code: Some(0),
            stderr: format!("could not determine downloaded file for {}", url),
        })?;
        if !media.path.exists() {
            return Err(Error::NotFound(format!(
                "Downloaded file missing: {}",
                media.path.display()
            )));
        }

        info!(title = %media.title, path = %media.path.display(), "Fetched audio");
        Ok(media)
    }
}
