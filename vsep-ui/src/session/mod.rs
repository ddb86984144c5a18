//! Per-user interactive session
//!
//! A session remembers what the user last submitted (upload identity and
//! link), the staged source file, and the results of the last successful
//! separation. All temp files hang off `TempDir` values owned here, so
//! replacing or dropping the state removes them.

pub mod controller;
pub mod store;

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tempfile::TempDir;
use vsep_common::Segment;

pub use controller::{Action, Interaction, Outcome, SessionController, Upload};
pub use store::{SessionStore, SESSION_COOKIE};

/// Upload formats accepted from the form
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["wav", "mp3", "m4a", "flac"];

/// Session processing phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Downloading,
    Ready,
    Trimming,
    Separating,
    Done,
    Error,
}

impl Phase {
    /// Status line text shown on the page
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Idle => "Waiting for a file or link",
            Phase::Downloading => "Downloading audio...",
            Phase::Ready => "Ready to separate",
            Phase::Trimming => "Trimming segment...",
            Phase::Separating => "Separating vocals and melody...",
            Phase::Done => "Separation complete",
            Phase::Error => "Error",
        }
    }
}

/// Identity of an uploaded file: name, size and content digest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadIdentity {
    pub name: String,
    pub size: usize,
    pub digest: String,
}

impl UploadIdentity {
    pub fn of(name: &str, bytes: &[u8]) -> Self {
        let digest = Sha256::digest(bytes)
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect();
        Self {
            name: name.to_string(),
            size: bytes.len(),
            digest,
        }
    }
}

/// Where a staged source came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOrigin {
    Upload(UploadIdentity),
    Link(String),
}

/// Local audio file the session will separate
#[derive(Debug)]
pub struct StagedSource {
    /// Owns the staged file; deleted on drop
    _dir: TempDir,
    pub path: PathBuf,
    /// Name shown on the page (upload file name or link title)
    pub display_name: String,
    /// Unsanitized base for result file names
    pub base_hint: String,
    pub duration_secs: u32,
    pub origin: SourceOrigin,
}

impl StagedSource {
    pub fn new(
        dir: TempDir,
        path: PathBuf,
        display_name: impl Into<String>,
        base_hint: impl Into<String>,
        duration_secs: u32,
        origin: SourceOrigin,
    ) -> Self {
        Self {
            _dir: dir,
            path,
            display_name: display_name.into(),
            base_hint: base_hint.into(),
            duration_secs,
            origin,
        }
    }

    /// Lowercase file extension of the staged file, `wav` when absent
    pub fn extension(&self) -> String {
        extension_of(&self.path).unwrap_or_else(|| "wav".to_string())
    }

    /// True when this source still corresponds to the submitted inputs.
    ///
    /// An upload always wins over a link, so a link source only matches when
    /// no upload is present.
    pub fn matches(&self, upload: Option<&UploadIdentity>, link: &str) -> bool {
        match &self.origin {
            SourceOrigin::Upload(id) => upload == Some(id),
            SourceOrigin::Link(url) => upload.is_none() && url == link,
        }
    }
}

/// Lowercase extension of a path, if any
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// In-memory result file
#[derive(Debug, Clone)]
pub struct TrackBytes {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Tracks a result can be served as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Vocals,
    Melody,
    Original,
}

impl TrackKind {
    pub const ALL: [TrackKind; 3] = [TrackKind::Vocals, TrackKind::Melody, TrackKind::Original];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "vocals" => Some(TrackKind::Vocals),
            "melody" => Some(TrackKind::Melody),
            "original" => Some(TrackKind::Original),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrackKind::Vocals => "vocals",
            TrackKind::Melody => "melody",
            TrackKind::Original => "original",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            TrackKind::Vocals => "Vocals",
            TrackKind::Melody => "Melody",
            TrackKind::Original => "Original",
        }
    }
}

/// Outputs of the last successful separation
#[derive(Debug, Clone)]
pub struct SeparationResults {
    pub base_name: String,
    pub segment: Segment,
    pub vocals: TrackBytes,
    pub melody: TrackBytes,
    pub original: TrackBytes,
}

impl SeparationResults {
    pub fn track(&self, kind: TrackKind) -> &TrackBytes {
        match kind {
            TrackKind::Vocals => &self.vocals,
            TrackKind::Melody => &self.melody,
            TrackKind::Original => &self.original,
        }
    }
}

/// MIME type for a served audio file extension
pub fn content_type_for(extension: &str) -> &'static str {
    match extension {
        "wav" => "audio/wav",
        "mp3" => "audio/mpeg",
        "m4a" => "audio/mp4",
        "flac" => "audio/flac",
        _ => "application/octet-stream",
    }
}

/// Everything one user's session remembers between interactions
#[derive(Debug, Default)]
pub struct SessionState {
    pub(crate) phase: Phase,
    pub(crate) separating: bool,
    pub(crate) separation_done: bool,
    pub(crate) last_upload: Option<UploadIdentity>,
    pub(crate) last_link: String,
    /// Last link a fetch was attempted for; failed fetches are not retried
    pub(crate) fetch_attempted: Option<String>,
    pub(crate) source: Option<StagedSource>,
    pub(crate) results: Option<SeparationResults>,
    pub(crate) last_error: Option<String>,
    pub(crate) start_text: String,
    pub(crate) end_text: String,
}

impl SessionState {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_separating(&self) -> bool {
        self.separating
    }

    pub fn separation_done(&self) -> bool {
        self.separation_done
    }

    pub fn source(&self) -> Option<&StagedSource> {
        self.source.as_ref()
    }

    pub fn results(&self) -> Option<&SeparationResults> {
        self.results.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn link(&self) -> &str {
        &self.last_link
    }

    pub fn start_text(&self) -> &str {
        &self.start_text
    }

    pub fn end_text(&self) -> &str {
        &self.end_text
    }

    /// Separate is offered only for a staged source that has not been
    /// separated yet and is not being separated now.
    pub fn separate_enabled(&self) -> bool {
        self.source.is_some() && !self.separating && !self.separation_done
    }

    /// Forget progress tied to the previous inputs.
    pub(crate) fn clear_progress(&mut self) {
        self.phase = Phase::Idle;
        self.separating = false;
        self.separation_done = false;
        self.results = None;
        self.last_error = None;
    }

    pub(crate) fn fail(&mut self, message: impl Into<String>) {
        self.phase = Phase::Error;
        self.last_error = Some(message.into());
    }
}
