//! Session interaction state machine
//!
//! One call to [`SessionController::handle`] processes one form submission:
//! reset, change detection, source acquisition, then the requested action.
//! Everything here blocks; the web layer runs it on the blocking pool.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{error, info, warn};
use vsep_common::naming::{sanitize_filename, track_file_name};
use vsep_common::{Result, Segment};
use vsep_sep::audio::probe_duration_secs;
use vsep_sep::{Separator, Trimmer};

use super::{
    content_type_for, extension_of, Phase, SeparationResults, SessionState, SourceOrigin,
    StagedSource, TrackBytes, UploadIdentity, SUPPORTED_EXTENSIONS,
};
use crate::fetch::MediaFetcher;

/// A newly uploaded file
#[derive(Debug, Clone)]
pub struct Upload {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Button pressed on the form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Action {
    /// Submit inputs without separating (also the fallback for unknown values)
    #[default]
    Refresh,
    Separate,
    Reset,
}

impl Action {
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "separate" => Action::Separate,
            "reset" => Action::Reset,
            _ => Action::Refresh,
        }
    }
}

/// One form submission
#[derive(Debug, Clone, Default)]
pub struct Interaction {
    pub upload: Option<Upload>,
    pub link: String,
    pub start: String,
    pub end: String,
    pub action: Action,
}

/// Result of handling an interaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// State was updated (possibly into the error phase)
    Updated,
    /// The action was not allowed; state is unchanged
    ActionRejected(String),
}

impl Outcome {
    pub fn notice(&self) -> Option<&str> {
        match self {
            Outcome::Updated => None,
            Outcome::ActionRejected(msg) => Some(msg),
        }
    }
}

/// Drives sessions through staging, trimming and separation
pub struct SessionController {
    separator: Separator,
    trimmer: Arc<dyn Trimmer>,
    fetcher: Arc<dyn MediaFetcher>,
}

impl SessionController {
    pub fn new(
        separator: Separator,
        trimmer: Arc<dyn Trimmer>,
        fetcher: Arc<dyn MediaFetcher>,
    ) -> Self {
        Self {
            separator,
            trimmer,
            fetcher,
        }
    }

    pub fn handle(&self, state: &mut SessionState, interaction: Interaction) -> Outcome {
        let Interaction {
            upload,
            link,
            start,
            end,
            action,
        } = interaction;

        if action == Action::Reset {
            info!("Session reset");
            *state = SessionState::default();
            return Outcome::Updated;
        }

        state.start_text = start;
        state.end_text = end;

        let link = link.trim().to_string();
        let new_identity = upload.as_ref().map(|u| UploadIdentity::of(&u.name, &u.bytes));
        let identity = new_identity.or_else(|| state.last_upload.clone());

        if identity != state.last_upload || link != state.last_link {
            info!(
                upload = ?identity.as_ref().map(|i| i.name.as_str()),
                link = %link,
                "Session inputs changed"
            );
            state.clear_progress();
            if let Some(source) = &state.source {
                if !source.matches(identity.as_ref(), &link) {
                    state.source = None;
                }
            }
            if link != state.last_link {
                state.fetch_attempted = None;
            }
            if state.source.is_some() {
                state.phase = Phase::Ready;
            }
            state.last_upload = identity.clone();
            state.last_link = link.clone();
        }

        self.acquire_source(state, upload, identity, &link);

        if action == Action::Separate {
            return self.separate(state);
        }
        Outcome::Updated
    }

    fn acquire_source(
        &self,
        state: &mut SessionState,
        upload: Option<Upload>,
        identity: Option<UploadIdentity>,
        link: &str,
    ) {
        if state.source.is_some() {
            return;
        }

        if let (Some(upload), Some(identity)) = (upload, identity.as_ref()) {
            match stage_upload(&upload, identity) {
                Ok(source) => {
                    info!(
                        file = %source.display_name,
                        duration_secs = source.duration_secs,
                        "Staged upload"
                    );
                    state.source = Some(source);
                    state.phase = Phase::Ready;
                }
                Err(message) => {
                    warn!(file = %upload.name, "Upload rejected: {}", message);
                    // Only staged uploads count as the current upload
                    state.last_upload = None;
                    state.fail(message);
                }
            }
            return;
        }

        if identity.is_some() || link.is_empty() {
            return;
        }
        if state.fetch_attempted.as_deref() == Some(link) {
            return;
        }

        state.fetch_attempted = Some(link.to_string());
        state.phase = Phase::Downloading;
        match self.fetch_link(link) {
            Ok(source) => {
                info!(
                    title = %source.display_name,
                    duration_secs = source.duration_secs,
                    "Staged download"
                );
                state.source = Some(source);
                state.phase = Phase::Ready;
            }
            Err(e) => {
                error!(link = %link, "Download failed: {}", e);
                state.fail(e.to_string());
            }
        }
    }

    fn fetch_link(&self, link: &str) -> Result<StagedSource> {
        let dir = tempfile::Builder::new().prefix("vsep-link-").tempdir()?;
        let media = self.fetcher.fetch(link, dir.path())?;
        let duration = probe_duration_secs(&media.path)?;
        let title = if media.title.is_empty() {
            "download".to_string()
        } else {
            media.title
        };
        Ok(StagedSource::new(
            dir,
            media.path,
            title.clone(),
            title,
            duration,
            SourceOrigin::Link(link.to_string()),
        ))
    }

    fn separate(&self, state: &mut SessionState) -> Outcome {
        if state.separating || state.separation_done {
            return Outcome::ActionRejected(
                "Already separated. Change the file or link to separate again.".to_string(),
            );
        }
        let Some(source) = state.source.as_ref() else {
            return Outcome::ActionRejected("Upload a file or enter a link first.".to_string());
        };

        let job = SeparationJob {
            path: source.path.clone(),
            base_hint: source.base_hint.clone(),
            extension: source.extension(),
            duration: source.duration_secs,
            segment: Segment::from_fields(&state.start_text, &state.end_text, source.duration_secs),
        };

        state.separating = true;
        state.last_error = None;
        let result = self.run_job(&job, &mut state.phase);
        state.separating = false;

        match result {
            Ok(results) => {
                info!(
                    base = %results.base_name,
                    start = results.segment.start,
                    end = results.segment.end,
                    "Separation finished"
                );
                state.results = Some(results);
                state.separation_done = true;
                state.phase = Phase::Done;
            }
            Err(e) => {
                error!("Separation failed: {}", e);
                state.fail(e.to_string());
            }
        }
        Outcome::Updated
    }

    fn run_job(&self, job: &SeparationJob, phase: &mut Phase) -> Result<SeparationResults> {
        let work = tempfile::Builder::new().prefix("vsep-run-").tempdir()?;
        let working = work.path().join(format!("input.{}", job.extension));

        if job.segment.is_full(job.duration) {
            std::fs::copy(&job.path, &working)?;
        } else {
            *phase = Phase::Trimming;
            info!(
                start = job.segment.start,
                end = job.segment.end,
                "Trimming segment"
            );
            self.trimmer
                .trim(&job.path, &working, job.segment.start, job.segment.duration())?;
        }

        *phase = Phase::Separating;
        let outputs = self.separator.separate(&working, Some(&job.base_hint))?;

        Ok(SeparationResults {
            vocals: read_track(&outputs.vocals)?,
            melody: read_track(&outputs.melody)?,
            original: TrackBytes {
                file_name: format!("{}.{}", outputs.base_name, job.extension),
                content_type: content_type_for(&job.extension),
                bytes: std::fs::read(&working)?,
            },
            base_name: outputs.base_name,
            segment: job.segment,
        })
    }
}

/// Inputs for one separation run, detached from the session borrow
struct SeparationJob {
    path: PathBuf,
    base_hint: String,
    extension: String,
    duration: u32,
    segment: Segment,
}

fn read_track(path: &Path) -> Result<TrackBytes> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| track_file_name("output", "track"));
    Ok(TrackBytes {
        file_name,
        content_type: "audio/wav",
        bytes: std::fs::read(path)?,
    })
}

/// Validate an upload and write it into a fresh temp dir.
///
/// Errors are user-facing messages.
fn stage_upload(
    upload: &Upload,
    identity: &UploadIdentity,
) -> std::result::Result<StagedSource, String> {
    let supported = extension_of(Path::new(&upload.name))
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()));
    if !supported {
        return Err(format!(
            "Unsupported file type for {}. Use one of: {}",
            upload.name,
            SUPPORTED_EXTENSIONS.join(", ")
        ));
    }

    let stage = || -> Result<StagedSource> {
        let dir = tempfile::Builder::new().prefix("vsep-upload-").tempdir()?;
        let path = dir.path().join(sanitize_filename(&upload.name));
        std::fs::write(&path, &upload.bytes)?;
        let duration = probe_duration_secs(&path)?;
        let base_hint = Path::new(&upload.name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(StagedSource::new(
            dir,
            path,
            upload.name.clone(),
            base_hint,
            duration,
            SourceOrigin::Upload(identity.clone()),
        ))
    };

    stage().map_err(|e| format!("Could not read {}: {}", upload.name, e))
}
