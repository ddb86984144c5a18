//! Synchronous external tool invocation
//!
//! ffmpeg, yt-dlp and demucs are all driven as child processes. The call
//! blocks until the process exits; a non-zero exit becomes [`Error::Tool`]
//! carrying the exit code and captured stderr.

use crate::{Error, Result};
use std::ffi::OsStr;
use std::process::Command;
use tracing::debug;

/// Captured output of a successful tool run
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Run `program` with `args` and wait for it to finish.
pub fn run_tool<I, S>(program: &str, args: I) -> Result<ToolOutput>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let args: Vec<S> = args.into_iter().collect();
    debug!(
        tool = program,
        args = ?args.iter().map(|a| a.as_ref().to_string_lossy().into_owned()).collect::<Vec<_>>(),
        "Running external tool"
    );

    let output = Command::new(program).args(&args).output().map_err(|e| {
        let stderr = if e.kind() == std::io::ErrorKind::NotFound {
            format!("{} not found in PATH", program)
        } else {
            format!("failed to start: {}", e)
        };
        Error::Tool {
            tool: program.to_string(),
            code: None,
            stderr,
        }
    })?;

    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if !output.status.success() {
        return Err(Error::Tool {
            tool: program.to_string(),
            code: output.status.code(),
            stderr,
        });
    }

    Ok(ToolOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr,
    })
}
