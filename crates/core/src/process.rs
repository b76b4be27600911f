//! Process execution utilities
//!
//! Runs external build tools with inherited stdio, so long-running builds
//! stream their output straight to the terminal.

use crate::error::{Error, Result};
use std::ffi::OsStr;
use std::path::Path;
use std::process::{Command, Stdio};

/// Run a command in a specific directory, streaming its output.
///
/// Returns the exit code, or `-1` when the process was terminated by a signal.
pub fn run_command_streaming_in_dir<S: AsRef<str>>(
    program: impl AsRef<OsStr>,
    args: &[S],
    dir: &Path,
) -> Result<i32> {
    let program = program.as_ref();
    let name = program.to_string_lossy();
    let status = Command::new(program)
        .args(args.iter().map(AsRef::as_ref))
        .current_dir(dir)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::command_not_found(&name).with_source(e),
            _ => Error::process(format!("Failed to execute {}: {}", name, e)).with_source(e),
        })?;

    tracing::debug!(program = %name, code = ?status.code(), "process exited");

    Ok(status.code().unwrap_or(-1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[cfg(unix)]
    #[test]
    fn test_exit_code_is_reported() {
        let dir = std::env::temp_dir();
        assert_eq!(run_command_streaming_in_dir("true", &[] as &[&str], &dir).unwrap(), 0);
        assert_eq!(run_command_streaming_in_dir("sh", &["-c", "exit 3"], &dir).unwrap(), 3);
    }

    #[test]
    fn test_missing_program() {
        let dir = std::env::temp_dir();
        let err = run_command_streaming_in_dir("nonexistent_command_12345", &["x"], &dir)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::CommandNotFound);
    }
}
