//! Runs OS command-line tools and captures their text output.

use std::process::Command;

use crate::error::{PlatformError, Result};

/// Runs `program` with `args` and returns stdout as (lossy) UTF-8.
///
/// A non-zero exit status is an error; callers that parse the output treat
/// any error as "source unavailable".
pub fn run_tool(program: &str, args: &[&str]) -> Result<String> {
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|source| PlatformError::Spawn {
            program: program.to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(PlatformError::ToolFailed {
            program: program.to_string(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Runs an AppleScript snippet through `osascript -e`.
pub fn run_applescript(script: &str) -> Result<String> {
    run_tool("osascript", &["-e", script]).map(|out| out.trim().to_string())
}

/// Full power-management log (`pmset -g log`).
pub fn power_log() -> Result<String> {
    run_tool("pmset", &["-g", "log"])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program_is_spawn_error() {
        let err = run_tool("daytrace-definitely-not-a-real-tool", &[]).unwrap_err();
        assert!(matches!(err, PlatformError::Spawn { .. }));
    }

    #[test]
    fn test_captures_stdout() {
        let out = run_tool("sh", &["-c", "echo hello"]).unwrap();
        assert_eq!(out.trim(), "hello");
    }

    #[test]
    fn test_non_zero_exit_is_error() {
        let err = run_tool("sh", &["-c", "echo nope >&2; exit 3"]).unwrap_err();
        match err {
            PlatformError::ToolFailed { stderr, .. } => assert_eq!(stderr, "nope"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
