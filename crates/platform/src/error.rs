use std::path::PathBuf;

/// Errors raised by platform adapters.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("no battery found")]
    NoBattery,

    #[error("battery error: {0}")]
    Battery(String),

    #[error("`{program}` could not be started: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program}` exited with {status}: {stderr}")]
    ToolFailed {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("home directory could not be resolved")]
    NoHome,

    #[error("{} does not exist", .0.display())]
    Missing(PathBuf),
}

pub type Result<T> = std::result::Result<T, PlatformError>;
