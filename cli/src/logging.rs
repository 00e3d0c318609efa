use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{runtime_dir, LogLevel};

static INIT: OnceLock<()> = OnceLock::new();

const LOG_PREFIX: &str = "daytrace";
const KEEP_LOG_FILES: usize = 7;

/// Crates whose chatter drowns out probe logs at debug level.
const QUIET_TARGETS: &[&str] = &["rusqlite=warn", "sysinfo=warn"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    File,
    Stderr,
}

/// Keeps the non-blocking file writer alive until the process exits.
pub struct LogGuard {
    _guard: Option<WorkerGuard>,
}

pub fn init(level: LogLevel, mode: LogMode, cli_override: Option<LogLevel>) -> LogGuard {
    let mut guard = None;

    INIT.get_or_init(|| {
        let Some(tracing_level) = effective_level(level, cli_override) else {
            return;
        };

        guard = match mode {
            LogMode::File => init_file_logging(tracing_level, &runtime_dir()),
            LogMode::Stderr => {
                init_stderr_logging(tracing_level);
                None
            }
        };
    });

    LogGuard { _guard: guard }
}

fn effective_level(configured: LogLevel, cli_override: Option<LogLevel>) -> Option<Level> {
    cli_override.unwrap_or(configured).as_tracing_level()
}

fn quiet_directives() -> Vec<Directive> {
    QUIET_TARGETS
        .iter()
        .filter_map(|target| target.parse().ok())
        .collect()
}

fn build_env_filter(level: Level) -> EnvFilter {
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    quiet_directives()
        .into_iter()
        .fold(filter, |filter, directive| filter.add_directive(directive))
}

fn init_file_logging(level: Level, log_dir: &Path) -> Option<WorkerGuard> {
    if let Err(e) = std::fs::create_dir_all(log_dir) {
        eprintln!(
            "Warning: Failed to create log directory {:?}: {}",
            log_dir, e
        );
        return None;
    }

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_PREFIX)
        .filename_suffix("log")
        .max_log_files(KEEP_LOG_FILES)
        .build(log_dir)
        .ok()?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_timer(UtcTime::rfc_3339())
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(build_env_filter(level))
        .with(file_layer)
        .init();

    eprintln!("Logging to {}", log_file_glob(log_dir).display());
    Some(guard)
}

/// No escape codes when stderr is redirected.
fn init_stderr_logging(level: Level) {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_timer(UtcTime::rfc_3339())
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(true);

    tracing_subscriber::registry()
        .with(build_env_filter(level))
        .with(stderr_layer)
        .init();
}

fn log_file_glob(log_dir: &Path) -> PathBuf {
    log_dir.join(format!("{LOG_PREFIX}.*.log"))
}
