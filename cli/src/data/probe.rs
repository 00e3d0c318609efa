//! Shared probe plumbing: the error taxonomy, the probe catalogue and the
//! per-run context every probe receives.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime};
use daytrace_platform::PlatformError;
use tokio_util::sync::CancellationToken;

use super::db_copy::CopyRegistry;
use crate::config::UserConfig;

/// Why a probe produced no payload. None of these are fatal to the run.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProbeError {
    /// Access not granted, application not running, file absent.
    #[error("{0}")]
    SourceUnavailable(String),

    /// The source answered but could not be interpreted.
    #[error("could not parse {what}: {detail}")]
    ParseFailure { what: String, detail: String },

    #[error("timed out after {}s", .after.as_secs())]
    Timeout { after: Duration },

    #[error("cancelled before completion")]
    Cancelled,
}

impl ProbeError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        ProbeError::SourceUnavailable(reason.into())
    }

    pub fn parse(what: impl Into<String>, detail: impl fmt::Display) -> Self {
        ProbeError::ParseFailure {
            what: what.into(),
            detail: detail.to_string(),
        }
    }
}

impl From<PlatformError> for ProbeError {
    fn from(err: PlatformError) -> Self {
        ProbeError::SourceUnavailable(err.to_string())
    }
}

/// A probe's result slot: `Ok` is an available payload, `Err` carries the
/// diagnostic for an unavailable one.
pub type Probed<T> = Result<T, ProbeError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeKind {
    Uptime,
    Battery,
    Screen,
    Apps,
    Focus,
    Media,
    Network,
    Browsers,
    Notifications,
    Issues,
}

impl ProbeKind {
    pub const ALL: [ProbeKind; 10] = [
        ProbeKind::Uptime,
        ProbeKind::Battery,
        ProbeKind::Screen,
        ProbeKind::Apps,
        ProbeKind::Focus,
        ProbeKind::Media,
        ProbeKind::Network,
        ProbeKind::Browsers,
        ProbeKind::Notifications,
        ProbeKind::Issues,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ProbeKind::Uptime => "uptime",
            ProbeKind::Battery => "battery",
            ProbeKind::Screen => "screen",
            ProbeKind::Apps => "apps",
            ProbeKind::Focus => "focus",
            ProbeKind::Media => "media",
            ProbeKind::Network => "network",
            ProbeKind::Browsers => "browsers",
            ProbeKind::Notifications => "notifications",
            ProbeKind::Issues => "issues",
        }
    }

    /// One-line pointer at the access grant a source usually needs.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            ProbeKind::Apps | ProbeKind::Focus | ProbeKind::Media | ProbeKind::Notifications => {
                Some("Grant Full Disk Access to your terminal in System Settings > Privacy & Security")
            }
            ProbeKind::Browsers => Some(
                "Allow your terminal to control your browsers in System Settings > Privacy & Security > Automation",
            ),
            ProbeKind::Issues => Some("Crash reports live in ~/Library/Logs/DiagnosticReports"),
            _ => None,
        }
    }
}

impl fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything a probe needs for one run. Shared read-only across probes.
pub struct ProbeContext {
    pub config: Arc<UserConfig>,
    pub now: DateTime<Local>,
    cancel: CancellationToken,
    copies: CopyRegistry,
}

impl ProbeContext {
    pub fn new(config: Arc<UserConfig>, now: DateTime<Local>) -> Self {
        Self {
            config,
            now,
            cancel: CancellationToken::new(),
            copies: CopyRegistry::default(),
        }
    }

    pub fn day(&self) -> NaiveDate {
        self.now.date_naive()
    }

    /// Local midnight at the start of the query day.
    pub fn day_start(&self) -> NaiveDateTime {
        self.day().and_time(NaiveTime::MIN)
    }

    /// Local wall-clock end of the query window.
    pub fn window_end(&self) -> NaiveDateTime {
        self.now.naive_local()
    }

    /// Temporary database copies made during this run.
    pub fn copies(&self) -> &CopyRegistry {
        &self.copies
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Returns `Cancelled` once the shared deadline has passed, so long
    /// probes can stop between steps.
    pub fn checkpoint(&self) -> Result<(), ProbeError> {
        if self.is_cancelled() {
            Err(ProbeError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    fn ctx_at(hour: u32, minute: u32) -> ProbeContext {
        let now = Local
            .with_ymd_and_hms(2024, 1, 15, hour, minute, 0)
            .single()
            .unwrap();
        ProbeContext::new(Arc::new(UserConfig::default()), now)
    }

    #[test]
    fn test_window_is_midnight_to_now() {
        let ctx = ctx_at(14, 30);
        assert_eq!(ctx.day_start().to_string(), "2024-01-15 00:00:00");
        assert_eq!(ctx.window_end().hour(), 14);
        assert_eq!(ctx.window_end().minute(), 30);
    }

    #[test]
    fn test_checkpoint_after_cancel() {
        let ctx = ctx_at(9, 0);
        assert!(ctx.checkpoint().is_ok());
        ctx.cancel();
        assert_eq!(ctx.checkpoint(), Err(ProbeError::Cancelled));
    }

    #[test]
    fn test_platform_errors_map_to_unavailable() {
        let err: ProbeError = PlatformError::NoBattery.into();
        assert_eq!(err, ProbeError::SourceUnavailable("no battery found".to_string()));
    }

    #[test]
    fn test_error_messages() {
        let timeout = ProbeError::Timeout {
            after: Duration::from_secs(5),
        };
        assert_eq!(timeout.to_string(), "timed out after 5s");
        assert_eq!(
            ProbeError::parse("power log", "no display transitions").to_string(),
            "could not parse power log: no display transitions"
        );
    }

    #[test]
    fn test_kind_names_unique() {
        let mut names: Vec<_> = ProbeKind::ALL.iter().map(|k| k.name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), ProbeKind::ALL.len());
    }
}
