use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::warn;

/// A setting that was replaced with its default while loading.
///
/// Loading happens before logging is initialised, so these are collected
/// and reported through `log_issues` afterwards.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigIssue {
    #[error("could not read config: {0}")]
    Unreadable(String),

    #[error("ignoring malformed config: {0}")]
    Malformed(String),

    #[error(
        "fragmentation thresholds out of order ({focused_max}/{moderate_max}/{fragmented_min}), using defaults"
    )]
    CutPointsOutOfOrder {
        focused_max: u32,
        moderate_max: u32,
        fragmented_min: u32,
    },

    #[error("fragmentation {factor} ramp inverted ({low} >= {high}), using defaults")]
    RampInverted {
        factor: &'static str,
        low: f64,
        high: f64,
    },

    #[error("timeout_secs must be positive, using default")]
    ZeroTimeout,
}

pub fn log_issues(issues: &[ConfigIssue]) {
    for issue in issues {
        warn!("{}", issue);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "off" | "none" => LogLevel::Off,
            "error" => LogLevel::Error,
            "info" => LogLevel::Info,
            "debug" => LogLevel::Debug,
            "trace" => LogLevel::Trace,
            _ => LogLevel::Warn,
        }
    }

    pub fn as_tracing_level(&self) -> Option<tracing::Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(tracing::Level::ERROR),
            LogLevel::Warn => Some(tracing::Level::WARN),
            LogLevel::Info => Some(tracing::Level::INFO),
            LogLevel::Debug => Some(tracing::Level::DEBUG),
            LogLevel::Trace => Some(tracing::Level::TRACE),
        }
    }
}

/// Hostname patterns used to categorize visited domains.
///
/// Each pattern is an exact host, `*.suffix`, `prefix.*`, or a bare domain
/// that also matches its subdomains.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainPatterns {
    pub work: Vec<String>,
    pub distraction: Vec<String>,
    pub neutral: Vec<String>,
}

impl Default for DomainPatterns {
    fn default() -> Self {
        let owned = |list: &[&str]| list.iter().map(|s| s.to_string()).collect();
        Self {
            work: owned(&[
                "github.com",
                "gitlab.com",
                "atlassian.net",
                "linear.app",
                "notion.so",
                "figma.com",
                "slack.com",
                "stackoverflow.com",
                "docs.*",
                "localhost",
            ]),
            distraction: owned(&[
                "youtube.com",
                "reddit.com",
                "x.com",
                "twitter.com",
                "facebook.com",
                "instagram.com",
                "tiktok.com",
                "netflix.com",
                "twitch.tv",
                "news.ycombinator.com",
            ]),
            neutral: owned(&["google.com", "*.google.com", "duckduckgo.com", "wikipedia.org"]),
        }
    }
}

/// Cut points and factor ramps for the fragmentation score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FragmentationConfig {
    pub focused_max: u32,
    pub moderate_max: u32,
    pub fragmented_min: u32,
    pub apps_low: f64,
    pub apps_high: f64,
    pub tabs_low: f64,
    pub tabs_high: f64,
    pub domains_low: f64,
    pub domains_high: f64,
    pub switches_low: f64,
    pub switches_high: f64,
}

impl Default for FragmentationConfig {
    fn default() -> Self {
        Self {
            focused_max: 30,
            moderate_max: 60,
            fragmented_min: 61,
            apps_low: 3.0,
            apps_high: 15.0,
            tabs_low: 10.0,
            tabs_high: 50.0,
            domains_low: 3.0,
            domains_high: 20.0,
            switches_low: 10.0,
            switches_high: 60.0,
        }
    }
}

impl FragmentationConfig {
    /// Enforces `focused_max <= moderate_max < fragmented_min`, resetting the
    /// three cut points together when violated, and resets any inverted ramp.
    pub fn validated(mut self) -> (Self, Vec<ConfigIssue>) {
        let defaults = Self::default();
        let mut issues = Vec::new();

        if !(self.focused_max <= self.moderate_max && self.moderate_max < self.fragmented_min) {
            issues.push(ConfigIssue::CutPointsOutOfOrder {
                focused_max: self.focused_max,
                moderate_max: self.moderate_max,
                fragmented_min: self.fragmented_min,
            });
            self.focused_max = defaults.focused_max;
            self.moderate_max = defaults.moderate_max;
            self.fragmented_min = defaults.fragmented_min;
        }

        let ramps = [
            (
                "apps",
                &mut self.apps_low,
                &mut self.apps_high,
                defaults.apps_low,
                defaults.apps_high,
            ),
            (
                "tabs",
                &mut self.tabs_low,
                &mut self.tabs_high,
                defaults.tabs_low,
                defaults.tabs_high,
            ),
            (
                "domains",
                &mut self.domains_low,
                &mut self.domains_high,
                defaults.domains_low,
                defaults.domains_high,
            ),
            (
                "switches",
                &mut self.switches_low,
                &mut self.switches_high,
                defaults.switches_low,
                defaults.switches_high,
            ),
        ];
        for (factor, low, high, default_low, default_high) in ramps {
            if !(*high > *low) {
                issues.push(ConfigIssue::RampInverted {
                    factor,
                    low: *low,
                    high: *high,
                });
                *low = default_low;
                *high = default_high;
            }
        }

        (self, issues)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BurnoutConfig {
    pub long_day_hours: f64,
    pub switches_per_hour: f64,
    pub tab_overload: u32,
    pub late_night_minutes: u64,
    pub no_break_hours: f64,
}

impl Default for BurnoutConfig {
    fn default() -> Self {
        Self {
            long_day_hours: 10.0,
            switches_per_hour: 50.0,
            tab_overload: 100,
            late_night_minutes: 30,
            no_break_hours: 4.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FocusConfig {
    /// Largest gap between same-app intervals that still extends a streak.
    pub streak_gap_secs: i64,
    /// Largest gap between any intervals that still counts as no break.
    pub no_break_gap_mins: i64,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            streak_gap_secs: crate::analysis::streak::STREAK_GAP_SECS,
            no_break_gap_mins: crate::analysis::no_break::NO_BREAK_GAP_MINS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    pub log_level: LogLevel,
    pub timeout_secs: u64,
    pub top_count: usize,
    pub excluded_apps: Vec<String>,
    pub domains: DomainPatterns,
    pub fragmentation: FragmentationConfig,
    pub burnout: BurnoutConfig,
    pub focus: FocusConfig,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Warn,
            timeout_secs: 5,
            top_count: 5,
            excluded_apps: Vec::new(),
            domains: DomainPatterns::default(),
            fragmentation: FragmentationConfig::default(),
            burnout: BurnoutConfig::default(),
            focus: FocusConfig::default(),
        }
    }
}

pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("~/.config"))
        .join("daytrace")
}

pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("~/.local/share"))
        .join("daytrace")
}

pub fn runtime_dir() -> PathBuf {
    dirs::runtime_dir()
        .or_else(dirs::cache_dir)
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("daytrace")
}

pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

pub fn ensure_dirs() -> std::io::Result<()> {
    fs::create_dir_all(config_dir())?;
    fs::create_dir_all(data_dir())?;
    Ok(())
}

impl UserConfig {
    /// Loads the config file, with any settings that had to be replaced.
    pub fn load() -> (Self, Vec<ConfigIssue>) {
        let path = config_path();
        if !path.exists() {
            return (Self::default(), Vec::new());
        }

        match fs::read_to_string(&path) {
            Ok(content) => Self::parse(&content),
            Err(e) => (
                Self::default(),
                vec![ConfigIssue::Unreadable(format!("{}: {}", path.display(), e))],
            ),
        }
    }

    /// Parses TOML, falling back to defaults on malformed input.
    pub fn parse(content: &str) -> (Self, Vec<ConfigIssue>) {
        match toml::from_str::<Self>(content) {
            Ok(config) => config.normalized(),
            Err(e) => (
                Self::default(),
                vec![ConfigIssue::Malformed(e.message().to_string())],
            ),
        }
    }

    pub fn save(&self) -> std::io::Result<()> {
        let _ = ensure_dirs();
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        fs::write(config_path(), content)
    }

    pub fn normalized(mut self) -> (Self, Vec<ConfigIssue>) {
        let (fragmentation, mut issues) = self.fragmentation.validated();
        self.fragmentation = fragmentation;
        if self.timeout_secs == 0 {
            issues.push(ConfigIssue::ZeroTimeout);
            self.timeout_secs = Self::default().timeout_secs;
        }
        (self, issues)
    }

    pub fn merge_with_args(&mut self, timeout_secs: Option<u64>) {
        if let Some(secs) = timeout_secs.filter(|s| *s > 0) {
            self.timeout_secs = secs;
        }
    }

    /// Whether `subject` (a bundle identifier) matches a user exclusion,
    /// either exactly or by its last dotted component.
    pub fn is_excluded_app(&self, subject: &str) -> bool {
        let short = subject.rsplit('.').next().unwrap_or(subject);
        self.excluded_apps
            .iter()
            .any(|name| name == subject || name.eq_ignore_ascii_case(short))
    }
}
