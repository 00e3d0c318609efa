use std::fmt;

use serde::{Deserialize, Serialize};

use crate::version::SCHEMA_VERSION;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    #[default]
    Complete,
    Partial,
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DomainCategory {
    Work,
    Distraction,
    #[default]
    Neutral,
}

impl DomainCategory {
    pub fn label(&self) -> &'static str {
        match self {
            DomainCategory::Work => "work",
            DomainCategory::Distraction => "distraction",
            DomainCategory::Neutral => "neutral",
        }
    }
}

impl fmt::Display for DomainCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FragmentationLevel {
    #[default]
    Focused,
    Moderate,
    Fragmented,
}

impl FragmentationLevel {
    pub fn label(&self) -> &'static str {
        match self {
            FragmentationLevel::Focused => "focused",
            FragmentationLevel::Moderate => "moderate",
            FragmentationLevel::Fragmented => "fragmented",
        }
    }
}

/// Warning severity. Ordered so that `High` sorts last; presentation
/// reverses it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    LongDay,
    HighSwitching,
    TabOverload,
    LateNight,
    NoBreaks,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BurnoutWarning {
    #[serde(rename = "type")]
    pub kind: WarningKind,
    pub message: String,
    pub severity: Severity,
    pub metric_value: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FragmentationBreakdown {
    pub unique_apps: u32,
    pub total_tabs: u32,
    pub unique_domains: u32,
    pub app_switches_per_hour: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FragmentationSection {
    pub score: u32,
    pub level: FragmentationLevel,
    pub breakdown: FragmentationBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UptimeSection {
    pub boot_time: String,
    pub uptime_minutes: u64,
    pub sleep_minutes: u64,
    pub awake_minutes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatterySection {
    pub charge_percent: f32,
    pub state: String,
    pub health_percent: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle_count: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenSection {
    pub screen_on_minutes: u64,
    pub display_on_events: u32,
}

/// Time attributed to one application or media source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageEntry {
    pub name: String,
    pub minutes: u64,
}

/// Event count attributed to one application or process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountEntry {
    pub name: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppsSection {
    pub unique_apps: u32,
    pub active_minutes: u64,
    pub late_night_minutes: u64,
    pub top_apps: Vec<UsageEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakSection {
    pub subject: String,
    pub minutes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchingSection {
    pub switches: u32,
    pub switches_per_hour: f64,
    pub avg_mins_between: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longest_streak: Option<StreakSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub switching: Option<SwitchingSection>,
    pub longest_no_break_minutes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaSection {
    pub listening_minutes: u64,
    pub top_sources: Vec<UsageEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSection {
    pub received_bytes: u64,
    pub sent_bytes: u64,
    pub since: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowserTabs {
    pub name: String,
    pub tabs: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainVisits {
    pub domain: String,
    pub visits: u32,
    pub category: DomainCategory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCounts {
    pub work: u32,
    pub distraction: u32,
    pub neutral: u32,
}

impl CategoryCounts {
    pub fn add(&mut self, category: DomainCategory, count: u32) {
        match category {
            DomainCategory::Work => self.work += count,
            DomainCategory::Distraction => self.distraction += count,
            DomainCategory::Neutral => self.neutral += count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowsersSection {
    pub total_tabs: u32,
    pub unique_domains: u32,
    pub browsers: Vec<BrowserTabs>,
    pub top_domains: Vec<DomainVisits>,
    pub categories: CategoryCounts,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationsSection {
    pub total: u32,
    pub top_apps: Vec<CountEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuesSection {
    pub total: u32,
    pub by_process: Vec<CountEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnavailableSource {
    pub source: String,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

/// The display-agnostic projection of one day's report.
///
/// Sections whose source was unavailable are omitted from the JSON
/// entirely rather than serialized as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayReport {
    pub schema_version: u32,
    pub date: String,
    pub generated_at: String,
    pub status: ReportStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uptime: Option<UptimeSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery: Option<BatterySection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen: Option<ScreenSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apps: Option<AppsSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus: Option<FocusSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<NetworkSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browsers: Option<BrowsersSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notifications: Option<NotificationsSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issues: Option<IssuesSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fragmentation: Option<FragmentationSection>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub burnout_warnings: Vec<BurnoutWarning>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unavailable: Vec<UnavailableSource>,
}

impl DayReport {
    pub fn new(date: impl Into<String>, generated_at: impl Into<String>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            date: date.into(),
            generated_at: generated_at.into(),
            status: ReportStatus::Complete,
            uptime: None,
            battery: None,
            screen: None,
            apps: None,
            focus: None,
            media: None,
            network: None,
            browsers: None,
            notifications: None,
            issues: None,
            fragmentation: None,
            burnout_warnings: Vec::new(),
            unavailable: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.status == ReportStatus::Empty
    }
}
