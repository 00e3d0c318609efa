//! Report projection types for daytrace.
//!
//! This is the one stable external contract: field names are camelCase and
//! sections whose data source was unavailable are omitted, never `null`.

mod types;
mod version;

pub use types::{
    AppsSection, BatterySection, BrowserTabs, BrowsersSection, BurnoutWarning, CategoryCounts,
    CountEntry, DayReport, DomainCategory, DomainVisits, FocusSection, FragmentationBreakdown,
    FragmentationLevel, FragmentationSection, IssuesSection, MediaSection, NetworkSection,
    NotificationsSection, ReportStatus, ScreenSection, Severity, StreakSection, SwitchingSection,
    UnavailableSource, UptimeSection, UsageEntry, WarningKind,
};
pub use version::SCHEMA_VERSION;
