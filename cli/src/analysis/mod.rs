//! Interval analyzers and the scorers that turn a collected day into
//! fragmentation and burnout signals.

pub mod burnout;
pub mod domains;
pub mod fragmentation;
pub mod no_break;
pub mod streak;
pub mod switching;

use chrono::NaiveDateTime;
use daytrace_protocol::{BurnoutWarning, FragmentationBreakdown};

use crate::config::UserConfig;
use crate::data::CollectedDay;

use burnout::{evaluate, BurnoutInputs};
pub use domains::{classify_with, host_of};
pub use fragmentation::FragmentationResult;
pub use no_break::longest_no_break;
pub use streak::longest_streak;
pub use switching::switching_stats;

#[derive(Debug, Clone, PartialEq)]
pub struct DayAnalysis {
    pub fragmentation: FragmentationResult,
    pub warnings: Vec<BurnoutWarning>,
}

/// Scores a collected day. Each missing probe only zeroes or suppresses
/// the inputs it would have supplied.
pub fn analyze(day: &CollectedDay, config: &UserConfig, now: NaiveDateTime) -> DayAnalysis {
    let apps = day.apps.as_ref().ok();
    let browsers = day.browsers.as_ref().ok();
    let focus = day.focus.as_ref().ok();
    let screen = day.screen.as_ref().ok();

    let switches_per_hour = focus
        .and_then(|f| f.switching.as_ref())
        .map(|s| s.switches_per_hour);

    let breakdown = FragmentationBreakdown {
        unique_apps: apps.map_or(0, |a| a.unique_apps),
        total_tabs: browsers.map_or(0, |b| b.total_tabs),
        unique_domains: browsers.map_or(0, |b| b.unique_domains),
        app_switches_per_hour: switches_per_hour.unwrap_or(0.0),
    };
    let fragmentation = fragmentation::score(
        breakdown,
        &config.fragmentation,
        apps.is_some() || browsers.is_some(),
    );

    let inputs = BurnoutInputs {
        screen_on_minutes: screen.map(|s| s.screen_on_minutes),
        switches_per_hour,
        open_tabs: browsers.map(|b| b.total_tabs),
        late_night_minutes: apps.map(|a| a.late_night_minutes),
        longest_no_break_minutes: focus.map(|f| f.longest_no_break_minutes),
        now,
    };

    DayAnalysis {
        fragmentation,
        warnings: evaluate(&inputs, &config.burnout),
    }
}
