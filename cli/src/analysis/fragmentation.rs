use daytrace_protocol::{FragmentationBreakdown, FragmentationLevel, FragmentationSection};

use crate::config::FragmentationConfig;

const APPS_WEIGHT: f64 = 0.30;
const TABS_WEIGHT: f64 = 0.25;
const DOMAINS_WEIGHT: f64 = 0.25;
const SWITCHES_WEIGHT: f64 = 0.20;

#[derive(Debug, Clone, PartialEq)]
pub struct FragmentationResult {
    pub score: u32,
    pub level: FragmentationLevel,
    pub breakdown: FragmentationBreakdown,
    pub available: bool,
}

impl FragmentationResult {
    pub fn section(&self) -> Option<FragmentationSection> {
        self.available.then(|| FragmentationSection {
            score: self.score,
            level: self.level,
            breakdown: self.breakdown,
        })
    }
}

/// Maps `value` linearly onto `[0, 1]`: `low` and below is 0, `high` and
/// above is 1.
pub fn ramp(value: f64, low: f64, high: f64) -> f64 {
    if !value.is_finite() || value <= low {
        return 0.0;
    }
    if value >= high || high <= low {
        return 1.0;
    }
    (value - low) / (high - low)
}

pub fn level_for(score: u32, config: &FragmentationConfig) -> FragmentationLevel {
    if score <= config.focused_max {
        FragmentationLevel::Focused
    } else if score >= config.fragmented_min {
        FragmentationLevel::Fragmented
    } else {
        FragmentationLevel::Moderate
    }
}

/// Weighted 0-100 score over the four breadth factors.
pub fn score(
    breakdown: FragmentationBreakdown,
    config: &FragmentationConfig,
    available: bool,
) -> FragmentationResult {
    let weighted = APPS_WEIGHT
        * ramp(breakdown.unique_apps as f64, config.apps_low, config.apps_high)
        + TABS_WEIGHT * ramp(breakdown.total_tabs as f64, config.tabs_low, config.tabs_high)
        + DOMAINS_WEIGHT
            * ramp(
                breakdown.unique_domains as f64,
                config.domains_low,
                config.domains_high,
            )
        + SWITCHES_WEIGHT
            * ramp(
                breakdown.app_switches_per_hour,
                config.switches_low,
                config.switches_high,
            );

    let score = (weighted * 100.0).round().clamp(0.0, 100.0) as u32;

    FragmentationResult {
        score,
        level: level_for(score, config),
        breakdown,
        available,
    }
}
