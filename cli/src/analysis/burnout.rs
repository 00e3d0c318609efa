use chrono::{NaiveDateTime, Timelike};
use daytrace_protocol::{BurnoutWarning, Severity, WarningKind};

use crate::config::BurnoutConfig;

/// Hour of the day before which late-night activity is still "tonight".
const LATE_NIGHT_END_HOUR: u32 = 6;

/// Inputs gathered from the probes. `None` means the source was unavailable
/// and only suppresses its own check.
#[derive(Debug, Clone, PartialEq)]
pub struct BurnoutInputs {
    pub screen_on_minutes: Option<u64>,
    pub switches_per_hour: Option<f64>,
    pub open_tabs: Option<u32>,
    pub late_night_minutes: Option<u64>,
    pub longest_no_break_minutes: Option<u64>,
    pub now: NaiveDateTime,
}

fn hours_to_minutes(hours: f64) -> f64 {
    hours * 60.0
}

fn long_day(minutes: u64, config: &BurnoutConfig) -> Option<BurnoutWarning> {
    if (minutes as f64) < hours_to_minutes(config.long_day_hours) {
        return None;
    }
    let hours = minutes / 60;
    Some(BurnoutWarning {
        kind: WarningKind::LongDay,
        message: format!("Screen has been on for {hours}h today, consider wrapping up"),
        severity: Severity::Medium,
        metric_value: hours,
    })
}

fn high_switching(rate: f64, config: &BurnoutConfig) -> Option<BurnoutWarning> {
    if !rate.is_finite() || rate < config.switches_per_hour {
        return None;
    }
    let rounded = rate.round() as u64;
    Some(BurnoutWarning {
        kind: WarningKind::HighSwitching,
        message: format!("Switching apps {rounded} times an hour, attention is scattered"),
        severity: Severity::Medium,
        metric_value: rounded,
    })
}

fn tab_overload(tabs: u32, config: &BurnoutConfig) -> Option<BurnoutWarning> {
    if tabs < config.tab_overload {
        return None;
    }
    Some(BurnoutWarning {
        kind: WarningKind::TabOverload,
        message: format!("{tabs} browser tabs open, close what you are not using"),
        severity: Severity::Low,
        metric_value: u64::from(tabs),
    })
}

fn late_night(minutes: u64, now: NaiveDateTime, config: &BurnoutConfig) -> Option<BurnoutWarning> {
    if now.hour() >= LATE_NIGHT_END_HOUR || minutes < config.late_night_minutes {
        return None;
    }
    Some(BurnoutWarning {
        kind: WarningKind::LateNight,
        message: format!("{minutes} minutes of activity after midnight, get some sleep"),
        severity: Severity::High,
        metric_value: minutes,
    })
}

fn no_breaks(minutes: u64, config: &BurnoutConfig) -> Option<BurnoutWarning> {
    if (minutes as f64) < hours_to_minutes(config.no_break_hours) {
        return None;
    }
    Some(BurnoutWarning {
        kind: WarningKind::NoBreaks,
        message: format!(
            "{}h{:02}m without a break, step away for a few minutes",
            minutes / 60,
            minutes % 60
        ),
        severity: Severity::High,
        metric_value: minutes,
    })
}

/// Runs every check. Warnings come back sorted by severity, highest first,
/// then by check order.
pub fn evaluate(inputs: &BurnoutInputs, config: &BurnoutConfig) -> Vec<BurnoutWarning> {
    let mut warnings: Vec<BurnoutWarning> = [
        inputs.screen_on_minutes.and_then(|m| long_day(m, config)),
        inputs.switches_per_hour.and_then(|r| high_switching(r, config)),
        inputs.open_tabs.and_then(|t| tab_overload(t, config)),
        inputs
            .late_night_minutes
            .and_then(|m| late_night(m, inputs.now, config)),
        inputs.longest_no_break_minutes.and_then(|m| no_breaks(m, config)),
    ]
    .into_iter()
    .flatten()
    .collect();

    warnings.sort_by(|a, b| b.severity.cmp(&a.severity).then(a.kind.cmp(&b.kind)));
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn quiet() -> BurnoutInputs {
        BurnoutInputs {
            screen_on_minutes: Some(120),
            switches_per_hour: Some(5.0),
            open_tabs: Some(10),
            late_night_minutes: Some(0),
            longest_no_break_minutes: Some(45),
            now: at(15),
        }
    }

    fn kinds(warnings: &[BurnoutWarning]) -> Vec<WarningKind> {
        warnings.iter().map(|w| w.kind).collect()
    }

    #[test]
    fn test_quiet_day_has_no_warnings() {
        assert!(evaluate(&quiet(), &BurnoutConfig::default()).is_empty());
    }

    #[test]
    fn test_eleven_hour_day() {
        let inputs = BurnoutInputs {
            screen_on_minutes: Some(660),
            ..quiet()
        };
        let warnings = evaluate(&inputs, &BurnoutConfig::default());

        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::LongDay);
        assert_eq!(warnings[0].severity, Severity::Medium);
        assert_eq!(warnings[0].metric_value, 11);
    }

    #[test]
    fn test_long_day_threshold_inclusive() {
        let inputs = BurnoutInputs {
            screen_on_minutes: Some(600),
            ..quiet()
        };
        assert_eq!(kinds(&evaluate(&inputs, &BurnoutConfig::default())), vec![WarningKind::LongDay]);

        let inputs = BurnoutInputs {
            screen_on_minutes: Some(599),
            ..quiet()
        };
        assert!(evaluate(&inputs, &BurnoutConfig::default()).is_empty());
    }

    #[test]
    fn test_tab_overload() {
        let inputs = BurnoutInputs {
            open_tabs: Some(125),
            ..quiet()
        };
        let warnings = evaluate(&inputs, &BurnoutConfig::default());

        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::TabOverload);
        assert_eq!(warnings[0].severity, Severity::Low);
        assert_eq!(warnings[0].metric_value, 125);
    }

    #[test]
    fn test_high_switching() {
        let inputs = BurnoutInputs {
            switches_per_hour: Some(62.4),
            ..quiet()
        };
        let warnings = evaluate(&inputs, &BurnoutConfig::default());
        assert_eq!(kinds(&warnings), vec![WarningKind::HighSwitching]);
        assert_eq!(warnings[0].metric_value, 62);
    }

    #[test]
    fn test_late_night_only_before_six() {
        let inputs = BurnoutInputs {
            late_night_minutes: Some(90),
            now: at(2),
            ..quiet()
        };
        let warnings = evaluate(&inputs, &BurnoutConfig::default());
        assert_eq!(kinds(&warnings), vec![WarningKind::LateNight]);
        assert_eq!(warnings[0].severity, Severity::High);
        assert_eq!(warnings[0].metric_value, 90);

        let later = BurnoutInputs { now: at(9), ..inputs };
        assert!(evaluate(&later, &BurnoutConfig::default()).is_empty());
    }

    #[test]
    fn test_late_night_below_threshold_silent() {
        let inputs = BurnoutInputs {
            late_night_minutes: Some(10),
            now: at(1),
            ..quiet()
        };
        assert!(evaluate(&inputs, &BurnoutConfig::default()).is_empty());
    }

    #[test]
    fn test_no_breaks() {
        let inputs = BurnoutInputs {
            longest_no_break_minutes: Some(265),
            ..quiet()
        };
        let warnings = evaluate(&inputs, &BurnoutConfig::default());
        assert_eq!(kinds(&warnings), vec![WarningKind::NoBreaks]);
        assert_eq!(warnings[0].metric_value, 265);
        assert!(warnings[0].message.starts_with("4h25m"));
    }

    #[test]
    fn test_missing_inputs_suppress_only_their_check() {
        let inputs = BurnoutInputs {
            screen_on_minutes: None,
            switches_per_hour: None,
            open_tabs: Some(150),
            late_night_minutes: None,
            longest_no_break_minutes: Some(300),
            now: at(15),
        };
        let warnings = evaluate(&inputs, &BurnoutConfig::default());
        assert_eq!(kinds(&warnings), vec![WarningKind::NoBreaks, WarningKind::TabOverload]);
    }

    #[test]
    fn test_sorted_by_severity_then_check_order() {
        let inputs = BurnoutInputs {
            screen_on_minutes: Some(700),
            switches_per_hour: Some(80.0),
            open_tabs: Some(200),
            late_night_minutes: Some(45),
            longest_no_break_minutes: Some(300),
            now: at(4),
        };
        let warnings = evaluate(&inputs, &BurnoutConfig::default());
        assert_eq!(
            kinds(&warnings),
            vec![
                WarningKind::LateNight,
                WarningKind::NoBreaks,
                WarningKind::LongDay,
                WarningKind::HighSwitching,
                WarningKind::TabOverload,
            ]
        );
    }

    #[test]
    fn test_idempotent() {
        let inputs = BurnoutInputs {
            screen_on_minutes: Some(660),
            open_tabs: Some(125),
            ..quiet()
        };
        let config = BurnoutConfig::default();
        assert_eq!(evaluate(&inputs, &config), evaluate(&inputs, &config));
    }
}
