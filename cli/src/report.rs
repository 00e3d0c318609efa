use chrono::{DateTime, Local, SecondsFormat};
use daytrace_protocol::{DayReport, ReportStatus, UnavailableSource};

use crate::analysis::DayAnalysis;
use crate::data::{CollectedDay, ProbeError, ProbeKind};

/// Projects a collected and analysed day onto the report contract.
pub fn build_report(day: &CollectedDay, analysis: &DayAnalysis, now: DateTime<Local>) -> DayReport {
    let mut report = DayReport::new(
        now.date_naive().format("%Y-%m-%d").to_string(),
        now.to_rfc3339_opts(SecondsFormat::Secs, false),
    );

    report.uptime = day.uptime.as_ref().ok().cloned();
    report.battery = day.battery.as_ref().ok().cloned();
    report.screen = day.screen.as_ref().ok().cloned();
    report.apps = day.apps.as_ref().ok().cloned();
    report.focus = day.focus.as_ref().ok().cloned();
    report.media = day.media.as_ref().ok().cloned();
    report.network = day.network.as_ref().ok().cloned();
    report.browsers = day.browsers.as_ref().ok().cloned();
    report.notifications = day.notifications.as_ref().ok().cloned();
    report.issues = day.issues.as_ref().ok().cloned();
    report.fragmentation = analysis.fragmentation.section();
    report.burnout_warnings = analysis.warnings.clone();

    report.unavailable = ProbeKind::ALL
        .iter()
        .filter_map(|kind| {
            let err = day.error(*kind)?;
            Some(UnavailableSource {
                source: kind.name().to_string(),
                reason: err.to_string(),
                hint: matches!(err, ProbeError::SourceUnavailable(_))
                    .then(|| kind.hint())
                    .flatten()
                    .map(str::to_string),
            })
        })
        .collect();

    report.status = match day.available_count() {
        0 => ReportStatus::Empty,
        n if n == ProbeKind::ALL.len() => ReportStatus::Complete,
        _ => ReportStatus::Partial,
    };

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze;
    use crate::config::UserConfig;
    use chrono::TimeZone;
    use daytrace_protocol::ScreenSection;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn now() -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2024, 1, 15, 14, 0, 0)
            .single()
            .unwrap()
    }

    fn report_for(day: &CollectedDay) -> DayReport {
        let analysis = analyze(day, &UserConfig::default(), now().naive_local());
        build_report(day, &analysis, now())
    }

    #[test]
    fn test_empty_day() {
        let report = report_for(&CollectedDay::default());

        assert_eq!(report.status, ReportStatus::Empty);
        assert!(report.is_empty());
        assert_eq!(report.date, "2024-01-15");
        assert_eq!(report.unavailable.len(), ProbeKind::ALL.len());
        assert!(report.fragmentation.is_none());
        assert!(report.burnout_warnings.is_empty());
    }

    #[test]
    fn test_partial_day_keeps_available_sections() {
        let day = CollectedDay {
            screen: Ok(ScreenSection {
                screen_on_minutes: 30,
                display_on_events: 1,
            }),
            apps: Err(ProbeError::unavailable("knowledgeC.db not found")),
            browsers: Err(ProbeError::Timeout {
                after: Duration::from_secs(5),
            }),
            ..CollectedDay::default()
        };
        let report = report_for(&day);

        assert_eq!(report.status, ReportStatus::Partial);
        assert_eq!(report.screen.as_ref().unwrap().screen_on_minutes, 30);
        assert!(report.apps.is_none());

        let apps = report.unavailable.iter().find(|u| u.source == "apps").unwrap();
        assert_eq!(apps.reason, "knowledgeC.db not found");
        assert!(apps.hint.as_deref().unwrap().contains("Full Disk Access"));

        let browsers = report.unavailable.iter().find(|u| u.source == "browsers").unwrap();
        assert_eq!(browsers.reason, "timed out after 5s");
        assert_eq!(browsers.hint, None);

        assert!(report.unavailable.iter().all(|u| u.source != "screen"));
    }

    #[test]
    fn test_absent_sections_omitted_from_json() {
        let report = report_for(&CollectedDay::default());
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["status"], "empty");
        assert!(json.get("screen").is_none());
        assert!(json.get("fragmentation").is_none());
        assert!(json.get("burnoutWarnings").is_none());
    }
}
