use std::collections::HashSet;

use chrono::{NaiveDateTime, TimeDelta};
use daytrace_protocol::{AppsSection, UsageEntry};

use super::interval_store::{totals_by_subject, ActivityInterval, IntervalStore, APP_USAGE_STREAM};
use super::probe::{ProbeContext, Probed};

/// Late-night activity is anything between midnight and this hour.
const LATE_NIGHT_HOURS: i64 = 6;

/// Bundle identifiers whose components never spell the product name.
const KNOWN_NAMES: &[(&str, &str)] = &[
    ("com.spotify.client", "Spotify"),
    ("com.tinyspeck.slackmacgap", "Slack"),
    ("us.zoom.xos", "Zoom"),
    ("com.apple.podcasts", "Podcasts"),
    ("com.apple.iWork.Keynote", "Keynote"),
];

/// Trailing components that name a build flavour rather than the product.
const FLAVOUR_COMPONENTS: &[&str] = &["client", "app", "desktop", "mac", "macos", "osx"];

/// Short, human name for a bundle identifier: a known product name, else
/// its last meaningful dotted component.
pub fn app_name(subject: &str) -> &str {
    if let Some((_, name)) = KNOWN_NAMES
        .iter()
        .find(|(id, _)| id.eq_ignore_ascii_case(subject))
    {
        return name;
    }

    let mut parts = subject.rsplit('.').filter(|part| !part.is_empty());
    let Some(last) = parts.next() else {
        return subject;
    };
    if FLAVOUR_COMPONENTS
        .iter()
        .any(|flavour| flavour.eq_ignore_ascii_case(last))
    {
        parts.next().unwrap_or(last)
    } else {
        last
    }
}

fn whole_minutes(delta: TimeDelta) -> u64 {
    delta.num_minutes().max(0) as u64
}

/// Top `count` subjects by time, named with `app_name`.
pub fn top_usage(intervals: &[ActivityInterval], count: usize) -> Vec<UsageEntry> {
    totals_by_subject(intervals)
        .into_iter()
        .take(count)
        .map(|(subject, total)| UsageEntry {
            name: app_name(&subject).to_string(),
            minutes: whole_minutes(total),
        })
        .collect()
}

/// App-usage intervals for today, with system and user-excluded apps removed.
pub fn app_intervals(ctx: &ProbeContext) -> Probed<Vec<ActivityInterval>> {
    let store = IntervalStore::open_default(ctx.copies())?;
    ctx.checkpoint()?;
    store.intervals(
        APP_USAGE_STREAM,
        ctx.day_start(),
        ctx.window_end(),
        |subject| ctx.config.is_excluded_app(subject),
    )
}

pub fn summarize(
    intervals: &[ActivityInterval],
    day_start: NaiveDateTime,
    top_count: usize,
) -> AppsSection {
    let unique: HashSet<&str> = intervals.iter().map(|i| i.subject.as_str()).collect();
    let active = intervals
        .iter()
        .fold(TimeDelta::zero(), |acc, i| acc + i.duration());

    let late_night_end = day_start + TimeDelta::hours(LATE_NIGHT_HOURS);
    let late_night = intervals
        .iter()
        .fold(TimeDelta::zero(), |acc, i| acc + i.overlap(day_start, late_night_end));

    AppsSection {
        unique_apps: unique.len() as u32,
        active_minutes: whole_minutes(active),
        late_night_minutes: whole_minutes(late_night),
        top_apps: top_usage(intervals, top_count),
    }
}

pub fn probe(ctx: &ProbeContext) -> Probed<AppsSection> {
    let intervals = app_intervals(ctx)?;
    Ok(summarize(&intervals, ctx.day_start(), ctx.config.top_count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::interval_store::tests::{at, interval};

    #[test]
    fn test_app_name() {
        assert_eq!(app_name("com.microsoft.VSCode"), "VSCode");
        assert_eq!(app_name("Terminal"), "Terminal");
        assert_eq!(app_name("com.example."), "example");
        assert_eq!(app_name("com.spotify.client"), "Spotify");
        assert_eq!(app_name("com.example.Notes.desktop"), "Notes");
        assert_eq!(app_name("desktop"), "desktop");
    }

    #[test]
    fn test_summary_counts() {
        let intervals = vec![
            interval("com.apple.Terminal", (5, 0), (6, 30)),
            interval("com.apple.Safari", (9, 0), (9, 45)),
            interval("com.apple.Terminal", (10, 0), (10, 20)),
        ];
        let summary = summarize(&intervals, at(0, 0), 5);

        assert_eq!(summary.unique_apps, 2);
        assert_eq!(summary.active_minutes, 155);
        assert_eq!(summary.late_night_minutes, 60);
        assert_eq!(
            summary.top_apps,
            vec![
                UsageEntry {
                    name: "Terminal".to_string(),
                    minutes: 110
                },
                UsageEntry {
                    name: "Safari".to_string(),
                    minutes: 45
                },
            ]
        );
    }

    #[test]
    fn test_top_apps_truncated() {
        let intervals = vec![
            interval("a", (9, 0), (9, 30)),
            interval("b", (9, 30), (9, 50)),
            interval("c", (9, 50), (10, 0)),
        ];
        let summary = summarize(&intervals, at(0, 0), 2);
        assert_eq!(summary.top_apps.len(), 2);
        assert_eq!(summary.top_apps[0].name, "a");
    }

    #[test]
    fn test_empty_day() {
        let summary = summarize(&[], at(0, 0), 5);
        assert_eq!(summary.unique_apps, 0);
        assert_eq!(summary.active_minutes, 0);
        assert!(summary.top_apps.is_empty());
    }
}
