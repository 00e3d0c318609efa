use chrono::TimeDelta;
use daytrace_protocol::{FocusSection, StreakSection, SwitchingSection};

use crate::analysis::{longest_no_break, longest_streak, switching_stats};
use crate::config::FocusConfig;

use super::apps::{app_intervals, app_name};
use super::interval_store::ActivityInterval;
use super::probe::{ProbeContext, Probed};

pub fn summarize(intervals: &[ActivityInterval], config: &FocusConfig) -> FocusSection {
    let streak_gap = TimeDelta::seconds(config.streak_gap_secs.max(0));
    let no_break_gap = TimeDelta::minutes(config.no_break_gap_mins.max(0));

    let longest_streak = longest_streak(intervals, streak_gap).map(|streak| StreakSection {
        subject: app_name(&streak.subject).to_string(),
        minutes: streak.minutes(),
    });

    let switching = switching_stats(intervals).map(|stats| SwitchingSection {
        switches: stats.switches,
        switches_per_hour: stats.switches_per_hour,
        avg_mins_between: stats.avg_mins_between,
    });

    FocusSection {
        longest_streak,
        switching,
        longest_no_break_minutes: longest_no_break(intervals, no_break_gap)
            .num_minutes()
            .max(0) as u64,
    }
}

pub fn probe(ctx: &ProbeContext) -> Probed<FocusSection> {
    let intervals = app_intervals(ctx)?;
    Ok(summarize(&intervals, &ctx.config.focus))
}
