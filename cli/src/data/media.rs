use chrono::TimeDelta;
use daytrace_protocol::MediaSection;

use super::apps::top_usage;
use super::interval_store::{ActivityInterval, IntervalStore, NOW_PLAYING_STREAM};
use super::probe::{ProbeContext, Probed};

pub fn summarize(intervals: &[ActivityInterval], top_count: usize) -> MediaSection {
    let listening = intervals
        .iter()
        .fold(TimeDelta::zero(), |acc, i| acc + i.duration());

    MediaSection {
        listening_minutes: listening.num_minutes().max(0) as u64,
        top_sources: top_usage(intervals, top_count),
    }
}

pub fn probe(ctx: &ProbeContext) -> Probed<MediaSection> {
    let store = IntervalStore::open_default(ctx.copies())?;
    ctx.checkpoint()?;
    let intervals = store.intervals(
        NOW_PLAYING_STREAM,
        ctx.day_start(),
        ctx.window_end(),
        |_| false,
    )?;
    Ok(summarize(&intervals, ctx.config.top_count))
}
