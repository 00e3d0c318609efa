use chrono::TimeDelta;

use crate::data::ActivityInterval;

pub const NO_BREAK_GAP_MINS: i64 = 15;

/// Longest stretch of activity, in any app, where no gap between
/// consecutive intervals reaches `max_gap`.
pub fn longest_no_break(intervals: &[ActivityInterval], max_gap: TimeDelta) -> TimeDelta {
    let Some(first) = intervals.first() else {
        return TimeDelta::zero();
    };

    let mut span_start = first.start;
    let mut span_end = first.end;
    let mut longest = span_end - span_start;

    for interval in &intervals[1..] {
        if interval.start - span_end < max_gap {
            span_end = span_end.max(interval.end);
        } else {
            span_start = interval.start;
            span_end = interval.end;
        }
        longest = longest.max(span_end - span_start);
    }

    longest
}
