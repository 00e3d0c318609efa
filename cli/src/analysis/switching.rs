use chrono::TimeDelta;

use crate::data::ActivityInterval;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwitchingStats {
    pub switches: u32,
    pub switches_per_hour: f64,
    pub avg_mins_between: f64,
    /// Hours between the first interval's start and the last one's end.
    pub active_hours: f64,
}

/// Counts app switches between adjacent intervals.
///
/// A switch is any interval whose subject differs from the one before it.
/// The rate is taken over the active span (first start to last end), not the
/// calendar day. Fewer than two intervals, or a zero-length span, is
/// reported as `None`: a rate of zero there would be invented precision.
pub fn switching_stats(intervals: &[ActivityInterval]) -> Option<SwitchingStats> {
    if intervals.len() < 2 {
        return None;
    }

    let first = intervals.first()?;
    let last = intervals.last()?;
    let span = last.end - first.start;
    if span <= TimeDelta::zero() {
        return None;
    }

    let mut switches = 0u32;
    let mut gap_secs = 0i64;
    for pair in intervals.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        if next.subject != prev.subject {
            switches += 1;
            gap_secs += (next.start - prev.end).num_seconds().max(0);
        }
    }

    let active_hours = span.num_seconds() as f64 / 3600.0;
    let avg_mins_between = if switches > 0 {
        gap_secs as f64 / switches as f64 / 60.0
    } else {
        0.0
    };

    Some(SwitchingStats {
        switches,
        switches_per_hour: switches as f64 / active_hours,
        avg_mins_between,
        active_hours,
    })
}
