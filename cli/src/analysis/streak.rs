use chrono::{NaiveDateTime, TimeDelta};

use crate::data::ActivityInterval;

/// Default largest gap, in seconds, between two same-app intervals that
/// keeps a streak going.
pub const STREAK_GAP_SECS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusStreak {
    pub subject: String,
    pub total: TimeDelta,
}

impl FocusStreak {
    pub fn minutes(&self) -> u64 {
        self.total.num_minutes().max(0) as u64
    }
}

struct Running<'a> {
    subject: &'a str,
    total: TimeDelta,
    last_end: NaiveDateTime,
}

fn close<'a>(streak: Running<'a>, best: &mut Option<(&'a str, TimeDelta)>) {
    let longer = match best {
        Some((_, total)) => streak.total > *total,
        None => true,
    };
    if longer {
        *best = Some((streak.subject, streak.total));
    }
}

/// Longest run of consecutive same-subject intervals where each gap is
/// under `max_gap`, measured by summed interval time.
///
/// Ties keep the first streak seen. Returns `None` for an empty list or
/// when no streak has positive length.
pub fn longest_streak(intervals: &[ActivityInterval], max_gap: TimeDelta) -> Option<FocusStreak> {
    let mut best: Option<(&str, TimeDelta)> = None;
    let mut running: Option<Running> = None;

    for interval in intervals {
        let extends = running.as_ref().is_some_and(|current| {
            current.subject == interval.subject && interval.start - current.last_end < max_gap
        });

        if extends {
            if let Some(current) = running.as_mut() {
                current.total += interval.duration();
                current.last_end = interval.end;
            }
            continue;
        }

        if let Some(done) = running.take() {
            close(done, &mut best);
        }
        running = Some(Running {
            subject: &interval.subject,
            total: interval.duration(),
            last_end: interval.end,
        });
    }

    if let Some(open) = running.take() {
        close(open, &mut best);
    }

    best.filter(|(_, total)| *total > TimeDelta::zero())
        .map(|(subject, total)| FocusStreak {
            subject: subject.to_string(),
            total,
        })
}
