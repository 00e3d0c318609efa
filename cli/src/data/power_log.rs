//! Reconstructs sleep and display state from `pmset -g log` output.
//!
//! Lines look like:
//!
//! ```text
//! 2024-01-15 01:00:00 -0800 Sleep               	Entering Sleep state due to 'Idle Sleep'
//! 2024-01-15 08:00:00 -0800 Wake                	Wake from Deep Idle [CDNVA] : due to UserActivity
//! 2024-01-15 08:00:02 -0800 Notification        	Display is turned on
//! ```
//!
//! Each reconstruction is a two-state scan: an "open" event starts a span,
//! a "close" event ends it, and the spans are summed.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

const TIMESTAMP_LEN: usize = 19;
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    Sleep,
    Wake,
    DisplayOn,
    DisplayOff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateTransitionEvent {
    pub kind: TransitionKind,
    pub timestamp: NaiveDateTime,
}

/// Parses one log line. Lines that are not transitions, or whose timestamp
/// cannot be read, yield `None`.
pub fn parse_line(line: &str) -> Option<StateTransitionEvent> {
    let timestamp =
        NaiveDateTime::parse_from_str(line.get(..TIMESTAMP_LEN)?, TIMESTAMP_FORMAT).ok()?;

    let mut rest = line.get(TIMESTAMP_LEN..)?.trim_start();
    if rest.starts_with(['+', '-']) {
        rest = rest
            .split_once(char::is_whitespace)
            .map(|(_, after)| after.trim_start())
            .unwrap_or("");
    }

    let (event_type, message) = rest
        .split_once(char::is_whitespace)
        .unwrap_or((rest, ""));

    let kind = match event_type {
        "Sleep" => TransitionKind::Sleep,
        "Wake" => TransitionKind::Wake,
        _ if message.contains("Display is turned on") => TransitionKind::DisplayOn,
        _ if message.contains("Display is turned off") => TransitionKind::DisplayOff,
        _ => return None,
    };

    Some(StateTransitionEvent { kind, timestamp })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Closed,
    Open(NaiveDateTime),
}

/// Which event kinds open and close a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpanRule {
    pub opens: TransitionKind,
    pub closes: TransitionKind,
}

impl SpanRule {
    pub const SLEEP: SpanRule = SpanRule {
        opens: TransitionKind::Sleep,
        closes: TransitionKind::Wake,
    };

    pub const DISPLAY_ON: SpanRule = SpanRule {
        opens: TransitionKind::DisplayOn,
        closes: TransitionKind::DisplayOff,
    };
}

/// Applies one event. Returns the next state and, when a span closes, its
/// length.
///
/// A repeated open keeps the first timestamp; a close with nothing open is
/// ignored.
pub fn transition(
    state: ScanState,
    event: StateTransitionEvent,
    rule: SpanRule,
) -> (ScanState, Option<TimeDelta>) {
    match state {
        ScanState::Closed if event.kind == rule.opens => (ScanState::Open(event.timestamp), None),
        ScanState::Open(since) if event.kind == rule.closes => {
            let span = (event.timestamp - since).max(TimeDelta::zero());
            (ScanState::Closed, Some(span))
        }
        _ => (state, None),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconstruction {
    pub total: TimeDelta,
    /// Number of spans that were opened in the window.
    pub spans: u32,
    /// Number of transition lines from the query day that were considered.
    pub events: u32,
}

impl Reconstruction {
    pub fn minutes(&self) -> u64 {
        self.total.num_minutes().max(0) as u64
    }
}

/// Sums the spans defined by `rule` over the log lines of `day` that fall
/// in `[start, end]`. A span still open at the end of the scan runs to `end`.
pub fn reconstruct(
    log: &str,
    day: NaiveDate,
    start: NaiveDateTime,
    end: NaiveDateTime,
    rule: SpanRule,
) -> Reconstruction {
    let day_prefix = day.format("%Y-%m-%d").to_string();
    let mut state = ScanState::Closed;
    let mut result = Reconstruction {
        total: TimeDelta::zero(),
        spans: 0,
        events: 0,
    };

    for line in log.lines() {
        if !line.starts_with(&day_prefix) {
            continue;
        }
        let Some(event) = parse_line(line) else {
            continue;
        };
        if event.timestamp < start || event.timestamp > end {
            continue;
        }
        if event.kind == rule.opens || event.kind == rule.closes {
            result.events += 1;
        }

        let (next, closed) = transition(state, event, rule);
        if state == ScanState::Closed && matches!(next, ScanState::Open(_)) {
            result.spans += 1;
        }
        if let Some(span) = closed {
            result.total += span;
        }
        state = next;
    }

    if let ScanState::Open(since) = state {
        result.total += (end - since).max(TimeDelta::zero());
    }

    result
}

pub fn sleep_duration(
    log: &str,
    day: NaiveDate,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> TimeDelta {
    reconstruct(log, day, start, end, SpanRule::SLEEP).total
}

pub fn display_on(
    log: &str,
    day: NaiveDate,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Reconstruction {
    reconstruct(log, day, start, end, SpanRule::DISPLAY_ON)
}
