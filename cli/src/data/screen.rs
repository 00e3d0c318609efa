use chrono::{NaiveDate, NaiveDateTime};
use daytrace_platform::command;
use daytrace_protocol::ScreenSection;

use super::power_log::display_on;
use super::probe::{ProbeContext, ProbeError, Probed};

/// Screen-on time from the display transitions in `log`.
///
/// A log with no display transitions for the day cannot say anything about
/// the screen, so it is a parse failure rather than zero minutes.
pub fn from_log(
    log: &str,
    day: NaiveDate,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Probed<ScreenSection> {
    let display = display_on(log, day, start, end);
    if display.events == 0 {
        return Err(ProbeError::parse(
            "power log",
            "no display transitions recorded today",
        ));
    }

    Ok(ScreenSection {
        screen_on_minutes: display.minutes(),
        display_on_events: display.spans,
    })
}

pub fn probe(ctx: &ProbeContext) -> Probed<ScreenSection> {
    let log = command::power_log()?;
    ctx.checkpoint()?;
    from_log(&log, ctx.day(), ctx.day_start(), ctx.window_end())
}
