use chrono::{DateTime, Local, NaiveDateTime, TimeDelta};
use daytrace_platform::command;
use daytrace_protocol::UptimeSection;
use sysinfo::System;
use tracing::warn;

use super::power_log::sleep_duration;
use super::probe::{ProbeContext, ProbeError, Probed};

/// Time awake today: from the later of boot and midnight until `now`, less
/// the time spent asleep. Never negative.
pub fn awake_minutes(
    boot: NaiveDateTime,
    day_start: NaiveDateTime,
    now: NaiveDateTime,
    sleep: TimeDelta,
) -> u64 {
    let since = boot.max(day_start);
    let naive = (now - since).max(TimeDelta::zero());
    (naive - sleep).max(TimeDelta::zero()).num_minutes() as u64
}

pub fn boot_time() -> Probed<DateTime<Local>> {
    let secs = i64::try_from(System::boot_time())
        .map_err(|e| ProbeError::parse("boot time", e))?;
    DateTime::from_timestamp(secs, 0)
        .map(|utc| utc.with_timezone(&Local))
        .ok_or_else(|| ProbeError::parse("boot time", format!("{secs} is out of range")))
}

pub fn probe(ctx: &ProbeContext) -> Probed<UptimeSection> {
    let boot = boot_time()?;
    let uptime_secs = System::uptime();
    ctx.checkpoint()?;

    let sleep = match command::power_log() {
        Ok(log) => sleep_duration(&log, ctx.day(), ctx.day_start(), ctx.window_end()),
        Err(e) => {
            warn!("Power log unavailable, assuming no sleep: {}", e);
            TimeDelta::zero()
        }
    };

    Ok(UptimeSection {
        boot_time: boot.to_rfc3339(),
        uptime_minutes: uptime_secs / 60,
        sleep_minutes: sleep.num_minutes().max(0) as u64,
        awake_minutes: awake_minutes(
            boot.naive_local(),
            ctx.day_start(),
            ctx.window_end(),
            sleep,
        ),
    })
}
