//! Bytes moved over the network today.
//!
//! Interface counters run from boot, so a per-day baseline is kept in the
//! data directory. The first run of a day records the counters it sees and
//! later runs report the difference.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDate};
use daytrace_protocol::NetworkSection;
use serde::{Deserialize, Serialize};
use sysinfo::Networks;
use tracing::{debug, warn};

use crate::config::data_dir;

use super::probe::{ProbeContext, ProbeError, Probed};
use super::uptime::boot_time;

const BASELINE_FILE: &str = "network-baseline.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Counters {
    pub received: u64,
    pub sent: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Baseline {
    pub date: NaiveDate,
    pub received: u64,
    pub sent: u64,
    pub recorded_at: String,
}

impl Baseline {
    fn counters(&self) -> Counters {
        Counters {
            received: self.received,
            sent: self.sent,
        }
    }
}

pub fn baseline_path() -> PathBuf {
    data_dir().join(BASELINE_FILE)
}

pub fn read_baseline(path: &Path) -> Option<Baseline> {
    let content = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&content) {
        Ok(baseline) => Some(baseline),
        Err(e) => {
            debug!("Ignoring unreadable network baseline: {}", e);
            None
        }
    }
}

pub fn write_baseline(path: &Path, baseline: &Baseline) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(baseline)?;
    fs::write(path, json)
}

/// Sums every non-loopback interface.
pub fn read_counters() -> Counters {
    let networks = Networks::new_with_refreshed_list();
    networks
        .iter()
        .filter(|(name, _)| !name.starts_with("lo"))
        .fold(Counters::default(), |acc, (_, data)| Counters {
            received: acc.received.saturating_add(data.total_received()),
            sent: acc.sent.saturating_add(data.total_transmitted()),
        })
}

/// Decides today's totals and, when the stored baseline is stale or
/// missing, the baseline to store.
///
/// - Booted today: the counters themselves are today's traffic.
/// - Baseline from today that the counters have not fallen below: the
///   difference.
/// - Otherwise the day starts now, at zero.
pub fn delta(
    current: Counters,
    stored: Option<&Baseline>,
    now: DateTime<Local>,
    boot: DateTime<Local>,
) -> (NetworkSection, Option<Baseline>) {
    let today = now.date_naive();
    let fresh = Baseline {
        date: today,
        received: current.received,
        sent: current.sent,
        recorded_at: now.to_rfc3339(),
    };

    if boot.date_naive() == today {
        let replace = stored.map_or(true, |baseline| baseline.date != today);
        let section = NetworkSection {
            received_bytes: current.received,
            sent_bytes: current.sent,
            since: boot.to_rfc3339(),
        };
        let baseline = Baseline {
            received: 0,
            sent: 0,
            recorded_at: boot.to_rfc3339(),
            ..fresh
        };
        return (section, replace.then_some(baseline));
    }

    match stored {
        Some(baseline)
            if baseline.date == today
                && current.received >= baseline.received
                && current.sent >= baseline.sent =>
        {
            let start = baseline.counters();
            let section = NetworkSection {
                received_bytes: current.received - start.received,
                sent_bytes: current.sent - start.sent,
                since: baseline.recorded_at.clone(),
            };
            (section, None)
        }
        _ => {
            let section = NetworkSection {
                received_bytes: 0,
                sent_bytes: 0,
                since: fresh.recorded_at.clone(),
            };
            (section, Some(fresh))
        }
    }
}

pub fn probe(ctx: &ProbeContext) -> Probed<NetworkSection> {
    let boot = boot_time()?;
    let current = read_counters();
    if current == Counters::default() {
        return Err(ProbeError::unavailable("no network interfaces reported"));
    }
    ctx.checkpoint()?;

    let path = baseline_path();
    let stored = read_baseline(&path);
    let (section, replacement) = delta(current, stored.as_ref(), ctx.now, boot);

    if let Some(baseline) = replacement {
        if let Err(e) = write_baseline(&path, &baseline) {
            warn!("Could not save network baseline to {}: {}", path.display(), e);
        }
    }

    Ok(section)
}
