//! Crash, hang and spin reports written today.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Local, NaiveDate};
use daytrace_platform::paths;
use daytrace_protocol::{CountEntry, IssuesSection};

use super::probe::{ProbeContext, ProbeError, Probed};

const REPORT_EXTENSIONS: [&str; 4] = ["ips", "crash", "hang", "spin"];

/// Process name from a report file stem such as
/// `Safari-2024-01-15-101010`: everything before the first `-YYYY`.
pub fn process_name(stem: &str) -> &str {
    let bytes = stem.as_bytes();
    for (idx, _) in stem.match_indices('-') {
        let year = bytes.get(idx + 1..idx + 5);
        if year.is_some_and(|y| y.iter().all(u8::is_ascii_digit)) {
            return &stem[..idx];
        }
    }
    stem
}

pub fn is_report(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| REPORT_EXTENSIONS.contains(&ext))
}

/// Counts reports in `dir` last modified on `day`, per process.
pub fn scan(dir: &Path, day: NaiveDate, top_count: usize) -> Probed<IssuesSection> {
    let entries = fs::read_dir(dir).map_err(|e| {
        ProbeError::unavailable(format!("cannot read {}: {}", dir.display(), e))
    })?;

    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, u32> = HashMap::new();

    for entry in entries.flatten() {
        let path = entry.path();
        if !is_report(&path) {
            continue;
        }
        let Some(modified) = entry.metadata().and_then(|m| m.modified()).ok() else {
            continue;
        };
        if DateTime::<Local>::from(modified).date_naive() != day {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        let name = process_name(stem).to_string();
        let count = counts.entry(name.clone()).or_insert_with(|| {
            order.push(name);
            0
        });
        *count += 1;
    }

    let mut by_process: Vec<CountEntry> = order
        .into_iter()
        .map(|name| {
            let count = counts.get(&name).copied().unwrap_or(0);
            CountEntry { name, count }
        })
        .collect();
    by_process.sort_by(|a, b| b.count.cmp(&a.count));

    let total = by_process.iter().map(|e| e.count).sum();
    by_process.truncate(top_count);

    Ok(IssuesSection { total, by_process })
}

pub fn probe(ctx: &ProbeContext) -> Probed<IssuesSection> {
    let dir = paths::existing(paths::diagnostic_reports_dir()?)?;
    scan(&dir, ctx.day(), ctx.config.top_count)
}
