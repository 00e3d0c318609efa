//! Open tabs and today's visited domains across installed browsers.
//!
//! Tabs come from AppleScript (needs Automation access per browser) and
//! visits from each browser's history database (needs Full Disk Access for
//! Safari). Every browser is optional; the probe only fails when none of
//! them yields anything.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use chrono::NaiveDateTime;
use daytrace_platform::{command, paths};
use daytrace_protocol::{BrowserTabs, BrowsersSection, CategoryCounts, DomainVisits};
use rusqlite::{params, Connection};
use tracing::debug;

use crate::analysis::{classify_with, host_of};
use crate::config::DomainPatterns;

use super::db_copy::{CopyRegistry, DbCopy};
use super::interval_store::{to_store_time, COCOA_EPOCH_OFFSET};
use super::probe::{ProbeContext, ProbeError, Probed};

/// Seconds between 1601-01-01 (the WebKit/Chromium epoch) and the Unix epoch.
pub const WEBKIT_EPOCH_OFFSET: i64 = 11_644_473_600;

const NOT_RUNNING: &str = "__not_running__";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryKind {
    Safari,
    /// Chromium profile root under `~/Library/Application Support`.
    Chromium(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrowserSpec {
    pub name: &'static str,
    pub history: HistoryKind,
}

pub const BROWSERS: [BrowserSpec; 5] = [
    BrowserSpec {
        name: "Safari",
        history: HistoryKind::Safari,
    },
    BrowserSpec {
        name: "Google Chrome",
        history: HistoryKind::Chromium("Google/Chrome"),
    },
    BrowserSpec {
        name: "Brave Browser",
        history: HistoryKind::Chromium("BraveSoftware/Brave-Browser"),
    },
    BrowserSpec {
        name: "Arc",
        history: HistoryKind::Chromium("Arc/User Data"),
    },
    BrowserSpec {
        name: "Microsoft Edge",
        history: HistoryKind::Chromium("Microsoft Edge"),
    },
];

/// What one browser gave up. `None` fields failed or were not readable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BrowserReading {
    pub name: String,
    pub tabs: Option<Vec<String>>,
    pub visits: Option<Vec<(String, u32)>>,
}

fn tabs_script(app: &str) -> String {
    format!(
        "if application \"{app}\" is running then\n\
         tell application \"{app}\" to get URL of every tab of every window\n\
         else\n\
         return \"{NOT_RUNNING}\"\n\
         end if"
    )
}

/// Splits `osascript` list output (`a, b, c`) into URLs.
///
/// Returns `None` when the browser is not running.
pub fn parse_tab_list(output: &str) -> Option<Vec<String>> {
    let output = output.trim();
    if output == NOT_RUNNING {
        return None;
    }
    Some(
        output
            .split(", ")
            .map(str::trim)
            .filter(|url| !url.is_empty() && *url != "missing value")
            .map(str::to_string)
            .collect(),
    )
}

fn open_tabs(app: &str) -> Probed<Option<Vec<String>>> {
    let output = command::run_applescript(&tabs_script(app))?;
    Ok(parse_tab_list(&output))
}

/// Safari stores visit times as Cocoa seconds.
pub fn safari_visits(conn: &Connection, since: NaiveDateTime) -> Probed<Vec<(String, u32)>> {
    query_visits(
        conn,
        "SELECT i.url, COUNT(*) FROM history_visits v
         JOIN history_items i ON i.id = v.history_item
         WHERE v.visit_time >= ?1
         GROUP BY i.url",
        to_store_time(since),
    )
}

/// Chromium stores visit times as microseconds since 1601.
pub fn chromium_visits(conn: &Connection, since: NaiveDateTime) -> Probed<Vec<(String, u32)>> {
    let unix = to_store_time(since) as i64 + COCOA_EPOCH_OFFSET;
    let webkit_micros = (unix + WEBKIT_EPOCH_OFFSET) * 1_000_000;
    query_visits(
        conn,
        "SELECT u.url, COUNT(*) FROM visits v
         JOIN urls u ON u.id = v.url
         WHERE v.visit_time >= ?1
         GROUP BY u.url",
        webkit_micros,
    )
}

fn query_visits<P: rusqlite::ToSql>(
    conn: &Connection,
    sql: &str,
    since: P,
) -> Probed<Vec<(String, u32)>> {
    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| ProbeError::parse("browser history schema", e))?;
    let rows = stmt
        .query_map(params![since], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?))
        })
        .map_err(|e| ProbeError::parse("browser history rows", e))?;

    Ok(rows.filter_map(Result::ok).collect())
}

fn history_path(kind: HistoryKind) -> Probed<PathBuf> {
    let path = match kind {
        HistoryKind::Safari => paths::safari_history()?,
        HistoryKind::Chromium(root) => paths::chromium_history(root)?,
    };
    Ok(paths::existing(path)?)
}

fn history(
    kind: HistoryKind,
    since: NaiveDateTime,
    copies: &CopyRegistry,
) -> Probed<Vec<(String, u32)>> {
    let copy = DbCopy::of(&history_path(kind)?, copies)?;
    let conn = copy.open()?;
    match kind {
        HistoryKind::Safari => safari_visits(&conn, since),
        HistoryKind::Chromium(_) => chromium_visits(&conn, since),
    }
}

fn read_browser(spec: &BrowserSpec, ctx: &ProbeContext) -> Probed<BrowserReading> {
    ctx.checkpoint()?;
    let tabs = open_tabs(spec.name)
        .inspect_err(|e| debug!(browser = spec.name, "Tabs unavailable: {}", e))
        .ok()
        .flatten();

    ctx.checkpoint()?;
    let visits = history(spec.history, ctx.day_start(), ctx.copies())
        .inspect_err(|e| debug!(browser = spec.name, "History unavailable: {}", e))
        .ok();

    Ok(BrowserReading {
        name: spec.name.to_string(),
        tabs,
        visits,
    })
}

/// Folds per-browser readings into one section. `None` when no browser
/// produced tabs or history.
pub fn combine(
    readings: &[BrowserReading],
    patterns: &DomainPatterns,
    top_count: usize,
) -> Option<BrowsersSection> {
    if readings
        .iter()
        .all(|r| r.tabs.is_none() && r.visits.is_none())
    {
        return None;
    }

    let mut browsers = Vec::new();
    let mut tab_domains: HashSet<String> = HashSet::new();
    let mut total_tabs = 0u32;

    for reading in readings {
        let Some(tabs) = &reading.tabs else {
            continue;
        };
        total_tabs += tabs.len() as u32;
        tab_domains.extend(tabs.iter().filter_map(|url| host_of(url)));
        browsers.push(BrowserTabs {
            name: reading.name.clone(),
            tabs: tabs.len() as u32,
        });
    }

    let mut order: Vec<String> = Vec::new();
    let mut visits_by_host: HashMap<String, u32> = HashMap::new();
    for (url, count) in readings.iter().filter_map(|r| r.visits.as_ref()).flatten() {
        let Some(host) = host_of(url) else {
            continue;
        };
        let entry = visits_by_host.entry(host.clone()).or_insert_with(|| {
            order.push(host);
            0
        });
        *entry += count;
    }

    let mut categories = CategoryCounts::default();
    let mut domains: Vec<DomainVisits> = order
        .into_iter()
        .filter_map(|domain| {
            let visits = visits_by_host.get(&domain).copied().unwrap_or(0);
            let category = classify_with(&domain, patterns)?;
            categories.add(category, visits);
            Some(DomainVisits {
                domain,
                visits,
                category,
            })
        })
        .collect();
    domains.sort_by(|a, b| b.visits.cmp(&a.visits));
    domains.truncate(top_count);

    Some(BrowsersSection {
        total_tabs,
        unique_domains: tab_domains.len() as u32,
        browsers,
        top_domains: domains,
        categories,
    })
}

pub fn probe(ctx: &ProbeContext) -> Probed<BrowsersSection> {
    let mut readings = Vec::with_capacity(BROWSERS.len());
    for spec in &BROWSERS {
        readings.push(read_browser(spec, ctx)?);
    }

    combine(&readings, &ctx.config.domains, ctx.config.top_count).ok_or_else(|| {
        ProbeError::unavailable("no browser tabs or history could be read")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::interval_store::tests::at;
    use daytrace_protocol::DomainCategory;

    fn reading(name: &str, tabs: Option<&[&str]>, visits: Option<&[(&str, u32)]>) -> BrowserReading {
        BrowserReading {
            name: name.to_string(),
            tabs: tabs.map(|t| t.iter().map(|s| s.to_string()).collect()),
            visits: visits.map(|v| v.iter().map(|(u, c)| (u.to_string(), *c)).collect()),
        }
    }

    #[test]
    fn test_parse_tab_list() {
        assert_eq!(parse_tab_list("__not_running__\n"), None);
        assert_eq!(parse_tab_list(""), Some(vec![]));
        assert_eq!(
            parse_tab_list("https://github.com/, missing value, https://docs.rs/chrono\n"),
            Some(vec![
                "https://github.com/".to_string(),
                "https://docs.rs/chrono".to_string()
            ])
        );
    }

    #[test]
    fn test_script_guards_on_running() {
        let script = tabs_script("Safari");
        assert!(script.starts_with("if application \"Safari\" is running then"));
        assert!(script.contains(NOT_RUNNING));
    }

    #[test]
    fn test_nothing_readable_is_none() {
        let readings = vec![reading("Safari", None, None), reading("Arc", None, None)];
        assert_eq!(combine(&readings, &DomainPatterns::default(), 5), None);
    }

    #[test]
    fn test_combines_tabs_and_history() {
        let readings = vec![
            reading(
                "Safari",
                Some(&["https://github.com/a", "https://www.github.com/b", "https://reddit.com/"]),
                Some(&[("https://github.com/a", 4), ("https://news.ycombinator.com/", 9)]),
            ),
            reading("Google Chrome", None, Some(&[("https://github.com/c", 3), ("about:blank", 2)])),
            reading("Arc", Some(&["https://linear.app/team"]), None),
        ];
        let section = combine(&readings, &DomainPatterns::default(), 5).unwrap();

        assert_eq!(section.total_tabs, 4);
        assert_eq!(section.unique_domains, 3);
        assert_eq!(section.browsers.len(), 2);
        assert_eq!(section.browsers[0].name, "Safari");
        assert_eq!(section.browsers[0].tabs, 3);

        assert_eq!(section.top_domains[0].domain, "news.ycombinator.com");
        assert_eq!(section.top_domains[0].category, DomainCategory::Distraction);
        assert_eq!(section.top_domains[1].domain, "github.com");
        assert_eq!(section.top_domains[1].visits, 7);
        assert_eq!(section.top_domains[1].category, DomainCategory::Work);

        assert_eq!(section.categories.work, 7);
        assert_eq!(section.categories.distraction, 9);
        assert_eq!(section.categories.neutral, 0);
    }

    #[test]
    fn test_safari_history_query() {
        let dir = tempfile::tempdir().unwrap();
        let conn = Connection::open(dir.path().join("History.db")).unwrap();
        conn.execute_batch(
            "CREATE TABLE history_items (id INTEGER PRIMARY KEY, url TEXT);
             CREATE TABLE history_visits (id INTEGER PRIMARY KEY, history_item INTEGER, visit_time REAL);",
        )
        .unwrap();
        conn.execute("INSERT INTO history_items VALUES (1, 'https://github.com/')", [])
            .unwrap();
        for time in [at(9, 0), at(10, 0)] {
            conn.execute(
                "INSERT INTO history_visits (history_item, visit_time) VALUES (1, ?1)",
                params![to_store_time(time)],
            )
            .unwrap();
        }
        // Before the window
        conn.execute(
            "INSERT INTO history_visits (history_item, visit_time) VALUES (1, ?1)",
            params![to_store_time(at(0, 0)) - 3600.0],
        )
        .unwrap();

        let visits = safari_visits(&conn, at(0, 0)).unwrap();
        assert_eq!(visits, vec![("https://github.com/".to_string(), 2)]);
    }

    #[test]
    fn test_chromium_history_query() {
        let dir = tempfile::tempdir().unwrap();
        let conn = Connection::open(dir.path().join("History")).unwrap();
        conn.execute_batch(
            "CREATE TABLE urls (id INTEGER PRIMARY KEY, url TEXT);
             CREATE TABLE visits (id INTEGER PRIMARY KEY, url INTEGER, visit_time INTEGER);",
        )
        .unwrap();
        conn.execute("INSERT INTO urls VALUES (1, 'https://docs.rs/')", [])
            .unwrap();

        let webkit = |time: NaiveDateTime| -> i64 {
            let unix = to_store_time(time) as i64 + COCOA_EPOCH_OFFSET;
            (unix + WEBKIT_EPOCH_OFFSET) * 1_000_000
        };
        for time in [at(8, 0), at(12, 30)] {
            conn.execute(
                "INSERT INTO visits (url, visit_time) VALUES (1, ?1)",
                params![webkit(time)],
            )
            .unwrap();
        }

        let visits = chromium_visits(&conn, at(0, 0)).unwrap();
        assert_eq!(visits, vec![("https://docs.rs/".to_string(), 2)]);
        assert!(chromium_visits(&conn, at(13, 0)).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_schema_is_parse_failure() {
        let dir = tempfile::tempdir().unwrap();
        let conn = Connection::open(dir.path().join("History")).unwrap();
        let err = chromium_visits(&conn, at(0, 0)).unwrap_err();
        assert!(matches!(err, ProbeError::ParseFailure { .. }));
    }
}
