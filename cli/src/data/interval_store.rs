//! Usage-event store adapter.
//!
//! macOS records app usage, media playback and similar activity as rows in
//! `knowledgeC.db`. Timestamps there are seconds since the Cocoa reference
//! date (2001-01-01 UTC), not the Unix epoch, so query bounds are translated
//! on the way in and row times on the way out.

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Local, NaiveDateTime, TimeDelta, TimeZone};
use rusqlite::{params, Connection};
use tracing::debug;

use daytrace_platform::paths;

use super::db_copy::{CopyRegistry, DbCopy};
use super::probe::ProbeError;

/// Seconds between the Unix epoch and 2001-01-01T00:00:00Z.
pub const COCOA_EPOCH_OFFSET: i64 = 978_307_200;

pub const APP_USAGE_STREAM: &str = "/app/usage";
pub const NOW_PLAYING_STREAM: &str = "/media/nowPlaying";

/// System and utility subjects that never count as user activity.
const SYSTEM_SUBJECTS: &[&str] = &[
    "com.apple.loginwindow",
    "com.apple.ScreenSaver.Engine",
    "com.apple.dock",
    "com.apple.controlcenter",
    "com.apple.notificationcenterui",
    "com.apple.Spotlight",
];

/// One recorded span of use. `end >= start` always holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityInterval {
    pub subject: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl ActivityInterval {
    pub fn new(subject: impl Into<String>, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            subject: subject.into(),
            start,
            end: end.max(start),
        }
    }

    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    /// Portion of this interval inside `[from, to)`.
    pub fn overlap(&self, from: NaiveDateTime, to: NaiveDateTime) -> TimeDelta {
        let start = self.start.max(from);
        let end = self.end.min(to);
        (end - start).max(TimeDelta::zero())
    }
}

/// Local wall-clock time to store seconds.
pub fn to_store_time(wall: NaiveDateTime) -> f64 {
    let unix = match Local.from_local_datetime(&wall).earliest() {
        Some(local) => local.timestamp(),
        None => wall.and_utc().timestamp(),
    };
    (unix - COCOA_EPOCH_OFFSET) as f64
}

/// Store seconds to local wall-clock time.
pub fn from_store_time(secs: f64) -> Option<NaiveDateTime> {
    if !secs.is_finite() {
        return None;
    }
    let utc = DateTime::from_timestamp(secs.floor() as i64 + COCOA_EPOCH_OFFSET, 0)?;
    Some(utc.with_timezone(&Local).naive_local())
}

pub fn is_system_subject(subject: &str) -> bool {
    SYSTEM_SUBJECTS.contains(&subject)
}

/// Total time per subject, longest first. Ties keep first-seen order.
pub fn totals_by_subject(intervals: &[ActivityInterval]) -> Vec<(String, TimeDelta)> {
    let mut order: Vec<String> = Vec::new();
    let mut totals: HashMap<&str, TimeDelta> = HashMap::new();

    for interval in intervals {
        let entry = totals.entry(interval.subject.as_str()).or_insert_with(|| {
            order.push(interval.subject.clone());
            TimeDelta::zero()
        });
        *entry += interval.duration();
    }

    let mut ranked: Vec<(String, TimeDelta)> = order
        .into_iter()
        .map(|subject| {
            let total = totals
                .get(subject.as_str())
                .copied()
                .unwrap_or_else(TimeDelta::zero);
            (subject, total)
        })
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

pub struct IntervalStore {
    conn: Connection,
    _copy: DbCopy,
}

impl IntervalStore {
    /// Opens a private copy of the user's `knowledgeC.db`.
    pub fn open_default(copies: &CopyRegistry) -> Result<Self, ProbeError> {
        let path = paths::knowledge_db()?;
        Self::open(&path, copies)
    }

    pub fn open(path: &Path, copies: &CopyRegistry) -> Result<Self, ProbeError> {
        let copy = DbCopy::of(path, copies)?;
        let conn = copy.open()?;
        Ok(Self { conn, _copy: copy })
    }

    /// Intervals on `stream` inside `[window_start, window_end)`, ordered
    /// by start, with system subjects and `excluded` subjects removed.
    pub fn intervals<F>(
        &self,
        stream: &str,
        window_start: NaiveDateTime,
        window_end: NaiveDateTime,
        excluded: F,
    ) -> Result<Vec<ActivityInterval>, ProbeError>
    where
        F: Fn(&str) -> bool,
    {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT ZVALUESTRING, ZSTARTDATE, ZENDDATE FROM ZOBJECT
                 WHERE ZSTREAMNAME = ?1 AND ZSTARTDATE >= ?2 AND ZENDDATE < ?3
                 ORDER BY ZSTARTDATE ASC",
            )
            .map_err(|e| ProbeError::parse("event store schema", e))?;

        let rows = stmt
            .query_map(
                params![stream, to_store_time(window_start), to_store_time(window_end)],
                |row| {
                    Ok((
                        row.get::<_, Option<String>>(0)?,
                        row.get::<_, Option<f64>>(1)?,
                        row.get::<_, Option<f64>>(2)?,
                    ))
                },
            )
            .map_err(|e| ProbeError::parse("event store rows", e))?;

        let mut intervals = Vec::new();
        let mut skipped = 0usize;

        for row in rows {
            let Ok((Some(subject), Some(start), Some(end))) = row else {
                skipped += 1;
                continue;
            };
            let (Some(start), Some(end)) = (from_store_time(start), from_store_time(end)) else {
                skipped += 1;
                continue;
            };
            if end < start || is_system_subject(&subject) || excluded(&subject) {
                continue;
            }
            intervals.push(ActivityInterval::new(subject, start, end));
        }

        if skipped > 0 {
            debug!(stream, skipped, "Skipped unreadable event store rows");
        }

        intervals.sort_by(|a, b| a.start.cmp(&b.start));
        Ok(intervals)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::NaiveDate;

    pub(crate) fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    pub(crate) fn interval(subject: &str, start: (u32, u32), end: (u32, u32)) -> ActivityInterval {
        ActivityInterval::new(subject, at(start.0, start.1), at(end.0, end.1))
    }

    /// Creates a `knowledgeC.db` subset with the given rows.
    pub(crate) fn write_store(path: &Path, rows: &[(&str, &str, NaiveDateTime, NaiveDateTime)]) {
        let conn = Connection::open(path).unwrap();
        conn.execute_batch(
            "CREATE TABLE ZOBJECT (
                Z_PK INTEGER PRIMARY KEY,
                ZSTREAMNAME VARCHAR,
                ZVALUESTRING VARCHAR,
                ZSTARTDATE TIMESTAMP,
                ZENDDATE TIMESTAMP
            );",
        )
        .unwrap();
        for (stream, subject, start, end) in rows {
            conn.execute(
                "INSERT INTO ZOBJECT (ZSTREAMNAME, ZVALUESTRING, ZSTARTDATE, ZENDDATE)
                 VALUES (?1, ?2, ?3, ?4)",
                params![stream, subject, to_store_time(*start), to_store_time(*end)],
            )
            .unwrap();
        }
    }

    #[test]
    fn test_store_time_round_trip() {
        let wall = at(9, 30);
        assert_eq!(from_store_time(to_store_time(wall)), Some(wall));
    }

    #[test]
    fn test_epoch_offset_is_cocoa_reference_date() {
        let reference = DateTime::from_timestamp(COCOA_EPOCH_OFFSET, 0).unwrap();
        assert_eq!(reference.to_rfc3339(), "2001-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_non_finite_store_time_rejected() {
        assert_eq!(from_store_time(f64::NAN), None);
    }

    #[test]
    fn test_interval_never_inverted() {
        let iv = ActivityInterval::new("a", at(10, 0), at(9, 0));
        assert_eq!(iv.duration(), TimeDelta::zero());
    }

    #[test]
    fn test_overlap_clamps_to_window() {
        let iv = interval("a", (5, 30), (6, 30));
        assert_eq!(iv.overlap(at(0, 0), at(6, 0)), TimeDelta::minutes(30));
        assert_eq!(iv.overlap(at(7, 0), at(8, 0)), TimeDelta::zero());
    }

    #[test]
    fn test_totals_by_subject_ranked() {
        let intervals = vec![
            interval("mail", (9, 0), (9, 10)),
            interval("code", (9, 10), (10, 0)),
            interval("mail", (10, 0), (10, 5)),
        ];
        let totals = totals_by_subject(&intervals);
        assert_eq!(totals[0], ("code".to_string(), TimeDelta::minutes(50)));
        assert_eq!(totals[1], ("mail".to_string(), TimeDelta::minutes(15)));
    }

    #[test]
    fn test_missing_store_is_unavailable() {
        let err = IntervalStore::open(Path::new("/nope/knowledgeC.db"), &CopyRegistry::default())
            .err()
            .unwrap();
        assert!(matches!(err, ProbeError::SourceUnavailable(_)));
    }

    #[test]
    fn test_query_filters_window_stream_and_system_subjects() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("knowledgeC.db");
        write_store(
            &path,
            &[
                (APP_USAGE_STREAM, "com.apple.Safari", at(10, 0), at(10, 30)),
                (APP_USAGE_STREAM, "com.microsoft.VSCode", at(9, 0), at(9, 45)),
                (APP_USAGE_STREAM, "com.apple.loginwindow", at(9, 45), at(9, 50)),
                (APP_USAGE_STREAM, "com.apple.finder", at(11, 0), at(11, 5)),
                (NOW_PLAYING_STREAM, "com.spotify.client", at(9, 0), at(10, 0)),
                (APP_USAGE_STREAM, "com.apple.Notes", at(15, 0), at(15, 10)),
            ],
        );

        let store = IntervalStore::open(&path, &CopyRegistry::default()).unwrap();
        let intervals = store
            .intervals(APP_USAGE_STREAM, at(0, 0), at(14, 0), |s| {
                s == "com.apple.finder"
            })
            .unwrap();

        let subjects: Vec<_> = intervals.iter().map(|i| i.subject.as_str()).collect();
        assert_eq!(subjects, vec!["com.microsoft.VSCode", "com.apple.Safari"]);
        assert_eq!(intervals[0].start, at(9, 0));
        assert_eq!(intervals[0].end, at(9, 45));
    }

    #[test]
    fn test_rows_with_nulls_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("knowledgeC.db");
        write_store(&path, &[(APP_USAGE_STREAM, "com.apple.Safari", at(10, 0), at(10, 30))]);
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute(
                "INSERT INTO ZOBJECT (ZSTREAMNAME, ZVALUESTRING, ZSTARTDATE, ZENDDATE)
                 VALUES (?1, NULL, ?2, ?3)",
                params![APP_USAGE_STREAM, to_store_time(at(11, 0)), to_store_time(at(11, 5))],
            )
            .unwrap();
        }

        let store = IntervalStore::open(&path, &CopyRegistry::default()).unwrap();
        let intervals = store
            .intervals(APP_USAGE_STREAM, at(0, 0), at(14, 0), |_| false)
            .unwrap();
        assert_eq!(intervals.len(), 1);
    }

    #[test]
    fn test_wrong_schema_is_parse_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("knowledgeC.db");
        Connection::open(&path)
            .unwrap()
            .execute_batch("CREATE TABLE other (x INTEGER);")
            .unwrap();

        let store = IntervalStore::open(&path, &CopyRegistry::default()).unwrap();
        let err = store
            .intervals(APP_USAGE_STREAM, at(0, 0), at(14, 0), |_| false)
            .unwrap_err();
        assert!(matches!(err, ProbeError::ParseFailure { .. }));
    }
}
