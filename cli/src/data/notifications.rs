//! Notifications delivered today, from the Notification Center database.

use std::collections::HashMap;
use std::io::Cursor;
use std::path::PathBuf;

use chrono::NaiveDateTime;
use daytrace_platform::{command, paths};
use daytrace_protocol::{CountEntry, NotificationsSection};
use rusqlite::{params, Connection};
use tracing::debug;

use super::apps::app_name;
use super::db_copy::DbCopy;
use super::interval_store::to_store_time;
use super::probe::{ProbeContext, ProbeError, Probed};

/// Whether a record's binary-plist payload describes a user-visible
/// notification. Records without a `req` entry carry no content.
pub fn has_request(data: &[u8]) -> bool {
    plist::Value::from_reader(Cursor::new(data))
        .ok()
        .and_then(|value| value.into_dictionary())
        .is_some_and(|dict| dict.contains_key("req"))
}

/// Delivered notifications per app identifier since `since`, busiest first.
pub fn delivered_since(conn: &Connection, since: NaiveDateTime) -> Probed<Vec<(String, u32)>> {
    let mut stmt = conn
        .prepare(
            "SELECT app.identifier, record.data FROM record
             JOIN app ON app.app_id = record.app_id
             WHERE record.delivered_date >= ?1",
        )
        .map_err(|e| ProbeError::parse("notification database schema", e))?;

    let rows = stmt
        .query_map(params![to_store_time(since)], |row| {
            Ok((
                row.get::<_, Option<String>>(0)?,
                row.get::<_, Option<Vec<u8>>>(1)?,
            ))
        })
        .map_err(|e| ProbeError::parse("notification records", e))?;

    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, u32> = HashMap::new();
    let mut skipped = 0usize;

    for row in rows {
        let Ok((Some(identifier), Some(data))) = row else {
            skipped += 1;
            continue;
        };
        if !has_request(&data) {
            continue;
        }
        let count = counts.entry(identifier.clone()).or_insert_with(|| {
            order.push(identifier);
            0
        });
        *count += 1;
    }

    if skipped > 0 {
        debug!(skipped, "Skipped unreadable notification records");
    }

    let mut ranked: Vec<(String, u32)> = order
        .into_iter()
        .map(|id| {
            let count = counts.get(&id).copied().unwrap_or(0);
            (id, count)
        })
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    Ok(ranked)
}

pub fn summarize(delivered: &[(String, u32)], top_count: usize) -> NotificationsSection {
    NotificationsSection {
        total: delivered.iter().map(|(_, count)| count).sum(),
        top_apps: delivered
            .iter()
            .take(top_count)
            .map(|(id, count)| CountEntry {
                name: app_name(id).to_string(),
                count: *count,
            })
            .collect(),
    }
}

fn database_path() -> Probed<PathBuf> {
    let darwin_user_dir = command::run_tool("getconf", &["DARWIN_USER_DIR"])
        .map(|out| PathBuf::from(out.trim()))
        .inspect_err(|e| debug!("DARWIN_USER_DIR unavailable: {}", e))
        .ok();
    let candidates = paths::notification_db_candidates(darwin_user_dir.as_deref())?;
    Ok(paths::first_existing(candidates)?)
}

pub fn probe(ctx: &ProbeContext) -> Probed<NotificationsSection> {
    let copy = DbCopy::of(&database_path()?, ctx.copies())?;
    let conn = copy.open()?;
    ctx.checkpoint()?;
    let delivered = delivered_since(&conn, ctx.day_start())?;
    Ok(summarize(&delivered, ctx.config.top_count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::interval_store::tests::at;

    fn payload(with_request: bool) -> Vec<u8> {
        let mut dict = plist::Dictionary::new();
        dict.insert("app".to_string(), plist::Value::from("com.apple.mail"));
        if with_request {
            let mut req = plist::Dictionary::new();
            req.insert("titl".to_string(), plist::Value::from("New message"));
            dict.insert("req".to_string(), plist::Value::Dictionary(req));
        }
        let mut bytes = Vec::new();
        plist::Value::Dictionary(dict)
            .to_writer_binary(&mut bytes)
            .unwrap();
        bytes
    }

    fn write_db(conn: &Connection, records: &[(i64, NaiveDateTime, Vec<u8>)]) {
        conn.execute_batch(
            "CREATE TABLE app (app_id INTEGER PRIMARY KEY, identifier VARCHAR);
             CREATE TABLE record (rec_id INTEGER PRIMARY KEY, app_id INTEGER, delivered_date REAL, data BLOB);
             INSERT INTO app VALUES (1, 'com.apple.mail');
             INSERT INTO app VALUES (2, 'com.tinyspeck.slackmacgap');",
        )
        .unwrap();
        for (app_id, delivered, data) in records {
            conn.execute(
                "INSERT INTO record (app_id, delivered_date, data) VALUES (?1, ?2, ?3)",
                params![app_id, to_store_time(*delivered), data],
            )
            .unwrap();
        }
    }

    #[test]
    fn test_has_request() {
        assert!(has_request(&payload(true)));
        assert!(!has_request(&payload(false)));
        assert!(!has_request(b"not a plist"));
    }

    #[test]
    fn test_delivered_counts() {
        let dir = tempfile::tempdir().unwrap();
        let conn = Connection::open(dir.path().join("db")).unwrap();
        write_db(
            &conn,
            &[
                (1, at(9, 0), payload(true)),
                (2, at(9, 5), payload(true)),
                (2, at(9, 6), payload(true)),
                (2, at(9, 7), payload(false)),
                (1, at(0, 0) - chrono::TimeDelta::hours(2), payload(true)),
            ],
        );

        let delivered = delivered_since(&conn, at(0, 0)).unwrap();
        assert_eq!(
            delivered,
            vec![
                ("com.tinyspeck.slackmacgap".to_string(), 2),
                ("com.apple.mail".to_string(), 1),
            ]
        );

        let section = summarize(&delivered, 5);
        assert_eq!(section.total, 3);
        assert_eq!(section.top_apps[0].name, "Slack");
        assert_eq!(section.top_apps[1].name, "mail");
    }

    #[test]
    fn test_unexpected_schema_is_parse_failure() {
        let dir = tempfile::tempdir().unwrap();
        let conn = Connection::open(dir.path().join("db")).unwrap();
        let err = delivered_since(&conn, at(0, 0)).unwrap_err();
        assert!(matches!(err, ProbeError::ParseFailure { .. }));
    }
}
