//! Well-known locations of macOS data sources.
//!
//! Most of these live under directories protected by Full Disk Access, so
//! `existing` returning `Missing` is the normal outcome when the terminal
//! has not been granted access.

use std::path::{Path, PathBuf};

use crate::error::{PlatformError, Result};

fn home() -> Result<PathBuf> {
    dirs::home_dir().ok_or(PlatformError::NoHome)
}

/// Returns `path` if it exists, `Missing` otherwise.
pub fn existing(path: PathBuf) -> Result<PathBuf> {
    if path.exists() {
        Ok(path)
    } else {
        Err(PlatformError::Missing(path))
    }
}

/// The first candidate that exists, or `Missing` naming the first candidate.
pub fn first_existing(candidates: Vec<PathBuf>) -> Result<PathBuf> {
    let fallback = candidates.first().cloned().unwrap_or_default();
    candidates
        .into_iter()
        .find(|p| p.exists())
        .ok_or(PlatformError::Missing(fallback))
}

/// The usage-event store (`knowledgeC.db`).
pub fn knowledge_db() -> Result<PathBuf> {
    Ok(home()?.join("Library/Application Support/Knowledge/knowledgeC.db"))
}

pub fn safari_history() -> Result<PathBuf> {
    Ok(home()?.join("Library/Safari/History.db"))
}

/// History database of a Chromium-family browser, given its profile root
/// relative to `~/Library/Application Support`.
pub fn chromium_history(profile_root: &str) -> Result<PathBuf> {
    Ok(home()?
        .join("Library/Application Support")
        .join(profile_root)
        .join("Default/History"))
}

/// Notification Center database locations, newest macOS layout first.
///
/// Older releases keep the database under the per-user temp directory,
/// passed in as `darwin_user_dir` when known.
pub fn notification_db_candidates(darwin_user_dir: Option<&Path>) -> Result<Vec<PathBuf>> {
    let mut candidates =
        vec![home()?.join("Library/Group Containers/group.com.apple.usernoted/db2/db")];
    if let Some(dir) = darwin_user_dir {
        candidates.push(dir.join("com.apple.notificationcenter/db2/db"));
    }
    Ok(candidates)
}

pub fn diagnostic_reports_dir() -> Result<PathBuf> {
    Ok(home()?.join("Library/Logs/DiagnosticReports"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_existing_reports_missing_path() {
        let path = PathBuf::from("/definitely/not/here/knowledgeC.db");
        match existing(path.clone()) {
            Err(PlatformError::Missing(p)) => assert_eq!(p, path),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_first_existing_picks_present_candidate() {
        let present = std::env::temp_dir();
        let found = first_existing(vec![PathBuf::from("/nope/a"), present.clone()]).unwrap();
        assert_eq!(found, present);
    }

    #[test]
    fn test_first_existing_names_first_candidate_when_none_exist() {
        let err = first_existing(vec![PathBuf::from("/nope/a"), PathBuf::from("/nope/b")])
            .unwrap_err();
        assert_eq!(err.to_string(), "/nope/a does not exist");
    }

    #[test]
    fn test_chromium_history_layout() {
        let path = chromium_history("Google/Chrome").unwrap();
        assert!(path.ends_with("Library/Application Support/Google/Chrome/Default/History"));
    }
}
