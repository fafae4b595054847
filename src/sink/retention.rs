use super::SinkError;
use chrono::{Days, NaiveDate};
use regex::Regex;
use std::path::{Path, PathBuf};

/// Recognizes `<prefix>_YYYY_MM_DD...` file names and extracts their date.
#[derive(Debug, Clone)]
pub struct LogFileMatcher {
    pattern: Regex,
}

impl LogFileMatcher {
    pub fn new(prefix: &str) -> Result<Self, SinkError> {
        let pattern = Regex::new(&format!(
            r"^{}_(\d{{4}}_\d{{2}}_\d{{2}}).*$",
            regex::escape(prefix)
        ))?;
        Ok(Self { pattern })
    }

    pub fn matches(&self, file_name: &str) -> bool {
        self.pattern.is_match(file_name)
    }

    /// Date embedded in a matching file name. Impossible dates yield `None`.
    pub fn date_of(&self, file_name: &str) -> Option<NaiveDate> {
        let captures = self.pattern.captures(file_name)?;
        NaiveDate::parse_from_str(captures.get(1)?.as_str(), "%Y_%m_%d").ok()
    }

    /// Matching files in `dir`, sorted by name. A missing directory is empty.
    pub fn list(&self, dir: &Path) -> Vec<PathBuf> {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!("Cannot list log directory {}: {}", dir.display(), e);
                return Vec::new();
            }
        };

        let mut files: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name().to_str().is_some_and(|n| self.matches(n)))
            .map(|entry| entry.path())
            .collect();
        files.sort();
        files
    }

    /// Files in `dir` whose date falls at or before `today - save_days`.
    pub fn expired(&self, dir: &Path, today: NaiveDate, save_days: u32) -> Vec<PathBuf> {
        self.list(dir)
            .into_iter()
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .and_then(|name| self.date_of(name))
                    .is_some_and(|date| is_expired(date, today, save_days))
            })
            .collect()
    }
}

pub fn is_expired(date: NaiveDate, today: NaiveDate, save_days: u32) -> bool {
    match today.checked_sub_days(Days::new(u64::from(save_days))) {
        Some(due) => date <= due,
        None => false,
    }
}

/// Deletes each path on its own task; failures are only reported.
pub(crate) fn spawn_removals(paths: Vec<PathBuf>) {
    for path in paths {
        tokio::spawn(async move {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => tracing::debug!("Deleted expired log {}", path.display()),
                Err(e) => tracing::error!("Failed to delete expired log {}: {}", path.display(), e),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_matcher_requires_prefix_and_date() {
        let matcher = LogFileMatcher::new("util").unwrap();
        assert!(matcher.matches("util_2024_03_09.txt"));
        assert!(matcher.matches("util_2024_03_09"));
        assert!(!matcher.matches("other_2024_03_09.txt"));
        assert!(!matcher.matches("util_2024_3_9.txt"));
        assert_eq!(matcher.date_of("util_2024_03_09.log"), Some(day(2024, 3, 9)));
        assert_eq!(matcher.date_of("util_2024_13_40.log"), None);
    }

    #[test]
    fn test_prefix_is_matched_literally() {
        let matcher = LogFileMatcher::new("a.b").unwrap();
        assert!(matcher.matches("a.b_2024_01_01.txt"));
        assert!(!matcher.matches("axb_2024_01_01.txt"));
    }

    #[test]
    fn test_expiry_boundary() {
        let today = day(2024, 3, 10);
        assert!(is_expired(day(2024, 3, 2), today, 7));
        assert!(is_expired(day(2024, 3, 3), today, 7));
        assert!(!is_expired(day(2024, 3, 4), today, 7));
    }

    #[test]
    fn test_expired_scans_directory() {
        let dir = TempDir::new().unwrap();
        for name in ["util_2024_03_02.txt", "util_2024_03_04.txt", "notes.txt"] {
            std::fs::write(dir.path().join(name), "x").unwrap();
        }
        let matcher = LogFileMatcher::new("util").unwrap();

        let expired = matcher.expired(dir.path(), day(2024, 3, 10), 7);

        assert_eq!(expired, vec![dir.path().join("util_2024_03_02.txt")]);
        assert_eq!(matcher.list(dir.path()).len(), 2);
    }
}
