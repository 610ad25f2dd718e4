use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::app_dirs::AppDirs;
use crate::content::DEFAULT_SOURCE;
use crate::error::StoreError;
use crate::filter::FilterOptions;
use crate::history::{append_result, truncate_oldest, SessionResult, HISTORY_CAP};
use crate::metrics::{merge_into, CharMetrics};
use crate::session::TypingSession;

/// Everything that outlives a single race
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Record {
    pub last_source: String,
    pub metrics: CharMetrics,
    pub history: Vec<SessionResult>,
    #[serde(flatten)]
    pub filters: FilterOptions,
}

impl Default for Record {
    fn default() -> Self {
        Self {
            last_source: DEFAULT_SOURCE.to_string(),
            metrics: CharMetrics::new(),
            history: Vec::new(),
            filters: FilterOptions::default(),
        }
    }
}

impl Record {
    /// Fold a finished race into the metrics and history.
    ///
    /// Returns the appended result, or `None` (leaving the record untouched)
    /// when the race has not completed.
    pub fn record_session(
        &mut self,
        session: &TypingSession,
        timestamp: i64,
    ) -> Option<SessionResult> {
        let result = SessionResult::from_session(session, timestamp)?;

        merge_into(&mut self.metrics, &session.session_stats());
        append_result(&mut self.history, result);

        info!(
            wpm = result.wpm,
            accuracy = result.accuracy,
            races = self.history.len(),
            "race recorded"
        );
        Some(result)
    }
}

pub trait RecordStore {
    /// Load the record; a store with nothing saved yet yields the defaults
    fn try_load(&self) -> Result<Record, StoreError>;

    fn save(&self, record: &Record) -> Result<(), StoreError>;

    /// Like `try_load`, but falls back to the defaults on any failure
    fn load(&self) -> Record {
        self.try_load().unwrap_or_else(|err| {
            warn!(%err, "could not load record, starting fresh");
            Record::default()
        })
    }
}

/// JSON file on disk
#[derive(Debug, Clone)]
pub struct FileRecordStore {
    path: PathBuf,
}

impl FileRecordStore {
    pub fn new() -> Self {
        Self {
            path: AppDirs::record_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore for FileRecordStore {
    fn try_load(&self) -> Result<Record, StoreError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Record::default()),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, record: &Record) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut capped = record.clone();
        truncate_oldest(&mut capped.history, HISTORY_CAP);

        fs::write(&self.path, serde_json::to_vec_pretty(&capped)?)?;
        info!(path = %self.path.display(), "record saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::CharMetric;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    fn finished_session(target: &str, typed: &str) -> TypingSession {
        let mut session = TypingSession::new(target);
        for c in typed.chars() {
            session.add_input(c);
        }
        session
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let store = FileRecordStore::with_path(dir.path().join("record.json"));

        let record = store.try_load().unwrap();

        assert_eq!(record, Record::default());
        assert_eq!(record.last_source, "quotes");
        assert!(record.filters.include_numbers);
        assert!(record.filters.include_non_standard);
    }

    #[test]
    fn test_roundtrip_record() {
        let dir = tempdir().unwrap();
        let store = FileRecordStore::with_path(dir.path().join("nested").join("record.json"));
        let mut record = Record {
            last_source: "code".into(),
            filters: FilterOptions {
                include_punctuation: false,
                ..FilterOptions::default()
            },
            ..Record::default()
        };
        record.record_session(&finished_session("Hi", "Hx"), 1_700_000_000);
        // Measured WPM is arbitrary; pin it so the comparison is exact
        record.history[0].wpm = 42.5;

        store.save(&record).unwrap();
        let loaded = store.try_load().unwrap();

        assert_eq!(loaded, record);
        assert_eq!(loaded.metrics[&'h'], CharMetric { attempts: 1, mistakes: 0 });
        assert_eq!(loaded.metrics[&'i'], CharMetric { attempts: 1, mistakes: 1 });
    }

    #[test]
    fn test_filter_flags_are_top_level_and_optional() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("record.json");
        fs::write(
            &path,
            r#"{"last_source": "code", "include_capitals": false, "metrics": {"a": {"attempts": 3, "mistakes": 1}}}"#,
        )
        .unwrap();

        let record = FileRecordStore::with_path(&path).try_load().unwrap();

        assert_eq!(record.last_source, "code");
        assert!(!record.filters.include_capitals);
        assert!(record.filters.include_numbers);
        assert_eq!(record.metrics[&'a'], CharMetric { attempts: 3, mistakes: 1 });
        assert!(record.history.is_empty());
    }

    #[test]
    fn test_corrupt_file_is_an_error_but_load_falls_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("record.json");
        fs::write(&path, "{ not json").unwrap();
        let store = FileRecordStore::with_path(&path);

        assert_matches!(store.try_load(), Err(StoreError::Json(_)));
        assert_eq!(store.load(), Record::default());
    }

    #[test]
    fn test_save_caps_history() {
        let dir = tempdir().unwrap();
        let store = FileRecordStore::with_path(dir.path().join("record.json"));
        let mut record = Record::default();
        for i in 0..(HISTORY_CAP + 5) {
            record.history.push(SessionResult {
                wpm: 40.0,
                accuracy: 95.0,
                timestamp: i as i64,
            });
        }

        store.save(&record).unwrap();
        let loaded = store.try_load().unwrap();

        assert_eq!(loaded.history.len(), HISTORY_CAP);
        assert_eq!(loaded.history[0].timestamp, 5);
        assert_eq!(record.history.len(), HISTORY_CAP + 5);
    }

    #[test]
    fn test_failed_save_leaves_record_usable() {
        let dir = tempdir().unwrap();
        // A directory where the file should be makes the write fail
        let store = FileRecordStore::with_path(dir.path());
        let mut record = Record::default();
        record.record_session(&finished_session("ok", "ok"), 1);

        assert_matches!(store.save(&record), Err(StoreError::Io(_)));
        assert_eq!(record.history.len(), 1);
        assert_eq!(record.metrics[&'o'].attempts, 1);
    }

    #[test]
    fn test_unfinished_session_is_not_recorded() {
        let mut record = Record::default();
        let session = finished_session("hello", "he");

        assert!(record.record_session(&session, 1).is_none());
        assert_eq!(record, Record::default());
    }

    #[test]
    fn test_metrics_accumulate_across_sessions() {
        let mut record = Record::default();

        record.record_session(&finished_session("Aa", "aa"), 1);
        record.record_session(&finished_session("ab", "xb"), 2);

        assert_eq!(record.metrics[&'a'], CharMetric { attempts: 3, mistakes: 2 });
        assert_eq!(record.metrics[&'b'], CharMetric { attempts: 1, mistakes: 0 });
        assert_eq!(record.history.len(), 2);
        assert_eq!(record.history[1].accuracy, 50.0);
    }
}
