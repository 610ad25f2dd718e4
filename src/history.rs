use std::path::Path;

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::StoreError;
use crate::session::TypingSession;

/// Upper bound on results kept in the persisted record
pub const HISTORY_CAP: usize = 500;

/// Summary of one finished race
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SessionResult {
    pub wpm: f64,
    pub accuracy: f64,
    /// Unix seconds
    pub timestamp: i64,
}

impl SessionResult {
    /// `None` until the race has completed
    pub fn from_session(session: &TypingSession, timestamp: i64) -> Option<Self> {
        session.is_completed().then(|| Self {
            wpm: session.wpm(),
            accuracy: session.accuracy(),
            timestamp,
        })
    }
}

pub fn append_result(log: &mut Vec<SessionResult>, result: SessionResult) {
    log.push(result);
}

/// The newest `window` results, oldest first
pub fn recent(log: &[SessionResult], window: usize) -> &[SessionResult] {
    &log[log.len().saturating_sub(window)..]
}

/// Drop the oldest results beyond `cap`
pub fn truncate_oldest(log: &mut Vec<SessionResult>, cap: usize) {
    if log.len() > cap {
        log.drain(..log.len() - cap);
    }
}

#[derive(Serialize)]
struct CsvRow {
    timestamp: i64,
    date: String,
    wpm: f64,
    accuracy: f64,
}

/// Write the history log as CSV, one row per race
pub fn export_csv<P: AsRef<Path>>(log: &[SessionResult], path: P) -> Result<(), StoreError> {
    let mut writer = csv::Writer::from_path(path.as_ref())?;

    for result in log {
        writer.serialize(CsvRow {
            timestamp: result.timestamp,
            date: DateTime::from_timestamp(result.timestamp, 0)
                .map(|d| d.to_rfc3339())
                .unwrap_or_default(),
            wpm: (result.wpm * 100.0).round() / 100.0,
            accuracy: (result.accuracy * 100.0).round() / 100.0,
        })?;
    }
    writer.flush()?;

    info!(rows = log.len(), path = %path.as_ref().display(), "history exported");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn result(wpm: f64, timestamp: i64) -> SessionResult {
        SessionResult {
            wpm,
            accuracy: 100.0,
            timestamp,
        }
    }

    #[test]
    fn test_append_keeps_order() {
        let mut log = vec![];
        append_result(&mut log, result(10.0, 1));
        append_result(&mut log, result(20.0, 2));

        assert_eq!(log.iter().map(|r| r.timestamp).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_recent_window() {
        let log: Vec<_> = (0..30).map(|i| result(i as f64, i)).collect();

        let window = recent(&log, 20);
        assert_eq!(window.len(), 20);
        assert_eq!(window[0].timestamp, 10);
        assert_eq!(window[19].timestamp, 29);

        assert_eq!(recent(&log[..3], 20).len(), 3);
    }

    #[test]
    fn test_truncate_oldest() {
        let mut log: Vec<_> = (0..10).map(|i| result(i as f64, i)).collect();

        truncate_oldest(&mut log, 4);

        assert_eq!(log.len(), 4);
        assert_eq!(log[0].timestamp, 6);
    }

    #[test]
    fn test_from_session_requires_completion() {
        let mut session = TypingSession::new("ab");
        session.add_input('a');
        assert!(SessionResult::from_session(&session, 7).is_none());

        session.add_input('x');
        let summary = SessionResult::from_session(&session, 7).unwrap();

        assert_eq!(summary.timestamp, 7);
        assert_eq!(summary.accuracy, 50.0);
        assert!(summary.wpm >= 0.0);
    }

    #[test]
    fn test_export_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.csv");
        let log = vec![
            SessionResult {
                wpm: 42.123,
                accuracy: 97.5,
                timestamp: 0,
            },
            result(55.0, 86_400),
        ];

        export_csv(&log, &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines[0], "timestamp,date,wpm,accuracy");
        assert_eq!(lines[1], "0,1970-01-01T00:00:00+00:00,42.12,97.5");
        assert_eq!(lines[2], "86400,1970-01-02T00:00:00+00:00,55.0,100.0");
    }
}
