use std::fs;

use assert_matches::assert_matches;
use keyrace::config::{FileRecordStore, Record, RecordStore};
use keyrace::content::{prepare_content, source_by_name, CustomSource, SOURCE_NAMES};
use keyrace::error::ContentError;
use keyrace::filter::FilterOptions;
use keyrace::history::export_csv;
use keyrace::metrics::report;
use keyrace::session::TypingSession;
use keyrace::trend::{trend, GraphSize, TrendOutcome, DEFAULT_WINDOW};

fn race(text: &str, typed: &str) -> TypingSession {
    let mut session = TypingSession::new(text);
    for c in typed.chars() {
        session.add_input(c);
    }
    session
}

#[test]
fn finished_races_flow_into_metrics_trend_and_export() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileRecordStore::with_path(dir.path().join("record.json"));
    let mut record = store.load();

    let options = FilterOptions {
        include_punctuation: false,
        include_capitals: false,
        ..FilterOptions::default()
    };
    let content = prepare_content(&CustomSource::new("Hello,   World!"), &options).unwrap();
    assert_eq!(content.text, "hello world");

    for (i, typed) in ["hello world", "hellp world", "jello world"].iter().enumerate() {
        let session = race(&content.text, typed);
        assert!(record.record_session(&session, 1_700_000_000 + i as i64).is_some());
    }
    store.save(&record).unwrap();

    let loaded = store.try_load().unwrap();
    assert_eq!(loaded.history.len(), 3);
    assert_eq!(loaded.metrics[&'o'].attempts, 6);
    assert_eq!(loaded.metrics[&'o'].mistakes, 1);

    let rows = report(&loaded.metrics);
    // 'h' and 'o' each missed once; 'h' has fewer attempts so it is weaker
    assert_eq!(rows[0].character, 'h');
    assert_eq!(rows[1].character, 'o');

    let outcome = trend(&loaded.history, DEFAULT_WINDOW, GraphSize::default());
    assert_eq!(outcome.grid().map(|grid| grid.points.len()), Some(3));

    let csv_path = dir.path().join("history.csv");
    export_csv(&loaded.history, &csv_path).unwrap();
    let csv = fs::read_to_string(&csv_path).unwrap();
    assert_eq!(csv.lines().count(), 4);
    assert!(csv.lines().nth(1).unwrap().starts_with("1700000000,2023-11-14T22:13:20+00:00,"));
}

#[test]
fn first_race_has_no_trend_yet() {
    let mut record = Record::default();
    record.record_session(&race("ok", "ok"), 1);

    assert_eq!(
        trend(&record.history, DEFAULT_WINDOW, GraphSize::default()),
        TrendOutcome::InsufficientData { played: 1 }
    );
}

#[test]
fn every_builtin_source_yields_raceable_text() {
    let strict = FilterOptions {
        include_numbers: false,
        include_punctuation: false,
        include_capitals: false,
        include_non_standard: false,
    };

    for name in SOURCE_NAMES {
        let source = source_by_name(name).unwrap();
        for options in [FilterOptions::default(), strict] {
            let content = prepare_content(source.as_ref(), &options).unwrap();
            assert!(!content.text.is_empty());
            assert!(!content.text.contains("  "));
        }
    }
}

#[test]
fn text_filtered_to_nothing_is_reported() {
    let options = FilterOptions {
        include_numbers: false,
        include_punctuation: false,
        ..FilterOptions::default()
    };

    assert_matches!(
        prepare_content(&CustomSource::new("1, 2, 3!"), &options),
        Err(ContentError::EmptyAfterFilter)
    );
}
