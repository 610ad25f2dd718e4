use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use keyrace::runtime::{ChannelEventSource, RaceEvent, Runner, TypingAction};
use keyrace::session::{SessionPhase, TypingSession};

fn key(c: char) -> RaceEvent {
    RaceEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
}

/// Drive `session` from `runner` until it completes, a quit arrives, or the
/// step budget runs out
fn drive(runner: &Runner<ChannelEventSource>, session: &mut TypingSession) -> bool {
    for _ in 0..200u32 {
        match runner.step() {
            RaceEvent::Key(key) => match TypingAction::from_key(&key) {
                Some(TypingAction::Quit) => return false,
                Some(action) => action.apply(session),
                None => {}
            },
            RaceEvent::Tick | RaceEvent::Resize => {}
        }
        if session.is_completed() {
            return true;
        }
    }
    false
}

// Headless integration using the library runtime without a TTY
#[test]
fn headless_race_completes() {
    let mut session = TypingSession::new("hi");
    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(ChannelEventSource::new(rx), Duration::from_millis(5));

    tx.send(key('h')).unwrap();
    tx.send(RaceEvent::Tick).unwrap();
    tx.send(key('i')).unwrap();

    assert!(drive(&runner, &mut session));
    assert_eq!(session.phase(), SessionPhase::Completed);
    assert_eq!(session.accuracy(), 100.0);
    assert!(session.wpm() >= 0.0);
}

#[test]
fn corrections_do_not_repair_first_try_accuracy() {
    let mut session = TypingSession::new("Hello");
    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(ChannelEventSource::new(rx), Duration::from_millis(5));

    for event in [
        key('H'),
        key('e'),
        key('x'),
        RaceEvent::Key(KeyEvent::new(KeyCode::Backspace, KeyModifiers::NONE)),
        key('l'),
        key('l'),
        key('o'),
    ] {
        tx.send(event).unwrap();
    }

    assert!(drive(&runner, &mut session));
    assert_eq!(session.input_text(), "Hello");
    assert_eq!(session.errors(), 0);
    assert!((session.accuracy() - 80.0).abs() < 1e-9);
    assert_eq!(session.first_attempt_mistakes().get(&2), Some(&true));
}

#[test]
fn escape_finishes_early() {
    let mut session = TypingSession::new("hello world");
    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(ChannelEventSource::new(rx), Duration::from_millis(5));

    tx.send(key('h')).unwrap();
    tx.send(key('e')).unwrap();
    tx.send(RaceEvent::Key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)))
        .unwrap();

    assert!(drive(&runner, &mut session));
    assert_eq!(session.input_text(), "he");
    assert_eq!(session.correct_chars(), 2);
    assert_eq!(session.first_attempt_mistakes().len(), 2);
}

#[test]
fn ctrl_c_stops_the_loop() {
    let mut session = TypingSession::new("hello");
    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(ChannelEventSource::new(rx), Duration::from_millis(5));

    tx.send(key('h')).unwrap();
    tx.send(RaceEvent::Key(KeyEvent::new(
        KeyCode::Char('c'),
        KeyModifiers::CONTROL,
    )))
    .unwrap();

    assert!(!drive(&runner, &mut session));
    assert_eq!(session.phase(), SessionPhase::InProgress);
}

#[test]
fn idle_runner_only_ticks() {
    let (_tx, rx) = mpsc::channel();
    let runner = Runner::new(ChannelEventSource::new(rx), Duration::from_millis(2));

    for _ in 0..3 {
        assert!(matches!(runner.step(), RaceEvent::Tick));
    }
}
