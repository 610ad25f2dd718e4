use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::session::TypingSession;

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum RaceEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Source of terminal events (keyboard, resize, etc.)
pub trait RaceEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    fn recv_timeout(&self, timeout: Duration) -> Result<RaceEvent, RecvTimeoutError>;
}

/// Production event source reading crossterm events on a background thread
pub struct CrosstermEventSource {
    rx: Receiver<RaceEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let forwarded = match event::read() {
                Ok(CtEvent::Key(key)) => tx.send(RaceEvent::Key(key)),
                Ok(CtEvent::Resize(_, _)) => tx.send(RaceEvent::Resize),
                Ok(_) => Ok(()),
                Err(_) => break,
            };
            if forwarded.is_err() {
                break;
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl RaceEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<RaceEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Event source fed by a channel, for headless runs and tests
pub struct ChannelEventSource {
    rx: Receiver<RaceEvent>,
}

impl ChannelEventSource {
    pub fn new(rx: Receiver<RaceEvent>) -> Self {
        Self { rx }
    }
}

impl RaceEventSource for ChannelEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<RaceEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Advances the host loop one event at a time, yielding `Tick` when the
/// tick interval passes without input so the live WPM can be redrawn
pub struct Runner<E: RaceEventSource> {
    event_source: E,
    tick_interval: Duration,
}

impl<E: RaceEventSource> Runner<E> {
    pub fn new(event_source: E, tick_interval: Duration) -> Self {
        Self {
            event_source,
            tick_interval,
        }
    }

    pub fn step(&self) -> RaceEvent {
        self.event_source
            .recv_timeout(self.tick_interval)
            .unwrap_or(RaceEvent::Tick)
    }
}

/// What a key press means while a race is running
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypingAction {
    Type(char),
    Backspace,
    BackspaceWord,
    Finish,
    Quit,
}

impl TypingAction {
    pub fn from_key(key: &KeyEvent) -> Option<Self> {
        if key.kind != KeyEventKind::Press {
            return None;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);

        match key.code {
            KeyCode::Char('c') if ctrl => Some(Self::Quit),
            KeyCode::Char('w') if ctrl => Some(Self::BackspaceWord),
            KeyCode::Backspace if alt || ctrl => Some(Self::BackspaceWord),
            KeyCode::Backspace => Some(Self::Backspace),
            KeyCode::Esc => Some(Self::Finish),
            KeyCode::Char(c) if !ctrl && !alt => Some(Self::Type(c)),
            _ => None,
        }
    }

    /// Apply to `session`. `Quit` is left to the host.
    pub fn apply(self, session: &mut TypingSession) {
        match self {
            Self::Type(c) => session.add_input(c),
            Self::Backspace => session.backspace(),
            Self::BackspaceWord => session.backspace_word(),
            Self::Finish => session.complete(),
            Self::Quit => {}
        }
    }
}
