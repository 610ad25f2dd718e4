mod ui;

use std::{
    error::Error,
    fs::OpenOptions,
    io::{self, stdin},
    path::PathBuf,
    sync::Mutex,
    time::Duration,
};

use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use keyrace::{
    app_dirs::AppDirs,
    config::{FileRecordStore, Record, RecordStore},
    content::{next_source_name, prepare_content, source_by_name, Content, ContentSource, CustomSource, DEFAULT_SOURCE},
    filter::FilterOptions,
    history::{export_csv, SessionResult},
    runtime::{CrosstermEventSource, RaceEvent, Runner, TypingAction},
    session::TypingSession,
    trend::DEFAULT_WINDOW,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing::{info, warn};
use webbrowser::Browser;

const TICK_RATE_MS: u64 = 100;

/// typing races with first-try accuracy, per-character metrics and a wpm trend
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A typing race TUI. Accuracy counts only what you got right on the first try, per-character mistakes are tracked across races, and recent results are plotted as a WPM trend."
)]
pub struct Cli {
    /// passage collection to race against (defaults to the last one used)
    #[clap(short = 's', long, value_enum)]
    source: Option<SourceKind>,

    /// custom text to type instead of a built-in passage
    #[clap(short = 'p', long)]
    prompt: Option<String>,

    /// record file holding settings, character metrics and race history
    #[clap(long)]
    config: Option<PathBuf>,

    /// drop digits from the text for this run
    #[clap(long)]
    no_numbers: bool,

    /// drop punctuation and symbols from the text for this run
    #[clap(long)]
    no_punctuation: bool,

    /// lowercase all letters for this run
    #[clap(long)]
    no_capitals: bool,

    /// drop characters outside printable ASCII for this run
    #[clap(long)]
    no_non_standard: bool,

    /// number of recent races plotted on the trend screen
    #[clap(long, default_value_t = DEFAULT_WINDOW)]
    window: usize,

    /// write the race history as CSV to this path and exit
    #[clap(long)]
    export_history: Option<PathBuf>,
}

#[derive(Debug, Copy, Clone, ValueEnum, strum_macros::Display)]
pub enum SourceKind {
    Quotes,
    Code,
}

impl SourceKind {
    fn as_name(&self) -> String {
        self.to_string().to_lowercase()
    }
}

impl Cli {
    /// Persisted filter options with this run's overrides applied
    fn effective_filters(&self, persisted: FilterOptions) -> FilterOptions {
        FilterOptions {
            include_numbers: persisted.include_numbers && !self.no_numbers,
            include_punctuation: persisted.include_punctuation && !self.no_punctuation,
            include_capitals: persisted.include_capitals && !self.no_capitals,
            include_non_standard: persisted.include_non_standard && !self.no_non_standard,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Typing,
    Results,
    Metrics,
    Trend,
    Settings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

pub struct App {
    pub cli: Cli,
    pub store: FileRecordStore,
    pub record: Record,
    pub source: Box<dyn ContentSource>,
    pub content: Option<Content>,
    pub session: Option<TypingSession>,
    pub last_result: Option<SessionResult>,
    pub screen: Screen,
    /// Problems worth showing the user: missing content, failed saves
    pub status: Option<String>,
}

impl App {
    pub fn new(cli: Cli) -> Self {
        let store = cli
            .config
            .as_ref()
            .map(FileRecordStore::with_path)
            .unwrap_or_default();
        let record = store.load();

        let mut app = Self {
            source: Box::new(CustomSource::new(String::new())),
            cli,
            store,
            record,
            content: None,
            session: None,
            last_result: None,
            screen: Screen::Typing,
            status: None,
        };

        if let Some(prompt) = app.cli.prompt.clone() {
            app.source = Box::new(CustomSource::new(prompt));
        } else {
            let requested = app.cli.source.map(|s| s.as_name());
            let name = requested
                .clone()
                .unwrap_or_else(|| app.record.last_source.clone());
            app.use_source(&name);
            if requested.is_some_and(|r| r != app.record.last_source) {
                app.record.last_source = app.source.name().to_string();
                app.save();
            }
        }

        app.new_race();
        app
    }

    pub fn filters(&self) -> FilterOptions {
        self.cli.effective_filters(self.record.filters)
    }

    fn use_source(&mut self, name: &str) {
        match source_by_name(name).or_else(|err| {
            warn!(%err, "falling back to the default source");
            source_by_name(DEFAULT_SOURCE)
        }) {
            Ok(source) => self.source = source,
            Err(err) => self.status = Some(err.to_string()),
        }
    }

    /// Fetch fresh content and start over. On failure no race exists and the
    /// reason is kept in `status`.
    pub fn new_race(&mut self) {
        self.screen = Screen::Typing;
        self.last_result = None;

        match prepare_content(self.source.as_ref(), &self.filters()) {
            Ok(content) => {
                self.session = Some(TypingSession::new(&content.text));
                self.content = Some(content);
                self.status = None;
            }
            Err(err) => {
                warn!(%err, source = self.source.name(), "no race started");
                self.session = None;
                self.content = None;
                self.status = Some(err.to_string());
            }
        }
    }

    fn finish_race(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        self.last_result = self
            .record
            .record_session(session, chrono::Local::now().timestamp());
        if self.last_result.is_some() {
            self.save();
            self.screen = Screen::Results;
        }
    }

    /// Persist the record; failure is reported but never interrupts play
    fn save(&mut self) {
        if let Err(err) = self.store.save(&self.record) {
            warn!(%err, "could not save record");
            self.status = Some(format!("could not save: {err}"));
        }
    }

    fn cycle_source(&mut self) {
        let next = next_source_name(self.source.name());
        self.use_source(next);
        self.record.last_source = self.source.name().to_string();
        self.save();
        self.new_race();
    }

    fn open_source_url(&self) {
        if let Some(url) = self.content.as_ref().and_then(|c| c.source_url.as_deref()) {
            if Browser::is_available() {
                if let Err(err) = webbrowser::open(url) {
                    warn!(%err, url, "could not open browser");
                }
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Flow {
        if key.kind != KeyEventKind::Press {
            return Flow::Continue;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Flow::Quit;
        }

        match self.screen {
            Screen::Typing => self.on_typing_key(key),
            Screen::Results => self.on_results_key(key),
            Screen::Metrics | Screen::Trend => {
                if matches!(
                    key.code,
                    KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('b' | 'm' | 't')
                ) {
                    self.screen = Screen::Results;
                }
                Flow::Continue
            }
            Screen::Settings => self.on_settings_key(key),
        }
    }

    fn on_typing_key(&mut self, key: KeyEvent) -> Flow {
        let Some(session) = self.session.as_mut() else {
            // No content: offer retry, switch or quit
            return match key.code {
                KeyCode::Char('r') => {
                    self.new_race();
                    Flow::Continue
                }
                KeyCode::Char('p') => {
                    self.cycle_source();
                    Flow::Continue
                }
                KeyCode::Char('q') | KeyCode::Esc => Flow::Quit,
                _ => Flow::Continue,
            };
        };

        match TypingAction::from_key(&key) {
            Some(TypingAction::Quit) => return Flow::Quit,
            Some(TypingAction::Finish) if !session.has_started() => return Flow::Quit,
            Some(action) => action.apply(session),
            None => {}
        }

        if session.is_completed() {
            self.finish_race();
        }
        Flow::Continue
    }

    fn on_results_key(&mut self, key: KeyEvent) -> Flow {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Flow::Quit,
            KeyCode::Char('r') => self.new_race(),
            KeyCode::Char('m') => self.screen = Screen::Metrics,
            KeyCode::Char('t') => self.screen = Screen::Trend,
            KeyCode::Char(',') => self.screen = Screen::Settings,
            KeyCode::Char('p') => self.cycle_source(),
            KeyCode::Enter => self.open_source_url(),
            _ => {}
        }
        Flow::Continue
    }

    fn on_settings_key(&mut self, key: KeyEvent) -> Flow {
        let filters = &mut self.record.filters;
        match key.code {
            KeyCode::Esc | KeyCode::Char(',') => {
                self.screen = Screen::Results;
                return Flow::Continue;
            }
            KeyCode::Char('n') => filters.include_numbers = !filters.include_numbers,
            KeyCode::Char('p') => filters.include_punctuation = !filters.include_punctuation,
            KeyCode::Char('c') => filters.include_capitals = !filters.include_capitals,
            KeyCode::Char('s') => filters.include_non_standard = !filters.include_non_standard,
            _ => return Flow::Continue,
        }
        self.save();
        Flow::Continue
    }
}

/// Send tracing output to a log file; the terminal belongs to the UI
fn init_logging() {
    let Some(path) = AppDirs::log_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        if std::fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    if let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) {
        tracing_subscriber::fmt()
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .init();
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging();

    if let Some(path) = cli.export_history.as_ref() {
        let store = cli
            .config
            .as_ref()
            .map(FileRecordStore::with_path)
            .unwrap_or_default();
        let record = store.try_load()?;
        export_csv(&record.history, path)?;
        println!("wrote {} races to {}", record.history.len(), path.display());
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(cli);
    info!(source = app.source.name(), "starting");
    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        Duration::from_millis(TICK_RATE_MS),
    );

    loop {
        terminal.draw(|f| ui::draw(app, f))?;

        match runner.step() {
            RaceEvent::Key(key) => {
                if app.handle_key(key) == Flow::Quit {
                    break;
                }
            }
            // Redraw keeps the live WPM moving
            RaceEvent::Tick | RaceEvent::Resize => {}
        }
    }

    Ok(())
}
