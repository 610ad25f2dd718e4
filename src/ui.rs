pub mod character_stats;
pub mod charting;
pub mod screen;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;
use webbrowser::Browser;

use keyrace::session::{CharStatus, TypingSession};

use crate::App;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

fn bold_style() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim_bold_style() -> Style {
    bold_style().add_modifier(Modifier::DIM)
}

pub fn draw(app: &App, f: &mut Frame) {
    screen::current_view(app.screen).render(app, f);
}

/// Lines the target text needs at `line_width` columns
fn prompt_lines(session: &TypingSession, line_width: u16) -> u16 {
    let width = session.target_text().width();
    let line_width = line_width.max(1) as usize;
    if width <= line_width {
        1
    } else {
        ((width as f64 / line_width as f64).ceil() as u16).saturating_add(1)
    }
}

/// Target text coloured by `status` per position. While `live`, mistakes show
/// what was typed and the cursor is underlined.
fn prompt_spans(
    session: &TypingSession,
    status: impl Fn(usize) -> CharStatus,
    live: bool,
) -> Vec<Span<'static>> {
    let green_bold_style = bold_style().fg(Color::Green);
    let red_bold_style = bold_style().fg(Color::Red);
    let cursor = live.then(|| session.input().len());

    session
        .target()
        .iter()
        .enumerate()
        .map(|(idx, &expected)| match status(idx) {
            CharStatus::Correct => Span::styled(expected.to_string(), green_bold_style),
            CharStatus::Incorrect => {
                let typed = if live {
                    session.input().get(idx).copied()
                } else {
                    None
                };
                let shown = match typed.unwrap_or(expected) {
                    ' ' => "·".to_owned(),
                    c => c.to_string(),
                };
                Span::styled(shown, red_bold_style)
            }
            CharStatus::Untyped if cursor == Some(idx) => Span::styled(
                expected.to_string(),
                dim_bold_style().add_modifier(Modifier::UNDERLINED),
            ),
            CharStatus::Untyped => Span::styled(expected.to_string(), dim_bold_style()),
        })
        .collect()
}

pub fn render_typing(app: &App, f: &mut Frame) {
    let area = f.area();
    let Some(session) = app.session.as_ref() else {
        render_unavailable(app, f);
        return;
    };

    let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2);
    let prompt_occupied_lines = prompt_lines(session, max_chars_per_line);
    let padding = area.height.saturating_sub(prompt_occupied_lines.saturating_add(2)) / 2;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(padding),
            Constraint::Length(2),
            Constraint::Length(prompt_occupied_lines),
            Constraint::Min(0),
        ])
        .split(area);

    let header = if session.has_started() {
        format!(
            "{}   {:.0} wpm   {:.0}% acc",
            app.source.name(),
            session.wpm(),
            session.live_accuracy()
        )
    } else {
        format!("{}   start typing, (esc) to quit", app.source.name())
    };
    let header = Paragraph::new(Span::styled(header, dim_bold_style())).alignment(Alignment::Center);
    f.render_widget(header, chunks[1]);

    let spans = prompt_spans(
        session,
        |idx| session.position_status(idx),
        true,
    );
    let widget = Paragraph::new(Line::from(spans))
        .alignment(if prompt_occupied_lines == 1 {
            Alignment::Center
        } else {
            Alignment::Left
        })
        .wrap(Wrap { trim: true });
    f.render_widget(widget, chunks[2]);
}

/// No race could start: say why and what can be done about it
fn render_unavailable(app: &App, f: &mut Frame) {
    let reason = app
        .status
        .clone()
        .unwrap_or_else(|| "no content available".to_string());

    let text = vec![
        Line::from(Span::styled(
            format!("Content unavailable ({})", app.source.name()),
            bold_style().fg(Color::Yellow),
        )),
        Line::from(reason),
        Line::from(""),
        Line::from(Span::styled(
            "(r)etry / (p) next source / (q)uit",
            Style::default().add_modifier(Modifier::ITALIC),
        )),
    ];

    let widget = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("keyrace"));
    f.render_widget(widget, f.area());
}

pub fn render_results(app: &App, f: &mut Frame) {
    let area = f.area();
    let Some(session) = app.session.as_ref() else {
        render_unavailable(app, f);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),    // first-try text
            Constraint::Length(1), // stats
            Constraint::Length(1), // attribution
            Constraint::Length(1), // status
            Constraint::Length(1), // padding
            Constraint::Length(1), // legend
        ])
        .split(area);

    let spans = prompt_spans(session, |idx| session.first_attempt_status(idx), false);
    let text = Paragraph::new(Line::from(spans))
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("First try"));
    f.render_widget(text, chunks[0]);

    let (wpm, accuracy) = app
        .last_result
        .map(|r| (r.wpm, r.accuracy))
        .unwrap_or_else(|| (session.wpm(), session.accuracy()));
    let stats = Paragraph::new(Span::styled(
        format!(
            "{wpm:.1} wpm   {accuracy:.1}% acc   {:.1}s   {} uncorrected",
            session.elapsed().as_secs_f64(),
            session.errors()
        ),
        bold_style(),
    ))
    .alignment(Alignment::Center);
    f.render_widget(stats, chunks[1]);

    if let Some(author) = app.content.as_ref().and_then(|c| c.author.as_deref()) {
        let attribution = Paragraph::new(Span::styled(
            format!("- {author}"),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center);
        f.render_widget(attribution, chunks[2]);
    }

    if let Some(status) = app.status.as_deref() {
        let status = Paragraph::new(Span::styled(status, Style::default().fg(Color::Yellow)))
            .alignment(Alignment::Center);
        f.render_widget(status, chunks[3]);
    }

    let has_url = app
        .content
        .as_ref()
        .is_some_and(|c| c.source_url.is_some());
    let legend = if has_url && Browser::is_available() {
        "(r)ace / (m)etrics / (t)rend / (,) settings / (p) source / (enter) open / (q)uit"
    } else {
        "(r)ace / (m)etrics / (t)rend / (,) settings / (p) source / (q)uit"
    };
    let legend = Paragraph::new(Span::styled(
        legend,
        Style::default().add_modifier(Modifier::ITALIC),
    ));
    f.render_widget(legend, chunks[5]);
}

pub fn render_settings(app: &App, f: &mut Frame) {
    let area = f.area();
    let filters = app.record.filters;
    let effective = app.filters();

    let option = |key: char, label: &str, saved: bool, active: bool| {
        let mark = if saved { "x" } else { " " };
        let mut spans = vec![Span::styled(format!("[{mark}] ({key}) {label}"), bold_style())];
        if saved && !active {
            spans.push(Span::styled(
                "  off for this run",
                Style::default().fg(Color::Gray),
            ));
        }
        Line::from(spans)
    };

    let text = vec![
        option('n', "numbers", filters.include_numbers, effective.include_numbers),
        option(
            'p',
            "punctuation",
            filters.include_punctuation,
            effective.include_punctuation,
        ),
        option('c', "capitals", filters.include_capitals, effective.include_capitals),
        option(
            's',
            "non-standard characters",
            filters.include_non_standard,
            effective.include_non_standard,
        ),
        Line::from(""),
        Line::from(Span::styled(
            "changes apply from the next race   (esc) back",
            Style::default().add_modifier(Modifier::ITALIC),
        )),
    ];

    let widget = Paragraph::new(text).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Settings")
            .style(Style::default().fg(Color::Cyan)),
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(VERTICAL_MARGIN)
        .constraints([Constraint::Length(8), Constraint::Min(0)])
        .split(area);
    f.render_widget(widget, chunks[0]);
}
