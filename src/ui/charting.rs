use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use keyrace::trend::{format_label, trend, GraphSize, TrendGrid, TrendOutcome};

use crate::App;

const MARK: char = '●';
/// Width of the axis label column, separator included
const AXIS_WIDTH: usize = 9;

/// Text rows for a trend grid: labelled plot rows, the x axis, then the
/// oldest/newest caption
pub fn grid_lines(grid: &TrendGrid) -> Vec<String> {
    let mut lines: Vec<String> = grid
        .rows()
        .map(|(label, cells)| {
            let plot: String = cells
                .iter()
                .map(|&marked| if marked { MARK } else { ' ' })
                .collect();
            format!("{:>7} ┤{plot}", format_label(label))
        })
        .collect();

    lines.push(format!("{:>8}└{}", "", "─".repeat(grid.size.width())));

    let caption_gap = grid.size.width().saturating_sub("Oldest".len() + "Newest".len());
    lines.push(format!(
        "{:>AXIS_WIDTH$}Oldest{}Newest",
        "",
        " ".repeat(caption_gap)
    ));
    lines
}

pub fn summary_line(grid: &TrendGrid, flat: bool) -> String {
    if flat {
        format!(
            "Every race in this window ran at {} wpm",
            format_label(grid.mean_wpm)
        )
    } else {
        format!(
            "{} races   mean {:.1} wpm   sd {:.1}   best {:.1}",
            grid.points.len(),
            grid.mean_wpm,
            grid.std_dev,
            grid.points
                .iter()
                .map(|p| p.wpm)
                .fold(f64::NEG_INFINITY, f64::max)
        )
    }
}

/// Render the WPM trend of recent races
pub fn render_trend(app: &App, f: &mut Frame) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(0),    // Graph
            Constraint::Length(1), // Summary
            Constraint::Length(1), // Instructions
        ])
        .split(area);

    let title = Paragraph::new(format!("WPM over the last {} races", app.cli.window))
        .block(Block::default().borders(Borders::ALL).title("Trend"))
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    match trend(
        &app.record.history,
        app.cli.window,
        GraphSize::for_terminal(area.width),
    ) {
        TrendOutcome::InsufficientData { played } => {
            let message = Paragraph::new(format!(
                "Not enough data yet: {played} race(s) played, finish at least 2 to see a trend."
            ))
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Gray));
            f.render_widget(message, chunks[1]);
        }
        TrendOutcome::Flat(grid) => render_grid(f, &grid, true, chunks[1], chunks[2]),
        TrendOutcome::Graph(grid) => render_grid(f, &grid, false, chunks[1], chunks[2]),
    }

    let instructions = Paragraph::new("(esc/b) back").alignment(Alignment::Center);
    f.render_widget(instructions, chunks[3]);
}

fn render_grid(f: &mut Frame, grid: &TrendGrid, flat: bool, plot: Rect, footer: Rect) {
    let lines: Vec<Line> = grid_lines(grid)
        .into_iter()
        .map(|l| Line::from(Span::styled(l, Style::default().fg(Color::Magenta))))
        .collect();
    f.render_widget(Paragraph::new(lines), plot);

    let summary = Paragraph::new(Span::styled(
        summary_line(grid, flat),
        Style::default().add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center);
    f.render_widget(summary, footer);
}
