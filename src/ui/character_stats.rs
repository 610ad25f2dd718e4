use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
    Frame,
};

use keyrace::metrics::{report, CharacterReportRow};

use crate::App;

/// Rows shown on the metrics screen
pub const METRICS_ROWS: usize = 15;

/// Pure presenter for a single character metrics row
pub fn present_row(row: &CharacterReportRow) -> Row<'static> {
    let accuracy_color = if row.accuracy >= 98.0 {
        Color::Green
    } else if row.accuracy >= 90.0 {
        Color::Yellow
    } else {
        Color::Red
    };

    let mistakes_style = if row.mistakes == 0 {
        Style::default().fg(Color::Gray)
    } else {
        Style::default()
    };

    Row::new(vec![
        Cell::from(row.display_char()).style(Style::default().add_modifier(Modifier::BOLD)),
        Cell::from(format!("{:.1}", row.accuracy)).style(Style::default().fg(accuracy_color)),
        Cell::from(row.attempts.to_string()),
        Cell::from(row.mistakes.to_string()).style(mistakes_style),
    ])
}

/// Render the per-character metrics screen, weakest characters first
pub fn render_character_stats(app: &App, f: &mut Frame) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(0),    // Table
            Constraint::Length(2), // Instructions
        ])
        .split(area);

    let title = Paragraph::new(format!(
        "Weakest characters over {} races",
        app.record.history.len()
    ))
    .block(Block::default().borders(Borders::ALL).title("Metrics"))
    .style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )
    .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    let rows = report(&app.record.metrics);
    if rows.is_empty() {
        let no_data = Paragraph::new("No character metrics yet. Finish a race to collect some.")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Gray));
        f.render_widget(no_data, chunks[1]);
    } else {
        let header = Row::new(vec![
            Cell::from("Char"),
            Cell::from("Accuracy (%)"),
            Cell::from("Attempts"),
            Cell::from("Mistakes"),
        ])
        .style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

        let visible_rows: Vec<Row> = rows.iter().take(METRICS_ROWS).map(present_row).collect();

        let widths = [
            Constraint::Length(6),
            Constraint::Length(14),
            Constraint::Length(10),
            Constraint::Min(8),
        ];

        let table = Table::new(visible_rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title("Characters"))
            .column_spacing(2);

        f.render_widget(table, chunks[1]);
    }

    let instructions = Paragraph::new("(esc/b) back")
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(instructions, chunks[2]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::tests::{rendered_text, test_app};

    fn row_index(text: &str, label: &str) -> Option<usize> {
        text.lines().position(|line| {
            line.trim_start_matches([' ', '│'])
                .starts_with(&format!("{label} "))
        })
    }

    #[test]
    fn test_metrics_screen_lists_weakest_first() {
        let (_dir, mut app) = test_app("ab");
        app.record.metrics.insert(
            'q',
            keyrace::metrics::CharMetric {
                attempts: 4,
                mistakes: 2,
            },
        );
        app.record.metrics.insert(
            'z',
            keyrace::metrics::CharMetric {
                attempts: 4,
                mistakes: 0,
            },
        );

        let text = rendered_text(&app, render_character_stats, 80, 30);

        let q = row_index(&text, "Q").unwrap();
        let z = row_index(&text, "Z").unwrap();
        assert!(q < z);
        assert!(text.contains("50.0"));
    }

    #[test]
    fn test_metrics_screen_caps_rows() {
        let (_dir, mut app) = test_app("ab");
        for c in 'a'..='z' {
            app.record
                .metrics
                .insert(c, keyrace::metrics::CharMetric { attempts: 1, mistakes: 0 });
        }

        let text = rendered_text(&app, render_character_stats, 80, 40);

        // Ties sort by character, so the first fifteen letters make the cut
        assert!(row_index(&text, "O").is_some());
        assert!(row_index(&text, "P").is_none());
    }

    #[test]
    fn test_metrics_screen_without_data() {
        let (_dir, app) = test_app("ab");

        let text = rendered_text(&app, render_character_stats, 80, 24);

        assert!(text.contains("No character metrics yet"));
    }
}
