use ratatui::Frame;

use crate::{
    ui::{
        character_stats::render_character_stats, charting::render_trend, render_results,
        render_settings, render_typing,
    },
    App, Screen,
};

/// A UI screen boundary: draws one screen of the app
pub trait View {
    fn render(&self, app: &App, f: &mut Frame);
}

/// Race in progress, or the reason no race could start
pub struct TypingView;

impl View for TypingView {
    fn render(&self, app: &App, f: &mut Frame) {
        render_typing(app, f);
    }
}

/// First-try breakdown of the race just finished
pub struct ResultsView;

impl View for ResultsView {
    fn render(&self, app: &App, f: &mut Frame) {
        render_results(app, f);
    }
}

pub struct MetricsView;

impl View for MetricsView {
    fn render(&self, app: &App, f: &mut Frame) {
        render_character_stats(app, f);
    }
}

pub struct TrendView;

impl View for TrendView {
    fn render(&self, app: &App, f: &mut Frame) {
        render_trend(app, f);
    }
}

pub struct SettingsView;

impl View for SettingsView {
    fn render(&self, app: &App, f: &mut Frame) {
        render_settings(app, f);
    }
}

/// Helper to construct the view for the current screen
pub fn current_view(screen: Screen) -> Box<dyn View> {
    match screen {
        Screen::Typing => Box::new(TypingView),
        Screen::Results => Box::new(ResultsView),
        Screen::Metrics => Box::new(MetricsView),
        Screen::Trend => Box::new(TrendView),
        Screen::Settings => Box::new(SettingsView),
    }
}
