use ratatui::{buffer::Buffer, layout::Rect};
use term_type::navigation::Screen;

use crate::{
    ui::{render_history, render_menu, render_results, render_typing},
    App,
};

/// A UI screen boundary: renders one [`Screen`] of the app
pub trait View {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer);
}

/// Mode picker shown at startup and after a test
pub struct MenuView;

impl View for MenuView {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        render_menu(app, area, buf);
    }
}

/// Target text with live feedback while typing
pub struct TypingView;

impl View for TypingView {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        render_typing(app, area, buf);
    }
}

pub struct ResultsView;

impl View for ResultsView {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        render_results(app, area, buf);
    }
}

pub struct HistoryView;

impl View for HistoryView {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        render_history(app, area, buf);
    }
}

/// Helper to construct the appropriate view for the current screen
pub fn current_view(screen: Screen) -> Box<dyn View> {
    match screen {
        Screen::Menu => Box::new(MenuView),
        Screen::Typing => Box::new(TypingView),
        Screen::Results => Box::new(ResultsView),
        Screen::History => Box::new(HistoryView),
    }
}
