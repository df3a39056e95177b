pub mod charting;
pub mod screen;

use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Axis, Chart, Dataset, GraphType, List, ListItem, ListState, Paragraph, Row,
        StatefulWidget, Table, Widget, Wrap,
    },
};
use term_type::{history::newest_first, session::SessionState, time_series};
use unicode_width::UnicodeWidthStr;

use crate::{
    ui::{
        charting::{format_label, scaled_error_points, wpm_points, ChartBounds},
        screen::current_view,
    },
    App, MENU_ITEMS,
};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;
const MENU_WIDTH: u16 = 40;

/// Colors used by every screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub background: Color,
    pub text: Color,
    pub pending: Color,
    pub error: Color,
    pub error_bg: Color,
    pub accent: Color,
}

impl Default for Theme {
    // serika dark
    fn default() -> Self {
        Self {
            background: Color::Rgb(0x32, 0x34, 0x37),
            text: Color::Rgb(0xd1, 0xd0, 0xc5),
            pending: Color::Rgb(0x64, 0x66, 0x69),
            error: Color::Rgb(0xca, 0x47, 0x54),
            error_bg: Color::Rgb(0x7e, 0x2a, 0x33),
            accent: Color::Rgb(0xe2, 0xb7, 0x14),
        }
    }
}

impl Theme {
    fn bold(&self) -> Style {
        Style::default().fg(self.text).add_modifier(Modifier::BOLD)
    }

    fn subtle(&self) -> Style {
        Style::default().fg(self.pending)
    }

    fn highlight(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    fn notice(&self) -> Style {
        Style::default().fg(self.error).add_modifier(Modifier::ITALIC)
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(
            area,
            Style::default().bg(self.theme.background).fg(self.theme.text),
        );
        current_view(self.screen).render(self, area, buf);
    }
}

fn centered(area: Rect, width: u16) -> Rect {
    let width = width.min(area.width);
    Rect {
        x: area.x + (area.width - width) / 2,
        width,
        ..area
    }
}

fn render_notice(app: &App, area: Rect, buf: &mut Buffer) {
    if let Some(ref notice) = app.notice {
        Paragraph::new(Span::styled(notice.as_str(), app.theme.notice()))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }
}

pub(crate) fn render_menu(app: &App, area: Rect, buf: &mut Buffer) {
    let theme = &app.theme;
    let list_height = MENU_ITEMS.len() as u16 * 2;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(1), // title
            Constraint::Length(1), // last mode
            Constraint::Length(1),
            Constraint::Length(list_height),
            Constraint::Length(2), // notice
            Constraint::Fill(1),
        ])
        .split(area);

    Paragraph::new(Span::styled("term-type", theme.highlight()))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    Paragraph::new(Span::styled(
        format!("last mode: {}", app.config.mode().label()),
        theme.subtle(),
    ))
    .alignment(Alignment::Center)
    .render(chunks[2], buf);

    let items: Vec<ListItem> = MENU_ITEMS
        .iter()
        .map(|item| {
            ListItem::new(vec![
                Line::from(format!("[{}] {}", item.shortcut, item.label)),
                Line::from(Span::styled(
                    format!("    {}", item.description),
                    theme.subtle(),
                )),
            ])
        })
        .collect();

    let list = List::new(items)
        .highlight_style(theme.highlight())
        .highlight_symbol("> ");
    let mut state = ListState::default().with_selected(Some(app.menu_selected));
    StatefulWidget::render(list, centered(chunks[4], MENU_WIDTH), buf, &mut state);

    render_notice(app, chunks[5], buf);
}

pub(crate) fn render_typing(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(ref session) = app.session else {
        return;
    };
    let theme = &app.theme;

    let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
    let prompt_width = session.target_text().width();
    let prompt_occupied_lines = if prompt_width <= max_chars_per_line as usize {
        1
    } else {
        ((prompt_width as f64 / max_chars_per_line as f64).ceil() + 1.0) as u16
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(1), // timer or word progress
            Constraint::Length(1),
            Constraint::Length(prompt_occupied_lines),
            Constraint::Length(1),
            Constraint::Length(1), // live stats
            Constraint::Fill(1),
        ])
        .split(area);

    let progress = match session.time_remaining() {
        Some(secs) => format!("{secs:.1}"),
        None => format!("{}/{}", session.words_typed(), session.word_count()),
    };
    Paragraph::new(Span::styled(progress, theme.highlight()))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    let input = session.input();
    let cursor = input.len();
    let correct = theme.bold();
    let wrong = Style::default()
        .fg(theme.error)
        .bg(theme.error_bg)
        .add_modifier(Modifier::BOLD);
    let at_cursor = Style::default()
        .fg(theme.accent)
        .add_modifier(Modifier::UNDERLINED | Modifier::BOLD);
    let pending = theme.subtle();

    let cells = session
        .target()
        .iter()
        .enumerate()
        .map(|(idx, &expected)| {
            let style = match input.get(idx) {
                Some(&typed) if typed == expected => correct,
                Some(_) => wrong,
                None if idx == cursor => at_cursor,
                None => pending,
            };
            (style, expected)
        });

    // one span per run of equally styled characters
    let runs = cells.chunk_by(|(style, _)| *style);
    let spans: Vec<Span> = (&runs)
        .into_iter()
        .map(|(style, run)| Span::styled(run.map(|(_, c)| c).collect::<String>(), style))
        .collect();

    Paragraph::new(Line::from(spans))
        .alignment(if prompt_occupied_lines == 1 {
            Alignment::Center
        } else {
            Alignment::Left
        })
        .wrap(Wrap { trim: true })
        .render(chunks[3], buf);

    let live = match session.state() {
        SessionState::InProgress => Span::styled(
            format!(
                "{:.0} wpm   {:.0}% acc",
                session.wpm(),
                session.accuracy()
            ),
            theme.subtle(),
        ),
        _ => Span::styled(
            "(esc) menu / (ctrl+w) delete word",
            theme.subtle().add_modifier(Modifier::ITALIC),
        ),
    };
    Paragraph::new(live)
        .alignment(Alignment::Center)
        .render(chunks[5], buf);
}

pub(crate) fn render_results(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(ref session) = app.session else {
        return;
    };
    let theme = &app.theme;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),    // chart
            Constraint::Length(1), // stats
            Constraint::Length(1), // details
            Constraint::Length(1), // notice
            Constraint::Length(1), // padding
            Constraint::Length(1), // legend
        ])
        .split(area);

    let series = session.snapshots();
    if time_series::is_graphable(series) {
        let bounds = ChartBounds::from_series(series);
        let wpm = wpm_points(series);
        let errors = scaled_error_points(series, &bounds);

        let mut datasets = vec![Dataset::default()
            .name("wpm")
            .marker(Marker::Braille)
            .style(Style::default().fg(theme.accent))
            .graph_type(GraphType::Line)
            .data(&wpm)];
        if bounds.has_errors() {
            datasets.push(
                Dataset::default()
                    .name(format!("errors (max {})", bounds.max_errors))
                    .marker(Marker::Braille)
                    .style(Style::default().fg(theme.error))
                    .graph_type(GraphType::Line)
                    .data(&errors),
            );
        }

        let bold = theme.bold();
        Chart::new(datasets)
            .hidden_legend_constraints((Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)))
            .x_axis(
                Axis::default()
                    .title("seconds")
                    .style(theme.subtle())
                    .bounds([0.0, bounds.max_secs])
                    .labels(vec![
                        Span::styled("0", bold),
                        Span::styled(format_label(bounds.max_secs), bold),
                    ]),
            )
            .y_axis(
                Axis::default()
                    .title("wpm")
                    .style(theme.subtle())
                    .bounds([bounds.min_wpm, bounds.max_wpm])
                    .labels(vec![
                        Span::styled(format_label(bounds.min_wpm), bold),
                        Span::styled(format_label(bounds.max_wpm), bold),
                    ]),
            )
            .render(chunks[0], buf);
    } else {
        Paragraph::new(Span::styled("not enough data for a graph", theme.subtle()))
            .alignment(Alignment::Center)
            .render(chunks[0], buf);
    }

    let summary = session.summary();
    Paragraph::new(Span::styled(
        format!("{} wpm   {:.1}% acc", summary.wpm, summary.accuracy),
        theme.highlight(),
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    Paragraph::new(Span::styled(
        format!(
            "{} correct   {} wrong   {:.1}s   {}",
            summary.correct,
            summary.wrong,
            summary.elapsed.as_secs_f64(),
            summary.mode_label
        ),
        theme.subtle(),
    ))
    .alignment(Alignment::Center)
    .render(chunks[2], buf);

    render_notice(app, chunks[3], buf);

    Paragraph::new(Span::styled(
        "(enter) retry / (tab) menu / (h)istory / (esc)ape",
        theme.subtle().add_modifier(Modifier::ITALIC),
    ))
    .render(chunks[5], buf);
}

pub(crate) fn render_history(app: &App, area: Rect, buf: &mut Buffer) {
    let theme = &app.theme;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // title
            Constraint::Length(1),
            Constraint::Min(1), // table
            Constraint::Length(1), // notice
            Constraint::Length(1), // legend
        ])
        .split(area);

    Paragraph::new(Span::styled("History", theme.highlight()))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    if app.history_records.is_empty() {
        Paragraph::new(Span::styled("No results yet", theme.subtle()))
            .alignment(Alignment::Center)
            .render(chunks[2], buf);
    } else {
        let header = Row::new(["date", "mode", "wpm", "accuracy", "correct", "wrong"])
            .style(theme.highlight());
        let rows = newest_first(&app.history_records)
            .into_iter()
            .skip(app.history_scroll)
            .map(|record| {
                Row::new(vec![
                    record.date.format("%Y-%m-%d %H:%M").to_string(),
                    record.mode.clone(),
                    format!("{:.0}", record.wpm),
                    format!("{:.1}%", record.accuracy),
                    record.correct.to_string(),
                    record.wrong.to_string(),
                ])
            });
        let widths = [
            Constraint::Length(16),
            Constraint::Length(10),
            Constraint::Length(5),
            Constraint::Length(9),
            Constraint::Length(8),
            Constraint::Length(6),
        ];
        let table = Table::new(rows, widths).header(header).column_spacing(2);
        Widget::render(table, chunks[2], buf);
    }

    render_notice(app, chunks[3], buf);

    Paragraph::new(Span::styled(
        "(esc) back / (j/k) scroll / (q)uit",
        theme.subtle().add_modifier(Modifier::ITALIC),
    ))
    .render(chunks[4], buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Launch, TestSource};
    use chrono::Local;
    use std::sync::mpsc::{self, Receiver};
    use std::time::{Duration, Instant};
    use tempfile::{tempdir, TempDir};
    use term_type::{
        config::{Config, FileConfigStore},
        history::{HistoryRecord, JsonHistoryStore},
        navigation::Screen,
        runtime::AppEvent,
        session::{Mode, TypingSession},
        words::WordList,
    };

    fn create_test_app() -> (App, Receiver<AppEvent>, TempDir) {
        let dir = tempdir().unwrap();
        let (tx, rx) = mpsc::channel();
        let app = App::new(
            Config::default(),
            WordList::english().unwrap(),
            Box::new(JsonHistoryStore::with_path(dir.path().join("history.json"))),
            Box::new(FileConfigStore::with_path(dir.path().join("config.json"))),
            tx,
        );
        (app, rx, dir)
    }

    fn render(app: &App, area: Rect) -> Buffer {
        let mut buffer = Buffer::empty(area);
        app.render(area, &mut buffer);
        buffer
    }

    fn rendered_text(buffer: &Buffer) -> String {
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    fn finished_session_with_series() -> TypingSession {
        let t0 = Instant::now();
        let mut session = TypingSession::new("abcd", Mode::FreeText).unwrap();
        session.type_char_at('a', t0);
        session.type_char_at('x', t0 + Duration::from_secs(1));
        assert!(session.record_snapshot_at(t0 + Duration::from_secs(1)));
        session.type_char_at('c', t0 + Duration::from_secs(2));
        session.finish_at(t0 + Duration::from_secs(3));
        session
    }

    #[test]
    fn test_menu_lists_modes() {
        let (app, _rx, _dir) = create_test_app();

        let text = rendered_text(&render(&app, Rect::new(0, 0, 80, 24)));

        assert!(text.contains("Time 15s"));
        assert!(text.contains("Words 50"));
        assert!(text.contains("History"));
        assert!(text.contains("last mode: 25 words"));
    }

    #[test]
    fn test_typing_shows_target_and_progress() {
        let (mut app, _rx, _dir) = create_test_app();
        let _ = app.launch(Launch::Test(TestSource::Custom("hello world".to_string())));

        let text = rendered_text(&render(&app, Rect::new(0, 0, 80, 24)));

        assert!(text.contains("hello world"));
        assert!(text.contains("0/2"));
    }

    #[test]
    fn test_typing_shows_timer() {
        let (mut app, _rx, _dir) = create_test_app();
        let _ = app.launch(Launch::Test(TestSource::Generated(Mode::Timed(30))));

        let text = rendered_text(&render(&app, Rect::new(0, 0, 80, 24)));

        assert!(text.contains("30.0"));
    }

    #[test]
    fn test_typing_marks_mismatch_with_expected_char() {
        let (mut app, _rx, _dir) = create_test_app();
        let _ = app.launch(Launch::Test(TestSource::Custom("hello".to_string())));
        app.session.as_mut().unwrap().type_char('j');

        let buffer = render(&app, Rect::new(0, 0, 80, 24));

        let theme = Theme::default();
        assert!(buffer
            .content()
            .iter()
            .any(|cell| cell.symbol() == "h" && cell.fg == theme.error && cell.bg == theme.error_bg));
        assert!(!rendered_text(&buffer).contains('j'));
    }

    #[test]
    fn test_results_with_chart() {
        let (mut app, _rx, _dir) = create_test_app();
        app.session = Some(finished_session_with_series());
        app.screen = Screen::Results;

        let text = rendered_text(&render(&app, Rect::new(0, 0, 80, 24)));

        assert!(text.contains("seconds"));
        assert!(text.contains("errors (max 1)"));
        assert!(text.contains("2 correct"));
        assert!(text.contains("(enter) retry"));
    }

    #[test]
    fn test_results_without_enough_samples() {
        let (mut app, _rx, _dir) = create_test_app();
        let _ = app.launch(Launch::Test(TestSource::Custom("ok".to_string())));
        let session = app.session.as_mut().unwrap();
        session.type_char('o');
        session.type_char('k');
        app.screen = Screen::Results;

        let text = rendered_text(&render(&app, Rect::new(0, 0, 80, 24)));

        assert!(text.contains("not enough data for a graph"));
        assert!(text.contains("100.0% acc"));
    }

    #[test]
    fn test_results_show_notice() {
        let (mut app, _rx, _dir) = create_test_app();
        app.session = Some(finished_session_with_series());
        app.screen = Screen::Results;
        app.notice = Some("result not saved".to_string());

        let text = rendered_text(&render(&app, Rect::new(0, 0, 80, 24)));

        assert!(text.contains("result not saved"));
    }

    #[test]
    fn test_history_empty() {
        let (mut app, _rx, _dir) = create_test_app();
        app.screen = Screen::History;

        let text = rendered_text(&render(&app, Rect::new(0, 0, 80, 24)));

        assert!(text.contains("No results yet"));
    }

    #[test]
    fn test_history_table() {
        let (mut app, _rx, _dir) = create_test_app();
        app.screen = Screen::History;
        app.history_records = vec![HistoryRecord {
            date: Local::now(),
            mode: "30s".to_string(),
            wpm: 87.0,
            accuracy: 96.5,
            correct: 210,
            wrong: 8,
        }];

        let text = rendered_text(&render(&app, Rect::new(0, 0, 80, 24)));

        assert!(text.contains("accuracy"));
        assert!(text.contains("87"));
        assert!(text.contains("96.5%"));
        assert!(!text.contains("No results yet"));
    }

    #[test]
    fn test_extreme_sizes() {
        let (mut app, _rx, _dir) = create_test_app();
        let _ = app.launch(Launch::Test(TestSource::Custom(
            "word ".repeat(1000).trim().to_string(),
        )));

        for screen in [Screen::Menu, Screen::Typing, Screen::History] {
            app.screen = screen;
            for area in [
                Rect::new(0, 0, 10, 5),
                Rect::new(0, 0, 200, 5),
                Rect::new(0, 0, 20, 50),
                Rect::new(0, 0, 1, 1),
            ] {
                let buffer = render(&app, area);
                assert_eq!(*buffer.area(), area);
            }
        }

        app.session = Some(finished_session_with_series());
        app.screen = Screen::Results;
        let area = Rect::new(0, 0, 12, 6);
        assert_eq!(*render(&app, area).area(), area);
    }

    #[test]
    fn test_centered() {
        let area = Rect::new(0, 0, 80, 10);
        assert_eq!(centered(area, 40), Rect::new(20, 0, 40, 10));
        assert_eq!(centered(area, 100), area);
    }
}
