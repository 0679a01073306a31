//! UI rendering for the dashboard

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Tabs, Widget},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use super::app::{App, Focus, Tab};
use super::board;
use super::help;
use super::log_pane;
use super::search;
use super::sidebar;

const SIDEBAR_WIDTH: u16 = 24;

/// Main render function
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Layout: header (1 line) + main content + status bar (1 line)
    let [header_area, main_area, status_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(header_area, frame.buffer_mut(), app);

    let [sidebar_area, content_area] =
        Layout::horizontal([Constraint::Length(SIDEBAR_WIDTH), Constraint::Fill(1)])
            .areas(main_area);

    sidebar::render(
        sidebar_area,
        frame.buffer_mut(),
        &app.sidebar,
        app.focus == Focus::Sidebar,
    );

    // Content: tabs, optional search box, board, optional log pane
    let search_height = if app.tab == Tab::Airline {
        search::SEARCH_HEIGHT
    } else {
        0
    };
    let log_height = if app.logs.visible {
        log_pane::LOG_PANE_HEIGHT
    } else {
        0
    };
    let [tabs_area, search_area, board_area, log_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(search_height),
        Constraint::Fill(1),
        Constraint::Length(log_height),
    ])
    .areas(content_area);

    render_tabs(tabs_area, frame.buffer_mut(), app.tab);

    if search_height > 0 {
        search::render(search_area, frame, &app.search, app.focus == Focus::Search);
    }

    board::render(
        board_area,
        frame.buffer_mut(),
        &app.board,
        app.tab.kind(),
        app.airport(),
        app.locale,
        app.focus == Focus::Board,
    );

    if log_height > 0 {
        log_pane::render(log_area, frame.buffer_mut(), &app.logs);
    }

    render_status(status_area, frame.buffer_mut(), app);

    if app.show_help {
        help::render_help_popup(frame, app.refresh_secs);
    }
}

fn render_header(area: Rect, buf: &mut Buffer, app: &App) {
    let title = " Flightboard";
    let airport = match app.sidebar.active_airport() {
        Some(entry) if entry.name.is_empty() => format!(" {} ", entry.code),
        Some(entry) => format!(" {} {} ", entry.code, entry.name),
        None => " no airport ".to_string(),
    };
    let help = " [?] Help ";

    let used = title.width() + airport.width() + help.width();
    let padding = " ".repeat((area.width as usize).saturating_sub(used));

    let line = Line::from(vec![
        Span::styled(
            title,
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(padding),
        Span::styled(help, Style::default().fg(Color::Gray)),
        Span::styled(airport, Style::default().fg(Color::Cyan)),
    ]);

    Paragraph::new(line)
        .style(Style::default().bg(Color::DarkGray))
        .render(area, buf);
}

fn render_tabs(area: Rect, buf: &mut Buffer, current: Tab) {
    let titles = Tab::ALL
        .iter()
        .enumerate()
        .map(|(i, t)| format!("{} {}", i + 1, t.title()));

    Tabs::new(titles)
        .select(current.index())
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .render(area, buf);
}

fn render_status(area: Rect, buf: &mut Buffer, app: &App) {
    if let Some((ref msg, is_error)) = app.status {
        let style = if is_error {
            Style::default().fg(Color::Red).bg(Color::DarkGray)
        } else {
            Style::default().fg(Color::Green).bg(Color::DarkGray)
        };
        Paragraph::new(Line::from(Span::styled(format!(" {} ", msg), style)))
            .style(Style::default().bg(Color::DarkGray))
            .render(area, buf);
        return;
    }

    let sep_style = Style::default().fg(Color::DarkGray);
    let hint = Style::default().fg(Color::Gray);

    let mut spans = vec![
        Span::styled(
            format!(" Tab: {} ", app.focus.as_str()),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(" | ", sep_style),
    ];
    if let Some(ref airline) = app.airline {
        spans.push(Span::styled(
            format!("airline {}", airline),
            Style::default().fg(Color::Yellow),
        ));
        spans.push(Span::styled(" | ", sep_style));
    }
    spans.extend([
        Span::styled(format!("auto-refresh {}s", app.refresh_secs), hint),
        Span::styled(" | ", sep_style),
        Span::styled("r: refresh", hint),
        Span::styled(" | ", sep_style),
        Span::styled("/: airline", hint),
        Span::styled(" | ", sep_style),
        Span::styled("?: help", hint),
    ]);

    Paragraph::new(Line::from(spans))
        .style(Style::default().bg(Color::DarkGray))
        .render(area, buf);
}
