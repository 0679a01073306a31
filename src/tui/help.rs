//! Help popup listing the dashboard key bindings.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

const POPUP_WIDTH: u16 = 72;
const POPUP_HEIGHT: u16 = 20;

/// Key column width inside a category.
const KEY_WIDTH: usize = 12;

struct Category {
    title: &'static str,
    keys: &'static [(&'static str, &'static str)],
}

const NAVIGATION: Category = Category {
    title: "NAVIGATION",
    keys: &[
        ("Up/Down", "Move in airport list / scroll board"),
        ("Tab", "Cycle focus"),
        ("Enter", "Show selected airport"),
        ("PgUp/PgDn", "Scroll board by a page"),
    ],
};

const VIEWS: Category = Category {
    title: "VIEWS",
    keys: &[
        ("1 / 2", "Arrivals / Departures"),
        ("3 / 4", "Schedule / Airline"),
        ("Left/Right", "Previous / next tab"),
    ],
};

const SEARCH: Category = Category {
    title: "AIRLINE SEARCH",
    keys: &[
        ("/", "Edit airline code"),
        ("Enter", "Search"),
        ("Esc", "Leave the search box"),
    ],
};

const MISC: Category = Category {
    title: "MISC",
    keys: &[
        ("r", "Refresh now"),
        ("l", "Toggle log pane"),
        ("[ / ]", "Scroll log pane"),
        ("?", "Toggle this help"),
        ("q / Ctrl+C", "Quit"),
    ],
};

/// Render the help popup centered on screen.
pub fn render_help_popup(frame: &mut Frame, refresh_secs: u64) {
    let area = frame.area();
    let popup = centered_rect(
        POPUP_WIDTH.min(area.width.saturating_sub(2)),
        POPUP_HEIGHT.min(area.height.saturating_sub(2)),
        area,
    );
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(
            " HELP ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
        .title_bottom(Line::from(Span::styled(
            format!(
                " Boards refresh every {} min. Press any key to close ",
                (refresh_secs / 60).max(1)
            ),
            Style::default().fg(Color::Gray),
        )));

    let inner = block.inner(popup);
    frame.render_widget(block, popup);
    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let [left, right] =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(inner);
    frame.render_widget(Paragraph::new(column(&[&NAVIGATION, &VIEWS])), left.inner(MARGIN));
    frame.render_widget(Paragraph::new(column(&[&SEARCH, &MISC])), right.inner(MARGIN));
}

const MARGIN: ratatui::layout::Margin = ratatui::layout::Margin {
    horizontal: 1,
    vertical: 1,
};

fn column(categories: &[&Category]) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (i, category) in categories.iter().enumerate() {
        if i > 0 {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(
            category.title,
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )));
        for (key, desc) in category.keys {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{:<width$}", key, width = KEY_WIDTH),
                    Style::default().fg(Color::Yellow),
                ),
                Span::styled(*desc, Style::default().fg(Color::Gray)),
            ]));
        }
    }
    lines
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width, height)
}
