//! Sidebar widget: airport list with cursor and the airport currently shown.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::models::{AirportCode, Locale, KNOWN_AIRPORTS};

/// One selectable airport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AirportEntry {
    pub code: AirportCode,
    pub name: String,
}

/// Sidebar state: the airport list, the cursor and the active airport.
pub struct SidebarState {
    pub airports: Vec<AirportEntry>,
    /// Cursor row (0-based)
    pub selected: usize,
    /// Row whose board is displayed
    pub active: Option<usize>,
}

impl SidebarState {
    /// Built-in airports, named in `locale`. An `initial` airport that is not
    /// built in is added at the top and made active.
    pub fn new(locale: Locale, initial: Option<&AirportCode>) -> Self {
        let mut airports: Vec<AirportEntry> = KNOWN_AIRPORTS
            .iter()
            .filter_map(|known| {
                let code = AirportCode::new(known.code).ok()?;
                let name = match locale {
                    Locale::ZhTw => known.name_zh,
                    Locale::En => known.name_en,
                };
                Some(AirportEntry {
                    code,
                    name: name.to_string(),
                })
            })
            .collect();

        let active = initial.map(|code| match airports.iter().position(|a| &a.code == code) {
            Some(idx) => idx,
            None => {
                airports.insert(
                    0,
                    AirportEntry {
                        code: code.clone(),
                        name: String::new(),
                    },
                );
                0
            }
        });

        Self {
            airports,
            selected: active.unwrap_or(0),
            active,
        }
    }

    pub fn move_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.selected + 1 < self.airports.len() {
            self.selected += 1;
        }
    }

    /// Make the cursor row the active airport and return it.
    pub fn activate(&mut self) -> Option<&AirportEntry> {
        let entry = self.airports.get(self.selected)?;
        self.active = Some(self.selected);
        Some(entry)
    }

    pub fn active_airport(&self) -> Option<&AirportEntry> {
        self.airports.get(self.active?)
    }
}

/// Render the sidebar into the given area.
pub fn render(area: Rect, buf: &mut Buffer, state: &SidebarState, focused: bool) {
    let (border_style, border_type) = if focused {
        (Style::default().fg(Color::Yellow), BorderType::Double)
    } else {
        (Style::default().fg(Color::DarkGray), BorderType::Plain)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(border_type)
        .border_style(border_style)
        .title(Span::styled(
            " Airports ",
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    block.render(area, buf);

    let height = inner.height as usize;
    if height == 0 || inner.width == 0 {
        return;
    }

    let offset = scroll_offset(state.selected, height, state.airports.len());
    for (row, idx) in (offset..state.airports.len()).take(height).enumerate() {
        let entry = &state.airports[idx];
        let selected = focused && idx == state.selected;
        let active = state.active == Some(idx);

        let cursor = if selected { "\u{25BA}" } else { " " };
        let label = format!("{}{} {}", cursor, entry.code, entry.name);
        let marker = if active { "\u{25CF}" } else { "" };

        let style = if selected {
            Style::default()
                .fg(Color::White)
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD)
        } else if active {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };

        let row_area = Rect::new(inner.x, inner.y + row as u16, inner.width, 1);
        render_row(buf, row_area, &label, marker, style);
    }
}

/// Keep the cursor row visible.
fn scroll_offset(selected: usize, height: usize, total: usize) -> usize {
    if total <= height || selected < height {
        return 0;
    }
    selected
        .saturating_sub(height - 1)
        .min(total.saturating_sub(height))
}

/// Left-aligned label with an optional marker in the last column.
fn render_row(buf: &mut Buffer, area: Rect, left: &str, marker: &str, style: Style) {
    let width = area.width as usize;
    let marker_w = marker.width();
    let max_left = width.saturating_sub(marker_w);

    let mut left_truncated = String::new();
    let mut used = 0;
    for ch in left.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > max_left {
            break;
        }
        used += w;
        left_truncated.push(ch);
    }
    let pad = width.saturating_sub(used + marker_w);

    let line = Line::from(vec![
        Span::styled(left_truncated, style),
        Span::styled(" ".repeat(pad), style),
        Span::styled(marker.to_string(), style),
    ]);
    Paragraph::new(line).render(area, buf);
}
