//! Airline search box: single-line code input for the Airline tab.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

/// Height of the search box: border + input + border.
pub const SEARCH_HEIGHT: u16 = 3;

/// Longest code accepted; carrier codes are 2-3 characters.
const MAX_INPUT: usize = 8;

/// State for the airline code input.
#[derive(Default)]
pub struct SearchState {
    pub input: String,
    /// Cursor position in characters
    pub cursor: usize,
}

impl SearchState {
    pub fn insert_char(&mut self, c: char) {
        if c.is_whitespace() || self.input.chars().count() >= MAX_INPUT {
            return;
        }
        let at = self.byte_index(self.cursor);
        self.input.insert(at, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let end = self.byte_index(self.cursor);
        let start = self.byte_index(self.cursor - 1);
        self.input.drain(start..end);
        self.cursor -= 1;
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.input.chars().count());
    }

    pub fn clear(&mut self) {
        self.input.clear();
        self.cursor = 0;
    }

    /// The upper-cased code, or `None` for blank input. The box keeps its
    /// text so the searched code stays visible.
    pub fn submit(&mut self) -> Option<String> {
        let code = self.input.trim().to_uppercase();
        if code.is_empty() {
            return None;
        }
        self.input = code.clone();
        self.cursor = self.input.chars().count();
        Some(code)
    }

    fn byte_index(&self, char_pos: usize) -> usize {
        self.input
            .char_indices()
            .nth(char_pos)
            .map(|(i, _)| i)
            .unwrap_or(self.input.len())
    }
}

/// Render the search box; places the terminal cursor when focused.
pub fn render(area: Rect, frame: &mut Frame, state: &SearchState, focused: bool) {
    let (border_style, border_type) = if focused {
        (Style::default().fg(Color::Yellow), BorderType::Double)
    } else {
        (Style::default().fg(Color::DarkGray), BorderType::Plain)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(border_type)
        .border_style(border_style)
        .title(Span::styled(" Airline ", Style::default().fg(Color::White)));

    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let line = if state.input.is_empty() {
        Line::from(Span::styled(
            " e.g. CI, BR, JX  (Enter to search)",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Line::from(Span::styled(
            format!(" {}", state.input),
            Style::default().fg(Color::White),
        ))
    };
    let input_area = Rect::new(inner.x, inner.y, inner.width, 1);
    frame.render_widget(Paragraph::new(line), input_area);

    if focused {
        let x = input_area.x + 1 + state.cursor as u16;
        frame.set_cursor_position((x.min(input_area.right().saturating_sub(1)), input_area.y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(text: &str) -> SearchState {
        let mut state = SearchState::default();
        for c in text.chars() {
            state.insert_char(c);
        }
        state
    }

    #[test]
    fn test_submit_uppercases() {
        let mut state = typed("ci");
        assert_eq!(state.submit().as_deref(), Some("CI"));
        assert_eq!(state.input, "CI");
        assert_eq!(state.cursor, 2);
    }

    #[test]
    fn test_submit_ignores_empty() {
        let mut state = SearchState::default();
        assert_eq!(state.submit(), None);

        // Whitespace is never inserted.
        let mut state = typed("   ");
        assert_eq!(state.input, "");
        assert_eq!(state.submit(), None);
    }

    #[test]
    fn test_editing() {
        let mut state = typed("BX");
        state.move_left();
        state.insert_char('R');
        assert_eq!(state.input, "BRX");

        state.move_right();
        state.backspace();
        assert_eq!(state.input, "BR");

        state.clear();
        assert_eq!(state.cursor, 0);
        state.backspace();
        assert_eq!(state.input, "");
    }

    #[test]
    fn test_input_length_capped() {
        let state = typed("ABCDEFGHIJKL");
        assert_eq!(state.input, "ABCDEFGH");
    }
}
