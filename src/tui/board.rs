//! Flight board pane: the records of the current tab as a table.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, Widget},
};

use crate::api::table;
use crate::models::{AirportCode, Direction, FlightRecord, FlightStatus, Locale};

/// What the board is showing, which decides the column set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardKind {
    Arrivals,
    Departures,
    Schedule,
    Airline,
}

/// Records for the current view plus load status.
#[derive(Default)]
pub struct BoardState {
    pub records: Vec<FlightRecord>,
    /// A request is in flight
    pub loading: bool,
    /// At least one load has succeeded for this view
    pub loaded: bool,
    /// Local time of the last successful load
    pub updated_at: Option<String>,
    /// First visible row
    pub offset: usize,
}

impl BoardState {
    /// Forget the current records (new airport or tab).
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn set_records(&mut self, records: Vec<FlightRecord>, updated_at: String) {
        self.records = records;
        self.loading = false;
        self.loaded = true;
        self.updated_at = Some(updated_at);
        self.offset = self.offset.min(self.records.len().saturating_sub(1));
    }

    pub fn scroll_down(&mut self, n: usize) {
        self.offset = (self.offset + n).min(self.records.len().saturating_sub(1));
    }

    pub fn scroll_up(&mut self, n: usize) {
        self.offset = self.offset.saturating_sub(n);
    }
}

/// Render the board into the given area.
pub fn render(
    area: Rect,
    buf: &mut Buffer,
    state: &BoardState,
    kind: BoardKind,
    airport: Option<&AirportCode>,
    locale: Locale,
    focused: bool,
) {
    let (border_style, border_type) = if focused {
        (Style::default().fg(Color::Yellow), BorderType::Double)
    } else {
        (Style::default().fg(Color::DarkGray), BorderType::Plain)
    };

    let mut title = format!(" {} ", state.records.len());
    if state.loading {
        title.push_str("loading... ");
    } else if let Some(ref at) = state.updated_at {
        title.push_str(&format!("updated {} ", at));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(border_type)
        .border_style(border_style)
        .title(Span::styled(title, Style::default().fg(Color::Gray)));

    let inner = block.inner(area);
    block.render(area, buf);
    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let Some(airport) = airport else {
        placeholder(inner, buf, " Select an airport (Enter) to load its board");
        return;
    };

    if state.records.is_empty() {
        let text = if state.loading && !state.loaded {
            " Loading..."
        } else if kind == BoardKind::Airline && !state.loaded {
            " Enter an airline code (/) to search"
        } else {
            " No flights found"
        };
        placeholder(inner, buf, text);
        return;
    }

    let header_style = Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD);
    let visible = state.records.iter().skip(state.offset);

    let (header, rows, widths): (Vec<&str>, Vec<Row>, Vec<Constraint>) = match kind {
        BoardKind::Arrivals | BoardKind::Departures => {
            let direction = if kind == BoardKind::Arrivals {
                Direction::Arrival
            } else {
                Direction::Departure
            };
            let rows = visible
                .map(|r| status_row(table::board_row(r, direction, locale).to_vec(), r, direction))
                .collect();
            (table::BOARD_HEADERS.to_vec(), rows, board_widths(0))
        }
        BoardKind::Airline => {
            let rows = visible
                .map(|r| {
                    let direction = table::direction_at(r, airport.as_str());
                    status_row(table::airline_row(r, airport.as_str(), locale).to_vec(), r, direction)
                })
                .collect();
            (table::AIRLINE_HEADERS.to_vec(), rows, board_widths(5))
        }
        BoardKind::Schedule => {
            let rows = visible
                .map(|r| Row::new(table::schedule_row(r).to_vec()))
                .collect();
            let widths = vec![
                Constraint::Length(10),
                Constraint::Length(9),
                Constraint::Length(12),
                Constraint::Length(22),
                Constraint::Fill(1),
            ];
            (table::SCHEDULE_HEADERS.to_vec(), rows, widths)
        }
    };

    let grid = Table::new(rows, widths)
        .header(Row::new(header).style(header_style))
        .column_spacing(1);
    Widget::render(grid, inner, buf);
}

/// Column widths for the board layouts; `lead` adds a direction column.
fn board_widths(lead: u16) -> Vec<Constraint> {
    let mut widths = Vec::new();
    if lead > 0 {
        widths.push(Constraint::Length(lead));
    }
    widths.extend([
        Constraint::Length(10),
        Constraint::Length(8),
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Length(8),
        Constraint::Fill(1),
    ]);
    widths
}

/// A row whose last cell is colored by flight status.
fn status_row(mut cells: Vec<String>, record: &FlightRecord, direction: Direction) -> Row<'static> {
    let status = cells.pop().unwrap_or_default();
    let color = match record
        .remark(direction)
        .as_deref()
        .and_then(FlightStatus::from_code)
    {
        Some(s) if s.is_disrupted() => Color::Red,
        Some(FlightStatus::Boarding) => Color::Yellow,
        Some(_) => Color::Green,
        None => Color::Gray,
    };

    let mut row: Vec<Cell> = cells.into_iter().map(Cell::from).collect();
    row.push(Cell::from(status).style(Style::default().fg(color)));
    Row::new(row)
}

fn placeholder(area: Rect, buf: &mut Buffer, text: &str) {
    let line = Line::from(Span::styled(
        text.to_string(),
        Style::default().fg(Color::DarkGray),
    ));
    Paragraph::new(line).render(Rect::new(area.x, area.y, area.width, 1), buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(n: usize) -> Vec<FlightRecord> {
        (0..n)
            .map(|i| serde_json::from_value(json!({"FlightNumber": i.to_string()})).unwrap())
            .collect()
    }

    fn text_of(buf: &Buffer) -> String {
        let area = buf.area;
        (area.y..area.y + area.height)
            .map(|y| {
                (area.x..area.x + area.width)
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_set_records_marks_loaded() {
        let mut state = BoardState {
            loading: true,
            ..Default::default()
        };
        state.set_records(records(3), "08:00:00".to_string());
        assert!(!state.loading);
        assert!(state.loaded);
        assert_eq!(state.updated_at.as_deref(), Some("08:00:00"));
    }

    #[test]
    fn test_scroll_clamps() {
        let mut state = BoardState::default();
        state.set_records(records(5), "t".to_string());
        state.scroll_down(10);
        assert_eq!(state.offset, 4);
        state.scroll_up(2);
        assert_eq!(state.offset, 2);

        // Shorter reload pulls the offset back in range.
        state.set_records(records(2), "t".to_string());
        assert_eq!(state.offset, 1);
    }

    #[test]
    fn test_render_rows_with_translated_status() {
        let mut state = BoardState::default();
        state.set_records(
            vec![serde_json::from_value(json!({
                "AirlineID": "B7",
                "FlightNumber": "123",
                "DepartureAirportID": "KNH",
                "ArrivalRemark": "CANCELLED"
            }))
            .unwrap()],
            "09:00:00".to_string(),
        );

        let area = Rect::new(0, 0, 70, 6);
        let mut buf = Buffer::empty(area);
        let airport = AirportCode::new("TSA").unwrap();
        render(area, &mut buf, &state, BoardKind::Arrivals, Some(&airport), Locale::En, false);

        let text = text_of(&buf);
        assert!(text.contains("updated 09:00:00"), "{text}");
        assert!(text.contains("Flight"), "{text}");
        assert!(text.contains("B7 123"), "{text}");
        assert!(text.contains("Cancelled"), "{text}");
    }

    #[test]
    fn test_render_placeholders() {
        let area = Rect::new(0, 0, 50, 4);
        let state = BoardState::default();

        let mut buf = Buffer::empty(area);
        render(area, &mut buf, &state, BoardKind::Arrivals, None, Locale::En, false);
        assert!(text_of(&buf).contains("Select an airport"));

        let airport = AirportCode::new("TPE").unwrap();
        let mut buf = Buffer::empty(area);
        render(area, &mut buf, &state, BoardKind::Airline, Some(&airport), Locale::En, false);
        assert!(text_of(&buf).contains("airline code"));
    }
}
