//! Plain-text tables for the one-shot commands
//!
//! Row builders are shared with the dashboard so both surfaces show the same
//! columns.

use unicode_width::UnicodeWidthStr;

use crate::models::{format_clock, translate_status, Direction, FlightRecord, Locale};

use super::flights::WEEKDAYS_FIELD;

pub const BOARD_HEADERS: [&str; 6] = ["Flight", "From/To", "Sched", "Latest", "T/G", "Status"];
pub const AIRLINE_HEADERS: [&str; 7] =
    ["Dir", "Flight", "From/To", "Sched", "Latest", "T/G", "Status"];
pub const SCHEDULE_HEADERS: [&str; 5] = ["Flight", "Route", "Dep-Arr", "Days", "Period"];

/// Columns of one arrivals/departures row.
pub fn board_row(record: &FlightRecord, direction: Direction, locale: Locale) -> [String; 6] {
    [
        record.flight_label(),
        record
            .counterpart_airport(direction)
            .unwrap_or_else(|| "-".to_string()),
        format_clock(record.scheduled_time(direction).as_deref()),
        format_clock(record.latest_time(direction).as_deref()),
        record.terminal_gate(direction),
        translate_status(record.remark(direction).as_deref(), locale),
    ]
}

/// Which side of `airport` a record is on. Anything not departing is shown
/// as an arrival.
pub fn direction_at(record: &FlightRecord, airport: &str) -> Direction {
    if record.departure_airport().as_deref() == Some(airport) {
        Direction::Departure
    } else {
        Direction::Arrival
    }
}

/// Columns of one airline-search row; direction is judged relative to `airport`.
pub fn airline_row(record: &FlightRecord, airport: &str, locale: Locale) -> [String; 7] {
    let direction = direction_at(record, airport);
    let [flight, other, sched, latest, gate, status] = board_row(record, direction, locale);
    let dir = match direction {
        Direction::Arrival => "ARR",
        Direction::Departure => "DEP",
    };
    [dir.to_string(), flight, other, sched, latest, gate, status]
}

/// Columns of one periodic-schedule row.
pub fn schedule_row(record: &FlightRecord) -> [String; 5] {
    let or_dash = |v: Option<String>| v.unwrap_or_else(|| "-".to_string());

    let route = format!(
        "{}→{}",
        or_dash(record.departure_airport()),
        or_dash(record.arrival_airport())
    );
    let times = format!(
        "{}-{}",
        format_clock(record.text("DepartureTime").as_deref()),
        format_clock(record.text("ArrivalTime").as_deref())
    );
    let period = match (record.text("ScheduleStartDate"), record.text("ScheduleEndDate")) {
        (None, None) => "-".to_string(),
        (start, end) => format!("{} ~ {}", or_dash(start), or_dash(end)),
    };

    [
        record.flight_label(),
        route,
        times,
        or_dash(record.text(WEEKDAYS_FIELD)),
        period,
    ]
}

/// Column-aligned text table.
pub struct TextTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TextTable {
    pub fn new<S: AsRef<str>>(headers: &[S]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.as_ref().to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push<I, S>(&mut self, row: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(row.into_iter().map(Into::into).collect());
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render with two spaces between columns, measured in display cells.
    pub fn render(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.width()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if i < widths.len() {
                    widths[i] = widths[i].max(cell.width());
                }
            }
        }

        let total: usize = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
        let mut out = String::new();
        out.push_str(&render_line(&self.headers, &widths));
        out.push('\n');
        out.push_str(&"-".repeat(total));
        out.push('\n');
        for row in &self.rows {
            out.push_str(&render_line(row, &widths));
            out.push('\n');
        }
        out
    }
}

fn render_line(cells: &[String], widths: &[usize]) -> String {
    let line = widths
        .iter()
        .enumerate()
        .map(|(i, width)| pad(cells.get(i).map(String::as_str).unwrap_or(""), *width))
        .collect::<Vec<_>>()
        .join("  ");
    line.trim_end().to_string()
}

/// Left-align `text` in `width` display cells (CJK counts double).
pub fn pad(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(text.width());
    format!("{}{}", text, " ".repeat(fill))
}

/// Generic table for pass-through records: one column per scalar field, in
/// first-seen order.
pub fn record_table(records: &[FlightRecord]) -> TextTable {
    let mut keys: Vec<&str> = Vec::new();
    for record in records {
        for (key, value) in record.fields() {
            if !value.is_object() && !value.is_array() && !keys.contains(&key.as_str()) {
                keys.push(key.as_str());
            }
        }
    }

    let mut table = TextTable::new(&keys);
    for record in records {
        table.push(
            keys.iter()
                .map(|key| record.text(key).unwrap_or_else(|| "-".to_string())),
        );
    }
    table
}
