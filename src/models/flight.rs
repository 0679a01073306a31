//! Flight records as returned by the TDX FIDS and schedule feeds
//!
//! Records are kept as raw JSON objects so every field the API sends reaches
//! the caller untouched; accessors read the well-known ones.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Which side of a flight an airport is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Arrival,
    Departure,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Arrival => "arrival",
            Direction::Departure => "departure",
        }
    }
}

/// One flight leg (or one schedule / seat-inventory row).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlightRecord(Map<String, Value>);

/// Seat-availability rows share the pass-through representation.
pub type SeatRecord = FlightRecord;

impl FlightRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.0
    }

    /// String value of `key`; numbers are rendered as text.
    pub fn text(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Add or replace a derived field.
    pub fn insert(&mut self, key: &str, value: Value) {
        self.0.insert(key.to_string(), value);
    }

    pub fn airline_id(&self) -> Option<String> {
        self.text("AirlineID")
    }

    pub fn flight_number(&self) -> Option<String> {
        self.text("FlightNumber")
    }

    pub fn departure_airport(&self) -> Option<String> {
        self.text("DepartureAirportID")
    }

    pub fn arrival_airport(&self) -> Option<String> {
        self.text("ArrivalAirportID")
    }

    /// Carrier code and number, e.g. `CI 0100`.
    pub fn flight_label(&self) -> String {
        match (self.airline_id(), self.flight_number()) {
            (Some(airline), Some(number)) if number.starts_with(&airline) => number,
            (Some(airline), Some(number)) => format!("{airline} {number}"),
            (None, Some(number)) => number,
            (Some(airline), None) => airline,
            (None, None) => "-".to_string(),
        }
    }

    /// The other end of the flight relative to the board's airport.
    pub fn counterpart_airport(&self, direction: Direction) -> Option<String> {
        match direction {
            Direction::Arrival => self.departure_airport(),
            Direction::Departure => self.arrival_airport(),
        }
    }

    pub fn scheduled_time(&self, direction: Direction) -> Option<String> {
        match direction {
            Direction::Arrival => self.text("ScheduleArrivalTime"),
            Direction::Departure => self.text("ScheduleDepartureTime"),
        }
    }

    /// Actual time if known, otherwise the estimate.
    pub fn latest_time(&self, direction: Direction) -> Option<String> {
        match direction {
            Direction::Arrival => self
                .text("ActualArrivalTime")
                .or_else(|| self.text("EstimatedArrivalTime")),
            Direction::Departure => self
                .text("ActualDepartureTime")
                .or_else(|| self.text("EstimatedDepartureTime")),
        }
    }

    /// Remark text for the given side, falling back to a generic `Status`.
    pub fn remark(&self, direction: Direction) -> Option<String> {
        let key = match direction {
            Direction::Arrival => "ArrivalRemark",
            Direction::Departure => "DepartureRemark",
        };
        self.text(key).or_else(|| self.text("Status"))
    }

    /// `Terminal/Gate` with `-` for missing parts.
    pub fn terminal_gate(&self, direction: Direction) -> String {
        let (terminal_key, gate_key) = match direction {
            Direction::Arrival => ("ArrivalTerminal", "ArrivalGate"),
            Direction::Departure => ("DepartureTerminal", "DepartureGate"),
        };
        let terminal = self
            .text(terminal_key)
            .or_else(|| self.text("Terminal"))
            .unwrap_or_else(|| "-".to_string());
        let gate = self
            .text(gate_key)
            .or_else(|| self.text("Gate"))
            .unwrap_or_else(|| "-".to_string());
        format!("{terminal}/{gate}")
    }
}

/// Normalize an API response into a list of records.
///
/// Accepts a bare array or an envelope object with a `Records` array.
/// Anything else (error bodies, `{}`, scalars) means "no data".
pub fn normalize_records(value: Value) -> Vec<FlightRecord> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut envelope) => match envelope.remove("Records") {
            Some(Value::Array(items)) => items,
            _ => {
                tracing::debug!("Response has no record array, treating as empty");
                return Vec::new();
            }
        },
        _ => {
            tracing::debug!("Response is not an array or envelope, treating as empty");
            return Vec::new();
        }
    };

    let total = items.len();
    let records: Vec<FlightRecord> = items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(fields) => Some(FlightRecord(fields)),
            _ => None,
        })
        .collect();

    if records.len() != total {
        tracing::debug!("Skipped {} non-object records", total - records.len());
    }
    records
}

/// Render an API timestamp as `HH:MM`, or as-is when it is not a timestamp.
pub fn format_clock(raw: Option<&str>) -> String {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return "-".to_string();
    };

    const FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"];

    // Offsets (e.g. "+08:00") are dropped; the feeds report local airport time.
    let local = raw.get(..19).filter(|_| raw.len() > 19).unwrap_or(raw);
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(local, fmt).ok())
        .map(|dt| dt.format("%H:%M").to_string())
        .unwrap_or_else(|| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> FlightRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_normalize_envelope() {
        let records = normalize_records(json!({
            "UpdateTime": "2024-05-01T08:00:00+08:00",
            "Records": [{"AirlineID": "B7", "FlightNumber": "123", "ArrivalAirportID": "TSA"}]
        }));
        assert_eq!(records.len(), 1);
        assert_eq!(
            Value::Object(records[0].fields().clone()),
            json!({"AirlineID": "B7", "FlightNumber": "123", "ArrivalAirportID": "TSA"})
        );
    }

    #[test]
    fn test_normalize_bare_array_unchanged() {
        let raw = json!([
            {"FlightNumber": "1"},
            {"FlightNumber": "2", "Extra": {"nested": true}}
        ]);
        let records = normalize_records(raw.clone());
        assert_eq!(serde_json::to_value(&records).unwrap(), raw);
    }

    #[test]
    fn test_normalize_other_shapes_are_empty() {
        assert!(normalize_records(json!({})).is_empty());
        assert!(normalize_records(json!({"Records": "nope"})).is_empty());
        assert!(normalize_records(json!({"message": "quota exceeded"})).is_empty());
        assert!(normalize_records(json!("error")).is_empty());
        assert!(normalize_records(Value::Null).is_empty());
    }

    #[test]
    fn test_normalize_skips_non_objects() {
        let records = normalize_records(json!([{"FlightNumber": "1"}, 7, null]));
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_flight_label() {
        let r = record(json!({"AirlineID": "CI", "FlightNumber": "0100"}));
        assert_eq!(r.flight_label(), "CI 0100");

        let r = record(json!({"AirlineID": "BR", "FlightNumber": "BR198"}));
        assert_eq!(r.flight_label(), "BR198");

        let r = record(json!({"FlightNumber": 881}));
        assert_eq!(r.flight_label(), "881");

        assert_eq!(FlightRecord::default().flight_label(), "-");
    }

    #[test]
    fn test_direction_accessors() {
        let r = record(json!({
            "DepartureAirportID": "TSA",
            "ArrivalAirportID": "KNH",
            "ScheduleDepartureTime": "2024-05-01T08:30",
            "EstimatedArrivalTime": "2024-05-01T09:40",
            "ActualArrivalTime": "",
            "ArrivalRemark": "ARRIVED",
            "Terminal": "1"
        }));

        assert_eq!(r.counterpart_airport(Direction::Arrival).as_deref(), Some("TSA"));
        assert_eq!(r.counterpart_airport(Direction::Departure).as_deref(), Some("KNH"));
        assert_eq!(
            r.latest_time(Direction::Arrival).as_deref(),
            Some("2024-05-01T09:40")
        );
        assert_eq!(r.remark(Direction::Arrival).as_deref(), Some("ARRIVED"));
        assert_eq!(r.remark(Direction::Departure), None);
        assert_eq!(r.terminal_gate(Direction::Arrival), "1/-");
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(Some("2024-05-01T08:30")), "08:30");
        assert_eq!(format_clock(Some("2024-05-01T23:05:00")), "23:05");
        assert_eq!(format_clock(Some("2024-05-01T07:15:00+08:00")), "07:15");
        assert_eq!(format_clock(Some("08:30")), "08:30");
        assert_eq!(format_clock(Some("")), "-");
        assert_eq!(format_clock(None), "-");
    }
}
