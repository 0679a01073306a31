//! Flight status codes and their display text

use super::Locale;

/// Known remark codes reported by airport FIDS feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightStatus {
    OnTime,
    Delayed,
    Boarding,
    Departed,
    Arrived,
    Cancelled,
}

impl FlightStatus {
    /// Parse an upper-case status code; unknown codes yield `None`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_uppercase().as_str() {
            "ON TIME" => Some(Self::OnTime),
            "DELAYED" => Some(Self::Delayed),
            "BOARDING" => Some(Self::Boarding),
            "DEPARTED" => Some(Self::Departed),
            "ARRIVED" => Some(Self::Arrived),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn label(self, locale: Locale) -> &'static str {
        match (self, locale) {
            (Self::OnTime, Locale::ZhTw) => "準時",
            (Self::Delayed, Locale::ZhTw) => "延誤",
            (Self::Boarding, Locale::ZhTw) => "登機中",
            (Self::Departed, Locale::ZhTw) => "已起飛",
            (Self::Arrived, Locale::ZhTw) => "已抵達",
            (Self::Cancelled, Locale::ZhTw) => "取消",
            (Self::OnTime, Locale::En) => "On time",
            (Self::Delayed, Locale::En) => "Delayed",
            (Self::Boarding, Locale::En) => "Boarding",
            (Self::Departed, Locale::En) => "Departed",
            (Self::Arrived, Locale::En) => "Arrived",
            (Self::Cancelled, Locale::En) => "Cancelled",
        }
    }

    /// Whether the status should be highlighted as a disruption.
    pub fn is_disrupted(self) -> bool {
        matches!(self, Self::Delayed | Self::Cancelled)
    }
}

/// Display text for a raw status/remark value. Unknown values pass through.
pub fn translate_status(raw: Option<&str>, locale: Locale) -> String {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => "-".to_string(),
        Some(code) => match FlightStatus::from_code(code) {
            Some(status) => status.label(locale).to_string(),
            None => code.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes_translate() {
        assert_eq!(translate_status(Some("ON TIME"), Locale::ZhTw), "準時");
        assert_eq!(translate_status(Some("cancelled"), Locale::ZhTw), "取消");
        assert_eq!(translate_status(Some("DELAYED"), Locale::En), "Delayed");
    }

    #[test]
    fn test_unknown_codes_pass_through() {
        assert_eq!(translate_status(Some("已到ARRIVED"), Locale::ZhTw), "已到ARRIVED");
        assert_eq!(translate_status(Some("GATE CHANGE"), Locale::En), "GATE CHANGE");
    }

    #[test]
    fn test_missing_status_is_dash() {
        assert_eq!(translate_status(None, Locale::En), "-");
        assert_eq!(translate_status(Some("  "), Locale::ZhTw), "-");
    }

    #[test]
    fn test_disruption_flag() {
        assert!(FlightStatus::Cancelled.is_disrupted());
        assert!(!FlightStatus::Boarding.is_disrupted());
    }
}
