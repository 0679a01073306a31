//! Operating-day masks for periodic schedules

use serde::{Deserialize, Serialize};

/// Shown when a schedule carries no usable day mask.
pub const UNKNOWN_WEEKDAYS: &str = "-";

/// Language used for weekday names and flight status text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum Locale {
    #[default]
    #[serde(rename = "zh-TW")]
    #[value(name = "zh-TW")]
    ZhTw,
    #[serde(rename = "en")]
    #[value(name = "en")]
    En,
}

impl Locale {
    /// Weekday names, Sunday first.
    pub fn weekday_names(self) -> [&'static str; 7] {
        match self {
            Locale::ZhTw => ["日", "一", "二", "三", "四", "五", "六"],
            Locale::En => ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"],
        }
    }

    fn list_delimiter(self) -> &'static str {
        match self {
            Locale::ZhTw => "、",
            Locale::En => ", ",
        }
    }
}

/// Decode a Sunday-first day mask such as `"1010100"`.
///
/// Position *i* is an operating day iff it holds `'1'`. An absent or empty
/// mask decodes to [`UNKNOWN_WEEKDAYS`].
pub fn decode_day_mask(mask: Option<&str>, locale: Locale) -> String {
    let Some(mask) = mask.filter(|m| !m.is_empty()) else {
        return UNKNOWN_WEEKDAYS.to_string();
    };

    locale
        .weekday_names()
        .iter()
        .zip(mask.chars())
        .filter(|(_, flag)| *flag == '1')
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join(locale.list_delimiter())
}
