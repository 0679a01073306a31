//! Airport, airline and flight identifiers

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Error;

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident, $kind:literal, uppercase = $upper:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Trim `raw`; reject it only if nothing is left.
            pub fn new(raw: &str) -> Result<Self, Error> {
                let code = raw.trim();
                if code.is_empty() {
                    return Err(Error::EmptyIdentifier { kind: $kind });
                }
                if $upper {
                    Ok(Self(code.to_uppercase()))
                } else {
                    Ok(Self(code.to_string()))
                }
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = Error;

            fn try_from(raw: String) -> Result<Self, Error> {
                Self::new(&raw)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> String {
                id.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = Error;

            fn from_str(raw: &str) -> Result<Self, Error> {
                Self::new(raw)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

identifier!(
    /// IATA airport code, e.g. `TPE`.
    AirportCode,
    "airport code",
    uppercase = false
);
identifier!(
    /// IATA carrier code, e.g. `CI`. Upper-cased, since search input is
    /// compared against the feed's `AirlineID`.
    AirlineCode,
    "airline code",
    uppercase = true
);
identifier!(
    /// Flight number as the API spells it, e.g. `CI0100` or `123`.
    FlightNumber,
    "flight number",
    uppercase = false
);

/// An airport offered in the dashboard sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownAirport {
    pub code: &'static str,
    pub name_zh: &'static str,
    pub name_en: &'static str,
}

/// Airports served by the TDX FIDS feed.
pub const KNOWN_AIRPORTS: &[KnownAirport] = &[
    KnownAirport { code: "TPE", name_zh: "臺灣桃園", name_en: "Taoyuan" },
    KnownAirport { code: "TSA", name_zh: "臺北松山", name_en: "Taipei Songshan" },
    KnownAirport { code: "KHH", name_zh: "高雄", name_en: "Kaohsiung" },
    KnownAirport { code: "RMQ", name_zh: "臺中", name_en: "Taichung" },
    KnownAirport { code: "TNN", name_zh: "臺南", name_en: "Tainan" },
    KnownAirport { code: "CYI", name_zh: "嘉義", name_en: "Chiayi" },
    KnownAirport { code: "HUN", name_zh: "花蓮", name_en: "Hualien" },
    KnownAirport { code: "TTT", name_zh: "臺東", name_en: "Taitung" },
    KnownAirport { code: "MZG", name_zh: "澎湖", name_en: "Penghu" },
    KnownAirport { code: "KNH", name_zh: "金門", name_en: "Kinmen" },
    KnownAirport { code: "LZN", name_zh: "馬祖南竿", name_en: "Matsu Nangan" },
    KnownAirport { code: "MFK", name_zh: "馬祖北竿", name_en: "Matsu Beigan" },
    KnownAirport { code: "GNI", name_zh: "綠島", name_en: "Green Island" },
    KnownAirport { code: "KYD", name_zh: "蘭嶼", name_en: "Orchid Island" },
    KnownAirport { code: "CMJ", name_zh: "七美", name_en: "Qimei" },
    KnownAirport { code: "WOT", name_zh: "望安", name_en: "Wang-an" },
];

/// Look up a built-in airport by code.
pub fn known_airport(code: &AirportCode) -> Option<&'static KnownAirport> {
    KNOWN_AIRPORTS.iter().find(|a| a.code == code.as_str())
}
