//! Error taxonomy for the TDX access layer.
//!
//! Every failure the core can produce maps onto one of these variants.
//! The fetcher recovers locally from exactly one of them (a single 401);
//! everything else propagates unchanged to the caller.

use thiserror::Error;

/// Errors produced by the credential exchange, the authenticated fetcher,
/// and the flight query service.
#[derive(Debug, Error)]
pub enum Error {
    /// Identity endpoint unreachable, non-2xx, or returned a malformed
    /// token response. Never retried.
    #[error("credential exchange failed{}: {message}", http_suffix(.status))]
    AuthExchange {
        /// HTTP status of the token response, `None` when no response arrived.
        status: Option<u16>,
        message: String,
    },

    /// The data API rejected the request (or rejected it twice with 401).
    #[error("API request failed (HTTP {status}) for {url}")]
    Request { status: u16, url: String },

    /// Transport failure: DNS, connect, timeout, reset.
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    /// A 2xx response whose body is not valid JSON.
    #[error("invalid JSON in API response: {0}")]
    Parse(#[from] serde_json::Error),

    /// An airport, airline or flight identifier was blank.
    #[error("{kind} must not be empty")]
    EmptyIdentifier { kind: &'static str },

    /// A query URL could not be built from the configured base URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

fn http_suffix(status: &Option<u16>) -> String {
    status
        .map(|code| format!(" (HTTP {code})"))
        .unwrap_or_default()
}

impl Error {
    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::AuthExchange { status, .. } => *status,
            Self::Request { status, .. } => Some(*status),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns `true` if the data API answered 401 (after the single retry).
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Request { status: 401, .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
