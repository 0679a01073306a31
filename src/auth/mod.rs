//! Authentication for the TDX open-data API
//!
//! Service-to-service only: a client-credentials grant yields a bearer token,
//! which lives in memory for the lifetime of the process.

pub mod exchange;
pub mod tokens;

use serde::{Deserialize, Serialize};

pub use exchange::{CredentialExchanger, TokenGrant};
pub use tokens::TokenStore;

const TDX_TOKEN_URL: &str =
    "https://tdx.transportdata.tw/auth/realms/TDXConnect/protocol/openid-connect/token";

/// Identity endpoint and client credentials.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AuthConfig {
    /// OpenID Connect token endpoint
    pub token_url: String,
    /// TDX application client id
    pub client_id: String,
    /// TDX application client secret
    pub client_secret: String,
}

impl AuthConfig {
    /// Whether both client id and secret are present.
    pub fn is_configured(&self) -> bool {
        !self.client_id.trim().is_empty() && !self.client_secret.trim().is_empty()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_url: TDX_TOKEN_URL.to_string(),
            client_id: String::new(),
            client_secret: String::new(),
        }
    }
}
