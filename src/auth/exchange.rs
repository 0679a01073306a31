//! Client-credentials exchange against the TDX identity endpoint
//!
//! A 401 here means the configured client id or secret is wrong, so the
//! exchange never retries.

use serde::Deserialize;

use super::AuthConfig;
use crate::error::{Error, Result};

/// Longest slice of an error body kept in error messages.
const BODY_PREVIEW_LEN: usize = 200;

/// Parsed identity endpoint response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenGrant {
    pub access_token: String,
    /// Declared lifetime in seconds, before the store's safety margin.
    pub expires_in: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

/// Performs the out-of-band credential exchange.
pub struct CredentialExchanger {
    http: reqwest::Client,
    config: AuthConfig,
}

impl CredentialExchanger {
    pub fn new(http: reqwest::Client, config: AuthConfig) -> Self {
        Self { http, config }
    }

    /// Issue a client-credentials grant and parse the resulting token.
    pub async fn exchange(&self) -> Result<TokenGrant> {
        tracing::debug!("Requesting access token from {}", self.config.token_url);

        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
        ];

        let resp = self
            .http
            .post(&self.config.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| Error::AuthExchange {
                status: None,
                message: format!("identity endpoint unreachable: {e}"),
            })?;

        let status = resp.status();
        let body = resp.bytes().await.map_err(|e| Error::AuthExchange {
            status: Some(status.as_u16()),
            message: format!("failed to read token response: {e}"),
        })?;

        if !status.is_success() {
            return Err(Error::AuthExchange {
                status: Some(status.as_u16()),
                message: body_preview(&body),
            });
        }

        let parsed: TokenResponse =
            serde_json::from_slice(&body).map_err(|e| Error::AuthExchange {
                status: Some(status.as_u16()),
                message: format!("malformed token response: {e}"),
            })?;

        if parsed.access_token.is_empty() {
            return Err(Error::AuthExchange {
                status: Some(status.as_u16()),
                message: "token response has an empty 'access_token'".to_string(),
            });
        }

        tracing::info!("Access token issued (expires in {}s)", parsed.expires_in);

        Ok(TokenGrant {
            access_token: parsed.access_token,
            expires_in: parsed.expires_in,
        })
    }
}

fn body_preview(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        return "(empty body)".to_string();
    }
    text.chars().take(BODY_PREVIEW_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn setup() -> (MockServer, CredentialExchanger) {
        let server = MockServer::start().await;
        let config = AuthConfig {
            token_url: format!("{}/token", server.uri()),
            client_id: "board-client".to_string(),
            client_secret: "s3cret".to_string(),
        };
        (server, CredentialExchanger::new(reqwest::Client::new(), config))
    }

    #[tokio::test]
    async fn test_exchange_success() {
        let (server, exchanger) = setup().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string_contains("grant_type=client_credentials"))
            .and(body_string_contains("client_id=board-client"))
            .and(body_string_contains("client_secret=s3cret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "abc",
                "expires_in": 86400,
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let grant = tokio_test::assert_ok!(exchanger.exchange().await);
        assert_eq!(
            grant,
            TokenGrant {
                access_token: "abc".to_string(),
                expires_in: 86400,
            }
        );
    }

    #[tokio::test]
    async fn test_exchange_non_success_carries_status() {
        let (server, exchanger) = setup().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(
                ResponseTemplate::new(401).set_body_string(r#"{"error":"invalid_client"}"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let err = tokio_test::assert_err!(exchanger.exchange().await);
        match err {
            Error::AuthExchange { status, message } => {
                assert_eq!(status, Some(401));
                assert!(message.contains("invalid_client"), "message: {message}");
            }
            other => panic!("expected AuthExchange, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_exchange_missing_expires_in() {
        let (server, exchanger) = setup().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "abc"
            })))
            .mount(&server)
            .await;

        let err = exchanger.exchange().await.unwrap_err();
        assert!(
            matches!(err, Error::AuthExchange { status: Some(200), .. }),
            "got {err:?}"
        );
    }

    #[tokio::test]
    async fn test_exchange_ill_typed_fields() {
        let (server, exchanger) = setup().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": 42,
                "expires_in": "soon"
            })))
            .mount(&server)
            .await;

        let err = exchanger.exchange().await.unwrap_err();
        assert!(matches!(err, Error::AuthExchange { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn test_exchange_non_json_body() {
        let (server, exchanger) = setup().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = exchanger.exchange().await.unwrap_err();
        assert!(matches!(err, Error::AuthExchange { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn test_exchange_empty_token_rejected() {
        let (server, exchanger) = setup().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "",
                "expires_in": 3600
            })))
            .mount(&server)
            .await;

        let err = exchanger.exchange().await.unwrap_err();
        assert!(matches!(err, Error::AuthExchange { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn test_exchange_unreachable_has_no_status() {
        let config = AuthConfig {
            // Port 9 (discard) on localhost is not expected to accept HTTP.
            token_url: "http://127.0.0.1:9/token".to_string(),
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
        };
        let exchanger = CredentialExchanger::new(reqwest::Client::new(), config);

        let err = exchanger.exchange().await.unwrap_err();
        assert!(
            matches!(err, Error::AuthExchange { status: None, .. }),
            "got {err:?}"
        );
    }

    #[test]
    fn test_body_preview_truncates() {
        let long = "x".repeat(500);
        assert_eq!(body_preview(long.as_bytes()).len(), BODY_PREVIEW_LEN);
        assert_eq!(body_preview(b"  "), "(empty body)");
    }
}
