//! Authenticated HTTP client for the TDX data API
//!
//! Wraps reqwest::Client with bearer token injection, lazy token refresh,
//! and a single forced refresh + retry when the API answers 401.

use reqwest::StatusCode;
use serde_json::Value;
use url::Url;

use crate::auth::{CredentialExchanger, TokenStore};
use crate::config::Config;
use crate::error::{Error, Result};

/// Client that performs authenticated GETs against the data API.
///
/// Owns the process-wide token store. Concurrent callers are not serialized:
/// two requests that both find the store invalid will both exchange, and the
/// last token written wins.
pub struct FlightClient {
    http: reqwest::Client,
    base_url: Url,
    tokens: TokenStore,
    exchanger: CredentialExchanger,
}

impl FlightClient {
    /// Build the client from configuration. No network traffic happens here.
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.api.request_timeout())
            .connect_timeout(config.api.request_timeout())
            .user_agent(concat!("flightboard/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(Error::Network)?;

        Self::with_client(http, config)
    }

    /// Build the client around an existing reqwest client.
    pub fn with_client(http: reqwest::Client, config: &Config) -> Result<Self> {
        let base_url = parse_base_url(&config.api.base_url)?;
        let exchanger = CredentialExchanger::new(http.clone(), config.auth.clone());
        Ok(Self {
            http,
            base_url,
            tokens: TokenStore::new(),
            exchanger,
        })
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// Join `path` (relative, no leading slash needed) onto the API base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Exchange a token ahead of the first request.
    ///
    /// Failures are logged and swallowed; `ensure_valid` retries on demand.
    pub async fn prime(&self) {
        if let Err(e) = self.ensure_valid().await {
            tracing::warn!("Token priming failed, will retry on first request: {}", e);
        }
    }

    /// Return a usable token, exchanging for a new one if the store is invalid.
    pub async fn ensure_valid(&self) -> Result<String> {
        if self.tokens.is_valid() {
            if let Some(token) = self.tokens.current() {
                return Ok(token);
            }
        }
        tracing::info!("Access token missing or expired, exchanging credentials...");
        self.refresh().await
    }

    /// Exchange unconditionally and store the result.
    async fn refresh(&self) -> Result<String> {
        let grant = self.exchanger.exchange().await?;
        self.tokens.set(grant.access_token.clone(), grant.expires_in);
        Ok(grant.access_token)
    }

    /// GET `url` with bearer auth and parse the JSON body.
    ///
    /// A 401 on the first attempt forces a refresh and exactly one retry.
    pub async fn fetch_json(&self, url: Url) -> Result<Value> {
        let mut token = self.ensure_valid().await?;
        let mut refreshed = false;

        loop {
            tracing::debug!("GET {}", url);

            let resp = self
                .http
                .get(url.clone())
                .bearer_auth(&token)
                .header(reqwest::header::ACCEPT, "application/json")
                .send()
                .await
                .map_err(Error::Network)?;

            let status = resp.status();
            if status == StatusCode::UNAUTHORIZED && !refreshed {
                tracing::warn!("401 Unauthorized for {}, refreshing token and retrying", url);
                refreshed = true;
                token = self.refresh().await?;
                continue;
            }

            if !status.is_success() {
                return Err(Error::Request {
                    status: status.as_u16(),
                    url: url.to_string(),
                });
            }

            let body = resp.bytes().await.map_err(Error::Network)?;
            return Ok(serde_json::from_slice(&body)?);
        }
    }
}

/// Parse the configured base URL so that relative joins append to its path.
fn parse_base_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim().trim_end_matches('/');
    Ok(Url::parse(&format!("{trimmed}/"))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn setup() -> (MockServer, FlightClient) {
        let server = MockServer::start().await;
        let mut config = Config::default();
        config.auth.token_url = format!("{}/token", server.uri());
        config.auth.client_id = "id".to_string();
        config.auth.client_secret = "secret".to_string();
        config.api.base_url = format!("{}/api", server.uri());
        let client = FlightClient::new(&config).unwrap();
        (server, client)
    }

    fn token_response(token: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "access_token": token,
            "expires_in": 86400
        }))
    }

    async fn mount_token(server: &MockServer, token: &str, times: u64) {
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(token_response(token))
            .expect(times)
            .mount(server)
            .await;
    }

    #[test]
    fn test_endpoint_appends_to_base_path() {
        let mut config = Config::default();
        config.api.base_url = "https://example.test/api/basic/v2/Air".to_string();
        let client = FlightClient::new(&config).unwrap();

        let url = client.endpoint("FIDS/Flight").unwrap();
        assert_eq!(url.as_str(), "https://example.test/api/basic/v2/Air/FIDS/Flight");

        let url = client.endpoint("/Schedule/International/Airport/TPE").unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.test/api/basic/v2/Air/Schedule/International/Airport/TPE"
        );
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let mut config = Config::default();
        config.api.base_url = "not a url".to_string();
        assert!(matches!(
            FlightClient::new(&config),
            Err(Error::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_ensure_valid_exchanges_once_when_empty() {
        let (server, client) = setup().await;
        mount_token(&server, "tok-1", 1).await;

        assert_eq!(client.ensure_valid().await.unwrap(), "tok-1");
        // Second call is served from the store.
        assert_eq!(client.ensure_valid().await.unwrap(), "tok-1");
        assert!(client.tokens().is_valid());
    }

    #[tokio::test]
    async fn test_ensure_valid_skips_exchange_when_valid() {
        let (server, client) = setup().await;
        mount_token(&server, "unused", 0).await;

        client.tokens().set("cached".to_string(), 3600);
        assert_eq!(client.ensure_valid().await.unwrap(), "cached");
    }

    #[tokio::test]
    async fn test_ensure_valid_replaces_expired_token() {
        let (server, client) = setup().await;
        mount_token(&server, "fresh", 1).await;

        client.tokens().set("stale".to_string(), 120);
        assert_eq!(client.ensure_valid().await.unwrap(), "fresh");
        assert_eq!(client.tokens().current().as_deref(), Some("fresh"));
    }

    #[tokio::test]
    async fn test_fetch_json_sends_bearer_token() {
        let (server, client) = setup().await;
        mount_token(&server, "tok-1", 1).await;

        Mock::given(method("GET"))
            .and(path("/api/FIDS/Flight"))
            .and(header("authorization", "Bearer tok-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"FlightNumber": "1"}])))
            .expect(1)
            .mount(&server)
            .await;

        let url = client.endpoint("FIDS/Flight").unwrap();
        let body = client.fetch_json(url).await.unwrap();
        assert_eq!(body, json!([{"FlightNumber": "1"}]));
    }

    #[tokio::test]
    async fn test_fetch_json_retries_once_after_401() {
        let (server, client) = setup().await;

        // First exchange hands out tok-1, the forced refresh hands out tok-2.
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(token_response("tok-1"))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(token_response("tok-2"))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/FIDS/Flight"))
            .and(header("authorization", "Bearer tok-1"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/FIDS/Flight"))
            .and(header("authorization", "Bearer tok-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Records": []})))
            .expect(1)
            .mount(&server)
            .await;

        let url = client.endpoint("FIDS/Flight").unwrap();
        let body = client.fetch_json(url).await.unwrap();
        assert_eq!(body, json!({"Records": []}));
        assert_eq!(client.tokens().current().as_deref(), Some("tok-2"));
    }

    #[tokio::test]
    async fn test_fetch_json_gives_up_after_second_401() {
        let (server, client) = setup().await;
        mount_token(&server, "tok", 2).await;

        Mock::given(method("GET"))
            .and(path("/api/FIDS/Flight"))
            .respond_with(ResponseTemplate::new(401))
            .expect(2)
            .mount(&server)
            .await;

        let url = client.endpoint("FIDS/Flight").unwrap();
        let err = client.fetch_json(url).await.unwrap_err();
        assert!(err.is_unauthorized(), "got {err:?}");
        assert_eq!(err.status(), Some(401));
    }

    #[tokio::test]
    async fn test_fetch_json_does_not_retry_other_statuses() {
        let (server, client) = setup().await;
        mount_token(&server, "tok", 1).await;

        Mock::given(method("GET"))
            .and(path("/api/FIDS/Flight"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let url = client.endpoint("FIDS/Flight").unwrap();
        let err = client.fetch_json(url).await.unwrap_err();
        assert!(
            matches!(err, Error::Request { status: 503, .. }),
            "got {err:?}"
        );
    }

    #[tokio::test]
    async fn test_fetch_json_invalid_body_is_parse_error() {
        let (server, client) = setup().await;
        mount_token(&server, "tok", 1).await;

        Mock::given(method("GET"))
            .and(path("/api/FIDS/Flight"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let url = client.endpoint("FIDS/Flight").unwrap();
        let err = client.fetch_json(url).await.unwrap_err();
        assert!(matches!(err, Error::Parse(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_fetch_json_exchange_failure_skips_request() {
        let (server, client) = setup().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid_client"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(0)
            .mount(&server)
            .await;

        let url = client.endpoint("FIDS/Flight").unwrap();
        let err = client.fetch_json(url).await.unwrap_err();
        assert!(
            matches!(err, Error::AuthExchange { status: Some(400), .. }),
            "got {err:?}"
        );
    }

    #[tokio::test]
    async fn test_fetch_json_huge_token_lifetime() {
        let (server, client) = setup().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "t",
                "expires_in": i64::MAX
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/FIDS/Flight"))
            .and(header("authorization", "Bearer t"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let url = client.endpoint("FIDS/Flight").unwrap();
        assert_eq!(client.fetch_json(url).await.unwrap(), json!([]));
        assert!(client.tokens().is_valid());
    }

    #[tokio::test]
    async fn test_fetch_json_network_failure() {
        let (server, client) = setup().await;
        mount_token(&server, "tok", 1).await;

        let url = Url::parse("http://127.0.0.1:9/FIDS/Flight").unwrap();
        let err = client.fetch_json(url).await.unwrap_err();
        assert!(matches!(err, Error::Network(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_prime_swallows_failure() {
        let (server, client) = setup().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        client.prime().await;
        assert!(!client.tokens().is_valid());
    }

    #[tokio::test]
    async fn test_prime_fills_store() {
        let (server, client) = setup().await;
        mount_token(&server, "warm", 1).await;

        client.prime().await;
        assert!(client.tokens().is_valid());
        assert_eq!(client.ensure_valid().await.unwrap(), "warm");
    }
}
