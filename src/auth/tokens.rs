//! In-memory access token storage
//!
//! The store reports expiry five minutes before the lifetime declared by the
//! identity endpoint, so a token is never sent when it could lapse mid-request.

use std::sync::RwLock;
use std::time::Duration;

use tokio::time::Instant;

/// Early-expiry buffer subtracted from every declared token lifetime.
pub const SAFETY_MARGIN_SECS: i64 = 300;

/// Longest effective lifetime kept (one year).
pub const MAX_LIFETIME_SECS: i64 = 365 * 24 * 60 * 60;

/// Access token plus the instant after which it must not be used.
#[derive(Debug, Clone)]
pub struct Credential {
    pub token: String,
    pub expires_at: Instant,
}

impl Credential {
    /// Build a credential from a declared lifetime, applying the safety margin.
    ///
    /// Lifetimes at or below the margin yield an already-expired credential.
    /// Lifetimes beyond [`MAX_LIFETIME_SECS`] are capped.
    pub fn new(token: String, expires_in_secs: i64) -> Self {
        let usable = expires_in_secs
            .saturating_sub(SAFETY_MARGIN_SECS)
            .clamp(0, MAX_LIFETIME_SECS);
        Self {
            token,
            expires_at: Instant::now() + Duration::from_secs(usable as u64),
        }
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Single-slot token store owned by the API client.
///
/// Writers replace the whole credential; readers clone what they need, so
/// no lock is ever held across an await point.
#[derive(Debug, Default)]
pub struct TokenStore {
    slot: RwLock<Option<Credential>>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff a credential is held and has not reached its effective expiry.
    pub fn is_valid(&self) -> bool {
        self.read(|slot| slot.as_ref().is_some_and(|c| !c.is_expired()))
    }

    /// Replace the held credential.
    pub fn set(&self, token: String, expires_in_secs: i64) {
        let credential = Credential::new(token, expires_in_secs);
        let mut guard = self.slot.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(credential);
    }

    /// The held token, valid or not.
    pub fn current(&self) -> Option<String> {
        self.read(|slot| slot.as_ref().map(|c| c.token.clone()))
    }

    /// Time left before the credential expires (zero once expired).
    pub fn remaining(&self) -> Option<Duration> {
        self.read(|slot| {
            slot.as_ref()
                .map(|c| c.expires_at.saturating_duration_since(Instant::now()))
        })
    }

    /// Wall-clock approximation of the effective expiry, for display.
    pub fn expires_at_utc(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        let remaining = self.remaining()?;
        let remaining = chrono::Duration::from_std(remaining).ok()?;
        Some(chrono::Utc::now() + remaining)
    }

    fn read<T>(&self, f: impl FnOnce(&Option<Credential>) -> T) -> T {
        let guard = self.slot.read().unwrap_or_else(|e| e.into_inner());
        f(&guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_store_is_invalid() {
        let store = TokenStore::new();
        assert!(!store.is_valid());
        assert_eq!(store.current(), None);
        assert_eq!(store.remaining(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_valid_until_margin_adjusted_expiry() {
        let store = TokenStore::new();
        store.set("tok".to_string(), 3600);
        assert!(store.is_valid());
        assert_eq!(store.remaining(), Some(Duration::from_secs(3300)));

        tokio::time::advance(Duration::from_secs(3299)).await;
        assert!(store.is_valid());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(!store.is_valid());
        assert_eq!(store.remaining(), Some(Duration::ZERO));
    }

    #[tokio::test(start_paused = true)]
    async fn test_just_above_margin_is_briefly_valid() {
        let store = TokenStore::new();
        store.set("tok".to_string(), 301);
        assert!(store.is_valid());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(!store.is_valid());
    }

    #[test]
    fn test_lifetime_at_or_below_margin_is_expired_immediately() {
        for expires_in in [300, 120, 1, 0, -60] {
            let store = TokenStore::new();
            store.set("tok".to_string(), expires_in);
            assert!(!store.is_valid(), "expires_in={expires_in}");
            // The token is still held; only validity is affected.
            assert_eq!(store.current().as_deref(), Some("tok"));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_extreme_lifetimes_do_not_overflow() {
        let store = TokenStore::new();
        store.set("tok".to_string(), i64::MAX);
        assert!(store.is_valid());
        assert_eq!(
            store.remaining(),
            Some(Duration::from_secs(MAX_LIFETIME_SECS as u64))
        );

        store.set("tok".to_string(), i64::MIN);
        assert!(!store.is_valid());
    }

    #[test]
    fn test_set_replaces_previous_credential() {
        let store = TokenStore::new();
        store.set("old".to_string(), 100);
        assert!(!store.is_valid());

        store.set("new".to_string(), 3600);
        assert!(store.is_valid());
        assert_eq!(store.current().as_deref(), Some("new"));
    }

    #[test]
    fn test_expires_at_utc_is_in_the_future() {
        let store = TokenStore::new();
        store.set("tok".to_string(), 3600);
        let expires = store.expires_at_utc().unwrap();
        assert!(expires > chrono::Utc::now());
    }
}
