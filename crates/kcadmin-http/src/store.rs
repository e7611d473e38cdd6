//! The credential store: the one owner of the active session.

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, trace, warn};

use kcadmin_core::{AccessToken, ActiveSession, AuthMode, RefreshToken, Result};

use crate::token::{is_rejection, TokenAcquirer, TokenGrant};

/// A non-secret view of the session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub mode: AuthMode,
    /// Whether an access token is currently cached.
    pub authenticated: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub has_refresh_token: bool,
}

#[derive(Default)]
struct Slot {
    active: Option<ActiveSession>,
    /// Refresh token kept after the access token was invalidated.
    retained_refresh: Option<RefreshToken>,
}

impl Slot {
    fn take_refresh_token(&mut self) -> Option<RefreshToken> {
        self.active
            .take()
            .and_then(|session| session.refresh_token)
            .or_else(|| self.retained_refresh.take())
    }
}

/// Holds the active credential and replaces it when it expires.
///
/// The session lock is held across an acquisition, so concurrent callers
/// that find the token expired wait for the one exchange in flight and then
/// reuse its result.
pub struct CredentialStore {
    acquirer: TokenAcquirer,
    skew: chrono::Duration,
    slot: Mutex<Slot>,
}

impl CredentialStore {
    pub fn new(acquirer: TokenAcquirer, skew: std::time::Duration) -> Self {
        Self {
            acquirer,
            skew: chrono::Duration::from_std(skew).unwrap_or(chrono::Duration::zero()),
            slot: Mutex::new(Slot::default()),
        }
    }

    pub fn mode(&self) -> AuthMode {
        self.acquirer.mode()
    }

    /// Returns false when a rejected token cannot be replaced (bearer mode).
    pub fn can_refresh(&self) -> bool {
        self.mode() != AuthMode::Bearer
    }

    /// Return a token that is valid for at least the expiry margin,
    /// acquiring one first if needed.
    #[instrument(skip(self), fields(mode = %self.mode()))]
    pub async fn get_valid_token(&self) -> Result<AccessToken> {
        let mut slot = self.slot.lock().await;

        if let Some(active) = &slot.active {
            if active.is_valid_at(Utc::now()) {
                trace!("Reusing cached token");
                return Ok(active.access_token.clone());
            }
            debug!(expires_at = ?active.expires_at, "Cached token expired");
        }

        self.acquire_locked(&mut slot).await
    }

    /// Discard the cached access token. A held refresh token is kept for
    /// the next acquisition.
    pub async fn invalidate(&self) {
        let mut slot = self.slot.lock().await;
        Self::invalidate_locked(&mut slot);
    }

    /// Discard the cached token only if it is still `used`.
    ///
    /// A caller that saw a 401 may find another task already replaced the
    /// token; that replacement is kept.
    pub async fn invalidate_if_current(&self, used: &AccessToken) {
        let mut slot = self.slot.lock().await;
        let current = slot
            .active
            .as_ref()
            .is_some_and(|active| &active.access_token == used);
        if current {
            Self::invalidate_locked(&mut slot);
        } else {
            trace!("Token already replaced");
        }
    }

    /// Force a full acquisition, replacing any cached session.
    #[instrument(skip(self), fields(mode = %self.mode()))]
    pub async fn login(&self) -> Result<()> {
        let mut slot = self.slot.lock().await;
        let grant = self.acquirer.acquire().await?;
        slot.retained_refresh = None;
        self.install(&mut slot, grant);
        info!("Logged in");
        Ok(())
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let slot = self.slot.lock().await;
        SessionSnapshot {
            mode: self.mode(),
            authenticated: slot.active.is_some(),
            expires_at: slot.active.as_ref().and_then(|active| active.expires_at),
            has_refresh_token: slot
                .active
                .as_ref()
                .is_some_and(|active| active.refresh_token.is_some())
                || slot.retained_refresh.is_some(),
        }
    }

    fn invalidate_locked(slot: &mut Slot) {
        if let Some(session) = slot.active.take() {
            debug!("Invalidating cached token");
            if session.refresh_token.is_some() {
                slot.retained_refresh = session.refresh_token;
            }
        }
    }

    async fn acquire_locked(&self, slot: &mut Slot) -> Result<AccessToken> {
        let refresh_token = slot.take_refresh_token();

        let grant = match refresh_token {
            Some(refresh_token) if self.acquirer.supports_refresh() => {
                match self.acquirer.refresh(&refresh_token).await {
                    Ok(grant) => grant,
                    Err(err) if is_rejection(&err) => {
                        warn!("Refresh token rejected, logging in again");
                        self.acquirer.acquire().await?
                    }
                    Err(err) => {
                        slot.retained_refresh = Some(refresh_token);
                        return Err(err);
                    }
                }
            }
            _ => self.acquirer.acquire().await?,
        };

        Ok(self.install(slot, grant))
    }

    fn install(&self, slot: &mut Slot, grant: TokenGrant) -> AccessToken {
        let session = grant.into_session(Utc::now(), self.skew);
        debug!(expires_at = ?session.expires_at, "Session replaced");
        let token = session.access_token.clone();
        slot.active = Some(session);
        token
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("mode", &self.mode())
            .field("token_url", &self.acquirer.token_url())
            .field("session", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use kcadmin_core::{BaseUrl, Credentials, RealmName};

    fn bearer_store() -> CredentialStore {
        let config = ClientConfig::new(
            BaseUrl::new("http://127.0.0.1:9").unwrap(),
            RealmName::new("acme").unwrap(),
            Credentials::bearer("caller-token"),
        );
        let acquirer = TokenAcquirer::new(reqwest::Client::new(), &config);
        CredentialStore::new(acquirer, config.expiry_skew())
    }

    #[tokio::test]
    async fn bearer_token_is_cached_without_expiry() {
        let store = bearer_store();
        assert!(!store.snapshot().await.authenticated);

        let token = store.get_valid_token().await.unwrap();
        assert_eq!(token.as_str(), "caller-token");

        let snapshot = store.snapshot().await;
        assert!(snapshot.authenticated);
        assert_eq!(snapshot.mode, AuthMode::Bearer);
        assert!(snapshot.expires_at.is_none());
        assert!(!store.can_refresh());
    }

    #[tokio::test]
    async fn invalidate_if_current_ignores_replaced_tokens() {
        let store = bearer_store();
        store.get_valid_token().await.unwrap();

        store.invalidate_if_current(&AccessToken::new("other")).await;
        assert!(store.snapshot().await.authenticated);

        store.invalidate_if_current(&AccessToken::new("caller-token")).await;
        assert!(!store.snapshot().await.authenticated);
    }

    #[test]
    fn slot_prefers_active_refresh_token() {
        let mut slot = Slot {
            active: Some(ActiveSession {
                access_token: AccessToken::new("a"),
                expires_at: None,
                refresh_token: Some(RefreshToken::new("fresh")),
            }),
            retained_refresh: Some(RefreshToken::new("stale")),
        };
        assert_eq!(slot.take_refresh_token().unwrap().as_str(), "fresh");
        assert!(slot.active.is_none());
    }

    #[test]
    fn debug_hides_session() {
        let debug = format!("{:?}", bearer_store());
        assert!(!debug.contains("caller-token"));
    }
}
