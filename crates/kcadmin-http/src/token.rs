//! Token endpoint exchanges.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use kcadmin_core::{
    AccessToken, ActiveSession, AuthError, AuthMode, Credentials, Error, NetworkError,
    RefreshToken, Result,
};

use crate::config::ClientConfig;

/// Scope requested when a password login asks for an offline token.
const OFFLINE_SCOPE: &str = "openid offline_access";

/// The result of one successful token exchange.
#[derive(Debug, Clone)]
pub struct TokenGrant {
    pub access_token: AccessToken,
    /// Lifetime in seconds. `None` means no local expiry.
    pub expires_in: Option<u64>,
    pub refresh_token: Option<RefreshToken>,
}

impl TokenGrant {
    /// Turn the grant into a session, applying the expiry margin.
    pub fn into_session(self, issued_at: DateTime<Utc>, skew: chrono::Duration) -> ActiveSession {
        ActiveSession::from_lifetime(
            self.access_token,
            self.refresh_token,
            issued_at,
            self.expires_in,
            skew,
        )
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TokenErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// Performs token exchanges for one credential configuration.
#[derive(Debug, Clone)]
pub struct TokenAcquirer {
    http: reqwest::Client,
    token_url: String,
    credentials: Credentials,
}

impl TokenAcquirer {
    pub fn new(http: reqwest::Client, config: &ClientConfig) -> Self {
        Self {
            http,
            token_url: config.token_url(),
            credentials: config.credentials().clone(),
        }
    }

    pub fn mode(&self) -> AuthMode {
        self.credentials.mode()
    }

    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    /// Returns true if a held refresh token should be tried before a full login.
    pub fn supports_refresh(&self) -> bool {
        self.mode() == AuthMode::Password
    }

    /// Obtain a fresh credential with the configured grant.
    ///
    /// Bearer mode makes no network call and returns the supplied token with
    /// no expiry.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Rejected`] when the endpoint refuses the grant,
    /// and [`AuthError::Transport`] when it cannot be reached.
    #[instrument(skip(self), fields(mode = %self.mode()))]
    pub async fn acquire(&self) -> Result<TokenGrant> {
        let form = match &self.credentials {
            Credentials::Bearer { token } => {
                return Ok(TokenGrant {
                    access_token: AccessToken::new(token.clone()),
                    expires_in: None,
                    refresh_token: None,
                });
            }
            Credentials::Password {
                username,
                password,
                client_id,
                client_secret,
                totp,
                offline_access,
            } => {
                debug!(%username, %client_id, "Requesting password grant");
                let mut form = vec![
                    ("grant_type", "password".to_string()),
                    ("username", username.clone()),
                    ("password", password.clone()),
                    ("client_id", client_id.clone()),
                ];
                if let Some(secret) = client_secret {
                    form.push(("client_secret", secret.clone()));
                }
                if let Some(totp) = totp {
                    form.push(("totp", totp.clone()));
                }
                if *offline_access {
                    form.push(("scope", OFFLINE_SCOPE.to_string()));
                }
                form
            }
            Credentials::ClientCredentials {
                client_id,
                client_secret,
            } => {
                debug!(%client_id, "Requesting client credentials grant");
                vec![
                    ("grant_type", "client_credentials".to_string()),
                    ("client_id", client_id.clone()),
                    ("client_secret", client_secret.clone()),
                ]
            }
        };

        self.exchange(&form).await
    }

    /// Exchange a refresh token for a new credential.
    #[instrument(skip(self, refresh_token), fields(mode = %self.mode()))]
    pub async fn refresh(&self, refresh_token: &RefreshToken) -> Result<TokenGrant> {
        let mut form = vec![
            ("grant_type", "refresh_token".to_string()),
            ("refresh_token", refresh_token.as_str().to_string()),
        ];
        if let Some(client_id) = self.credentials.client_id() {
            form.push(("client_id", client_id.to_string()));
        }
        if let Credentials::Password {
            client_secret: Some(secret),
            ..
        } = &self.credentials
        {
            form.push(("client_secret", secret.clone()));
        }

        debug!("Requesting refresh grant");
        self.exchange(&form).await
    }

    async fn exchange(&self, form: &[(&str, String)]) -> Result<TokenGrant> {
        let response = self
            .http
            .post(&self.token_url)
            .form(form)
            .send()
            .await
            .map_err(|e| AuthError::Transport(transport_error(e)))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| AuthError::Transport(transport_error(e)))?;

        if !status.is_success() {
            let error: TokenErrorResponse = serde_json::from_slice(&body).unwrap_or_default();
            warn!(
                status = status.as_u16(),
                error = ?error.error,
                "Token endpoint rejected the grant"
            );
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                error: error.error,
                description: error.error_description,
            }
            .into());
        }

        let token: TokenResponse =
            serde_json::from_slice(&body).map_err(|e| AuthError::InvalidTokenResponse {
                message: e.to_string(),
            })?;
        if token.access_token.is_empty() {
            return Err(AuthError::InvalidTokenResponse {
                message: "empty access_token".to_string(),
            }
            .into());
        }

        debug!(expires_in = ?token.expires_in, "Token acquired");
        Ok(TokenGrant {
            access_token: AccessToken::new(token.access_token),
            expires_in: token.expires_in,
            refresh_token: token.refresh_token.map(RefreshToken::new),
        })
    }
}

/// Classify a reqwest failure.
pub(crate) fn transport_error(err: reqwest::Error) -> NetworkError {
    if err.is_timeout() {
        NetworkError::Timeout {
            message: err.to_string(),
        }
    } else if err.is_connect() {
        NetworkError::Connection {
            message: err.to_string(),
        }
    } else {
        NetworkError::Http {
            message: err.to_string(),
        }
    }
}

/// Returns true for the error a refresh-token grant fails with when the
/// endpoint no longer honours the token.
pub(crate) fn is_rejection(err: &Error) -> bool {
    matches!(err, Error::Auth(AuthError::Rejected { .. }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kcadmin_core::{BaseUrl, RealmName};

    fn acquirer(credentials: Credentials) -> TokenAcquirer {
        let config = ClientConfig::new(
            BaseUrl::new("http://127.0.0.1:9").unwrap(),
            RealmName::new("acme").unwrap(),
            credentials,
        );
        TokenAcquirer::new(reqwest::Client::new(), &config)
    }

    #[tokio::test]
    async fn bearer_needs_no_network() {
        let grant = acquirer(Credentials::bearer("tok"))
            .acquire()
            .await
            .unwrap();
        assert_eq!(grant.access_token.as_str(), "tok");
        assert!(grant.expires_in.is_none());
        assert!(grant.refresh_token.is_none());
    }

    #[test]
    fn only_password_mode_refreshes() {
        assert!(acquirer(Credentials::password("u", "p", "admin-cli")).supports_refresh());
        assert!(!acquirer(Credentials::client_credentials("c", "s")).supports_refresh());
        assert!(!acquirer(Credentials::bearer("t")).supports_refresh());
    }

    #[test]
    fn grant_lifetime_applies_skew() {
        let issued = Utc::now();
        let session = TokenGrant {
            access_token: AccessToken::new("a"),
            expires_in: Some(300),
            refresh_token: None,
        }
        .into_session(issued, chrono::Duration::seconds(10));
        assert_eq!(session.expires_at, Some(issued + chrono::Duration::seconds(290)));
    }

    #[test]
    fn rejection_detection() {
        let rejected: Error = AuthError::Rejected {
            status: 400,
            error: Some("invalid_grant".into()),
            description: None,
        }
        .into();
        assert!(is_rejection(&rejected));

        let transport: Error = AuthError::Transport(NetworkError::Connection {
            message: "refused".into(),
        })
        .into();
        assert!(!is_rejection(&transport));
    }
}
