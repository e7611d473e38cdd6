//! Client configuration.

use std::time::Duration;

use kcadmin_core::{BaseUrl, Credentials, RealmName};

/// Default margin subtracted from a token's reported lifetime.
pub const DEFAULT_EXPIRY_SKEW: Duration = Duration::from_secs(10);

/// Default `User-Agent` header.
pub const DEFAULT_USER_AGENT: &str = concat!("kcadmin/", env!("CARGO_PKG_VERSION"));

/// Immutable configuration for an [`AdminClient`](crate::AdminClient).
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use kcadmin_core::{BaseUrl, Credentials, RealmName};
/// use kcadmin_http::ClientConfig;
///
/// let config = ClientConfig::new(
///     BaseUrl::new("https://sso.example.com").unwrap(),
///     RealmName::new("acme").unwrap(),
///     Credentials::password("admin", "s3cret", "admin-cli"),
/// )
/// .with_auth_realm(RealmName::master())
/// .with_timeout(Duration::from_secs(30));
///
/// assert_eq!(config.auth_realm().as_str(), "master");
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    base_url: BaseUrl,
    realm: RealmName,
    auth_realm: RealmName,
    credentials: Credentials,
    timeout: Option<Duration>,
    user_agent: String,
    expiry_skew: Duration,
}

impl ClientConfig {
    /// Create a configuration that authenticates against the target realm.
    pub fn new(base_url: BaseUrl, realm: RealmName, credentials: Credentials) -> Self {
        Self {
            base_url,
            auth_realm: realm.clone(),
            realm,
            credentials,
            timeout: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            expiry_skew: DEFAULT_EXPIRY_SKEW,
        }
    }

    /// Obtain tokens from another realm's token endpoint (usually `master`).
    pub fn with_auth_realm(mut self, realm: RealmName) -> Self {
        self.auth_realm = realm;
        self
    }

    /// Transport-level timeout per HTTP exchange. Unset by default.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Margin by which tokens are treated as expired early.
    pub fn with_expiry_skew(mut self, skew: Duration) -> Self {
        self.expiry_skew = skew;
        self
    }

    pub fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    pub fn realm(&self) -> &RealmName {
        &self.realm
    }

    pub fn auth_realm(&self) -> &RealmName {
        &self.auth_realm
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn expiry_skew(&self) -> Duration {
        self.expiry_skew
    }

    /// The token endpoint credentials are exchanged at.
    pub fn token_url(&self) -> String {
        self.base_url.token_url(&self.auth_realm)
    }
}
