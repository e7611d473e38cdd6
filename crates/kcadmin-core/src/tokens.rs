//! Token types for admin API authentication.

use std::fmt;

use chrono::{DateTime, Duration, Utc};

/// An access token for authenticated admin API requests.
///
/// # Security
///
/// - Never logged or displayed in Debug output
/// - Treat as opaque; do not parse or inspect
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Create a new access token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token value for use in authorization headers.
    ///
    /// # Security
    ///
    /// Use only when constructing HTTP authorization headers.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Hide token value in Debug output
impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AccessToken").field(&"[REDACTED]").finish()
    }
}

/// A refresh token for obtaining new access tokens without the password.
///
/// # Security
///
/// - Never logged or displayed in Debug output
/// - Treat as opaque; do not parse or inspect
#[derive(Clone, PartialEq, Eq)]
pub struct RefreshToken(String);

impl RefreshToken {
    /// Create a new refresh token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token value for use in refresh requests.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Hide token value in Debug output
impl fmt::Debug for RefreshToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RefreshToken").field(&"[REDACTED]").finish()
    }
}

/// The currently active credential.
///
/// Replaced wholesale on every acquisition; never edited in place.
#[derive(Debug, Clone)]
pub struct ActiveSession {
    /// Token presented in the `Authorization` header.
    pub access_token: AccessToken,
    /// Absolute expiry, already reduced by the clock-skew buffer.
    /// `None` means the token never expires locally.
    pub expires_at: Option<DateTime<Utc>>,
    /// Refresh token issued alongside the access token, if any.
    pub refresh_token: Option<RefreshToken>,
}

impl ActiveSession {
    /// A session that never expires locally (bearer mode).
    pub fn unbounded(access_token: AccessToken) -> Self {
        Self {
            access_token,
            expires_at: None,
            refresh_token: None,
        }
    }

    /// Build a session from a server-reported lifetime.
    ///
    /// `expires_at = issued_at + expires_in - skew`. A lifetime too large to
    /// represent leaves the session without a local expiry.
    pub fn from_lifetime(
        access_token: AccessToken,
        refresh_token: Option<RefreshToken>,
        issued_at: DateTime<Utc>,
        expires_in: Option<u64>,
        skew: Duration,
    ) -> Self {
        let expires_at = expires_in.and_then(|secs| {
            let lifetime = Duration::try_seconds(i64::try_from(secs).ok()?)?;
            issued_at
                .checked_add_signed(lifetime)?
                .checked_sub_signed(skew)
        });

        Self {
            access_token,
            expires_at,
            refresh_token,
        }
    }

    /// Returns true if the access token may still be presented at `now`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_none_or(|expires_at| now < expires_at)
    }
}
