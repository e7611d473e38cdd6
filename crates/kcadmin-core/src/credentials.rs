//! Authentication credentials.

use std::fmt;

/// The three supported ways of authenticating against the admin API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// A caller-supplied access token. Never refreshed.
    Bearer,
    /// Resource-owner password grant.
    Password,
    /// Client-credentials grant.
    ClientCredentials,
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AuthMode::Bearer => "bearer",
            AuthMode::Password => "password",
            AuthMode::ClientCredentials => "client_credentials",
        };
        f.write_str(name)
    }
}

/// Credentials used to authenticate admin API calls.
///
/// Supplied once when a client is built and never mutated afterwards.
///
/// # Security
///
/// Secrets are never exposed in Debug output to prevent accidental logging.
///
/// # Example
///
/// ```
/// use kcadmin_core::{AuthMode, Credentials};
///
/// let creds = Credentials::password("admin", "s3cret", "admin-cli").with_totp("123456");
/// assert_eq!(creds.mode(), AuthMode::Password);
/// assert!(!format!("{:?}", creds).contains("s3cret"));
/// ```
#[derive(Clone)]
pub enum Credentials {
    /// An access token managed by the caller.
    Bearer { token: String },

    /// Username and password exchanged at the token endpoint.
    Password {
        username: String,
        password: String,
        client_id: String,
        /// Secret of a confidential admin client, if the client requires one.
        client_secret: Option<String>,
        /// One-time password for accounts with OTP enabled.
        totp: Option<String>,
        /// Request the `offline_access` scope.
        offline_access: bool,
    },

    /// A service account's client id and secret.
    ClientCredentials {
        client_id: String,
        client_secret: String,
    },
}

impl Credentials {
    /// Authenticate with a token obtained elsewhere.
    pub fn bearer(token: impl Into<String>) -> Self {
        Credentials::Bearer {
            token: token.into(),
        }
    }

    /// Authenticate with the resource-owner password grant.
    ///
    /// # Arguments
    ///
    /// * `username` - The admin user's username
    /// * `password` - The admin user's password
    /// * `client_id` - The client to authenticate through, usually `admin-cli`
    pub fn password(
        username: impl Into<String>,
        password: impl Into<String>,
        client_id: impl Into<String>,
    ) -> Self {
        Credentials::Password {
            username: username.into(),
            password: password.into(),
            client_id: client_id.into(),
            client_secret: None,
            totp: None,
            offline_access: false,
        }
    }

    /// Authenticate with the client-credentials grant.
    pub fn client_credentials(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Credentials::ClientCredentials {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Attach a client secret to password credentials.
    ///
    /// Has no effect on other modes.
    pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
        if let Credentials::Password { client_secret, .. } = &mut self {
            *client_secret = Some(secret.into());
        }
        self
    }

    /// Attach a one-time password to password credentials.
    ///
    /// Has no effect on other modes.
    pub fn with_totp(mut self, code: impl Into<String>) -> Self {
        if let Credentials::Password { totp, .. } = &mut self {
            *totp = Some(code.into());
        }
        self
    }

    /// Request an offline token with password credentials.
    ///
    /// Has no effect on other modes.
    pub fn with_offline_access(mut self) -> Self {
        if let Credentials::Password { offline_access, .. } = &mut self {
            *offline_access = true;
        }
        self
    }

    /// Returns the authentication mode.
    pub fn mode(&self) -> AuthMode {
        match self {
            Credentials::Bearer { .. } => AuthMode::Bearer,
            Credentials::Password { .. } => AuthMode::Password,
            Credentials::ClientCredentials { .. } => AuthMode::ClientCredentials,
        }
    }

    /// Returns the client id, if this mode uses one.
    pub fn client_id(&self) -> Option<&str> {
        match self {
            Credentials::Bearer { .. } => None,
            Credentials::Password { client_id, .. } => Some(client_id),
            Credentials::ClientCredentials { client_id, .. } => Some(client_id),
        }
    }

    /// Returns the non-secret principal name: the username in password mode,
    /// the client id in client-credentials mode.
    pub fn principal(&self) -> Option<&str> {
        match self {
            Credentials::Bearer { .. } => None,
            Credentials::Password { username, .. } => Some(username),
            Credentials::ClientCredentials { client_id, .. } => Some(client_id),
        }
    }
}

// Intentionally hide secrets in Debug output
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Bearer { .. } => f
                .debug_struct("Bearer")
                .field("token", &"[REDACTED]")
                .finish(),
            Credentials::Password {
                username,
                client_id,
                client_secret,
                totp,
                offline_access,
                ..
            } => f
                .debug_struct("Password")
                .field("username", username)
                .field("password", &"[REDACTED]")
                .field("client_id", client_id)
                .field("client_secret", &client_secret.as_ref().map(|_| "[REDACTED]"))
                .field("totp", &totp.as_ref().map(|_| "[REDACTED]"))
                .field("offline_access", offline_access)
                .finish(),
            Credentials::ClientCredentials { client_id, .. } => f
                .debug_struct("ClientCredentials")
                .field("client_id", client_id)
                .field("client_secret", &"[REDACTED]")
                .finish(),
        }
    }
}
