//! Building a client from flags, environment and the saved profile.

use anyhow::{Context, Result, bail};
use tracing::debug;

use kcadmin_core::{BaseUrl, Credentials, RealmName};
use kcadmin_http::{AdminClient, ClientConfig};

use crate::cli::ConnectionArgs;
use crate::profile::{self, Profile};

/// Client used by the password grant when none is given.
const DEFAULT_CLIENT_ID: &str = "admin-cli";

/// Resolve the effective settings and build a client.
pub fn connect(args: &ConnectionArgs) -> Result<AdminClient> {
    let profile = profile::load_profile()?;
    let config = resolve(args, &profile)?;
    AdminClient::new(config).context("Failed to build HTTP client")
}

/// Flags and environment win over the profile.
pub fn resolve(args: &ConnectionArgs, profile: &Profile) -> Result<ClientConfig> {
    let mut settings = profile.clone();
    settings.merge(args);

    let base_url = settings
        .base_url
        .context("No base URL: pass --base-url, set KCADMIN_BASE_URL, or run `kcadmin config set`")?;
    let base_url = BaseUrl::new(&base_url).context("Invalid base URL")?;

    let realm = match settings.realm {
        Some(realm) => RealmName::new(realm).context("Invalid realm")?,
        None => RealmName::master(),
    };

    let credentials = credentials(args, settings.username, settings.client_id)?;
    debug!(%base_url, %realm, mode = %credentials.mode(), "Resolved connection");

    let mut config = ClientConfig::new(base_url, realm, credentials)
        .with_user_agent(format!("kcadmin-cli/{}", env!("KCADMIN_VERSION")));
    if let Some(auth_realm) = settings.auth_realm {
        config = config.with_auth_realm(RealmName::new(auth_realm).context("Invalid auth realm")?);
    }

    Ok(config)
}

fn credentials(
    args: &ConnectionArgs,
    username: Option<String>,
    client_id: Option<String>,
) -> Result<Credentials> {
    if let Some(token) = &args.token {
        return Ok(Credentials::bearer(token.clone()));
    }

    if let Some(username) = username {
        let Some(password) = &args.password else {
            bail!("No password for user '{}': pass --password or set KCADMIN_PASSWORD", username);
        };
        let client_id = client_id.unwrap_or_else(|| DEFAULT_CLIENT_ID.to_string());
        let mut credentials = Credentials::password(username, password.clone(), client_id);
        if let Some(secret) = &args.client_secret {
            credentials = credentials.with_client_secret(secret.clone());
        }
        return Ok(credentials);
    }

    match (client_id, &args.client_secret) {
        (Some(client_id), Some(secret)) => {
            Ok(Credentials::client_credentials(client_id, secret.clone()))
        }
        _ => bail!(
            "No credentials: pass --token, --username/--password, or --client-id/--client-secret"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kcadmin_core::AuthMode;

    fn args() -> ConnectionArgs {
        ConnectionArgs {
            base_url: Some("http://localhost:8080".into()),
            ..ConnectionArgs::default()
        }
    }

    #[test]
    fn token_wins() {
        let args = ConnectionArgs {
            token: Some("t".into()),
            username: Some("admin".into()),
            password: Some("p".into()),
            ..args()
        };
        let config = resolve(&args, &Profile::default()).unwrap();
        assert_eq!(config.credentials().mode(), AuthMode::Bearer);
        assert_eq!(config.realm().as_str(), "master");
    }

    #[test]
    fn password_from_profile_username() {
        let profile = Profile {
            username: Some("admin".into()),
            realm: Some("acme".into()),
            auth_realm: Some("master".into()),
            ..Profile::default()
        };
        let args = ConnectionArgs {
            password: Some("p".into()),
            ..args()
        };

        let config = resolve(&args, &profile).unwrap();

        assert_eq!(config.credentials().mode(), AuthMode::Password);
        assert_eq!(config.credentials().client_id(), Some(DEFAULT_CLIENT_ID));
        assert_eq!(config.realm().as_str(), "acme");
        assert_eq!(config.auth_realm().as_str(), "master");
    }

    #[test]
    fn client_credentials() {
        let args = ConnectionArgs {
            client_id: Some("svc".into()),
            client_secret: Some("s".into()),
            ..args()
        };
        let config = resolve(&args, &Profile::default()).unwrap();
        assert_eq!(config.credentials().mode(), AuthMode::ClientCredentials);
    }

    #[test]
    fn missing_pieces() {
        assert!(resolve(&ConnectionArgs::default(), &Profile::default()).is_err());
        assert!(resolve(&args(), &Profile::default()).is_err());

        let no_password = ConnectionArgs {
            username: Some("admin".into()),
            ..args()
        };
        assert!(resolve(&no_password, &Profile::default()).is_err());
    }
}
