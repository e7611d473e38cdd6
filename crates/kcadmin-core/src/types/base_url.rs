//! Server base URL type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use super::RealmName;
use crate::error::{Error, InvalidInputError};

/// Fixed prefix of every admin API path.
const ADMIN_PREFIX: &str = "admin/realms";

/// A validated identity-service base URL.
///
/// The URL must be absolute, use `http` or `https`, have a host, and carry no
/// query or fragment. A path prefix (e.g. `/auth` on older deployments) is
/// kept. Trailing slashes are normalized away.
///
/// # Example
///
/// ```
/// use kcadmin_core::{BaseUrl, RealmName};
///
/// let base = BaseUrl::new("https://sso.example.com/").unwrap();
/// let realm = RealmName::new("acme").unwrap();
/// assert_eq!(base.admin_url(&realm, "/groups"),
///            "https://sso.example.com/admin/realms/acme/groups");
/// assert_eq!(base.token_url(&realm),
///            "https://sso.example.com/realms/acme/protocol/openid-connect/token");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BaseUrl(Url);

impl BaseUrl {
    /// Create a new base URL from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not valid or doesn't meet requirements.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        let url = Url::parse(s).map_err(|e| InvalidInputError::BaseUrl {
            value: s.to_string(),
            reason: e.to_string(),
        })?;

        Self::validate(&url, s)?;

        let mut normalized = url;
        let trimmed = normalized.path().trim_end_matches('/').to_string();
        normalized.set_path(&trimmed);

        Ok(Self(normalized))
    }

    /// Returns the absolute URL of a realm-scoped admin resource.
    ///
    /// `path` is realm-relative (`/groups/{id}`); a missing leading slash is
    /// added, and an empty path addresses the realm itself.
    pub fn admin_url(&self, realm: &RealmName, path: &str) -> String {
        let mut url = format!("{}/{}/{}", self.base(), ADMIN_PREFIX, realm);
        if !path.is_empty() {
            if !path.starts_with('/') {
                url.push('/');
            }
            url.push_str(path);
        }
        url
    }

    /// Returns the OpenID Connect token endpoint of a realm.
    pub fn token_url(&self, realm: &RealmName) -> String {
        format!(
            "{}/realms/{}/protocol/openid-connect/token",
            self.base(),
            realm
        )
    }

    /// Returns the base URL as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the inner URL.
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// Returns the host string.
    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }

    fn base(&self) -> &str {
        // The URL crate always keeps a slash for root paths
        self.0.as_str().trim_end_matches('/')
    }

    fn validate(url: &Url, input: &str) -> Result<(), Error> {
        let invalid = |reason: &str| -> Error {
            InvalidInputError::BaseUrl {
                value: input.to_string(),
                reason: reason.to_string(),
            }
            .into()
        };

        if url.cannot_be_a_base() {
            return Err(invalid("must be an absolute URL"));
        }

        if url.scheme() != "https" && url.scheme() != "http" {
            return Err(invalid("must use http or https"));
        }

        if url.host_str().is_none() {
            return Err(invalid("must have a host"));
        }

        if url.query().is_some() || url.fragment().is_some() {
            return Err(invalid("must not carry a query or fragment"));
        }

        Ok(())
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base())
    }
}

impl FromStr for BaseUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for BaseUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.base())
    }
}

impl<'de> Deserialize<'de> for BaseUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        BaseUrl::new(&s).map_err(serde::de::Error::custom)
    }
}
