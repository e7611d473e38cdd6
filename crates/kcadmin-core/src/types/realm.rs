//! Realm name type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, InvalidInputError};

/// A validated realm name.
///
/// Realm names appear verbatim as URL path segments, so they are limited to
/// URL-unreserved characters.
///
/// # Example
///
/// ```
/// use kcadmin_core::RealmName;
///
/// let realm = RealmName::new("acme-prod").unwrap();
/// assert_eq!(realm.as_str(), "acme-prod");
/// assert!(RealmName::new("a/b").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RealmName(String);

impl RealmName {
    /// Create a new realm name, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty, too long, or contains
    /// characters that cannot appear unescaped in a path segment.
    pub fn new(s: impl Into<String>) -> Result<Self, Error> {
        let s = s.into();
        Self::validate(&s)?;
        Ok(Self(s))
    }

    /// The realm every installation ships with.
    pub fn master() -> Self {
        Self("master".to_string())
    }

    /// Returns the realm name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(s: &str) -> Result<(), Error> {
        let invalid = |reason: String| -> Error {
            InvalidInputError::Realm {
                value: s.to_string(),
                reason,
            }
            .into()
        };

        if s.is_empty() {
            return Err(invalid("cannot be empty".to_string()));
        }

        if s.len() > 255 {
            return Err(invalid(
                "exceeds maximum length of 255 characters".to_string(),
            ));
        }

        if s == "." || s == ".." {
            return Err(invalid("cannot be '.' or '..'".to_string()));
        }

        if let Some(c) = s
            .chars()
            .find(|c| !c.is_ascii_alphanumeric() && !matches!(c, '.' | '-' | '_' | '~'))
        {
            return Err(invalid(format!("contains invalid character '{}'", c)));
        }

        Ok(())
    }
}

impl fmt::Display for RealmName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RealmName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for RealmName {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<RealmName> for String {
    fn from(realm: RealmName) -> Self {
        realm.0
    }
}

impl AsRef<str> for RealmName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
