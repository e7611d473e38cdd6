//! Server-assigned resource identifier.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use url::{ParseError, Url};

/// Base used to resolve relative `Location` values.
const RELATIVE_BASE: &str = "http://localhost/";

/// Identifier of a resource created by the server.
///
/// Usually a UUID, taken from the final path segment of a `Location` header.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    /// Wrap an identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Extract the identifier from a `Location` header value.
    ///
    /// Absolute and relative values are accepted. The identifier is the
    /// final path segment, percent-decoded. Returns `None` when the value
    /// does not parse, has no path after the host, or ends in `/` (a
    /// collection rather than a resource).
    ///
    /// # Example
    ///
    /// ```
    /// use kcadmin_core::ResourceId;
    ///
    /// let id = ResourceId::from_location("https://sso/admin/realms/r/users/abc-123").unwrap();
    /// assert_eq!(id.as_str(), "abc-123");
    /// assert!(ResourceId::from_location("https://sso/admin/realms/r/users/").is_none());
    /// assert!(ResourceId::from_location("").is_none());
    /// ```
    pub fn from_location(location: &str) -> Option<Self> {
        let location = location.trim();
        if location.is_empty() {
            return None;
        }

        let url = match Url::parse(location) {
            Ok(url) => url,
            Err(ParseError::RelativeUrlWithoutBase) => {
                Url::parse(RELATIVE_BASE).ok()?.join(location).ok()?
            }
            Err(_) => return None,
        };

        let segment = url.path_segments()?.last()?;
        if segment.is_empty() {
            return None;
        }

        let id = urlencoding::decode(segment)
            .map(Cow::into_owned)
            .unwrap_or_else(|_| segment.to_string());
        Some(Self(id))
    }

    /// Returns the identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the identifier string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ResourceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<ResourceId> for String {
    fn from(id: ResourceId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_location() {
        let id = ResourceId::from_location(
            "http://localhost:8080/admin/realms/r/users/abc-123",
        )
        .unwrap();
        assert_eq!(id.as_str(), "abc-123");
    }

    #[test]
    fn relative_location() {
        assert_eq!(
            ResourceId::from_location("/admin/realms/r/groups/g1").unwrap().as_str(),
            "g1"
        );
        assert_eq!(ResourceId::from_location("g2").unwrap().as_str(), "g2");
    }

    #[test]
    fn percent_encoded_segment_is_decoded() {
        assert_eq!(
            ResourceId::from_location("/admin/realms/r/roles/ops%20lead").unwrap().as_str(),
            "ops lead"
        );
    }

    #[test]
    fn ignores_query_and_fragment() {
        assert_eq!(
            ResourceId::from_location("https://h/admin/realms/r/clients/c9?x=1#frag")
                .unwrap()
                .as_str(),
            "c9"
        );
    }

    #[test]
    fn malformed_locations() {
        assert!(ResourceId::from_location("").is_none());
        assert!(ResourceId::from_location("/").is_none());
        assert!(ResourceId::from_location("   ").is_none());
        assert!(ResourceId::from_location("https://").is_none());
        assert!(ResourceId::from_location("urn:kc:abc").is_none());
    }

    #[test]
    fn origin_only_location_is_rejected() {
        assert!(ResourceId::from_location("https://sso.example.com").is_none());
        assert!(ResourceId::from_location("https://sso.example.com/").is_none());
    }

    #[test]
    fn collection_location_is_rejected() {
        assert!(ResourceId::from_location("https://sso/admin/realms/r/users/").is_none());
        assert!(ResourceId::from_location("/admin/realms/r/groups/g1/").is_none());
    }
}
