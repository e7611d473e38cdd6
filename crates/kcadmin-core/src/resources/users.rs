//! User endpoints: `/users`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::groups::GroupRepresentation;
use crate::request::{encode_segment, Query, Request};
use crate::types::ResourceId;
use crate::{Dispatch, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRepresentation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Milliseconds since the epoch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_timestamp: Option<i64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, Vec<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_actions: Vec<String>,
    /// Group paths to join on creation.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub credentials: Vec<CredentialRepresentation>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl UserRepresentation {
    /// An enabled user with the given username.
    pub fn named(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            enabled: Some(true),
            ..Self::default()
        }
    }
}

/// A credential, as sent to `reset-password` or embedded in a new user.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRepresentation {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temporary: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl CredentialRepresentation {
    /// A password credential.
    pub fn password(value: impl Into<String>, temporary: bool) -> Self {
        Self {
            kind: Some("password".to_string()),
            value: Some(value.into()),
            temporary: Some(temporary),
            extra: serde_json::Map::new(),
        }
    }
}

// Hide credential value in Debug output
impl std::fmt::Debug for CredentialRepresentation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialRepresentation")
            .field("kind", &self.kind)
            .field("value", &self.value.as_ref().map(|_| "[REDACTED]"))
            .field("temporary", &self.temporary)
            .finish()
    }
}

/// Options for [`Users::find`] and [`Users::count`].
#[derive(Debug, Clone, Default)]
pub struct UserQuery {
    pub search: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub enabled: Option<bool>,
    pub exact: Option<bool>,
    /// Attribute query, `key:value key2:value2`.
    pub q: Option<String>,
    pub first: Option<u32>,
    pub max: Option<u32>,
    pub brief_representation: Option<bool>,
}

impl UserQuery {
    pub fn to_query(&self) -> Query {
        let mut query = Query::new();
        query.push_opt("search", self.search.as_deref());
        query.push_opt("username", self.username.as_deref());
        query.push_opt("email", self.email.as_deref());
        query.push_opt("firstName", self.first_name.as_deref());
        query.push_opt("lastName", self.last_name.as_deref());
        query.push_opt("enabled", self.enabled);
        query.push_opt("exact", self.exact);
        query.push_opt("q", self.q.as_deref());
        query.push_opt("first", self.first);
        query.push_opt("max", self.max);
        query.push_opt("briefRepresentation", self.brief_representation);
        query
    }
}

/// User operations for one realm.
pub struct Users<'a, D> {
    dispatch: &'a D,
}

impl<'a, D: Dispatch> Users<'a, D> {
    pub(crate) fn new(dispatch: &'a D) -> Self {
        Self { dispatch }
    }

    pub async fn find(&self, options: &UserQuery) -> Result<Vec<UserRepresentation>> {
        debug!(realm = %self.dispatch.realm(), "Listing users");
        self.dispatch
            .fetch(Request::get("/users").with_query(options.to_query()))
            .await
    }

    /// Count users matching the filters. Paging fields are ignored.
    pub async fn count(&self, options: &UserQuery) -> Result<u64> {
        let options = UserQuery {
            first: None,
            max: None,
            brief_representation: None,
            ..options.clone()
        };
        self.dispatch
            .fetch(Request::get("/users/count").with_query(options.to_query()))
            .await
    }

    pub async fn get(&self, id: &str) -> Result<Option<UserRepresentation>> {
        self.dispatch.fetch_optional(Request::get(user_path(id))).await
    }

    pub async fn create(&self, user: &UserRepresentation) -> Result<ResourceId> {
        debug!(realm = %self.dispatch.realm(), username = ?user.username, "Creating user");
        self.dispatch.create(Request::post("/users").json(user)?).await
    }

    pub async fn update(&self, id: &str, user: &UserRepresentation) -> Result<()> {
        self.dispatch
            .execute(Request::put(user_path(id)).json(user)?)
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        debug!(realm = %self.dispatch.realm(), id, "Deleting user");
        self.dispatch.execute(Request::delete(user_path(id))).await
    }

    /// Set a new password for the user.
    pub async fn reset_password(&self, id: &str, credential: &CredentialRepresentation) -> Result<()> {
        self.dispatch
            .execute(Request::put(format!("{}/reset-password", user_path(id))).json(credential)?)
            .await
    }

    /// Groups the user is a direct member of.
    pub async fn groups(&self, id: &str) -> Result<Vec<GroupRepresentation>> {
        self.dispatch
            .fetch(Request::get(format!("{}/groups", user_path(id))))
            .await
    }

    pub async fn add_to_group(&self, id: &str, group_id: &str) -> Result<()> {
        self.dispatch
            .execute(Request::put(membership_path(id, group_id)))
            .await
    }

    pub async fn remove_from_group(&self, id: &str, group_id: &str) -> Result<()> {
        self.dispatch
            .execute(Request::delete(membership_path(id, group_id)))
            .await
    }
}

pub(crate) fn user_path(id: &str) -> String {
    format!("/users/{}", encode_segment(id))
}

fn membership_path(id: &str, group_id: &str) -> String {
    format!("{}/groups/{}", user_path(id), encode_segment(group_id))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::Method;
    use crate::request::Body;
    use crate::resources::Resources;
    use crate::resources::recorder::{Canned, Recorder};

    #[tokio::test]
    async fn create_returns_location_id() {
        let recorder = Recorder::new([Canned::Created("abc-123")]);

        let id = recorder
            .users()
            .create(&UserRepresentation::named("alice"))
            .await
            .unwrap();

        assert_eq!(id.as_str(), "abc-123");
        let request = recorder.only_request();
        assert_eq!(
            request.body,
            Some(Body::Json(json!({"username": "alice", "enabled": true})))
        );
    }

    #[tokio::test]
    async fn count_drops_paging() {
        let recorder = Recorder::new([Canned::Json(json!(3))]);

        let count = recorder
            .users()
            .count(&UserQuery {
                email: Some("a@b.c".into()),
                first: Some(10),
                max: Some(5),
                ..UserQuery::default()
            })
            .await
            .unwrap();

        assert_eq!(count, 3);
        let request = recorder.only_request();
        assert_eq!(request.path, "/users/count");
        assert_eq!(request.query.encode(), "email=a%40b.c");
    }

    #[tokio::test]
    async fn reset_password_puts_credential() {
        let recorder = Recorder::new([Canned::Empty]);

        recorder
            .users()
            .reset_password("u1", &CredentialRepresentation::password("n3w", false))
            .await
            .unwrap();

        let request = recorder.only_request();
        assert_eq!(request.method, Method::Put);
        assert_eq!(request.path, "/users/u1/reset-password");
        assert_eq!(
            request.body,
            Some(Body::Json(json!({"type": "password", "value": "n3w", "temporary": false})))
        );
    }

    #[tokio::test]
    async fn group_membership() {
        let recorder = Recorder::new([Canned::Empty, Canned::Empty]);
        let users = recorder.users();

        users.add_to_group("u1", "g1").await.unwrap();
        users.remove_from_group("u1", "g1").await.unwrap();

        let requests = recorder.requests();
        assert_eq!(requests[0].method, Method::Put);
        assert_eq!(requests[0].path, "/users/u1/groups/g1");
        assert!(requests[0].body.is_none());
        assert_eq!(requests[1].method, Method::Delete);
    }

    #[tokio::test]
    async fn find_decodes_users() {
        let recorder = Recorder::new([Canned::Json(json!([
            {"id": "u1", "username": "alice", "createdTimestamp": 1700000000000i64, "totp": false}
        ]))]);

        let users = recorder
            .users()
            .find(&UserQuery {
                search: Some("ali".into()),
                ..UserQuery::default()
            })
            .await
            .unwrap();

        assert_eq!(users[0].created_timestamp, Some(1_700_000_000_000));
        assert_eq!(users[0].extra.get("totp"), Some(&json!(false)));
    }

    #[test]
    fn credential_debug_hides_value() {
        let debug = format!("{:?}", CredentialRepresentation::password("hunter2", true));
        assert!(!debug.contains("hunter2"));
    }
}
