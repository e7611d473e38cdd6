//! Realm roles and user realm-role mappings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::users::user_path;
use crate::request::{encode_segment, Query, Request};
use crate::{Dispatch, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleRepresentation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub composite: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_role: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_id: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, Vec<String>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl RoleRepresentation {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RoleQuery {
    pub search: Option<String>,
    pub first: Option<u32>,
    pub max: Option<u32>,
    pub brief_representation: Option<bool>,
}

impl RoleQuery {
    pub fn to_query(&self) -> Query {
        let mut query = Query::new();
        query.push_opt("search", self.search.as_deref());
        query.push_opt("first", self.first);
        query.push_opt("max", self.max);
        query.push_opt("briefRepresentation", self.brief_representation);
        query
    }
}

/// Realm role operations for one realm.
pub struct Roles<'a, D> {
    dispatch: &'a D,
}

impl<'a, D: Dispatch> Roles<'a, D> {
    pub(crate) fn new(dispatch: &'a D) -> Self {
        Self { dispatch }
    }

    pub async fn find(&self, options: &RoleQuery) -> Result<Vec<RoleRepresentation>> {
        self.dispatch
            .fetch(Request::get("/roles").with_query(options.to_query()))
            .await
    }

    pub async fn get_by_name(&self, name: &str) -> Result<Option<RoleRepresentation>> {
        self.dispatch.fetch_optional(Request::get(role_path(name))).await
    }

    /// Create a realm role.
    ///
    /// Roles are addressed by name, so the name is returned rather than the
    /// server-side id found in the `Location` header.
    pub async fn create(&self, role: &RoleRepresentation) -> Result<String> {
        self.dispatch
            .execute(Request::post("/roles").json(role)?)
            .await?;
        Ok(role.name.clone().unwrap_or_default())
    }

    pub async fn update_by_name(&self, name: &str, role: &RoleRepresentation) -> Result<()> {
        self.dispatch
            .execute(Request::put(role_path(name)).json(role)?)
            .await
    }

    pub async fn delete_by_name(&self, name: &str) -> Result<()> {
        self.dispatch.execute(Request::delete(role_path(name))).await
    }

    /// Realm roles directly mapped to a user.
    pub async fn list_realm_mappings(&self, user_id: &str) -> Result<Vec<RoleRepresentation>> {
        self.dispatch
            .fetch(Request::get(mapping_path(user_id)))
            .await
    }

    pub async fn add_realm_mappings(
        &self,
        user_id: &str,
        roles: &[RoleRepresentation],
    ) -> Result<()> {
        self.dispatch
            .execute(Request::post(mapping_path(user_id)).json(roles)?)
            .await
    }

    pub async fn remove_realm_mappings(
        &self,
        user_id: &str,
        roles: &[RoleRepresentation],
    ) -> Result<()> {
        self.dispatch
            .execute(Request::delete(mapping_path(user_id)).json(roles)?)
            .await
    }
}

fn role_path(name: &str) -> String {
    format!("/roles/{}", encode_segment(name))
}

fn mapping_path(user_id: &str) -> String {
    format!("{}/role-mappings/realm", user_path(user_id))
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
    async fn create_returns_name() {
        let recorder = Recorder::new([Canned::Created("ignored-id")]);
        let name = recorder
            .roles()
            .create(&RoleRepresentation::named("auditor"))
            .await
            .unwrap();
        assert_eq!(name, "auditor");
        assert_eq!(recorder.only_request().path, "/roles");
    }

    #[tokio::test]
    async fn names_are_escaped() {
        let recorder = Recorder::new([Canned::Status(404)]);
        let role = recorder.roles().get_by_name("read only").await.unwrap();
        assert!(role.is_none());
        assert_eq!(recorder.only_request().path, "/roles/read%20only");
    }

    #[tokio::test]
    async fn remove_mappings_sends_body_with_delete() {
        let recorder = Recorder::new([Canned::Empty]);
        let roles = vec![RoleRepresentation {
            id: Some("r1".into()),
            name: Some("auditor".into()),
            ..RoleRepresentation::default()
        }];

        recorder.roles().remove_realm_mappings("u1", &roles).await.unwrap();

        let request = recorder.only_request();
        assert_eq!(request.method, Method::Delete);
        assert_eq!(request.path, "/users/u1/role-mappings/realm");
        assert_eq!(
            request.body,
            Some(Body::Json(json!([{"id": "r1", "name": "auditor"}])))
        );
    }

    #[tokio::test]
    async fn list_mappings() {
        let recorder = Recorder::new([Canned::Json(json!([{"name": "offline_access"}]))]);
        let roles = recorder.roles().list_realm_mappings("u1").await.unwrap();
        assert_eq!(roles[0].name.as_deref(), Some("offline_access"));
    }
}
