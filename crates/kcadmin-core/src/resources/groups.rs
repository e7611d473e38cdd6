//! Group endpoints: `/groups`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::users::UserRepresentation;
use crate::request::{encode_segment, Query, Request};
use crate::types::ResourceId;
use crate::{Dispatch, Result};

/// A group as exchanged with the admin API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRepresentation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_group_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_groups: Vec<GroupRepresentation>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, Vec<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub realm_roles: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub client_roles: BTreeMap<String, Vec<String>>,
    /// Fields this crate does not model, kept for round-tripping.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl GroupRepresentation {
    /// A representation carrying only a name, as used for creation.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// Options for [`Groups::find`].
#[derive(Debug, Clone, Default)]
pub struct GroupQuery {
    pub search: Option<String>,
    /// Attribute query, `key:value key2:value2`.
    pub q: Option<String>,
    pub exact: Option<bool>,
    pub first: Option<u32>,
    pub max: Option<u32>,
    pub brief_representation: Option<bool>,
}

impl GroupQuery {
    pub fn to_query(&self) -> Query {
        let mut query = Query::new();
        query.push_opt("search", self.search.as_deref());
        query.push_opt("q", self.q.as_deref());
        query.push_opt("exact", self.exact);
        query.push_opt("first", self.first);
        query.push_opt("max", self.max);
        query.push_opt("briefRepresentation", self.brief_representation);
        query
    }
}

#[derive(Debug, Deserialize)]
struct CountResponse {
    count: u64,
}

/// Group operations for one realm.
pub struct Groups<'a, D> {
    dispatch: &'a D,
}

impl<'a, D: Dispatch> Groups<'a, D> {
    pub(crate) fn new(dispatch: &'a D) -> Self {
        Self { dispatch }
    }

    /// List top-level groups.
    pub async fn find(&self, options: &GroupQuery) -> Result<Vec<GroupRepresentation>> {
        debug!(realm = %self.dispatch.realm(), "Listing groups");
        self.dispatch
            .fetch(Request::get("/groups").with_query(options.to_query()))
            .await
    }

    /// Count groups, optionally restricted by a search string.
    pub async fn count(&self, search: Option<&str>) -> Result<u64> {
        let response: CountResponse = self
            .dispatch
            .fetch(Request::get("/groups/count").query_opt("search", search))
            .await?;
        Ok(response.count)
    }

    /// Fetch one group. Returns `None` if it does not exist.
    pub async fn get(&self, id: &str) -> Result<Option<GroupRepresentation>> {
        self.dispatch
            .fetch_optional(Request::get(group_path(id)))
            .await
    }

    /// Create a top-level group and return its identifier.
    pub async fn create(&self, group: &GroupRepresentation) -> Result<ResourceId> {
        debug!(realm = %self.dispatch.realm(), name = ?group.name, "Creating group");
        self.dispatch
            .create(Request::post("/groups").json(group)?)
            .await
    }

    /// Create a group beneath `parent_id` and return its identifier.
    pub async fn create_child(
        &self,
        parent_id: &str,
        group: &GroupRepresentation,
    ) -> Result<ResourceId> {
        self.dispatch
            .create(Request::post(format!("{}/children", group_path(parent_id))).json(group)?)
            .await
    }

    /// List the direct subgroups of a group.
    pub async fn list_children(
        &self,
        parent_id: &str,
        first: Option<u32>,
        max: Option<u32>,
    ) -> Result<Vec<GroupRepresentation>> {
        self.dispatch
            .fetch(
                Request::get(format!("{}/children", group_path(parent_id)))
                    .query_opt("first", first)
                    .query_opt("max", max),
            )
            .await
    }

    pub async fn update(&self, id: &str, group: &GroupRepresentation) -> Result<()> {
        self.dispatch
            .execute(Request::put(group_path(id)).json(group)?)
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        debug!(realm = %self.dispatch.realm(), id, "Deleting group");
        self.dispatch.execute(Request::delete(group_path(id))).await
    }

    /// List the users that are direct members of a group.
    pub async fn list_members(
        &self,
        id: &str,
        first: Option<u32>,
        max: Option<u32>,
    ) -> Result<Vec<UserRepresentation>> {
        self.dispatch
            .fetch(
                Request::get(format!("{}/members", group_path(id)))
                    .query_opt("first", first)
                    .query_opt("max", max),
            )
            .await
    }
}

fn group_path(id: &str) -> String {
    format!("/groups/{}", encode_segment(id))
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
    async fn create_posts_json_and_returns_location_id() {
        let recorder = Recorder::new([Canned::Created("g-1")]);

        let id = recorder
            .groups()
            .create(&GroupRepresentation::named("eng-42"))
            .await
            .unwrap();

        assert_eq!(id.as_str(), "g-1");
        let request = recorder.only_request();
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.path, "/groups");
        assert_eq!(request.body, Some(Body::Json(json!({"name": "eng-42"}))));
    }

    #[tokio::test]
    async fn find_translates_options() {
        let recorder = Recorder::new([Canned::Json(json!([
            {"id": "g-1", "name": "eng", "path": "/eng", "subGroupCount": 2}
        ]))]);

        let groups = recorder
            .groups()
            .find(&GroupQuery {
                search: Some("eng".into()),
                max: Some(10),
                brief_representation: Some(false),
                ..GroupQuery::default()
            })
            .await
            .unwrap();

        assert_eq!(groups[0].sub_group_count, Some(2));
        let request = recorder.only_request();
        assert_eq!(request.query.encode(), "search=eng&max=10&briefRepresentation=false");
    }

    #[tokio::test]
    async fn get_missing_group_is_none() {
        let recorder = Recorder::new([Canned::Status(404)]);
        assert!(recorder.groups().get("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn get_other_errors_propagate() {
        let recorder = Recorder::new([Canned::Status(403)]);
        let err = recorder.groups().get("g").await.unwrap_err();
        assert_eq!(err.status(), Some(403));
    }

    #[tokio::test]
    async fn count_reads_count_field() {
        let recorder = Recorder::new([Canned::Json(json!({"count": 7}))]);
        assert_eq!(recorder.groups().count(Some("e")).await.unwrap(), 7);
        assert_eq!(recorder.only_request().path, "/groups/count");
    }

    #[tokio::test]
    async fn ids_are_escaped_in_paths() {
        let recorder = Recorder::new([Canned::Empty]);
        recorder.groups().delete("../users").await.unwrap();
        assert_eq!(recorder.only_request().path, "/groups/..%2Fusers");
    }

    #[tokio::test]
    async fn child_and_members_paths() {
        let recorder = Recorder::new([
            Canned::Created("child"),
            Canned::Json(json!([{"id": "u1", "username": "ann"}])),
        ]);
        let groups = recorder.groups();

        let id = groups
            .create_child("parent", &GroupRepresentation::named("sub"))
            .await
            .unwrap();
        let members = groups.list_members("parent", Some(0), None).await.unwrap();

        assert_eq!(id.as_str(), "child");
        assert_eq!(members[0].username.as_deref(), Some("ann"));
        let requests = recorder.requests();
        assert_eq!(requests[0].path, "/groups/parent/children");
        assert_eq!(requests[1].path, "/groups/parent/members");
        assert_eq!(requests[1].query.encode(), "first=0");
    }

    #[test]
    fn unknown_fields_are_preserved() {
        let json = json!({"name": "eng", "access": {"view": true}});
        let group: GroupRepresentation = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(serde_json::to_value(&group).unwrap(), json);
    }
}
