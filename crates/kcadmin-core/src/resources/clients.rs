//! Client endpoints: `/clients`.
//!
//! Clients are addressed by their internal id, not by `clientId`.
//! Use [`ClientQuery::client_id`] to look one up.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::request::{encode_segment, Query, Request};
use crate::types::ResourceId;
use crate::{Dispatch, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRepresentation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_client: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_accounts_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub redirect_uris: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default)]
pub struct ClientQuery {
    pub client_id: Option<String>,
    pub search: Option<bool>,
    pub viewable_only: Option<bool>,
    pub first: Option<u32>,
    pub max: Option<u32>,
}

impl ClientQuery {
    pub fn to_query(&self) -> Query {
        let mut query = Query::new();
        query.push_opt("clientId", self.client_id.as_deref());
        query.push_opt("search", self.search);
        query.push_opt("viewableOnly", self.viewable_only);
        query.push_opt("first", self.first);
        query.push_opt("max", self.max);
        query
    }
}

/// A client secret as returned by the `client-secret` endpoints.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientSecret {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    pub value: Option<String>,
}

// Hide secret value in Debug output
impl std::fmt::Debug for ClientSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSecret")
            .field("kind", &self.kind)
            .field("value", &"[REDACTED]")
            .finish()
    }
}

pub struct Clients<'a, D> {
    dispatch: &'a D,
}

impl<'a, D: Dispatch> Clients<'a, D> {
    pub(crate) fn new(dispatch: &'a D) -> Self {
        Self { dispatch }
    }

    pub async fn find(&self, options: &ClientQuery) -> Result<Vec<ClientRepresentation>> {
        self.dispatch
            .fetch(Request::get("/clients").with_query(options.to_query()))
            .await
    }

    pub async fn get(&self, id: &str) -> Result<Option<ClientRepresentation>> {
        self.dispatch.fetch_optional(Request::get(client_path(id))).await
    }

    pub async fn create(&self, client: &ClientRepresentation) -> Result<ResourceId> {
        self.dispatch
            .create(Request::post("/clients").json(client)?)
            .await
    }

    pub async fn update(&self, id: &str, client: &ClientRepresentation) -> Result<()> {
        self.dispatch
            .execute(Request::put(client_path(id)).json(client)?)
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.dispatch.execute(Request::delete(client_path(id))).await
    }

    /// The current secret of a confidential client.
    pub async fn secret(&self, id: &str) -> Result<ClientSecret> {
        self.dispatch
            .fetch(Request::get(format!("{}/client-secret", client_path(id))))
            .await
    }

    /// Generate a new secret, invalidating the old one.
    pub async fn regenerate_secret(&self, id: &str) -> Result<ClientSecret> {
        self.dispatch
            .fetch(Request::post(format!("{}/client-secret", client_path(id))))
            .await
    }
}

fn client_path(id: &str) -> String {
    format!("/clients/{}", encode_segment(id))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::Method;
    use crate::resources::Resources;
    use crate::resources::recorder::{Canned, Recorder};

    #[tokio::test]
    async fn find_by_client_id() {
        let recorder = Recorder::new([Canned::Json(json!([
            {"id": "0f1e", "clientId": "billing", "publicClient": false}
        ]))]);

        let clients = recorder
            .clients()
            .find(&ClientQuery {
                client_id: Some("billing".into()),
                ..ClientQuery::default()
            })
            .await
            .unwrap();

        assert_eq!(clients[0].id.as_deref(), Some("0f1e"));
        assert_eq!(clients[0].public_client, Some(false));
        assert_eq!(recorder.only_request().query.encode(), "clientId=billing");
    }

    #[tokio::test]
    async fn regenerate_secret_posts_without_body() {
        let recorder = Recorder::new([Canned::Json(json!({"type": "secret", "value": "s3"}))]);

        let secret = recorder.clients().regenerate_secret("0f1e").await.unwrap();

        assert_eq!(secret.value.as_deref(), Some("s3"));
        assert!(!format!("{:?}", secret).contains("s3"));
        let request = recorder.only_request();
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.path, "/clients/0f1e/client-secret");
        assert!(request.body.is_none());
    }

    #[tokio::test]
    async fn secret_without_body_is_a_decode_error() {
        let recorder = Recorder::new([Canned::Empty]);
        let err = recorder.clients().secret("0f1e").await.unwrap_err();
        assert!(matches!(err, crate::Error::Decode { .. }));
    }
}
