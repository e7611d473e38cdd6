//! The request-dispatch seam.

use async_trait::async_trait;
use serde::de::{DeserializeOwned, IgnoredAny};

use crate::error::Error;
use crate::outcome::Outcome;
use crate::request::Request;
use crate::types::{RealmName, ResourceId};
use crate::Result;

/// Something that can carry admin API requests for one realm.
///
/// Resource modules are written against this trait only. The network
/// implementation lives in `kcadmin-http`; tests substitute a recorder.
#[async_trait]
pub trait Dispatch: Send + Sync {
    /// Returns the realm requests are scoped to.
    fn realm(&self) -> &RealmName;

    /// Issue a request and interpret the response.
    ///
    /// # Errors
    ///
    /// Returns an error for transport failures, authentication failures
    /// after the single refresh attempt, non-2xx responses, and bodies that
    /// do not decode as `T`.
    async fn request<T>(&self, request: Request) -> Result<Outcome<T>>
    where
        T: DeserializeOwned + Send + 'static;

    /// Issue a request that must return a body.
    async fn fetch<T>(&self, request: Request) -> Result<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let path = request.path.clone();
        match self.request::<T>(request).await? {
            Outcome::Value(value) | Outcome::Created { body: Some(value), .. } => Ok(value),
            Outcome::Created { id, body: None } => Err(Error::decode(
                path,
                format!("expected a response body, got created resource {}", id),
            )),
            Outcome::Empty => Err(Error::decode(path, "expected a response body, got none")),
        }
    }

    /// Like [`fetch`](Dispatch::fetch), but a 404 yields `None`.
    async fn fetch_optional<T>(&self, request: Request) -> Result<Option<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        match self.fetch(request).await {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Issue a creation request and return the new resource's identifier.
    ///
    /// An `id` field in the response body wins; otherwise the identifier
    /// comes from the `Location` header.
    async fn create(&self, request: Request) -> Result<ResourceId> {
        let path = request.path.clone();
        match self.request::<serde_json::Value>(request).await? {
            Outcome::Created { id, body } => Ok(body.as_ref().and_then(body_id).unwrap_or(id)),
            Outcome::Value(body) => body_id(&body)
                .ok_or_else(|| Error::decode(path, "created resource body carried no id")),
            Outcome::Empty => Err(Error::decode(
                path,
                "expected an identifier, got an empty response",
            )),
        }
    }

    /// Issue a request whose response body, if any, is not needed.
    async fn execute(&self, request: Request) -> Result<()> {
        match self.request::<IgnoredAny>(request).await {
            Ok(_) => Ok(()),
            // a 2xx body nobody reads cannot fail the call
            Err(Error::Decode { .. }) => Ok(()),
            Err(err) => Err(err),
        }
    }
}

fn body_id(body: &serde_json::Value) -> Option<ResourceId> {
    body.get("id")
        .and_then(serde_json::Value::as_str)
        .filter(|id| !id.is_empty())
        .map(ResourceId::new)
}
