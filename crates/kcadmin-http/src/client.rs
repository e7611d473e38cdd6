//! The request dispatcher.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue, CONTENT_TYPE, LOCATION};
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use kcadmin_core::{
    AccessToken, AuthError, BaseUrl, Dispatch, Error, InvalidInputError, Method, Outcome,
    RealmName, Request, Result,
};

use crate::config::ClientConfig;
use crate::response::{error_message, interpret, RawResponse};
use crate::store::CredentialStore;
use crate::token::{transport_error, TokenAcquirer};

/// Where a call is in its retry budget.
///
/// The only transition is `First` to `AfterRefresh`, so a request is sent
/// at most twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    First,
    AfterRefresh,
}

/// Admin API client for one realm.
///
/// Cheap to clone; clones share the connection pool and the credential
/// store.
///
/// # Example
///
/// ```no_run
/// use kcadmin_core::{BaseUrl, Credentials, RealmName, Resources};
/// use kcadmin_core::resources::groups::GroupRepresentation;
/// use kcadmin_http::{AdminClient, ClientConfig};
///
/// # async fn example() -> kcadmin_core::Result<()> {
/// let config = ClientConfig::new(
///     BaseUrl::new("https://sso.example.com")?,
///     RealmName::new("acme")?,
///     Credentials::client_credentials("provisioner", "s3cret"),
/// );
/// let client = AdminClient::new(config)?;
///
/// let id = client.groups().create(&GroupRepresentation::named("eng-42")).await?;
/// println!("created {}", id);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AdminClient {
    shared: Arc<Shared>,
    realm: RealmName,
}

struct Shared {
    http: reqwest::Client,
    base_url: BaseUrl,
    store: CredentialStore,
}

impl AdminClient {
    /// Build a client with its own connection pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built (e.g. an invalid
    /// user agent).
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent());
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|e| InvalidInputError::Other {
            message: format!("failed to build HTTP client: {}", e),
        })?;

        Ok(Self::with_http_client(config, http))
    }

    /// Build a client on an existing `reqwest::Client`.
    pub fn with_http_client(config: ClientConfig, http: reqwest::Client) -> Self {
        let acquirer = TokenAcquirer::new(http.clone(), &config);
        let store = CredentialStore::new(acquirer, config.expiry_skew());

        Self {
            shared: Arc::new(Shared {
                http,
                base_url: config.base_url().clone(),
                store,
            }),
            realm: config.realm().clone(),
        }
    }

    /// A client for another realm sharing this one's credentials and
    /// connection pool.
    pub fn for_realm(&self, realm: RealmName) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            realm,
        }
    }

    pub fn base_url(&self) -> &BaseUrl {
        &self.shared.base_url
    }

    /// The credential store backing this client.
    pub fn credentials(&self) -> &CredentialStore {
        &self.shared.store
    }

    /// Acquire a token now instead of on the first request.
    pub async fn login(&self) -> Result<()> {
        self.shared.store.login().await
    }

    async fn send(&self, request: &Request, token: &AccessToken) -> Result<RawResponse> {
        let url = self.shared.base_url.admin_url(&self.realm, &request.path);
        debug!(%url, "Sending request");

        let mut builder = self
            .shared
            .http
            .request(http_method(request.method), &url)
            .bearer_auth(token.as_str())
            .header(CONTENT_TYPE, request.content_type());

        if !request.query.is_empty() {
            let pairs: Vec<(&str, &str)> = request.query.iter().collect();
            builder = builder.query(&pairs);
        }

        for (name, value) in &request.headers {
            if name.eq_ignore_ascii_case(CONTENT_TYPE.as_str()) {
                continue;
            }
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                InvalidInputError::Header {
                    name: name.clone(),
                    reason: e.to_string(),
                }
            })?;
            let header_value = HeaderValue::from_str(value).map_err(|e| {
                InvalidInputError::Header {
                    name: name.clone(),
                    reason: e.to_string(),
                }
            })?;
            builder = builder.header(header_name, header_value);
        }

        if let Some(body) = &request.body {
            builder = builder.body(body.to_bytes());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Error::Network(transport_error(e)))?;

        let status = response.status().as_u16();
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Network(transport_error(e)))?
            .to_vec();

        debug!(status, "Received response");
        Ok(RawResponse {
            status,
            location,
            body,
        })
    }
}

#[async_trait]
impl Dispatch for AdminClient {
    fn realm(&self) -> &RealmName {
        &self.realm
    }

    #[instrument(
        skip(self, request),
        fields(realm = %self.realm, method = %request.method, path = %request.path)
    )]
    async fn request<T>(&self, request: Request) -> Result<Outcome<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let mut attempt = Attempt::First;

        loop {
            let token = self.shared.store.get_valid_token().await?;
            let response = self.send(&request, &token).await?;

            if response.status != 401 {
                return interpret(request.method, &request.path, response);
            }

            match attempt {
                Attempt::First if self.shared.store.can_refresh() => {
                    info!("Access token rejected, refreshing and retrying once");
                    self.shared.store.invalidate_if_current(&token).await;
                    attempt = Attempt::AfterRefresh;
                }
                _ => {
                    warn!(?attempt, "Request unauthorized");
                    let body = String::from_utf8_lossy(&response.body);
                    return Err(AuthError::Unauthorized {
                        method: request.method,
                        path: request.path.clone(),
                        message: Some(error_message(401, &body)),
                    }
                    .into());
                }
            }
        }
    }
}

impl std::fmt::Debug for AdminClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminClient")
            .field("base_url", &self.shared.base_url)
            .field("realm", &self.realm)
            .field("store", &self.shared.store)
            .finish()
    }
}

fn http_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kcadmin_core::Credentials;

    fn client() -> AdminClient {
        let config = ClientConfig::new(
            BaseUrl::new("http://localhost:8080").unwrap(),
            RealmName::new("acme").unwrap(),
            Credentials::bearer("t"),
        );
        AdminClient::new(config).unwrap()
    }

    #[test]
    fn for_realm_shares_store() {
        let client = client();
        let other = client.for_realm(RealmName::new("other").unwrap());

        assert_eq!(client.realm().as_str(), "acme");
        assert_eq!(other.realm().as_str(), "other");
        assert!(Arc::ptr_eq(&client.shared, &other.shared));
    }

    #[test]
    fn method_mapping() {
        assert_eq!(http_method(Method::Put), reqwest::Method::PUT);
        assert_eq!(http_method(Method::Delete), reqwest::Method::DELETE);
    }

    #[test]
    fn debug_hides_token() {
        assert!(!format!("{:?}", client()).contains("\"t\""));
    }
}
