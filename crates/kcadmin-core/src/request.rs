//! Request descriptors.
//!
//! A [`Request`] is built by a resource module, handed to a
//! [`Dispatch`](crate::Dispatch) implementation, and consumed once.

use std::fmt;

use serde::Serialize;

use crate::error::{Error, InvalidInputError};

/// Content type used for JSON bodies and as the default request header.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Content type used for form-encoded bodies.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// HTTP verbs used by the admin API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    /// The verb as it appears on the request line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            other => Err(InvalidInputError::Other {
                message: format!("unsupported HTTP method '{}'", other),
            }
            .into()),
        }
    }
}

/// A request body, chosen explicitly by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Serialized as JSON with `Content-Type: application/json`.
    Json(serde_json::Value),
    /// Sent unchanged with the given content type.
    Raw {
        content: String,
        content_type: String,
    },
}

impl Body {
    /// Serialize a value into a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInputError::Body`] if the value cannot be represented
    /// as JSON (e.g. a map with non-string keys).
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, Error> {
        serde_json::to_value(value)
            .map(Body::Json)
            .map_err(|e| {
                InvalidInputError::Body {
                    message: e.to_string(),
                }
                .into()
            })
    }

    /// Build an `application/x-www-form-urlencoded` body.
    ///
    /// ```
    /// use kcadmin_core::Body;
    ///
    /// let body = Body::form([("email", "a@b.c"), ("firstName", "Ann Lee")]);
    /// assert_eq!(body.content_type(), "application/x-www-form-urlencoded");
    /// assert_eq!(body.to_bytes(), b"email=a%40b.c&firstName=Ann+Lee".to_vec());
    /// ```
    pub fn form<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let content = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();
        Body::Raw {
            content,
            content_type: FORM_CONTENT_TYPE.to_string(),
        }
    }

    /// Pass a pre-encoded payload through unchanged.
    pub fn raw(content: impl Into<String>, content_type: impl Into<String>) -> Self {
        Body::Raw {
            content: content.into(),
            content_type: content_type.into(),
        }
    }

    /// The content type this body is sent with.
    pub fn content_type(&self) -> &str {
        match self {
            Body::Json(_) => JSON_CONTENT_TYPE,
            Body::Raw { content_type, .. } => content_type,
        }
    }

    /// The encoded payload.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Body::Json(value) => value.to_string().into_bytes(),
            Body::Raw { content, .. } => content.clone().into_bytes(),
        }
    }
}

/// Query parameters in canonical key/value form.
///
/// Absent values are dropped when they are added, so nothing like
/// `?max=` or `?max=null` ever reaches the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query(Vec<(String, String)>);

impl Query {
    /// An empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter.
    pub fn push(&mut self, key: impl Into<String>, value: impl ToString) {
        self.0.push((key.into(), value.to_string()));
    }

    /// Add a parameter if a value is present.
    pub fn push_opt<V: ToString>(&mut self, key: impl Into<String>, value: Option<V>) {
        if let Some(value) = value {
            self.push(key, value);
        }
    }

    /// Returns true if there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the parameters in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Look up the first value for a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    /// Encode as `k=v&k2=v2` without the leading `?`.
    pub fn encode(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.iter())
            .finish()
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for Query {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut query = Query::new();
        for (k, v) in iter {
            query.push(k, v);
        }
        query
    }
}

/// A single admin API call.
///
/// # Example
///
/// ```
/// use kcadmin_core::{Method, Request};
///
/// let request = Request::get("/users")
///     .query("search", "alice")
///     .query_opt("max", None::<u32>);
/// assert_eq!(request.method, Method::Get);
/// assert_eq!(request.query.encode(), "search=alice");
/// ```
#[derive(Debug, Clone)]
pub struct Request {
    /// Realm-relative path, e.g. `/groups/{id}`.
    pub path: String,
    pub method: Method,
    pub body: Option<Body>,
    pub query: Query,
    /// Header overrides; a `Content-Type` here wins over the body's.
    pub headers: Vec<(String, String)>,
}

impl Request {
    /// A request with no body, query or header overrides.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method,
            body: None,
            query: Query::new(),
            headers: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Attach a body.
    pub fn body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }

    /// Attach a JSON body serialized from `value`.
    pub fn json<T: Serialize + ?Sized>(self, value: &T) -> Result<Self, Error> {
        Ok(self.body(Body::json(value)?))
    }

    /// Add a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push(key, value);
        self
    }

    /// Add a query parameter if a value is present.
    pub fn query_opt<V: ToString>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        self.query.push_opt(key, value);
        self
    }

    /// Replace the query wholesale.
    pub fn with_query(mut self, query: Query) -> Self {
        self.query = query;
        self
    }

    /// Override a request header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// The effective `Content-Type`: a header override, else the body's,
    /// else JSON.
    pub fn content_type(&self) -> &str {
        self.headers
            .iter()
            .rev()
            .find(|(name, _)| name.eq_ignore_ascii_case("content-type"))
            .map(|(_, value)| value.as_str())
            .or_else(|| self.body.as_ref().map(Body::content_type))
            .unwrap_or(JSON_CONTENT_TYPE)
    }
}

/// Percent-encode a value for use as a single path segment.
///
/// Keeps URL-unreserved characters, so UUIDs and plain names pass through
/// untouched while `/`, `?` and spaces cannot alter the path.
///
/// ```
/// use kcadmin_core::request::encode_segment;
///
/// assert_eq!(encode_segment("abc-123"), "abc-123");
/// assert_eq!(encode_segment("a b/c"), "a%20b%2Fc");
/// ```
pub fn encode_segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn method_parsing() {
        assert_eq!("get".parse::<Method>().unwrap(), Method::Get);
        assert_eq!("DELETE".parse::<Method>().unwrap(), Method::Delete);
        assert!("PATCH".parse::<Method>().is_err());
    }

    #[test]
    fn json_body() {
        let body = Body::json(&json!({"name": "eng-42"})).unwrap();
        assert_eq!(body.content_type(), JSON_CONTENT_TYPE);
        assert_eq!(body.to_bytes(), br#"{"name":"eng-42"}"#.to_vec());
    }

    #[test]
    fn raw_body_passes_through() {
        let body = Body::raw("a=1", "text/plain");
        assert_eq!(body.content_type(), "text/plain");
        assert_eq!(body.to_bytes(), b"a=1".to_vec());
    }

    #[test]
    fn query_omits_absent_values() {
        let request = Request::get("/users")
            .query("first", 0)
            .query_opt("max", Some(20))
            .query_opt("search", None::<&str>)
            .query("briefRepresentation", true);
        assert_eq!(request.query.encode(), "first=0&max=20&briefRepresentation=true");
        assert_eq!(request.query.get("max"), Some("20"));
        assert_eq!(request.query.get("search"), None);
    }

    #[test]
    fn query_encodes_reserved_characters() {
        let query: Query = [("q", "role:admin & more")].into_iter().collect();
        assert_eq!(query.encode(), "q=role%3Aadmin+%26+more");
    }

    #[test]
    fn path_segment_encoding() {
        assert_eq!(encode_segment("9f2c-41_a.b~c"), "9f2c-41_a.b~c");
        assert_eq!(encode_segment("ops/lead?x#y"), "ops%2Flead%3Fx%23y");
        assert_eq!(encode_segment("équipe"), "%C3%A9quipe");
    }

    #[test]
    fn content_type_resolution() {
        assert_eq!(Request::get("/x").content_type(), JSON_CONTENT_TYPE);

        let form = Request::post("/x").body(Body::form([("a", "b")]));
        assert_eq!(form.content_type(), FORM_CONTENT_TYPE);

        let overridden = Request::post("/x")
            .body(Body::form([("a", "b")]))
            .header("Content-Type", "text/plain");
        assert_eq!(overridden.content_type(), "text/plain");
    }
}
