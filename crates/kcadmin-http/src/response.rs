//! Response interpretation.
//!
//! Everything here is a pure function of the status, the `Location` header
//! and the body bytes, so it is tested without a server.

use serde::de::DeserializeOwned;
use tracing::trace;

use kcadmin_core::{CreationError, Error, Method, Outcome, RequestError, ResourceId, Result};

/// The parts of an HTTP response the interpreter looks at.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub location: Option<String>,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    fn has_body(&self) -> bool {
        !self.body.iter().all(u8::is_ascii_whitespace)
    }
}

/// Turn a non-401 response into the call's outcome.
///
/// - non-2xx becomes [`RequestError`] with a message from the body
/// - 201 without a body yields the identifier from `Location`
/// - 201 with a body keeps both the decoded body and the `Location`
///   identifier; a body that does not decode falls back to `Location`, and
///   a body without a usable `Location` is returned as a plain value
/// - any other 2xx without a body is [`Outcome::Empty`]
pub fn interpret<T: DeserializeOwned>(
    method: Method,
    path: &str,
    response: RawResponse,
) -> Result<Outcome<T>> {
    trace!(status = response.status, "Interpreting response");

    if !response.is_success() {
        return Err(request_error(method, path, &response).into());
    }

    let location = response.location.as_deref();

    if !response.has_body() {
        if response.status == 201 {
            return created(path, location).map(Outcome::created_at);
        }
        return Ok(Outcome::Empty);
    }

    match serde_json::from_slice::<T>(&response.body) {
        Ok(body) if response.status == 201 => {
            match location.and_then(ResourceId::from_location) {
                Some(id) => Ok(Outcome::Created {
                    id,
                    body: Some(body),
                }),
                None => Ok(Outcome::Value(body)),
            }
        }
        Ok(body) => Ok(Outcome::Value(body)),
        Err(err) => match (response.status, location) {
            (201, Some(location)) => created(path, Some(location)).map(Outcome::created_at),
            _ => Err(Error::decode(path, err)),
        },
    }
}

fn created(path: &str, location: Option<&str>) -> Result<ResourceId> {
    let location = location.ok_or_else(|| CreationError::MissingLocation {
        path: path.to_string(),
    })?;
    let id = ResourceId::from_location(location).ok_or_else(|| {
        CreationError::MalformedLocation {
            path: path.to_string(),
            location: location.to_string(),
        }
    })?;
    Ok(id)
}

fn request_error(method: Method, path: &str, response: &RawResponse) -> RequestError {
    let body = String::from_utf8_lossy(&response.body).into_owned();
    RequestError {
        status: response.status,
        message: error_message(response.status, &body),
        method,
        path: path.to_string(),
        body,
    }
}

/// Pick the most useful message out of an error body.
///
/// Tries the JSON fields `errorMessage`, `error_description` and `error`,
/// then the raw text, then the status's reason phrase.
pub fn error_message(status: u16, body: &str) -> String {
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(body) {
        let field = ["errorMessage", "error_description", "error"]
            .iter()
            .filter_map(|key| map.get(*key).and_then(serde_json::Value::as_str))
            .find(|message| !message.is_empty());
        if let Some(message) = field {
            return message.to_string();
        }
    }

    let text = body.trim();
    if !text.is_empty() {
        return text.to_string();
    }

    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kcadmin_core::RequestErrorKind;
    use serde_json::{json, Value};

    fn response(status: u16, location: Option<&str>, body: &str) -> RawResponse {
        RawResponse {
            status,
            location: location.map(str::to_string),
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn created_from_location() {
        let outcome: Outcome<Value> = interpret(
            Method::Post,
            "/users",
            response(201, Some("http://kc/admin/realms/r/users/abc-123"), ""),
        )
        .unwrap();
        assert_eq!(outcome, Outcome::created_at(ResourceId::new("abc-123")));
    }

    #[test]
    fn created_without_location() {
        let err = interpret::<Value>(Method::Post, "/users", response(201, None, ""))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Creation(CreationError::MissingLocation { ref path }) if path == "/users"
        ));
    }

    #[test]
    fn created_with_unusable_location() {
        let err = interpret::<Value>(Method::Post, "/users", response(201, Some("/"), ""))
            .unwrap_err();
        assert!(matches!(err, Error::Creation(CreationError::MalformedLocation { .. })));
    }

    #[test]
    fn created_keeps_body_and_location() {
        let outcome: Outcome<Value> = interpret(
            Method::Post,
            "/clients",
            response(201, Some("/admin/realms/r/clients/from-header"), r#"{"id":"from-body"}"#),
        )
        .unwrap();
        assert_eq!(
            outcome,
            Outcome::Created {
                id: ResourceId::new("from-header"),
                body: Some(json!({"id": "from-body"})),
            }
        );
    }

    #[test]
    fn created_body_without_location_is_a_value() {
        let outcome: Outcome<Value> =
            interpret(Method::Post, "/clients", response(201, None, r#"{"id":"c7"}"#)).unwrap();
        assert_eq!(outcome, Outcome::Value(json!({"id": "c7"})));
    }

    #[test]
    fn created_undecodable_body_falls_back_to_location() {
        let outcome: Outcome<Value> = interpret(
            Method::Post,
            "/clients",
            response(201, Some("/admin/realms/r/clients/c1"), "created"),
        )
        .unwrap();
        assert_eq!(outcome, Outcome::created_at(ResourceId::new("c1")));
    }

    #[test]
    fn no_content_is_empty() {
        let outcome: Outcome<Value> =
            interpret(Method::Delete, "/groups/g", response(204, None, "")).unwrap();
        assert_eq!(outcome, Outcome::Empty);
    }

    #[test]
    fn malformed_body_is_decode_error() {
        let err = interpret::<Vec<Value>>(Method::Get, "/groups", response(200, None, "{oops"))
            .unwrap_err();
        assert!(matches!(err, Error::Decode { ref path, .. } if path == "/groups"));
    }

    #[test]
    fn not_found_is_request_error() {
        let err = interpret::<Value>(
            Method::Get,
            "/users/x",
            response(404, None, r#"{"error":"User not found"}"#),
        )
        .unwrap_err();
        match err {
            Error::Request(err) => {
                assert_eq!(err.status, 404);
                assert_eq!(err.kind(), RequestErrorKind::NotFound);
                assert_eq!(err.message, "User not found");
                assert_eq!(err.method, Method::Get);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn message_precedence() {
        assert_eq!(
            error_message(409, r#"{"errorMessage":"User exists with same username","error":"x"}"#),
            "User exists with same username"
        );
        assert_eq!(
            error_message(400, r#"{"error":"invalid_request","error_description":"Missing form parameter"}"#),
            "Missing form parameter"
        );
        assert_eq!(error_message(502, "upstream down\n"), "upstream down");
        assert_eq!(error_message(503, ""), "Service Unavailable");
        assert_eq!(error_message(599, ""), "HTTP 599");
    }
}
