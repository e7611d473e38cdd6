//! Error types for kcadmin.
//!
//! Every failed call ends in one [`Error`]. Callers are expected to match on
//! the variant and on [`Error::status`], never on message text.

use std::fmt;
use thiserror::Error;

use crate::request::Method;

/// The unified error type for kcadmin operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Credential acquisition or refresh failed, or a call stayed
    /// unauthorized after the single refresh attempt.
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// A 201 Created response did not identify the new resource.
    #[error("creation error: {0}")]
    Creation(#[from] CreationError),

    /// The server answered with a non-2xx status.
    #[error("request error: {0}")]
    Request(#[from] RequestError),

    /// The HTTP exchange itself could not complete.
    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    /// A 2xx body did not match the declared response type.
    #[error("could not decode response from {path}: {message}")]
    Decode { path: String, message: String },

    /// Input validation errors (base URL, realm name, request body).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

impl Error {
    /// The HTTP status associated with this error, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Request(err) => Some(err.status),
            Error::Auth(AuthError::Rejected { status, .. }) => Some(*status),
            Error::Auth(AuthError::Unauthorized { .. }) => Some(401),
            _ => None,
        }
    }

    /// Returns true if the server reported the resource as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Request(err) if err.kind() == RequestErrorKind::NotFound)
    }

    /// Returns true if the server reported a conflict (e.g. duplicate name).
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::Request(err) if err.kind() == RequestErrorKind::Conflict)
    }

    /// Build a [`Error::Decode`] for the given path.
    pub fn decode(path: impl Into<String>, message: impl fmt::Display) -> Self {
        Error::Decode {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Connection could not be established (DNS, refused, TLS handshake).
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// The request timed out at the transport level.
    #[error("request timed out: {message}")]
    Timeout { message: String },

    /// Any other failure while sending or receiving.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// Authentication-related errors.
#[derive(Debug)]
pub enum AuthError {
    /// The token endpoint refused the grant.
    ///
    /// `error` and `description` carry the OAuth2 `error` and
    /// `error_description` fields when the endpoint supplied them, which is
    /// how "invalid_grant: Invalid user credentials" is told apart from a
    /// disabled client.
    Rejected {
        status: u16,
        error: Option<String>,
        description: Option<String>,
    },

    /// The token endpoint could not be reached.
    Transport(NetworkError),

    /// The token endpoint answered 2xx with a body we could not use.
    InvalidTokenResponse { message: String },

    /// The admin API kept answering 401 after the credential was refreshed,
    /// or answered 401 to a caller-managed bearer token.
    Unauthorized {
        method: Method,
        path: String,
        message: Option<String>,
    },
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Rejected {
                status,
                error,
                description,
            } => {
                write!(f, "token endpoint returned HTTP {}", status)?;
                if let Some(error) = error {
                    write!(f, " [{}]", error)?;
                }
                if let Some(description) = description {
                    write!(f, ": {}", description)?;
                }
                Ok(())
            }
            AuthError::Transport(err) => write!(f, "token endpoint unreachable: {}", err),
            AuthError::InvalidTokenResponse { message } => {
                write!(f, "invalid token response: {}", message)
            }
            AuthError::Unauthorized {
                method,
                path,
                message,
            } => {
                write!(f, "{} {} unauthorized", method, path)?;
                if let Some(message) = message {
                    write!(f, ": {}", message)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for AuthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AuthError::Transport(err) => Some(err),
            _ => None,
        }
    }
}

/// A 201 Created response that did not name the created resource.
#[derive(Debug, Error)]
pub enum CreationError {
    #[error("201 Created from {path} carried no Location header")]
    MissingLocation { path: String },

    #[error("201 Created from {path} carried an unusable Location header '{location}'")]
    MalformedLocation { path: String, location: String },
}

/// Coarse classification of a failed admin API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestErrorKind {
    /// 400: the payload or parameters were rejected.
    Validation,
    /// 401
    Unauthorized,
    /// 403: authenticated but lacking the admin role for this operation.
    Forbidden,
    /// 404
    NotFound,
    /// 409: usually a duplicate name or username.
    Conflict,
    /// 5xx
    Server,
    /// Anything else outside 2xx.
    Other,
}

/// A non-2xx response from the admin API.
#[derive(Debug)]
pub struct RequestError {
    /// HTTP status code.
    pub status: u16,
    /// Message extracted from the body, or the raw body text.
    pub message: String,
    /// Verb of the failed request.
    pub method: Method,
    /// Realm-relative path of the failed request.
    pub path: String,
    /// The raw response body.
    pub body: String,
}

impl RequestError {
    /// Classify the status code.
    pub fn kind(&self) -> RequestErrorKind {
        match self.status {
            400 => RequestErrorKind::Validation,
            401 => RequestErrorKind::Unauthorized,
            403 => RequestErrorKind::Forbidden,
            404 => RequestErrorKind::NotFound,
            409 => RequestErrorKind::Conflict,
            500..=599 => RequestErrorKind::Server,
            _ => RequestErrorKind::Other,
        }
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {} from {} {}", self.status, self.method, self.path)?;
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for RequestError {}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid base URL.
    #[error("invalid base URL '{value}': {reason}")]
    BaseUrl { value: String, reason: String },

    /// Invalid realm name.
    #[error("invalid realm name '{value}': {reason}")]
    Realm { value: String, reason: String },

    /// A header override could not be used.
    #[error("invalid header '{name}': {reason}")]
    Header { name: String, reason: String },

    /// A request body could not be serialized.
    #[error("could not serialize request body: {message}")]
    Body { message: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}
