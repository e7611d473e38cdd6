//! Successful call outcomes.

use crate::types::ResourceId;

/// The successful result of an admin API call.
///
/// Failures are reported as [`Error`](crate::Error); a raw HTTP response is
/// never handed back.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// A decoded response body.
    Value(T),
    /// A 201 Created whose identifier came from the `Location` header,
    /// together with the decoded body when the server sent one.
    Created { id: ResourceId, body: Option<T> },
    /// A 2xx response without a body.
    Empty,
}

impl<T> Outcome<T> {
    /// A 201 Created without a body.
    pub fn created_at(id: ResourceId) -> Self {
        Outcome::Created { id, body: None }
    }

    /// Returns the decoded body, if there was one.
    pub fn value(self) -> Option<T> {
        match self {
            Outcome::Value(value) => Some(value),
            Outcome::Created { body, .. } => body,
            Outcome::Empty => None,
        }
    }

    /// Returns the created identifier, if there was one.
    pub fn created(&self) -> Option<&ResourceId> {
        match self {
            Outcome::Created { id, .. } => Some(id),
            _ => None,
        }
    }

    /// Transform the decoded body, leaving the other outcomes untouched.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Value(value) => Outcome::Value(f(value)),
            Outcome::Created { id, body } => Outcome::Created {
                id,
                body: body.map(f),
            },
            Outcome::Empty => Outcome::Empty,
        }
    }
}
