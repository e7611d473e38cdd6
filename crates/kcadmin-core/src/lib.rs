//! # kcadmin-core
//!
//! Core types for a typed client of a Keycloak-style admin REST API.
//!
//! This crate has no network code. It defines:
//!
//! - [`Credentials`] and the token types held by a credential store
//! - [`BaseUrl`] and [`RealmName`], validated at construction
//! - [`Request`], [`Body`] and [`Query`], the descriptor every call is built from
//! - [`Outcome`] and [`Error`], the only shapes a call can end in
//! - the [`Dispatch`] trait, and the [`resources`] modules written against it
//!
//! The reqwest-backed implementation of [`Dispatch`] lives in `kcadmin-http`.
//!
//! ## Example
//!
//! ```no_run
//! use kcadmin_core::{Dispatch, Request, Resources};
//! use kcadmin_core::resources::groups::GroupQuery;
//!
//! # async fn example(client: &impl Dispatch) -> kcadmin_core::Result<()> {
//! let groups = client.groups().find(&GroupQuery::default()).await?;
//! for group in groups {
//!     println!("{:?}", group.name);
//! }
//!
//! // Anything without a resource module goes through `request` directly.
//! let raw: serde_json::Value = client.fetch(Request::get("/authentication/flows")).await?;
//! # let _ = raw;
//! # Ok(())
//! # }
//! ```

pub mod credentials;
pub mod dispatch;
pub mod error;
pub mod outcome;
pub mod request;
pub mod resources;
pub mod tokens;
pub mod types;

pub use credentials::{AuthMode, Credentials};
pub use dispatch::Dispatch;
pub use error::{
    AuthError, CreationError, Error, InvalidInputError, NetworkError, RequestError,
    RequestErrorKind,
};
pub use outcome::Outcome;
pub use request::{Body, Method, Query, Request};
pub use resources::Resources;
pub use tokens::{AccessToken, ActiveSession, RefreshToken};
pub use types::{BaseUrl, RealmName, ResourceId};

/// Result type for kcadmin operations.
pub type Result<T> = std::result::Result<T, Error>;
