//! reqwest-backed admin client.
//!
//! [`AdminClient`] implements [`kcadmin_core::Dispatch`]: it builds the
//! realm-scoped URL, attaches a token from its [`CredentialStore`], and on a
//! 401 refreshes the token and resends exactly once.

pub mod client;
pub mod config;
pub mod response;
pub mod store;
pub mod token;

pub use client::AdminClient;
pub use config::ClientConfig;
pub use store::{CredentialStore, SessionSnapshot};
pub use token::{TokenAcquirer, TokenGrant};
