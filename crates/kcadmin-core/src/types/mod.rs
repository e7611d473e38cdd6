//! Validated identifiers and URLs.
//!
//! These types enforce their invariants at construction time, so a client
//! can never be pointed at a malformed server or realm.

mod base_url;
mod realm;
mod resource_id;

pub use base_url::BaseUrl;
pub use realm::RealmName;
pub use resource_id::ResourceId;
