//! Resource modules.
//!
//! Each module is a stateless translation from a method call to a
//! [`Request`](crate::Request) handed to a [`Dispatch`] implementation.
//! None of them encode business rules of the remote service.
//!
//! # Example
//!
//! ```no_run
//! use kcadmin_core::{Dispatch, Resources};
//! use kcadmin_core::resources::groups::GroupRepresentation;
//!
//! # async fn example(client: &impl Dispatch) -> kcadmin_core::Result<()> {
//! let id = client.groups().create(&GroupRepresentation::named("eng-42")).await?;
//! let group = client.groups().get(id.as_str()).await?;
//! assert_eq!(group.and_then(|g| g.name).as_deref(), Some("eng-42"));
//! # Ok(())
//! # }
//! ```

pub mod clients;
pub mod groups;
pub mod organizations;
pub mod roles;
pub mod users;

use crate::dispatch::Dispatch;

use clients::Clients;
use groups::Groups;
use organizations::Organizations;
use roles::Roles;
use users::Users;

/// Entry points to the resource modules for any [`Dispatch`] implementation.
pub trait Resources: Dispatch + Sized {
    fn groups(&self) -> Groups<'_, Self> {
        Groups::new(self)
    }

    fn users(&self) -> Users<'_, Self> {
        Users::new(self)
    }

    fn roles(&self) -> Roles<'_, Self> {
        Roles::new(self)
    }

    fn clients(&self) -> Clients<'_, Self> {
        Clients::new(self)
    }

    fn organizations(&self) -> Organizations<'_, Self> {
        Organizations::new(self)
    }
}

impl<D: Dispatch> Resources for D {}
