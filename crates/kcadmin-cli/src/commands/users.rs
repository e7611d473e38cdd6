//! `kcadmin users`: user operations.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde_json::json;

use kcadmin_core::Resources;
use kcadmin_core::resources::users::{CredentialRepresentation, UserQuery, UserRepresentation};

use crate::cli::ConnectionArgs;
use crate::connection;
use crate::output;

#[derive(Args, Debug)]
pub struct UsersCommand {
    #[command(subcommand)]
    pub command: UsersSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum UsersSubcommand {
    /// List users
    List(ListArgs),

    /// Fetch one user by id
    Get {
        /// User id
        id: String,
    },

    /// Create a user
    Create(CreateArgs),

    /// Delete a user by id
    Delete {
        /// User id
        id: String,
    },
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Substring to search for in username, email, first or last name
    #[arg(long)]
    pub search: Option<String>,

    #[arg(long)]
    pub username: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    /// Match filters exactly
    #[arg(long)]
    pub exact: bool,

    /// Index of the first result
    #[arg(long)]
    pub first: Option<u32>,

    /// Maximum number of results
    #[arg(long)]
    pub max: Option<u32>,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Username
    pub username: String,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub first_name: Option<String>,

    #[arg(long)]
    pub last_name: Option<String>,

    /// Create the user disabled
    #[arg(long)]
    pub disabled: bool,

    /// Initial password
    #[arg(long, env = "KCADMIN_NEW_USER_PASSWORD", hide_env_values = true)]
    pub initial_password: Option<String>,

    /// Require a password change at first login
    #[arg(long, requires = "initial_password")]
    pub temporary: bool,
}

pub async fn handle(cmd: UsersCommand, connection: &ConnectionArgs) -> Result<()> {
    let client = connection::connect(connection)?;
    let users = client.users();

    match cmd.command {
        UsersSubcommand::List(args) => {
            let query = UserQuery {
                search: args.search,
                username: args.username,
                email: args.email,
                exact: args.exact.then_some(true),
                first: args.first,
                max: args.max,
                ..UserQuery::default()
            };
            let found = users.find(&query).await.context("Failed to list users")?;
            output::json_pretty(&found)
        }
        UsersSubcommand::Get { id } => {
            let user = users
                .get(&id)
                .await
                .context("Failed to fetch user")?
                .with_context(|| format!("User '{}' not found", id))?;
            output::json_pretty(&user)
        }
        UsersSubcommand::Create(args) => {
            let user = UserRepresentation {
                email: args.email,
                first_name: args.first_name,
                last_name: args.last_name,
                enabled: Some(!args.disabled),
                ..UserRepresentation::named(args.username)
            };
            let id = users.create(&user).await.context("Failed to create user")?;

            if let Some(password) = args.initial_password {
                let credential = CredentialRepresentation::password(password, args.temporary);
                users
                    .reset_password(id.as_str(), &credential)
                    .await
                    .context("User created, but setting the password failed")?;
            }

            output::success("User created");
            output::json_pretty(&json!({ "id": id }))
        }
        UsersSubcommand::Delete { id } => {
            users.delete(&id).await.context("Failed to delete user")?;
            output::success(&format!("User '{}' deleted", id));
            Ok(())
        }
    }
}
