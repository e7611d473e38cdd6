//! `kcadmin groups`: group operations.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde_json::json;

use kcadmin_core::Resources;
use kcadmin_core::resources::groups::{GroupQuery, GroupRepresentation};

use crate::cli::ConnectionArgs;
use crate::connection;
use crate::output;

#[derive(Args, Debug)]
pub struct GroupsCommand {
    #[command(subcommand)]
    pub command: GroupsSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum GroupsSubcommand {
    /// List top-level groups
    List(ListArgs),

    /// Fetch one group by id
    Get {
        /// Group id
        id: String,
    },

    /// Create a group
    Create {
        /// Group name
        name: String,

        /// Create beneath this parent group id
        #[arg(long)]
        parent: Option<String>,
    },

    /// Delete a group by id
    Delete {
        /// Group id
        id: String,
    },
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Substring to search for in group names
    #[arg(long)]
    pub search: Option<String>,

    /// Match the search string exactly
    #[arg(long)]
    pub exact: bool,

    /// Index of the first result
    #[arg(long)]
    pub first: Option<u32>,

    /// Maximum number of results
    #[arg(long)]
    pub max: Option<u32>,
}

pub async fn handle(cmd: GroupsCommand, connection: &ConnectionArgs) -> Result<()> {
    let client = connection::connect(connection)?;
    let groups = client.groups();

    match cmd.command {
        GroupsSubcommand::List(args) => {
            let query = GroupQuery {
                search: args.search,
                exact: args.exact.then_some(true),
                first: args.first,
                max: args.max,
                ..GroupQuery::default()
            };
            let found = groups.find(&query).await.context("Failed to list groups")?;
            output::json_pretty(&found)
        }
        GroupsSubcommand::Get { id } => {
            let group = groups
                .get(&id)
                .await
                .context("Failed to fetch group")?
                .with_context(|| format!("Group '{}' not found", id))?;
            output::json_pretty(&group)
        }
        GroupsSubcommand::Create { name, parent } => {
            let group = GroupRepresentation::named(name);
            let id = match parent {
                Some(parent) => groups.create_child(&parent, &group).await,
                None => groups.create(&group).await,
            }
            .context("Failed to create group")?;
            output::success("Group created");
            output::json_pretty(&json!({ "id": id }))
        }
        GroupsSubcommand::Delete { id } => {
            groups.delete(&id).await.context("Failed to delete group")?;
            output::success(&format!("Group '{}' deleted", id));
            Ok(())
        }
    }
}
