//! CLI argument definitions.

use clap::{Args, Parser, Subcommand};

use crate::commands::config::ConfigCommand;
use crate::commands::groups::GroupsCommand;
use crate::commands::request::RequestArgs;
use crate::commands::token::TokenArgs;
use crate::commands::users::UsersCommand;

/// Command-line client for a Keycloak-style admin API.
#[derive(Parser, Debug)]
#[command(name = "kcadmin")]
#[command(author, version = env!("KCADMIN_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Connection settings. Each one falls back to the saved profile.
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Server base URL, e.g. https://sso.example.com
    #[arg(long, env = "KCADMIN_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Realm to manage
    #[arg(long, env = "KCADMIN_REALM", global = true)]
    pub realm: Option<String>,

    /// Realm to authenticate against (defaults to --realm)
    #[arg(long, env = "KCADMIN_AUTH_REALM", global = true)]
    pub auth_realm: Option<String>,

    /// OAuth2 client id
    #[arg(long, env = "KCADMIN_CLIENT_ID", global = true)]
    pub client_id: Option<String>,

    /// OAuth2 client secret
    #[arg(long, env = "KCADMIN_CLIENT_SECRET", global = true, hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Username for the password grant
    #[arg(long, env = "KCADMIN_USERNAME", global = true)]
    pub username: Option<String>,

    /// Password for the password grant
    #[arg(long, env = "KCADMIN_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,

    /// Use an access token obtained elsewhere
    #[arg(long, env = "KCADMIN_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage the saved connection profile
    Config(ConfigCommand),

    /// Acquire an access token and print it
    Token(TokenArgs),

    /// Group operations
    Groups(GroupsCommand),

    /// User operations
    Users(UsersCommand),

    /// Send a raw request to a realm-relative path
    Request(RequestArgs),
}
