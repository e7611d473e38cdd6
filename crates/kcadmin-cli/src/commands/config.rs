//! `kcadmin config`: manage the saved connection profile.

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::cli::ConnectionArgs;
use crate::output;
use crate::profile;

#[derive(Args, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigSubcommand {
    /// Save the given connection flags as defaults (secrets are not saved)
    Set,

    /// Print the saved profile
    Show,

    /// Delete the saved profile
    Clear,
}

pub fn handle(cmd: ConfigCommand, connection: &ConnectionArgs) -> Result<()> {
    match cmd.command {
        ConfigSubcommand::Set => set(connection),
        ConfigSubcommand::Show => output::json_pretty(&profile::load_profile()?),
        ConfigSubcommand::Clear => {
            if profile::clear_profile()? {
                output::success("Profile removed");
            } else {
                output::success("No profile saved");
            }
            Ok(())
        }
    }
}

fn set(connection: &ConnectionArgs) -> Result<()> {
    let mut saved = profile::load_profile()?;
    saved.merge(connection);
    let path = profile::save_profile(&saved)?;

    if connection.password.is_some()
        || connection.client_secret.is_some()
        || connection.token.is_some()
    {
        output::field("note", "secrets are not saved; pass them per command or via KCADMIN_*");
    }
    output::success(&format!("Profile saved to {}", path.display()));
    output::json_pretty(&saved)
}
