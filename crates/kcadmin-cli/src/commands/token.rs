//! `kcadmin token`: acquire an access token and print it.

use anyhow::{Context, Result};
use clap::Args;
use serde_json::json;

use crate::cli::ConnectionArgs;
use crate::connection;
use crate::output;

#[derive(Args, Debug)]
pub struct TokenArgs {
    /// Print the token with its mode and expiry as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: TokenArgs, connection: &ConnectionArgs) -> Result<()> {
    let client = connection::connect(connection)?;
    let store = client.credentials();

    let token = store
        .get_valid_token()
        .await
        .context("Failed to acquire token")?;
    let snapshot = store.snapshot().await;

    if args.json {
        return output::json_pretty(&json!({
            "access_token": token.as_str(),
            "mode": snapshot.mode.to_string(),
            "expires_at": snapshot.expires_at.map(|at| at.to_rfc3339()),
        }));
    }

    output::field("Mode", &snapshot.mode.to_string());
    if let Some(expires_at) = snapshot.expires_at {
        output::field("Expires", &expires_at.to_rfc3339());
    }
    println!("{}", token.as_str());
    Ok(())
}
