//! Saved connection profile.
//!
//! The profile holds connection defaults only. Passwords, client secrets and
//! tokens are never written to disk.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::cli::ConnectionArgs;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_realm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl Profile {
    /// Overwrite fields with the non-secret values given on the command line.
    pub fn merge(&mut self, args: &ConnectionArgs) {
        let pairs = [
            (&mut self.base_url, &args.base_url),
            (&mut self.realm, &args.realm),
            (&mut self.auth_realm, &args.auth_realm),
            (&mut self.client_id, &args.client_id),
            (&mut self.username, &args.username),
        ];
        for (slot, value) in pairs {
            if value.is_some() {
                slot.clone_from(value);
            }
        }
    }
}

fn profile_path() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("", "", "kcadmin").context("Could not determine config directory")?;

    let config_dir = dirs.config_dir();
    fs::create_dir_all(config_dir).context("Failed to create config directory")?;

    Ok(config_dir.join("profile.json"))
}

pub fn save_profile(profile: &Profile) -> Result<PathBuf> {
    let path = profile_path()?;
    let json = serde_json::to_string_pretty(profile)?;

    fs::write(&path, &json).context("Failed to write profile")?;

    #[cfg(unix)]
    {
        let mut perms = fs::metadata(&path)?.permissions();
        perms.set_mode(0o600);
        fs::set_permissions(&path, perms)?;
    }

    Ok(path)
}

/// Load the saved profile, or an empty one if none was saved.
pub fn load_profile() -> Result<Profile> {
    let path = profile_path()?;

    if !path.exists() {
        return Ok(Profile::default());
    }

    let json = fs::read_to_string(&path).context("Failed to read profile")?;
    serde_json::from_str(&json).context("Invalid profile file")
}

/// Remove the saved profile. Returns false if there was none.
pub fn clear_profile() -> Result<bool> {
    let path = profile_path()?;

    if !path.exists() {
        return Ok(false);
    }

    fs::remove_file(&path).context("Failed to remove profile")?;
    Ok(true)
}
