use std::path::Path;
use std::process::Output;

use tokio::process::Command;

/// Environment variables the binary reads, cleared so the host's settings
/// cannot leak into a test.
const KCADMIN_VARS: &[&str] = &[
    "KCADMIN_BASE_URL",
    "KCADMIN_REALM",
    "KCADMIN_AUTH_REALM",
    "KCADMIN_CLIENT_ID",
    "KCADMIN_CLIENT_SECRET",
    "KCADMIN_USERNAME",
    "KCADMIN_PASSWORD",
    "KCADMIN_TOKEN",
    "KCADMIN_NEW_USER_PASSWORD",
];

/// Run the CLI with a custom HOME directory for isolated profile storage.
pub async fn run_cli(args: &[&str], home: &Path) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_kcadmin"));
    cmd.args(args);
    for var in KCADMIN_VARS {
        cmd.env_remove(var);
    }
    cmd.env_remove("RUST_LOG");
    cmd.env("HOME", home);
    cmd.env("XDG_CONFIG_HOME", home.join("config"));
    cmd.env("NO_COLOR", "1");
    cmd.output().await.expect("Failed to execute CLI")
}

/// Run the CLI and expect success, returning stdout.
pub async fn run_cli_success(args: &[&str], home: &Path) -> String {
    let output = run_cli(args, home).await;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Run the CLI and expect failure, returning stderr.
pub async fn run_cli_failure(args: &[&str], home: &Path) -> String {
    let output = run_cli(args, home).await;
    if output.status.success() {
        panic!("CLI command should have failed: {:?}", args);
    }
    String::from_utf8_lossy(&output.stderr).to_string()
}
