//! System control glue: shutdown, reboot, system info
//!
//! Thin shell-outs for the host the daemon runs on. These touch nothing in
//! the playback engine.

use crate::{Error, Result};
use tokio::process::Command;
use tracing::warn;

/// Power the host off.
pub async fn shutdown() -> Result<()> {
    run_checked("sudo", &["shutdown", "now"]).await
}

/// Reboot the host.
pub async fn reboot() -> Result<()> {
    run_checked("sudo", &["reboot"]).await
}

/// Human-readable system summary.
pub async fn system_info() -> String {
    match Command::new("neofetch").arg("--stdout").output().await {
        Ok(output) if output.status.success() => {
            String::from_utf8_lossy(&output.stdout).into_owned()
        }
        Ok(output) => {
            warn!(status = %output.status, "neofetch failed");
            "Error fetching system info.".to_string()
        }
        Err(e) => {
            warn!(error = %e, "failed to run neofetch");
            "Error fetching system info.".to_string()
        }
    }
}

async fn run_checked(program: &str, args: &[&str]) -> Result<()> {
    let status = Command::new(program).args(args).status().await?;
    if status.success() {
        Ok(())
    } else {
        Err(Error::Internal(format!("{program} exited with {status}")))
    }
}
