use super::{AuthErrorCode, ProviderError};
use std::process::{Command, Stdio};
use tracing::debug;

/// Sends the user agent to the provider's authorization page.
pub trait Navigator: Send + Sync {
    /// # Errors
    /// Returns `auth/popup-blocked` when the page cannot be opened.
    fn navigate(&self, url: &str) -> Result<(), ProviderError>;
}

/// Opens URLs with the platform's default browser.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemBrowser;

impl SystemBrowser {
    fn command(url: &str) -> Command {
        if cfg!(target_os = "macos") {
            let mut command = Command::new("open");
            command.arg(url);
            command
        } else if cfg!(target_os = "windows") {
            let mut command = Command::new("cmd");
            command.args(["/C", "start", "", url]);
            command
        } else {
            let mut command = Command::new("xdg-open");
            command.arg(url);
            command
        }
    }
}

impl Navigator for SystemBrowser {
    fn navigate(&self, url: &str) -> Result<(), ProviderError> {
        // Not waited on. The runtime reaps the launcher once it exits.
        let child = tokio::process::Command::from(Self::command(url))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|err| {
                ProviderError::new(
                    AuthErrorCode::PopupBlocked,
                    format!("could not launch a browser: {err}"),
                )
            })?;

        debug!("browser launcher started: {:?}", child.id());

        Ok(())
    }
}
