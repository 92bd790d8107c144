//! Opens notification targets in a new window via a configured command.

use std::process::{ExitStatus, Stdio};

use tokio::process::{Child, Command};
use url::Url;
use worker_core::PlatformError;
use worker_core::platform::PlatformResult;

/// Resolves click targets against the worker origin and hands them to an
/// external opener (`xdg-open`, `open`, a kiosk browser...).
#[derive(Debug, Clone)]
pub struct WindowOpener {
    origin: Url,
    command: Option<String>,
}

impl WindowOpener {
    pub fn new(origin: Url, command: &str) -> Self {
        let command = command.trim();
        Self {
            origin,
            command: (!command.is_empty()).then(|| command.to_string()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.command.is_some()
    }

    /// Absolute URL for `target`. Only http and https are accepted.
    pub fn resolve(&self, target: &str) -> PlatformResult<Url> {
        let url = self
            .origin
            .join(target.trim())
            .map_err(|e| PlatformError::WindowOpen(format!("invalid URL {target:?}: {e}")))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(PlatformError::WindowOpen(format!(
                "unsupported URL scheme: {scheme}"
            ))),
        }
    }

    /// Launch the opener for `target`. Without a configured command the
    /// request is logged and dropped. The child is awaited on a background
    /// task so it never lingers as a zombie.
    pub fn open(&self, target: &str) -> PlatformResult<()> {
        let url = self.resolve(target)?;
        let Some(command) = &self.command else {
            tracing::warn!(url = %url, "WINDOW_OPEN_COMMAND not set, cannot open window");
            return Ok(());
        };

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| PlatformError::WindowOpen(format!("no async runtime: {e}")))?;
        let child = spawn_opener(command, &url)?;
        runtime.spawn(reap(command.clone(), child));
        tracing::info!(url = %url, "Opened window");
        Ok(())
    }
}

fn spawn_opener(command: &str, url: &Url) -> PlatformResult<Child> {
    let mut parts = command.split_whitespace();
    let program = parts
        .next()
        .ok_or_else(|| PlatformError::WindowOpen("empty command".into()))?;
    Command::new(program)
        .args(parts)
        .arg(url.as_str())
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| PlatformError::WindowOpen(format!("{program}: {e}")))
}

/// Wait for an opener process and log an unsuccessful exit.
async fn reap(command: String, mut child: Child) -> Option<ExitStatus> {
    match child.wait().await {
        Ok(status) => {
            if !status.success() {
                tracing::warn!(command = %command, %status, "Window opener exited unsuccessfully");
            }
            Some(status)
        }
        Err(e) => {
            tracing::error!(command = %command, "Failed to wait for window opener: {e}");
            None
        }
    }
}
