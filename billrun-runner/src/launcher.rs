//! Launcher process execution
//!
//! Runs a launcher command line in a shell and hands back what it printed.
//! The child inherits the runner's environment and working directory.

use async_trait::async_trait;
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("{0} not found in PATH")]
    ShellNotFound(String),
    #[error("failed to start launcher: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("launcher failed (exit_code={exit_code:?}): {stderr}")]
    ProcessFailed {
        exit_code: Option<i32>,
        stderr: String,
    },
}

/// Something that can run a launcher command and capture its standard output
#[async_trait]
pub trait Launcher: Send + Sync {
    async fn launch(&self, command: &str) -> Result<String, LaunchError>;
}

/// Runs commands through `<shell> -c`
#[derive(Debug, Clone)]
pub struct ShellLauncher {
    shell: String,
}

impl ShellLauncher {
    pub fn new() -> Self {
        Self::with_shell("bash")
    }

    pub fn with_shell(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }
}

impl Default for ShellLauncher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Launcher for ShellLauncher {
    async fn launch(&self, command: &str) -> Result<String, LaunchError> {
        let output = Command::new(&self.shell)
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    LaunchError::ShellNotFound(self.shell.clone())
                } else {
                    LaunchError::Spawn(e)
                }
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            return Err(LaunchError::ProcessFailed {
                exit_code: output.status.code(),
                stderr: stderr.trim().to_string(),
            });
        }

        if !stderr.trim().is_empty() {
            debug!("Launcher stderr: {}", stderr.trim());
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
