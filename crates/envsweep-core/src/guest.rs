//! Guest-side deregistration over ssh

use crate::error::GuestError;
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Runs the deregistration step inside a guest before it is deleted
#[async_trait]
pub trait GuestDeregistrar: Send + Sync {
    async fn deregister(&self, address: &str) -> Result<(), GuestError>;
}

/// Deregisters guests by running a command over ssh
#[derive(Debug, Clone)]
pub struct SshDeregistrar {
    program: String,
    user: String,
    command: String,
    identity_file: Option<PathBuf>,
    connect_timeout: Duration,
}

impl SshDeregistrar {
    pub fn new(user: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            program: "ssh".to_string(),
            user: user.into(),
            command: command.into(),
            identity_file: None,
            connect_timeout: Duration::from_secs(10),
        }
    }

    pub fn with_identity_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.identity_file = Some(path.into());
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Arguments passed to ssh for one guest
    pub fn ssh_args(&self, address: &str) -> Vec<String> {
        let mut args = vec![
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-o".to_string(),
            "StrictHostKeyChecking=no".to_string(),
            "-o".to_string(),
            format!("ConnectTimeout={}", self.connect_timeout.as_secs().max(1)),
        ];
        if let Some(identity) = &self.identity_file {
            args.push("-i".to_string());
            args.push(identity.display().to_string());
        }
        args.push(format!("{}@{}", self.user, address));
        args.push(self.command.clone());
        args
    }
}

#[async_trait]
impl GuestDeregistrar for SshDeregistrar {
    async fn deregister(&self, address: &str) -> Result<(), GuestError> {
        let args = self.ssh_args(address);
        tracing::debug!("Running: {} {}", self.program, args.join(" "));

        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            return Err(GuestError::CommandFailed {
                address: address.to_string(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }
}
