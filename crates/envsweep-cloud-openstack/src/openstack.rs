//! openstack CLI wrapper
//!
//! Wraps the openstack CLI commands used by envsweep. Every query asks for
//! `-f json` output and goes through [`crate::listing`] for decoding.

use crate::error::{OpenStackError, Result};
use crate::listing::{self, Listing, Row};
use async_trait::async_trait;
use envsweep_cloud::ResourceSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::process::Stdio;
use tokio::process::Command;

/// Captured result of one CLI invocation
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// Executes a program and captures its output
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput>;
}

/// Runs commands as local child processes
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput> {
        let mut cmd = Command::new(program);
        cmd.args(args);
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let output = match cmd.output().await {
            Ok(output) => output,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(OpenStackError::CliNotFound);
            }
            Err(e) => return Err(e.into()),
        };

        Ok(CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// openstack CLI wrapper
pub struct OpenStackCli<R = ProcessRunner> {
    runner: R,
    program: String,
    cloud: Option<String>,
}

impl OpenStackCli<ProcessRunner> {
    /// `cloud` selects an entry of clouds.yaml (`--os-cloud`); `None` uses
    /// the `OS_*` environment.
    pub fn new(cloud: Option<String>) -> Self {
        Self::with_runner(ProcessRunner, "openstack", cloud)
    }
}

impl<R: CommandRunner> OpenStackCli<R> {
    pub fn with_runner(runner: R, program: impl Into<String>, cloud: Option<String>) -> Self {
        Self {
            runner,
            program: program.into(),
            cloud,
        }
    }

    pub fn cloud(&self) -> Option<&str> {
        self.cloud.as_deref()
    }

    #[cfg(test)]
    pub(crate) fn runner(&self) -> &R {
        &self.runner
    }

    /// Run an openstack command and return stdout
    async fn run_command(&self, args: &[&str]) -> Result<String> {
        let mut full_args: Vec<String> = Vec::with_capacity(args.len() + 2);
        if let Some(cloud) = &self.cloud {
            full_args.push("--os-cloud".to_string());
            full_args.push(cloud.clone());
        }
        full_args.extend(args.iter().map(|a| a.to_string()));

        tracing::debug!("Running: {} {}", self.program, full_args.join(" "));

        let output = self.runner.run(&self.program, &full_args).await?;

        if !output.success {
            return Err(OpenStackError::from_stderr(&output.stderr));
        }

        Ok(output.stdout)
    }

    /// Check authentication by issuing a token
    pub async fn token_issue(&self) -> Result<TokenInfo> {
        let output = self.run_command(&["token", "issue", "-f", "json"]).await?;
        listing::decode_object(&output)
    }

    /// List all servers
    pub async fn server_list(&self) -> Result<Listing<ServerRow>> {
        let output = self.run_command(&["server", "list", "-f", "json"]).await?;
        listing::decode_rows(&output)
    }

    /// Show one server
    pub async fn server_show(&self, id: &str) -> Result<ServerDetail> {
        let output = self
            .run_command(&["server", "show", id, "-f", "json"])
            .await?;
        listing::decode_object(&output)
    }

    /// Delete a server
    pub async fn server_delete(&self, id: &str) -> Result<()> {
        self.run_command(&["server", "delete", id]).await?;
        Ok(())
    }

    /// List all volumes
    pub async fn volume_list(&self) -> Result<Listing<VolumeRow>> {
        let output = self.run_command(&["volume", "list", "-f", "json"]).await?;
        listing::decode_rows(&output)
    }

    /// Show one volume
    pub async fn volume_show(&self, id: &str) -> Result<VolumeDetail> {
        let output = self
            .run_command(&["volume", "show", id, "-f", "json"])
            .await?;
        listing::decode_object(&output)
    }

    /// Delete a volume
    pub async fn volume_delete(&self, id: &str) -> Result<()> {
        self.run_command(&["volume", "delete", id]).await?;
        Ok(())
    }

    /// List network IDs (used as the networking capability probe)
    pub async fn network_ids(&self) -> Result<ResourceSet<String>> {
        let output = self
            .run_command(&["network", "list", "-f", "value", "-c", "ID"])
            .await?;
        Ok(ResourceSet::from_lines(&output))
    }

    /// List floating IPs
    pub async fn floating_ip_list(&self) -> Result<Listing<FloatingIpRow>> {
        let output = self
            .run_command(&["floating", "ip", "list", "-f", "json"])
            .await?;
        listing::decode_rows(&output)
    }

    /// Release a floating IP
    pub async fn floating_ip_delete(&self, id: &str) -> Result<()> {
        self.run_command(&["floating", "ip", "delete", id]).await?;
        Ok(())
    }
}

/// Token information from `token issue`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenInfo {
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub expires: Option<String>,
}

/// Row of `server list`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerRow {
    #[serde(rename = "ID")]
    pub id: String,

    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "Status", default)]
    pub status: Option<String>,

    #[serde(rename = "Networks", default)]
    pub networks: Value,

    #[serde(rename = "Image", default)]
    pub image: Value,
}

impl Row for ServerRow {
    fn is_valid(&self) -> bool {
        !self.id.trim().is_empty()
    }
}

/// Output of `server show`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerDetail {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub addresses: Value,

    #[serde(default)]
    pub image: Value,
}

/// Row of `volume list`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeRow {
    #[serde(rename = "ID")]
    pub id: String,

    #[serde(rename = "Name", default)]
    pub name: Option<String>,

    #[serde(rename = "Status")]
    pub status: String,

    #[serde(rename = "Attached to", default)]
    pub attached_to: Value,
}

impl Row for VolumeRow {
    fn is_valid(&self) -> bool {
        !self.id.trim().is_empty()
    }
}

/// Output of `volume show`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeDetail {
    pub id: String,

    #[serde(default)]
    pub name: Option<String>,

    pub status: String,

    #[serde(default)]
    pub attachments: Value,
}

/// Row of `floating ip list`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloatingIpRow {
    #[serde(rename = "ID")]
    pub id: String,

    #[serde(rename = "Floating IP Address")]
    pub floating_ip_address: String,

    #[serde(rename = "Fixed IP Address", default)]
    pub fixed_ip_address: Option<String>,
}

impl Row for FloatingIpRow {
    fn is_valid(&self) -> bool {
        !self.id.trim().is_empty() && !self.floating_ip_address.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedRunner;

    #[tokio::test]
    async fn test_os_cloud_is_prepended() {
        let runner = ScriptedRunner::new().on("--os-cloud lab server list -f json", "[]");
        let cli = OpenStackCli::with_runner(runner, "openstack", Some("lab".to_string()));

        let listing = cli.server_list().await.unwrap();
        assert!(listing.rows.is_empty());
        assert_eq!(cli.runner().calls(), vec!["--os-cloud lab server list -f json"]);
    }

    #[tokio::test]
    async fn test_failed_command_is_classified() {
        let runner = ScriptedRunner::new().fail(
            "volume show vol-9 -f json",
            "No volume with a name or ID of 'vol-9' exists.",
        );
        let cli = OpenStackCli::with_runner(runner, "openstack", None);

        let err = cli.volume_show("vol-9").await.unwrap_err();
        assert!(matches!(err, OpenStackError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_network_ids_blank_output_is_empty() {
        let runner = ScriptedRunner::new().on("network list -f value -c ID", "\n");
        let cli = OpenStackCli::with_runner(runner, "openstack", None);

        let ids = cli.network_ids().await.unwrap();
        assert_eq!(ids.len(), 0);
    }

    #[test]
    fn test_server_row_validity() {
        let row: ServerRow = serde_json::from_str(
            r#"{"ID": "abc", "Name": "web", "Status": "ERROR", "Networks": "", "Image": ""}"#,
        )
        .unwrap();
        assert!(row.is_valid());

        let row: ServerRow =
            serde_json::from_str(r#"{"ID": " ", "Name": "web", "Status": "BUILD"}"#).unwrap();
        assert!(!row.is_valid());
    }
}
