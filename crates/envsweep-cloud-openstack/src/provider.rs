//! OpenStack provider implementation

use crate::error::OpenStackError;
use crate::listing::{self, NetworkAddresses};
use crate::openstack::{
    CommandRunner, FloatingIpRow, OpenStackCli, ProcessRunner, ServerDetail, ServerRow,
    VolumeDetail, VolumeRow,
};
use async_trait::async_trait;
use envsweep_cloud::{
    AuthStatus, CloudProvider, FloatingIp, Instance, NetworkingMode, Volume, VolumeStatus,
};

/// OpenStack provider
pub struct OpenStackProvider<R = ProcessRunner> {
    cli: OpenStackCli<R>,
}

impl OpenStackProvider<ProcessRunner> {
    pub fn new(cloud: Option<String>) -> Self {
        Self {
            cli: OpenStackCli::new(cloud),
        }
    }
}

impl<R: CommandRunner> OpenStackProvider<R> {
    pub fn with_cli(cli: OpenStackCli<R>) -> Self {
        Self { cli }
    }
}

fn instance_from_networks(
    id: String,
    name: String,
    networks: &[NetworkAddresses],
    image: Option<String>,
) -> Instance {
    let addresses = networks
        .iter()
        .flat_map(|n| n.addresses.iter().cloned())
        .collect();

    Instance {
        id,
        name,
        addresses,
        public_ip: listing::public_address(networks),
        image,
    }
}

impl From<ServerRow> for Instance {
    fn from(row: ServerRow) -> Self {
        let networks = listing::parse_networks(&row.networks);
        let image = listing::parse_image(&row.image);
        instance_from_networks(row.id, row.name, &networks, image)
    }
}

impl From<ServerDetail> for Instance {
    fn from(detail: ServerDetail) -> Self {
        let networks = listing::parse_networks(&detail.addresses);
        let image = listing::parse_image(&detail.image);
        instance_from_networks(detail.id, detail.name, &networks, image)
    }
}

impl From<VolumeRow> for Volume {
    fn from(row: VolumeRow) -> Self {
        Volume {
            id: row.id,
            name: row.name.unwrap_or_default(),
            status: VolumeStatus::from(row.status.as_str()),
            attached_to: listing::parse_attachments(&row.attached_to),
        }
    }
}

impl From<VolumeDetail> for Volume {
    fn from(detail: VolumeDetail) -> Self {
        Volume {
            id: detail.id,
            name: detail.name.unwrap_or_default(),
            status: VolumeStatus::from(detail.status.as_str()),
            attached_to: listing::parse_attachments(&detail.attachments),
        }
    }
}

impl From<FloatingIpRow> for FloatingIp {
    fn from(row: FloatingIpRow) -> Self {
        FloatingIp {
            id: row.id,
            floating_address: row.floating_ip_address.trim().to_string(),
            fixed_address: row
                .fixed_ip_address
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty()),
        }
    }
}

#[async_trait]
impl<R: CommandRunner> CloudProvider for OpenStackProvider<R> {
    fn name(&self) -> &str {
        "openstack"
    }

    fn display_name(&self) -> &str {
        "OpenStack"
    }

    async fn check_auth(&self) -> envsweep_cloud::Result<AuthStatus> {
        match self.cli.token_issue().await {
            Ok(token) => {
                let project = token.project_id.unwrap_or_else(|| "unknown".to_string());
                let account_info = match self.cli.cloud() {
                    Some(cloud) => format!("project {} (cloud: {})", project, cloud),
                    None => format!("project {}", project),
                };
                Ok(AuthStatus::ok(account_info))
            }
            Err(OpenStackError::CliNotFound) => {
                Ok(AuthStatus::failed("openstack CLI is not installed"))
            }
            Err(e) => Ok(AuthStatus::failed(e.to_string())),
        }
    }

    async fn list_instances(&self) -> envsweep_cloud::Result<Vec<Instance>> {
        let listing = self.cli.server_list().await?;
        if listing.skipped > 0 {
            tracing::debug!("Skipped {} malformed server rows", listing.skipped);
        }
        Ok(listing.rows.into_iter().map(Instance::from).collect())
    }

    async fn show_instance(&self, id: &str) -> envsweep_cloud::Result<Instance> {
        Ok(self.cli.server_show(id).await?.into())
    }

    async fn list_volumes(&self) -> envsweep_cloud::Result<Vec<Volume>> {
        let listing = self.cli.volume_list().await?;
        if listing.skipped > 0 {
            tracing::debug!("Skipped {} malformed volume rows", listing.skipped);
        }
        Ok(listing.rows.into_iter().map(Volume::from).collect())
    }

    async fn show_volume(&self, id: &str) -> envsweep_cloud::Result<Volume> {
        Ok(self.cli.volume_show(id).await?.into())
    }

    async fn probe_networking(&self) -> NetworkingMode {
        match self.cli.network_ids().await {
            Ok(networks) => {
                tracing::debug!("Networking service answered ({} networks)", networks.len());
                NetworkingMode::Advanced
            }
            Err(e) => {
                tracing::debug!("Networking probe failed, assuming legacy networking: {}", e);
                NetworkingMode::Legacy
            }
        }
    }

    async fn list_floating_ips(&self) -> envsweep_cloud::Result<Vec<FloatingIp>> {
        let listing = self.cli.floating_ip_list().await?;
        if listing.skipped > 0 {
            tracing::debug!("Skipped {} malformed floating IP rows", listing.skipped);
        }
        Ok(listing.rows.into_iter().map(FloatingIp::from).collect())
    }

    async fn delete_instance(&self, id: &str) -> envsweep_cloud::Result<()> {
        tracing::info!("Deleting server: {}", id);
        Ok(self.cli.server_delete(id).await?)
    }

    async fn delete_volume(&self, id: &str) -> envsweep_cloud::Result<()> {
        tracing::info!("Deleting volume: {}", id);
        Ok(self.cli.volume_delete(id).await?)
    }

    async fn release_floating_ip(&self, id: &str) -> envsweep_cloud::Result<()> {
        tracing::info!("Releasing floating IP: {}", id);
        Ok(self.cli.floating_ip_delete(id).await?)
    }
}
