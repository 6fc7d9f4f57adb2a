//! Resource discovery
//!
//! Read-only. Builds a [`TeardownPlan`] from the provider's listings:
//!
//! - instances whose name or ID matches the filter, with their image
//!   resolved from the instance detail
//! - `in-use` volumes attached to a matched instance (exact ID match)
//! - floating IPs whose address equals a matched instance address, only when
//!   the networking probe reports advanced networking

use crate::error::Result;
use crate::filter::EnvironmentFilter;
use crate::plan::TeardownPlan;
use envsweep_cloud::{
    CloudProvider, FloatingIp, FloatingIps, Instance, NetworkingMode, ResourceSet, Volume,
};
use futures_util::future::join_all;

pub struct Discoverer<'a> {
    provider: &'a dyn CloudProvider,
}

impl<'a> Discoverer<'a> {
    pub fn new(provider: &'a dyn CloudProvider) -> Self {
        Self { provider }
    }

    pub async fn discover(&self, filter: &EnvironmentFilter) -> Result<TeardownPlan> {
        tracing::info!(
            "Discovering resources on {} matching {}",
            self.provider.display_name(),
            filter
        );

        let instances = self.matched_instances(filter).await?;
        let volumes = self.candidate_volumes(&instances).await?;

        let networking = self.provider.probe_networking().await;
        let floating_ips = match networking {
            NetworkingMode::Advanced => self.matched_floating_ips(&instances).await?,
            NetworkingMode::Legacy => {
                tracing::info!("Legacy networking, floating IPs are not applicable");
                FloatingIps::NotApplicable
            }
        };

        Ok(TeardownPlan::new(
            filter.to_string(),
            instances,
            volumes,
            floating_ips,
            networking,
        ))
    }

    async fn matched_instances(
        &self,
        filter: &EnvironmentFilter,
    ) -> Result<ResourceSet<Instance>> {
        let listed: Vec<Instance> = self
            .provider
            .list_instances()
            .await?
            .into_iter()
            .filter(|i| !i.id.trim().is_empty())
            .filter(|i| filter.matches(i))
            .collect();

        tracing::debug!("{} instances match the filter", listed.len());

        let details = join_all(listed.iter().map(|i| self.provider.show_instance(&i.id))).await;

        let instances = listed
            .into_iter()
            .zip(details)
            .map(|(mut instance, detail)| {
                match detail {
                    Ok(detail) => {
                        if detail.image.is_some() {
                            instance.image = detail.image;
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Could not resolve image of {}: {}", instance.id, e);
                    }
                }
                instance
            })
            .collect();

        Ok(instances)
    }

    async fn candidate_volumes(
        &self,
        instances: &ResourceSet<Instance>,
    ) -> Result<ResourceSet<Volume>> {
        let volumes: ResourceSet<Volume> = self
            .provider
            .list_volumes()
            .await?
            .into_iter()
            .filter(|v| !v.id.trim().is_empty())
            .filter(|v| v.status.is_in_use())
            .filter(|v| instances.iter().any(|i| v.is_attached_to(&i.id)))
            .collect();

        tracing::debug!("{} in-use volumes attached to matched instances", volumes.len());
        Ok(volumes)
    }

    /// Only reached after a successful probe, so a listing failure here is a
    /// discovery failure like any other listing.
    async fn matched_floating_ips(
        &self,
        instances: &ResourceSet<Instance>,
    ) -> Result<FloatingIps> {
        let matched: ResourceSet<FloatingIp> = self
            .provider
            .list_floating_ips()
            .await?
            .into_iter()
            .filter(|f| !f.id.trim().is_empty() && !f.floating_address.trim().is_empty())
            .filter(|f| instances.iter().any(|i| f.belongs_to(i)))
            .collect();

        tracing::debug!("{} floating IPs belong to matched instances", matched.len());
        Ok(FloatingIps::Resolved(matched))
    }
}
