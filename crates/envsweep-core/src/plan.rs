//! Teardown plan

use crate::image;
use envsweep_cloud::{FloatingIps, Instance, NetworkingMode, ResourceSet, Volume};
use serde::Serialize;

/// Everything one run will delete
///
/// Built once by the discoverer and never modified afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct TeardownPlan {
    filter: String,
    instances: ResourceSet<Instance>,
    volumes: ResourceSet<Volume>,
    floating_ips: FloatingIps,
    images_differ: bool,
    networking: NetworkingMode,
}

impl TeardownPlan {
    pub fn new(
        filter: impl Into<String>,
        instances: ResourceSet<Instance>,
        volumes: ResourceSet<Volume>,
        floating_ips: FloatingIps,
        networking: NetworkingMode,
    ) -> Self {
        let images_differ = image::images_differ(&instances);
        Self {
            filter: filter.into(),
            instances,
            volumes,
            floating_ips,
            images_differ,
            networking,
        }
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn instances(&self) -> &ResourceSet<Instance> {
        &self.instances
    }

    /// Candidate volumes: in-use and attached to a matched instance
    pub fn volumes(&self) -> &ResourceSet<Volume> {
        &self.volumes
    }

    pub fn floating_ips(&self) -> &FloatingIps {
        &self.floating_ips
    }

    pub fn images_differ(&self) -> bool {
        self.images_differ
    }

    pub fn networking_advanced(&self) -> bool {
        self.networking.is_advanced()
    }

    pub fn networking(&self) -> NetworkingMode {
        self.networking
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    pub fn volume_count(&self) -> usize {
        self.volumes.len()
    }

    /// `None` when floating IPs are not applicable
    pub fn floating_ip_count(&self) -> Option<usize> {
        self.floating_ips.len()
    }

    /// Distinct images of the matched instances
    pub fn images(&self) -> Vec<&str> {
        image::distinct_images(&self.instances)
    }
}
