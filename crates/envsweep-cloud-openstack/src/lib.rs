//! OpenStack provider for envsweep
//!
//! This crate implements the CloudProvider trait for OpenStack, enabling
//! envsweep to discover and tear down servers, volumes and floating IPs.
//!
//! # Requirements
//!
//! - `openstack` CLI (python-openstackclient) must be installed
//! - Authentication comes from `clouds.yaml` (`--os-cloud`) or the `OS_*`
//!   environment variables
//!
//! # Example
//!
//! ```ignore
//! use envsweep_cloud_openstack::OpenStackProvider;
//! use envsweep_cloud::CloudProvider;
//!
//! let provider = OpenStackProvider::new(Some("lab".to_string()));
//!
//! let auth = provider.check_auth().await?;
//! if !auth.authenticated {
//!     panic!("Not authenticated: {:?}", auth.error);
//! }
//!
//! let instances = provider.list_instances().await?;
//! ```

pub mod error;
pub mod listing;
pub mod openstack;
pub mod provider;

#[cfg(test)]
mod testing;

pub use error::{OpenStackError, Result};
pub use openstack::{CommandOutput, CommandRunner, OpenStackCli, ProcessRunner};
pub use provider::OpenStackProvider;
