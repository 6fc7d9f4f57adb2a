//! envsweep Cloud Infrastructure
//!
//! This crate provides the provider abstraction for envsweep: the resource
//! model every backend maps its listings into, and the outcome types the
//! teardown sequencer records.
//!
//! # Supported Providers
//!
//! - **OpenStack**: Servers, Volumes, Floating IPs (via openstack CLI)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                  envsweep CLI                    │
//! │             (envsweep teardown <env>)            │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                envsweep-core                     │
//! │  discover → safety → images → confirm → teardown │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │               envsweep-cloud                     │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │          Provider Abstraction             │   │
//! │  │  trait CloudProvider { ... }              │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────┐            │
//! │  │  Resources   │  │   Reports    │            │
//! │  └──────────────┘  └──────────────┘            │
//! └───────┬─────────────────────────────────────────┘
//!         │
//! ┌───────▼───────┐
//! │   openstack   │
//! │   provider    │
//! └───────────────┘
//! ```

pub mod error;
pub mod model;
pub mod provider;
pub mod report;

// Re-exports
pub use error::{CloudError, Result};
pub use model::{
    FloatingIp, FloatingIps, Instance, ResourceSet, Volume, VolumeStatus, split_list,
};
pub use provider::{AuthStatus, CloudProvider, DetachWaitPolicy, NetworkingMode};
pub use report::{
    DetachOutcome, DetachWait, ReportSummary, ResourceKind, ResourceOutcome, ResourceStatus,
    TeardownReport,
};
