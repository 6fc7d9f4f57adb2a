//! Cloud provider trait definition

use crate::error::Result;
use crate::model::{FloatingIp, Instance, Volume};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Cloud provider abstraction trait
///
/// Query methods are read-only. `delete_instance`, `delete_volume` and
/// `release_floating_ip` are the only calls that mutate provider state.
#[async_trait]
pub trait CloudProvider: Send + Sync {
    /// Returns the provider name (e.g., "openstack")
    fn name(&self) -> &str;

    /// Returns the provider display name for UI
    fn display_name(&self) -> &str;

    /// Check if the provider is properly configured and authenticated
    async fn check_auth(&self) -> Result<AuthStatus>;

    /// List every instance visible to the credentials.
    ///
    /// The image reference may be left unresolved; see [`Self::show_instance`].
    async fn list_instances(&self) -> Result<Vec<Instance>>;

    /// Fetch the full detail of one instance, including its image reference
    async fn show_instance(&self, id: &str) -> Result<Instance>;

    /// List every volume with its attachment state
    async fn list_volumes(&self) -> Result<Vec<Volume>>;

    /// Fetch the current state of one volume
    async fn show_volume(&self, id: &str) -> Result<Volume>;

    /// Probe for the advanced networking subsystem. Never fails: an
    /// unreachable or missing networking service reports `Legacy`.
    async fn probe_networking(&self) -> NetworkingMode;

    /// List floating IPs (only meaningful in `Advanced` networking mode)
    async fn list_floating_ips(&self) -> Result<Vec<FloatingIp>>;

    /// Terminate an instance
    async fn delete_instance(&self, id: &str) -> Result<()>;

    /// Delete a volume
    async fn delete_volume(&self, id: &str) -> Result<()>;

    /// Release a floating IP back to the pool
    async fn release_floating_ip(&self, id: &str) -> Result<()>;
}

/// Networking capability reported by [`CloudProvider::probe_networking`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkingMode {
    /// Software-defined networking with floating IPs
    Advanced,
    /// Legacy networking, no floating-IP concept
    Legacy,
}

impl NetworkingMode {
    pub fn is_advanced(&self) -> bool {
        matches!(self, NetworkingMode::Advanced)
    }
}

impl std::fmt::Display for NetworkingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkingMode::Advanced => write!(f, "advanced"),
            NetworkingMode::Legacy => write!(f, "legacy"),
        }
    }
}

/// Authentication status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthStatus {
    /// Whether authentication is valid
    pub authenticated: bool,

    /// Account/project information if available
    pub account_info: Option<String>,

    /// Error message if not authenticated
    pub error: Option<String>,
}

impl AuthStatus {
    pub fn ok(account_info: impl Into<String>) -> Self {
        Self {
            authenticated: true,
            account_info: Some(account_info.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            authenticated: false,
            account_info: None,
            error: Some(error.into()),
        }
    }
}

/// Polling policy for the volume detach wait
///
/// Fixed delay between attempts; the total wait never exceeds
/// `attempts * delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetachWaitPolicy {
    /// Maximum number of state checks per volume
    pub attempts: u32,

    /// Delay between two checks
    pub delay: Duration,
}

impl DetachWaitPolicy {
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self { attempts, delay }
    }

    /// Upper bound of the time spent waiting on one volume
    pub fn max_wait(&self) -> Duration {
        self.delay.saturating_mul(self.attempts)
    }
}

impl Default for DetachWaitPolicy {
    fn default() -> Self {
        Self {
            attempts: 5,
            delay: Duration::from_secs(10),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detach_wait_defaults() {
        let policy = DetachWaitPolicy::default();
        assert_eq!(policy.attempts, 5);
        assert_eq!(policy.delay, Duration::from_secs(10));
        assert_eq!(policy.max_wait(), Duration::from_secs(50));
    }

    #[test]
    fn test_detach_wait_max_wait_saturates() {
        let policy = DetachWaitPolicy::new(u32::MAX, Duration::from_secs(u64::MAX));
        assert_eq!(policy.max_wait(), Duration::MAX);
    }

    #[test]
    fn test_auth_status() {
        let ok = AuthStatus::ok("demo (project-1)");
        assert!(ok.authenticated);
        assert!(ok.error.is_none());

        let failed = AuthStatus::failed("token expired");
        assert!(!failed.authenticated);
        assert_eq!(failed.error.as_deref(), Some("token expired"));
    }
}
