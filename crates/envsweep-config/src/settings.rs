//! Settings file model
//!
//! Every section and field is optional; missing values take the defaults
//! below.
//!
//! ```yaml
//! safety:
//!   min_filter_length: 8
//!   max_instances: 6
//! detach_wait:
//!   attempts: 5
//!   delay_secs: 10
//! provider:
//!   cli: openstack
//!   cloud: lab
//! guest:
//!   user: cloud-user
//!   command: sudo subscription-manager unregister
//!   identity_file: ~/.ssh/lab
//!   connect_timeout_secs: 10
//! prompt: true
//! deregister_guests: false
//! ```

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub safety: SafetySettings,
    pub detach_wait: DetachWaitSettings,
    pub provider: ProviderSettings,
    pub guest: GuestSettings,

    /// Ask for confirmation before deleting
    pub prompt: bool,

    /// Run the guest deregistration phase
    pub deregister_guests: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            safety: SafetySettings::default(),
            detach_wait: DetachWaitSettings::default(),
            provider: ProviderSettings::default(),
            guest: GuestSettings::default(),
            prompt: true,
            deregister_guests: false,
        }
    }
}

impl Settings {
    pub fn from_yaml(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Reject values no run can work with
    pub fn validate(&self) -> Result<()> {
        if self.provider.cli.trim().is_empty() {
            return Err(ConfigError::Invalid("provider.cli must not be empty".to_string()));
        }
        if self.detach_wait.delay_secs > MAX_DETACH_DELAY_SECS {
            return Err(ConfigError::Invalid(format!(
                "detach_wait.delay_secs must be at most {}",
                MAX_DETACH_DELAY_SECS
            )));
        }
        if self.deregister_guests && self.guest.command.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "guest.command must not be empty when deregister_guests is enabled".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetySettings {
    pub min_filter_length: usize,
    pub max_instances: usize,
}

impl Default for SafetySettings {
    fn default() -> Self {
        Self {
            min_filter_length: 8,
            max_instances: 6,
        }
    }
}

/// Upper bound for the delay between two detach checks
pub const MAX_DETACH_DELAY_SECS: u64 = 3600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetachWaitSettings {
    pub attempts: u32,
    pub delay_secs: u64,
}

impl DetachWaitSettings {
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }
}

impl Default for DetachWaitSettings {
    fn default() -> Self {
        Self {
            attempts: 5,
            delay_secs: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Path or name of the openstack CLI
    pub cli: String,

    /// clouds.yaml entry passed as `--os-cloud`
    pub cloud: Option<String>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            cli: "openstack".to_string(),
            cloud: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuestSettings {
    pub user: String,
    pub command: String,
    pub identity_file: Option<PathBuf>,
    pub connect_timeout_secs: u64,
}

impl GuestSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for GuestSettings {
    fn default() -> Self {
        Self {
            user: "cloud-user".to_string(),
            command: "sudo subscription-manager unregister".to_string(),
            identity_file: None,
            connect_timeout_secs: 10,
        }
    }
}
