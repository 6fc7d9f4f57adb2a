//! Error types for envsweep-core

use crate::safety::SafetyViolation;
use envsweep_cloud::CloudError;
use thiserror::Error;

/// Errors that stop a teardown run
///
/// Per-resource deletion failures are not errors here: they are recorded in
/// the [`envsweep_cloud::TeardownReport`] and the run goes on.
#[derive(Error, Debug)]
pub enum SweepError {
    #[error("Safety check failed: {0}")]
    Configuration(#[from] SafetyViolation),

    #[error("Invalid filter pattern '{pattern}': {reason}")]
    InvalidFilter { pattern: String, reason: String },

    #[error("Discovery failed: {0}")]
    Discovery(#[from] CloudError),

    #[error("Prompt failed: {0}")]
    Prompt(#[from] std::io::Error),
}

impl SweepError {
    /// Whether this error is an operator configuration problem
    /// (as opposed to a provider failure)
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            SweepError::Configuration(_) | SweepError::InvalidFilter { .. }
        )
    }
}

/// Guest deregistration errors (always absorbed by the sequencer)
#[derive(Error, Debug)]
pub enum GuestError {
    #[error("Failed to run ssh: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("Deregistration on {address} failed ({status}): {stderr}")]
    CommandFailed {
        address: String,
        status: String,
        stderr: String,
    },
}

pub type Result<T> = std::result::Result<T, SweepError>;
