//! Teardown outcome types
//!
//! Every resource moves forward through
//! `Discovered → DeletionRequested → (Deleted | DeletionFailed)`.
//! There is no rollback state.

use serde::{Deserialize, Serialize};

/// Kind of resource handled by the teardown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    Instance,
    Volume,
    FloatingIp,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKind::Instance => write!(f, "instance"),
            ResourceKind::Volume => write!(f, "volume"),
            ResourceKind::FloatingIp => write!(f, "floating-ip"),
        }
    }
}

/// Lifecycle state of a single resource during teardown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceStatus {
    Discovered,
    DeletionRequested,
    Deleted,
    DeletionFailed,
}

impl ResourceStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ResourceStatus::Deleted | ResourceStatus::DeletionFailed)
    }
}

impl std::fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceStatus::Discovered => write!(f, "discovered"),
            ResourceStatus::DeletionRequested => write!(f, "deletion requested"),
            ResourceStatus::Deleted => write!(f, "deleted"),
            ResourceStatus::DeletionFailed => write!(f, "deletion failed"),
        }
    }
}

/// Outcome of a single resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceOutcome {
    pub kind: ResourceKind,
    pub id: String,
    pub status: ResourceStatus,

    /// Error message if the deletion failed
    pub error: Option<String>,
}

impl ResourceOutcome {
    pub fn discovered(kind: ResourceKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
            status: ResourceStatus::Discovered,
            error: None,
        }
    }

    /// `Discovered → DeletionRequested`. No-op from any later state.
    pub fn request_deletion(mut self) -> Self {
        if self.status == ResourceStatus::Discovered {
            self.status = ResourceStatus::DeletionRequested;
        }
        self
    }

    /// `DeletionRequested → Deleted | DeletionFailed`. No-op from any other state.
    pub fn complete<E: std::fmt::Display>(mut self, result: Result<(), E>) -> Self {
        if self.status != ResourceStatus::DeletionRequested {
            return self;
        }
        match result {
            Ok(()) => self.status = ResourceStatus::Deleted,
            Err(e) => {
                self.status = ResourceStatus::DeletionFailed;
                self.error = Some(e.to_string());
            }
        }
        self
    }
}

/// How a volume's detach wait ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum DetachOutcome {
    /// The volume left `in-use` (or disappeared) after `attempts` checks
    Detached { attempts: u32 },
    /// Still `in-use` after every attempt; teardown went on regardless
    StillInUse { attempts: u32 },
}

impl DetachOutcome {
    pub fn is_detached(&self) -> bool {
        matches!(self, DetachOutcome::Detached { .. })
    }
}

/// Detach wait record of one volume
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetachWait {
    pub volume_id: String,
    pub outcome: DetachOutcome,
}

/// Result of a teardown run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeardownReport {
    /// Whether this was a dry run (no mutating calls issued)
    pub dry_run: bool,

    /// Guests successfully deregistered
    pub guests_deregistered: usize,

    /// Guests whose deregistration failed (ignored)
    pub guest_failures: usize,

    /// Per-resource outcomes, in the order deletions were issued
    pub outcomes: Vec<ResourceOutcome>,

    /// Detach wait results
    pub detach_waits: Vec<DetachWait>,

    /// Floating-IP release was skipped because the provider has no
    /// floating IPs here. Not a failure.
    pub floating_ips_skipped: bool,

    /// Total execution time in milliseconds
    pub duration_ms: u64,
}

impl TeardownReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dry_run() -> Self {
        Self {
            dry_run: true,
            ..Self::default()
        }
    }

    pub fn record(&mut self, outcome: ResourceOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn record_detach(&mut self, volume_id: impl Into<String>, outcome: DetachOutcome) {
        self.detach_waits.push(DetachWait {
            volume_id: volume_id.into(),
            outcome,
        });
    }

    /// Whether every requested deletion succeeded
    pub fn is_success(&self) -> bool {
        self.outcomes
            .iter()
            .all(|o| o.status != ResourceStatus::DeletionFailed)
    }

    pub fn deleted(&self, kind: ResourceKind) -> usize {
        self.count(kind, ResourceStatus::Deleted)
    }

    pub fn failed(&self, kind: ResourceKind) -> usize {
        self.count(kind, ResourceStatus::DeletionFailed)
    }

    /// Outcomes of one kind
    pub fn outcomes_of(&self, kind: ResourceKind) -> Vec<&ResourceOutcome> {
        self.outcomes.iter().filter(|o| o.kind == kind).collect()
    }

    fn count(&self, kind: ResourceKind, status: ResourceStatus) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.kind == kind && o.status == status)
            .count()
    }

    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            instances_deleted: self.deleted(ResourceKind::Instance),
            instances_failed: self.failed(ResourceKind::Instance),
            volumes_deleted: self.deleted(ResourceKind::Volume),
            volumes_failed: self.failed(ResourceKind::Volume),
            volumes_still_in_use: self
                .detach_waits
                .iter()
                .filter(|w| !w.outcome.is_detached())
                .count(),
            floating_ips_released: self.deleted(ResourceKind::FloatingIp),
            floating_ips_failed: self.failed(ResourceKind::FloatingIp),
            floating_ips_skipped: self.floating_ips_skipped,
        }
    }
}

/// Counts of a teardown run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSummary {
    pub instances_deleted: usize,
    pub instances_failed: usize,
    pub volumes_deleted: usize,
    pub volumes_failed: usize,
    pub volumes_still_in_use: usize,
    pub floating_ips_released: usize,
    pub floating_ips_failed: usize,
    pub floating_ips_skipped: bool,
}

impl std::fmt::Display for ReportSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} instances deleted ({} failed), {} volumes deleted ({} failed)",
            self.instances_deleted, self.instances_failed, self.volumes_deleted, self.volumes_failed
        )?;
        if self.floating_ips_skipped {
            write!(f, ", floating IPs not applicable")
        } else {
            write!(
                f,
                ", {} floating IPs released ({} failed)",
                self.floating_ips_released, self.floating_ips_failed
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_moves_forward_only() {
        let outcome = ResourceOutcome::discovered(ResourceKind::Instance, "i-1");
        assert_eq!(outcome.status, ResourceStatus::Discovered);

        // completing before the deletion was requested does nothing
        let outcome = outcome.complete::<String>(Ok(()));
        assert_eq!(outcome.status, ResourceStatus::Discovered);

        let outcome = outcome.request_deletion();
        assert_eq!(outcome.status, ResourceStatus::DeletionRequested);

        let outcome = outcome.complete(Err("boom"));
        assert_eq!(outcome.status, ResourceStatus::DeletionFailed);
        assert_eq!(outcome.error.as_deref(), Some("boom"));
        assert!(outcome.status.is_terminal());

        let outcome = outcome.request_deletion().complete::<String>(Ok(()));
        assert_eq!(outcome.status, ResourceStatus::DeletionFailed);
    }

    #[test]
    fn test_report_summary() {
        let mut report = TeardownReport::new();
        report.record(
            ResourceOutcome::discovered(ResourceKind::Instance, "i-1")
                .request_deletion()
                .complete::<String>(Ok(())),
        );
        report.record(
            ResourceOutcome::discovered(ResourceKind::Instance, "i-2")
                .request_deletion()
                .complete(Err("conflict")),
        );
        report.record(
            ResourceOutcome::discovered(ResourceKind::Volume, "v-1")
                .request_deletion()
                .complete::<String>(Ok(())),
        );
        report.record_detach("v-1", DetachOutcome::StillInUse { attempts: 5 });
        report.floating_ips_skipped = true;

        assert!(!report.is_success());
        let summary = report.summary();
        assert_eq!(summary.instances_deleted, 1);
        assert_eq!(summary.instances_failed, 1);
        assert_eq!(summary.volumes_deleted, 1);
        assert_eq!(summary.volumes_still_in_use, 1);
        assert_eq!(
            summary.to_string(),
            "1 instances deleted (1 failed), 1 volumes deleted (0 failed), floating IPs not applicable"
        );
    }
}
