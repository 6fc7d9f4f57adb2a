//! Teardown sequencer
//!
//! Deletes a [`TeardownPlan`] in dependency order. Each phase is a barrier:
//! the next one starts only after every call of the current one returned.
//!
//! 1. guest deregistration (optional)
//! 2. instance termination
//! 3. volume detach wait
//! 4. volume deletion
//! 5. floating-IP release (advanced networking only)
//!
//! Calls of the same kind run concurrently. A failed call is recorded in the
//! report and never stops the run.

use crate::guest::GuestDeregistrar;
use crate::plan::TeardownPlan;
use envsweep_cloud::{
    CloudProvider, DetachOutcome, DetachWaitPolicy, FloatingIps, ResourceKind, ResourceOutcome,
    TeardownReport,
};
use futures_util::future::join_all;
use std::time::Instant;
use tokio::time::sleep;

pub struct TeardownSequencer<'a> {
    provider: &'a dyn CloudProvider,
    guests: Option<&'a dyn GuestDeregistrar>,
    detach_wait: DetachWaitPolicy,
}

impl<'a> TeardownSequencer<'a> {
    pub fn new(provider: &'a dyn CloudProvider) -> Self {
        Self {
            provider,
            guests: None,
            detach_wait: DetachWaitPolicy::default(),
        }
    }

    /// Enable phase 1
    pub fn with_guest_deregistration(mut self, guests: &'a dyn GuestDeregistrar) -> Self {
        self.guests = Some(guests);
        self
    }

    pub fn with_detach_wait(mut self, policy: DetachWaitPolicy) -> Self {
        self.detach_wait = policy;
        self
    }

    /// Report what a run would delete. Issues no calls at all.
    pub fn dry_run(&self, plan: &TeardownPlan) -> TeardownReport {
        let mut report = TeardownReport::dry_run();
        for instance in plan.instances() {
            report.record(ResourceOutcome::discovered(ResourceKind::Instance, &instance.id));
        }
        for volume in plan.volumes() {
            report.record(ResourceOutcome::discovered(ResourceKind::Volume, &volume.id));
        }
        for fip in plan.floating_ips().iter() {
            report.record(ResourceOutcome::discovered(ResourceKind::FloatingIp, &fip.id));
        }
        report.floating_ips_skipped = !plan.floating_ips().is_applicable();
        report
    }

    pub async fn run(&self, plan: &TeardownPlan) -> TeardownReport {
        let started = Instant::now();
        let mut report = TeardownReport::new();

        self.deregister_guests(plan, &mut report).await;
        self.terminate_instances(plan, &mut report).await;
        self.wait_for_detach(plan, &mut report).await;
        self.delete_volumes(plan, &mut report).await;
        self.release_floating_ips(plan, &mut report).await;

        report.duration_ms = started.elapsed().as_millis() as u64;
        tracing::info!("Teardown finished: {}", report.summary());
        report
    }

    async fn deregister_guests(&self, plan: &TeardownPlan, report: &mut TeardownReport) {
        let Some(guests) = self.guests else {
            return;
        };

        let reachable: Vec<(&str, &str)> = plan
            .instances()
            .iter()
            .filter_map(|i| match i.public_ip.as_deref() {
                Some(ip) => Some((i.id.as_str(), ip)),
                None => {
                    tracing::debug!("{} has no reachable address, skipping deregistration", i.id);
                    None
                }
            })
            .collect();

        tracing::info!("Phase 1: deregistering {} guests", reachable.len());
        let results = join_all(reachable.iter().map(|(_, ip)| guests.deregister(ip))).await;

        for ((id, ip), result) in reachable.iter().zip(results) {
            match result {
                Ok(()) => report.guests_deregistered += 1,
                Err(e) => {
                    tracing::warn!("Deregistration of {} ({}) failed, ignoring: {}", id, ip, e);
                    report.guest_failures += 1;
                }
            }
        }
    }

    async fn terminate_instances(&self, plan: &TeardownPlan, report: &mut TeardownReport) {
        tracing::info!("Phase 2: deleting {} instances", plan.instance_count());
        let ids: Vec<&str> = plan.instances().iter().map(|i| i.id.as_str()).collect();
        self.delete_all(ResourceKind::Instance, &ids, report).await;
    }

    async fn wait_for_detach(&self, plan: &TeardownPlan, report: &mut TeardownReport) {
        if plan.volumes().is_empty() {
            return;
        }
        tracing::info!(
            "Phase 3: waiting for {} volumes to detach (up to {:?})",
            plan.volume_count(),
            self.detach_wait.max_wait()
        );

        let outcomes = join_all(plan.volumes().iter().map(|v| self.wait_until_detached(&v.id))).await;
        for (volume, outcome) in plan.volumes().iter().zip(outcomes) {
            if !outcome.is_detached() {
                tracing::warn!("Volume {} is still in use, deleting anyway", volume.id);
            }
            report.record_detach(&volume.id, outcome);
        }
    }

    /// Poll one volume until it leaves `in-use`. A volume that no longer
    /// exists counts as detached.
    async fn wait_until_detached(&self, volume_id: &str) -> DetachOutcome {
        let attempts = self.detach_wait.attempts;
        for attempt in 1..=attempts {
            match self.provider.show_volume(volume_id).await {
                Ok(volume) if !volume.status.is_in_use() => {
                    tracing::debug!("Volume {} is {} after {} checks", volume_id, volume.status, attempt);
                    return DetachOutcome::Detached { attempts: attempt };
                }
                Ok(_) => {}
                Err(e) if e.is_not_found() => return DetachOutcome::Detached { attempts: attempt },
                Err(e) => tracing::debug!("Checking volume {} failed: {}", volume_id, e),
            }

            if attempt < attempts {
                sleep(self.detach_wait.delay).await;
            }
        }
        DetachOutcome::StillInUse { attempts }
    }

    async fn delete_volumes(&self, plan: &TeardownPlan, report: &mut TeardownReport) {
        tracing::info!("Phase 4: deleting {} volumes", plan.volume_count());
        let ids: Vec<&str> = plan.volumes().iter().map(|v| v.id.as_str()).collect();
        self.delete_all(ResourceKind::Volume, &ids, report).await;
    }

    async fn release_floating_ips(&self, plan: &TeardownPlan, report: &mut TeardownReport) {
        match plan.floating_ips() {
            FloatingIps::NotApplicable => {
                tracing::info!("Phase 5: skipped, floating IPs are not applicable");
                report.floating_ips_skipped = true;
            }
            FloatingIps::Resolved(fips) => {
                tracing::info!("Phase 5: releasing {} floating IPs", fips.len());
                let ids: Vec<&str> = fips.iter().map(|f| f.id.as_str()).collect();
                self.delete_all(ResourceKind::FloatingIp, &ids, report).await;
            }
        }
    }

    /// Issue one deletion per ID concurrently and record every outcome
    async fn delete_all(&self, kind: ResourceKind, ids: &[&str], report: &mut TeardownReport) {
        let pending: Vec<ResourceOutcome> = ids
            .iter()
            .map(|id| ResourceOutcome::discovered(kind, *id).request_deletion())
            .collect();

        let results = join_all(ids.iter().map(|id| async move {
            match kind {
                ResourceKind::Instance => self.provider.delete_instance(id).await,
                ResourceKind::Volume => self.provider.delete_volume(id).await,
                ResourceKind::FloatingIp => self.provider.release_floating_ip(id).await,
            }
        }))
        .await;

        for (outcome, result) in pending.into_iter().zip(results) {
            if let Err(e) = &result {
                tracing::warn!("Deleting {} {} failed, continuing: {}", kind, outcome.id, e);
            }
            report.record(outcome.complete(result));
        }
    }
}
