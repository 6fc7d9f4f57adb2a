use crate::TeardownArgs;
use crate::prompt::TerminalPrompter;
use colored::Colorize;
use envsweep_cloud::{
    CloudProvider, DetachOutcome, DetachWaitPolicy, ResourceKind, ResourceStatus, TeardownReport,
};
use envsweep_config::Settings;
use envsweep_core::{
    ConfirmationGate, FilterRequest, GateOutcome, SafetyGate, SafetyOverride, SafetyPolicy,
    SshDeregistrar, TeardownSequencer, plan_teardown,
};

fn safety_gate(args: &TeardownArgs, settings: &Settings) -> SafetyGate {
    let policy = SafetyPolicy {
        min_filter_length: args
            .min_filter_length
            .unwrap_or(settings.safety.min_filter_length),
        max_instances: args.max_instances.unwrap_or(settings.safety.max_instances),
    };

    let overrides = if args.force {
        SafetyOverride::all()
    } else {
        SafetyOverride {
            allow_empty_filter: args.allow_empty_filter,
            allow_short_filter: args.allow_short_filter,
            allow_no_match: args.allow_no_match,
            allow_many_instances: args.allow_many_instances,
        }
    };

    SafetyGate::new(policy, overrides)
}

fn ssh_deregistrar(settings: &Settings) -> SshDeregistrar {
    let guest = &settings.guest;
    let deregistrar = SshDeregistrar::new(guest.user.clone(), guest.command.clone())
        .with_connect_timeout(guest.connect_timeout());
    match &guest.identity_file {
        Some(path) => deregistrar.with_identity_file(path.clone()),
        None => deregistrar,
    }
}

pub async fn handle(args: TeardownArgs, settings: Settings) -> anyhow::Result<()> {
    let provider = super::build_provider(&settings, args.cloud.clone());
    let gate = safety_gate(&args, &settings);
    let request = FilterRequest {
        value: args.filter.clone(),
        regex: args.regex,
    };

    if args.dry_run {
        println!("{}", "Dry run: nothing will be deleted".cyan().bold());
    }
    println!(
        "{}",
        format!(
            "Discovering resources on {}...",
            provider.display_name()
        )
        .blue()
    );

    let checked = plan_teardown(&provider, &gate, &request).await?;
    for warning in &checked.warnings {
        println!("  {} {}", "⚠".yellow(), warning.to_string().yellow());
    }
    println!();

    let prompt = settings.prompt && !args.yes;
    let outcome =
        ConfirmationGate::new(args.dry_run, prompt).decide(&checked.plan, &mut TerminalPrompter)?;

    match outcome {
        GateOutcome::Cancelled => {
            println!("{}", "Cancelled. Nothing was deleted.".yellow());
            Ok(())
        }
        GateOutcome::DryRun => {
            let report = TeardownSequencer::new(&provider).dry_run(&checked.plan);
            print_report(&report);
            Ok(())
        }
        GateOutcome::Proceed => {
            let deregistrar = ssh_deregistrar(&settings);
            let mut sequencer = TeardownSequencer::new(&provider).with_detach_wait(
                DetachWaitPolicy::new(
                    settings.detach_wait.attempts,
                    settings.detach_wait.delay(),
                ),
            );
            if settings.deregister_guests || args.deregister_guests {
                sequencer = sequencer.with_guest_deregistration(&deregistrar);
            }

            println!("{}", "Tearing down...".yellow().bold());
            let report = sequencer.run(&checked.plan).await;
            print_report(&report);
            Ok(())
        }
    }
}

fn print_kind(report: &TeardownReport, kind: ResourceKind, title: &str) {
    let outcomes = report.outcomes_of(kind);
    if outcomes.is_empty() {
        return;
    }

    println!();
    println!("{}", format!("{} ({}):", title, outcomes.len()).bold());
    for outcome in outcomes {
        match outcome.status {
            ResourceStatus::Deleted => println!("  ✓ {}", outcome.id),
            ResourceStatus::DeletionFailed => println!(
                "  {} {}: {}",
                "⚠".yellow(),
                outcome.id,
                outcome.error.as_deref().unwrap_or("unknown error")
            ),
            ResourceStatus::Discovered => println!("  • {} (would delete)", outcome.id.cyan()),
            ResourceStatus::DeletionRequested => println!("  … {}", outcome.id),
        }
    }
}

fn print_report(report: &TeardownReport) {
    print_kind(report, ResourceKind::Instance, "Instances");

    if !report.detach_waits.is_empty() {
        println!();
        println!("{}", "Volume detach:".bold());
        for wait in &report.detach_waits {
            match wait.outcome {
                DetachOutcome::Detached { attempts } => {
                    println!("  ✓ {} detached ({} checks)", wait.volume_id, attempts)
                }
                DetachOutcome::StillInUse { attempts } => println!(
                    "  {} {} still in use after {} checks",
                    "⚠".yellow(),
                    wait.volume_id,
                    attempts
                ),
            }
        }
    }

    print_kind(report, ResourceKind::Volume, "Volumes");
    print_kind(report, ResourceKind::FloatingIp, "Floating IPs");

    if report.guests_deregistered + report.guest_failures > 0 {
        println!();
        println!(
            "  ℹ Guests deregistered: {} ({} failed, ignored)",
            report.guests_deregistered, report.guest_failures
        );
    }
    if report.floating_ips_skipped {
        println!();
        println!("  ℹ Floating IPs are not applicable (legacy networking)");
    }

    println!();
    if report.dry_run {
        println!("{}", "Dry run complete. Nothing was deleted.".green().bold());
    } else if report.is_success() {
        println!("{}", format!("✓ {}", report.summary()).green().bold());
    } else {
        println!("{}", format!("⚠ {}", report.summary()).yellow().bold());
    }

    if !report.dry_run {
        println!(
            "{}",
            format!("  elapsed: {:.1}s", report.duration_ms as f64 / 1000.0).dimmed()
        );
    }
}
