//! Confirmation gate
//!
//! Decides whether the run may go on after the operator has seen the plan.
//! The terminal itself is behind the [`Prompter`] trait.

use crate::error::Result;
use crate::plan::TeardownPlan;
use std::fmt::Write as _;

/// Result of the confirmation gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    /// Operator approved (or prompting is disabled)
    Proceed,
    /// Operator declined; nothing was touched
    Cancelled,
    /// Report only
    DryRun,
}

/// Operator interaction
pub trait Prompter {
    /// Show text to the operator
    fn show(&mut self, text: &str) -> std::io::Result<()>;

    /// Ask a yes/no question. `true` means approved.
    fn confirm(&mut self, question: &str) -> std::io::Result<bool>;
}

/// Render the plan as a deterministic, human-reviewable summary
pub fn render_summary(plan: &TeardownPlan) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Environment filter: {}", plan.filter());
    let _ = writeln!(out);

    let _ = writeln!(out, "Instances ({}):", plan.instance_count());
    for instance in plan.instances() {
        let _ = writeln!(
            out,
            "  • {} {} ip={} image={}",
            instance.id,
            instance.name,
            instance.public_ip.as_deref().unwrap_or("-"),
            instance.image.as_deref().unwrap_or("-")
        );
    }

    let _ = writeln!(out, "Volumes ({}):", plan.volume_count());
    for volume in plan.volumes() {
        let name = if volume.name.is_empty() { "-" } else { volume.name.as_str() };
        let _ = writeln!(
            out,
            "  • {} {} attached_to={}",
            volume.id,
            name,
            volume.attached_to.join(",")
        );
    }

    match plan.floating_ip_count() {
        Some(count) => {
            let _ = writeln!(out, "Floating IPs ({}):", count);
            for fip in plan.floating_ips().iter() {
                let _ = writeln!(
                    out,
                    "  • {} {} fixed={}",
                    fip.id,
                    fip.floating_address,
                    fip.fixed_address.as_deref().unwrap_or("-")
                );
            }
        }
        None => {
            let _ = writeln!(out, "Floating IPs: not applicable (legacy networking)");
        }
    }

    let images = plan.images();
    let _ = writeln!(
        out,
        "Images: {}",
        if images.is_empty() {
            "-".to_string()
        } else {
            images.join(", ")
        }
    );

    out
}

/// Warning shown when the matched instances come from different images
pub fn render_image_warning(plan: &TeardownPlan) -> Option<String> {
    if !plan.images_differ() {
        return None;
    }
    Some(format!(
        "WARNING: matched instances were built from different images ({}). \
         The filter may span more than one environment.",
        plan.images().join(", ")
    ))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationGate {
    dry_run: bool,
    prompt: bool,
}

impl ConfirmationGate {
    pub fn new(dry_run: bool, prompt: bool) -> Self {
        Self { dry_run, prompt }
    }

    /// Show the plan and decide.
    ///
    /// With prompting enabled the image warning needs its own approval before
    /// the summary is shown. Dry runs never prompt and never proceed.
    pub fn decide(&self, plan: &TeardownPlan, prompter: &mut dyn Prompter) -> Result<GateOutcome> {
        if let Some(warning) = render_image_warning(plan) {
            prompter.show(&warning)?;
            if self.prompt
                && !self.dry_run
                && !prompter.confirm("Continue with instances from different images?")?
            {
                tracing::info!("Cancelled at the image warning");
                return Ok(GateOutcome::Cancelled);
            }
        }

        prompter.show(&render_summary(plan))?;

        if self.dry_run {
            return Ok(GateOutcome::DryRun);
        }
        if !self.prompt {
            return Ok(GateOutcome::Proceed);
        }

        if prompter.confirm("Delete these resources? This cannot be undone.")? {
            Ok(GateOutcome::Proceed)
        } else {
            tracing::info!("Cancelled by operator");
            Ok(GateOutcome::Cancelled)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use envsweep_cloud::{FloatingIps, Instance, NetworkingMode, ResourceSet};
    use std::collections::VecDeque;

    #[derive(Default)]
    struct ScriptedPrompter {
        answers: VecDeque<bool>,
        shown: Vec<String>,
        questions: Vec<String>,
    }

    impl ScriptedPrompter {
        fn answering(answers: &[bool]) -> Self {
            Self {
                answers: answers.iter().copied().collect(),
                ..Default::default()
            }
        }
    }

    impl Prompter for ScriptedPrompter {
        fn show(&mut self, text: &str) -> std::io::Result<()> {
            self.shown.push(text.to_string());
            Ok(())
        }

        fn confirm(&mut self, question: &str) -> std::io::Result<bool> {
            self.questions.push(question.to_string());
            Ok(self.answers.pop_front().unwrap_or(false))
        }
    }

    fn plan(images: &[&str]) -> TeardownPlan {
        let instances: ResourceSet<Instance> = images
            .iter()
            .enumerate()
            .map(|(i, image)| {
                Instance::new(format!("srv-{}", i), format!("abcd1234-{}", i)).with_image(*image)
            })
            .collect();
        TeardownPlan::new(
            "abcd1234",
            instances,
            ResourceSet::new(),
            FloatingIps::NotApplicable,
            NetworkingMode::Legacy,
        )
    }

    #[test]
    fn test_summary_is_deterministic() {
        let plan = plan(&["img-A", "img-A"]);
        let summary = render_summary(&plan);
        assert_eq!(summary, render_summary(&plan));
        assert!(summary.contains("Instances (2):"));
        assert!(summary.contains("srv-0 abcd1234-0 ip=- image=img-A"));
        assert!(summary.contains("Floating IPs: not applicable"));
        assert!(summary.contains("Images: img-A"));
    }

    #[test]
    fn test_approval_proceeds() {
        let mut prompter = ScriptedPrompter::answering(&[true]);
        let outcome = ConfirmationGate::new(false, true)
            .decide(&plan(&["img-A"]), &mut prompter)
            .unwrap();
        assert_eq!(outcome, GateOutcome::Proceed);
        assert_eq!(prompter.questions.len(), 1);
    }

    #[test]
    fn test_decline_cancels() {
        let mut prompter = ScriptedPrompter::answering(&[false]);
        let outcome = ConfirmationGate::new(false, true)
            .decide(&plan(&["img-A"]), &mut prompter)
            .unwrap();
        assert_eq!(outcome, GateOutcome::Cancelled);
    }

    #[test]
    fn test_image_warning_needs_its_own_approval() {
        let mut prompter = ScriptedPrompter::answering(&[false]);
        let outcome = ConfirmationGate::new(false, true)
            .decide(&plan(&["img-A", "img-B"]), &mut prompter)
            .unwrap();
        assert_eq!(outcome, GateOutcome::Cancelled);
        assert_eq!(prompter.questions.len(), 1);
        // the summary is never shown after the warning was declined
        assert_eq!(prompter.shown.len(), 1);
        assert!(prompter.shown[0].starts_with("WARNING"));

        let mut prompter = ScriptedPrompter::answering(&[true, true]);
        let outcome = ConfirmationGate::new(false, true)
            .decide(&plan(&["img-A", "img-B"]), &mut prompter)
            .unwrap();
        assert_eq!(outcome, GateOutcome::Proceed);
        assert_eq!(prompter.questions.len(), 2);
    }

    #[test]
    fn test_prompt_disabled_skips_every_question() {
        let mut prompter = ScriptedPrompter::default();
        let outcome = ConfirmationGate::new(false, false)
            .decide(&plan(&["img-A", "img-B"]), &mut prompter)
            .unwrap();
        assert_eq!(outcome, GateOutcome::Proceed);
        assert!(prompter.questions.is_empty());
    }

    #[test]
    fn test_dry_run_never_proceeds() {
        let mut prompter = ScriptedPrompter::answering(&[true, true]);
        let outcome = ConfirmationGate::new(true, true)
            .decide(&plan(&["img-A", "img-B"]), &mut prompter)
            .unwrap();
        assert_eq!(outcome, GateOutcome::DryRun);
        assert!(prompter.questions.is_empty());
        assert_eq!(prompter.shown.len(), 2);
    }
}
