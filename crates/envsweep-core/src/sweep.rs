//! Discovery pipeline: filter rules, discovery, plan rules

use crate::discovery::Discoverer;
use crate::error::Result;
use crate::plan::TeardownPlan;
use crate::safety::{SafetyGate, SafetyViolation};
use envsweep_cloud::CloudProvider;

/// Filter as given by the operator
#[derive(Debug, Clone, Default)]
pub struct FilterRequest {
    pub value: String,

    /// Treat `value` as a regular expression
    pub regex: bool,
}

impl FilterRequest {
    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            regex: false,
        }
    }

    pub fn regex(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            regex: true,
        }
    }
}

/// A plan that passed every safety rule
#[derive(Debug, Clone)]
pub struct CheckedPlan {
    pub plan: TeardownPlan,

    /// Overridden rule failures from both phases
    pub warnings: Vec<SafetyViolation>,
}

/// Run the filter rules, discover, then run the plan rules.
///
/// Nothing is queried when the filter rules fail.
pub async fn plan_teardown(
    provider: &dyn CloudProvider,
    gate: &SafetyGate,
    request: &FilterRequest,
) -> Result<CheckedPlan> {
    let checked = gate.check_filter(&request.value, request.regex)?;
    let mut warnings = checked.warnings;

    let plan = Discoverer::new(provider).discover(&checked.filter).await?;
    warnings.extend(gate.check_plan(&plan)?);

    Ok(CheckedPlan { plan, warnings })
}
