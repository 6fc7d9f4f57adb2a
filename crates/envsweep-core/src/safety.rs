//! Safety gate
//!
//! Four independent rules guard every teardown:
//!
//! 1. the filter is not empty
//! 2. the filter is at least `min_filter_length` characters long
//! 3. at least one instance matched
//! 4. no more than `max_instances` instances matched
//!
//! Rules 1 and 2 run before discovery, rules 3 and 4 after it. Each rule has
//! its own override flag. All rules of a phase are evaluated; overridden
//! failures come back as warnings and the first failure without an override
//! aborts the run.

use crate::error::{Result, SweepError};
use crate::filter::EnvironmentFilter;
use crate::plan::TeardownPlan;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Thresholds applied by the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyPolicy {
    pub min_filter_length: usize,
    pub max_instances: usize,
}

impl Default for SafetyPolicy {
    fn default() -> Self {
        Self {
            min_filter_length: 8,
            max_instances: 6,
        }
    }
}

/// Operator acknowledgments, one per rule
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SafetyOverride {
    pub allow_empty_filter: bool,
    pub allow_short_filter: bool,
    pub allow_no_match: bool,
    pub allow_many_instances: bool,
}

impl SafetyOverride {
    pub fn none() -> Self {
        Self::default()
    }

    /// Every rule overridden (`--force`)
    pub fn all() -> Self {
        Self {
            allow_empty_filter: true,
            allow_short_filter: true,
            allow_no_match: true,
            allow_many_instances: true,
        }
    }

    pub fn permits(&self, rule: SafetyRule) -> bool {
        match rule {
            SafetyRule::FilterNotEmpty => self.allow_empty_filter,
            SafetyRule::FilterLength => self.allow_short_filter,
            SafetyRule::AtLeastOneMatch => self.allow_no_match,
            SafetyRule::MaxInstances => self.allow_many_instances,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SafetyRule {
    FilterNotEmpty,
    FilterLength,
    AtLeastOneMatch,
    MaxInstances,
}

impl SafetyRule {
    /// Command-line flag that overrides this rule
    pub fn override_flag(&self) -> &'static str {
        match self {
            SafetyRule::FilterNotEmpty => "--allow-empty-filter",
            SafetyRule::FilterLength => "--allow-short-filter",
            SafetyRule::AtLeastOneMatch => "--allow-no-match",
            SafetyRule::MaxInstances => "--allow-many-instances",
        }
    }
}

/// A failed safety rule
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SafetyViolation {
    #[error("environment filter is empty (override with --allow-empty-filter)")]
    EmptyFilter,

    #[error(
        "environment filter '{filter}' is {length} characters, shorter than the minimum length of {min} (override with --allow-short-filter)"
    )]
    FilterTooShort {
        filter: String,
        length: usize,
        min: usize,
    },

    #[error("no matching instances for filter '{filter}' (override with --allow-no-match)")]
    NoMatchingInstances { filter: String },

    #[error(
        "matched instance count {count} exceeds maximum of {max} (override with --allow-many-instances)"
    )]
    TooManyInstances { count: usize, max: usize },
}

impl SafetyViolation {
    pub fn rule(&self) -> SafetyRule {
        match self {
            SafetyViolation::EmptyFilter => SafetyRule::FilterNotEmpty,
            SafetyViolation::FilterTooShort { .. } => SafetyRule::FilterLength,
            SafetyViolation::NoMatchingInstances { .. } => SafetyRule::AtLeastOneMatch,
            SafetyViolation::TooManyInstances { .. } => SafetyRule::MaxInstances,
        }
    }
}

/// Filter accepted by the pre-discovery rules
#[derive(Debug, Clone)]
pub struct FilterCheck {
    pub filter: EnvironmentFilter,

    /// Overridden failures
    pub warnings: Vec<SafetyViolation>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SafetyGate {
    policy: SafetyPolicy,
    overrides: SafetyOverride,
}

impl SafetyGate {
    pub fn new(policy: SafetyPolicy, overrides: SafetyOverride) -> Self {
        Self { policy, overrides }
    }

    pub fn policy(&self) -> &SafetyPolicy {
        &self.policy
    }

    pub fn overrides(&self) -> &SafetyOverride {
        &self.overrides
    }

    /// Rules 1 and 2. Builds the filter discovery will use.
    ///
    /// An allowed empty filter is replaced with the match-everything pattern.
    pub fn check_filter(&self, raw: &str, as_regex: bool) -> Result<FilterCheck> {
        let raw = raw.trim();
        let mut violations = Vec::new();

        let filter = if raw.is_empty() {
            violations.push(SafetyViolation::EmptyFilter);
            if !self.overrides.permits(SafetyRule::FilterNotEmpty) {
                return Err(SafetyViolation::EmptyFilter.into());
            }
            EnvironmentFilter::match_everything().map_err(|e| SweepError::InvalidFilter {
                pattern: crate::filter::MATCH_EVERYTHING.to_string(),
                reason: e.to_string(),
            })?
        } else if as_regex {
            EnvironmentFilter::pattern(raw).map_err(|e| SweepError::InvalidFilter {
                pattern: raw.to_string(),
                reason: e.to_string(),
            })?
        } else {
            EnvironmentFilter::literal(raw)
        };

        if filter.len() < self.policy.min_filter_length {
            violations.push(SafetyViolation::FilterTooShort {
                filter: filter.as_str().to_string(),
                length: filter.len(),
                min: self.policy.min_filter_length,
            });
        }

        let warnings = self.settle(violations)?;
        Ok(FilterCheck { filter, warnings })
    }

    /// Rules 3 and 4, against the discovered plan.
    ///
    /// Returns the overridden failures as warnings.
    pub fn check_plan(&self, plan: &TeardownPlan) -> Result<Vec<SafetyViolation>> {
        let count = plan.instance_count();
        let mut violations = Vec::new();

        if count == 0 {
            violations.push(SafetyViolation::NoMatchingInstances {
                filter: plan.filter().to_string(),
            });
        }
        if count > self.policy.max_instances {
            violations.push(SafetyViolation::TooManyInstances {
                count,
                max: self.policy.max_instances,
            });
        }

        self.settle(violations)
    }

    fn settle(&self, violations: Vec<SafetyViolation>) -> Result<Vec<SafetyViolation>> {
        let mut warnings = Vec::new();
        for violation in violations {
            if self.overrides.permits(violation.rule()) {
                tracing::warn!("Safety rule overridden: {}", violation);
                warnings.push(violation);
            } else {
                return Err(violation.into());
            }
        }
        Ok(warnings)
    }
}
