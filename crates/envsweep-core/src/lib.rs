//! envsweep core
//!
//! Environment-scoped teardown: everything between the provider abstraction
//! and the command line.
//!
//! ```text
//! Discoverer → SafetyGate → image check → ConfirmationGate → TeardownSequencer
//! ```
//!
//! # Example
//!
//! ```ignore
//! use envsweep_core::{FilterRequest, SafetyGate, TeardownSequencer, plan_teardown};
//!
//! let checked = plan_teardown(&provider, &SafetyGate::default(), &FilterRequest::literal("abcd1234")).await?;
//! let report = TeardownSequencer::new(&provider).run(&checked.plan).await;
//! println!("{}", report.summary());
//! ```

pub mod confirm;
pub mod discovery;
pub mod error;
pub mod filter;
pub mod guest;
pub mod image;
pub mod plan;
pub mod safety;
pub mod sequencer;
pub mod sweep;

pub use confirm::{ConfirmationGate, GateOutcome, Prompter, render_image_warning, render_summary};
pub use discovery::Discoverer;
pub use error::{GuestError, Result, SweepError};
pub use filter::{EnvironmentFilter, MATCH_EVERYTHING};
pub use guest::{GuestDeregistrar, SshDeregistrar};
pub use image::images_differ;
pub use plan::TeardownPlan;
pub use safety::{FilterCheck, SafetyGate, SafetyOverride, SafetyPolicy, SafetyRule, SafetyViolation};
pub use sequencer::TeardownSequencer;
pub use sweep::{CheckedPlan, FilterRequest, plan_teardown};
