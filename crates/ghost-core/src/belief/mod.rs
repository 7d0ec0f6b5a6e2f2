//! Posterior distribution over the hidden target cell.
//!
//! This module is composed of:
//! - `state`: the normalized `BeliefState` and its Bayes update.
//! - `telemetry`: summary metrics derived from a belief for logging and benchmarks.

mod state;
pub mod telemetry;

pub use state::{BeliefState, NORMALIZATION_TOLERANCE, UpdateOutcome};
pub use telemetry::BeliefMetrics;
