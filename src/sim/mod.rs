//! Monte Carlo delve simulator.
//!
//! Simulate many runs of a derived-stat build to measure:
//! - Floors cleared per run and where runs stall
//! - XP and fragment income rates
//! - Ability uptime effects and stamina economy
//!
//! A single run is a pure function of its inputs and RNG, so batches
//! reproduce exactly for a fixed seed.

mod abilities;
mod aggregate;
mod config;
mod report;
mod run;

pub use abilities::AbilityStates;
pub use aggregate::{run_batch, FragmentSummary, RunSample, StageSummary};
pub use config::SimOptions;
pub use report::SimReport;
pub use run::{simulate_run, RunMetrics};
