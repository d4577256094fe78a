//! Skill allocation search over the worker pool.

mod allocation;
mod ranking;
mod search;

pub use allocation::{
    perturb_allocation, repair_allocation, sample_allocation, AllocationConstraints,
};
pub use ranking::{compare_metrics, select_best, tie_epsilon, MetricTuple, Objective, TieBands};
pub use search::{optimize, OptimizationOutcome, OptimizerConfig};
