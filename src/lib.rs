//! Monte Carlo engine for delve farming builds.
//!
//! The crate simulates stamina-bounded delve runs for a character build,
//! aggregates batches of runs into rate summaries, and searches the skill
//! allocation space for the build that maximizes a chosen objective. All
//! randomness flows from caller-supplied seeds, so every simulation,
//! batch, and search result is reproducible.

pub mod blocks;
pub mod character;
pub mod core;
pub mod error;
pub mod optimizer;
pub mod pool;
pub mod sim;

pub use character::{resolve_stats, CharacterBuild, DerivedStats};
pub use error::SimError;
pub use optimizer::{optimize, Objective, OptimizerConfig};
pub use pool::SimPool;
pub use sim::{run_batch, simulate_run, SimOptions, StageSummary};
