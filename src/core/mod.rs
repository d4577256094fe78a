//! Tuning constants and seeded RNG construction.

pub mod constants;
pub mod rng;

pub use constants::*;
pub use rng::{derive_seed, run_rng};
