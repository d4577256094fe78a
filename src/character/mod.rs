//! Character configuration and derived combat coefficients.

pub mod build;
pub mod stats;
pub mod upgrades;

pub use build::{AbilityToggles, BuildError, CardConfig, CharacterBuild, SkillKind};
pub use stats::{resolve_stats, DerivedStats};
