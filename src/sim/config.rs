//! Simulation options.

use crate::character::AbilityToggles;
use crate::core::constants::MAX_FLOORS_PER_RUN;
use serde::{Deserialize, Serialize};

/// Per-run simulation switches.
///
/// These arrive over the wire inside worker requests, so absent fields fall
/// back to the defaults rather than failing deserialization.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SimOptions {
    /// Roll the one-hit-kill/crit chain; disabled, every hit lands plain.
    #[serde(default = "default_true")]
    pub use_crit: bool,

    /// Run the Enrage charge/cooldown machine.
    #[serde(default = "default_true")]
    pub enrage_enabled: bool,

    /// Run the Flurry stamina-restore cooldown.
    #[serde(default = "default_true")]
    pub flurry_enabled: bool,

    /// Run the Quake charge/cooldown machine with splash.
    #[serde(default = "default_true")]
    pub quake_enabled: bool,

    /// Carry ability charge/cooldown state across the runs of one batch
    /// instead of resetting it per run.
    #[serde(default)]
    pub persist_abilities: bool,

    /// Stop a run after this many floors even if stamina remains.
    #[serde(default = "default_max_floors")]
    pub max_floors: u32,
}

fn default_true() -> bool {
    true
}

fn default_max_floors() -> u32 {
    MAX_FLOORS_PER_RUN
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            use_crit: true,
            enrage_enabled: true,
            flurry_enabled: true,
            quake_enabled: true,
            persist_abilities: false,
            max_floors: MAX_FLOORS_PER_RUN,
        }
    }
}

impl SimOptions {
    /// Options matching a build's ability toggles.
    pub fn from_toggles(toggles: &AbilityToggles) -> Self {
        Self {
            use_crit: toggles.use_crit,
            enrage_enabled: toggles.enrage,
            flurry_enabled: toggles.flurry,
            quake_enabled: toggles.quake,
            ..Default::default()
        }
    }

    /// All three abilities off; the crit chain still rolls.
    pub fn abilities_off() -> Self {
        Self {
            enrage_enabled: false,
            flurry_enabled: false,
            quake_enabled: false,
            ..Default::default()
        }
    }

    /// Cap the run at a fixed floor count.
    pub fn floor_capped(max_floors: u32) -> Self {
        Self {
            max_floors,
            ..Default::default()
        }
    }
}
