//! Permanent upgrade definitions: gems and one-time fragment upgrades.
//!
//! Gems are repeatable linear upgrades. Fragment upgrades are capped,
//! floor-gated, and paid in a specific fragment currency. The cost lookups
//! serve the configuration layer only; the resolver reads just the levels.

use crate::blocks::FragmentKind;

pub const NUM_GEM_KINDS: usize = 6;
pub const NUM_FRAGMENT_UPGRADES: usize = 6;
pub const GEM_MAX_LEVEL: u32 = 50;

// Gem effects per level
pub const RUBY_DAMAGE_PER_LEVEL: f64 = 2.5;
pub const TOPAZ_CRIT_CHANCE_PER_LEVEL: f64 = 0.005;
pub const EMERALD_STAMINA_PER_LEVEL: f64 = 15.0;
pub const SAPPHIRE_XP_MULT_PER_LEVEL: f64 = 0.05;
pub const AMETHYST_FRAGMENT_MULT_PER_LEVEL: f64 = 0.04;
pub const DIAMOND_CRIT_MULT_PER_LEVEL: f64 = 0.05;

// Fragment upgrade effects per level
pub const SHARPENING_DAMAGE_PCT_PER_LEVEL: f64 = 0.25;
pub const DRILL_BITS_PEN_PER_LEVEL: f64 = 5.0;
pub const CANTEEN_STAMINA_PCT_PER_LEVEL: f64 = 0.20;
pub const LUCKY_LODE_LOOT_MULT_PER_LEVEL: f64 = 0.25;
pub const ADRENALINE_CHARGES_PER_LEVEL: u32 = 1;
pub const SCHOLARSHIP_XP_MULT_PER_LEVEL: f64 = 0.15;

// Gem upgrade costs: (cost_base, cost_step), paid in crystals; buying the
// next level at level L costs base + step * L.
pub const GEM_COSTS: [(u32, u32); NUM_GEM_KINDS] = [
    (25, 15), // Ruby
    (30, 20), // Topaz
    (20, 12), // Emerald
    (35, 25), // Sapphire
    (35, 25), // Amethyst
    (50, 40), // Diamond
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GemKind {
    Ruby,
    Topaz,
    Emerald,
    Sapphire,
    Amethyst,
    Diamond,
}

impl GemKind {
    pub fn all() -> [GemKind; NUM_GEM_KINDS] {
        [
            GemKind::Ruby,
            GemKind::Topaz,
            GemKind::Emerald,
            GemKind::Sapphire,
            GemKind::Amethyst,
            GemKind::Diamond,
        ]
    }

    pub fn index(&self) -> usize {
        match self {
            GemKind::Ruby => 0,
            GemKind::Topaz => 1,
            GemKind::Emerald => 2,
            GemKind::Sapphire => 3,
            GemKind::Amethyst => 4,
            GemKind::Diamond => 5,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            GemKind::Ruby => "Ruby",
            GemKind::Topaz => "Topaz",
            GemKind::Emerald => "Emerald",
            GemKind::Sapphire => "Sapphire",
            GemKind::Amethyst => "Amethyst",
            GemKind::Diamond => "Diamond",
        }
    }
}

/// Crystal cost of raising a gem from `current_level` to the next level.
pub fn gem_upgrade_cost(gem: GemKind, current_level: u32) -> u32 {
    let (base, step) = GEM_COSTS[gem.index()];
    base + step * current_level
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FragmentUpgrade {
    Sharpening,
    DrillBits,
    Canteen,
    LuckyLode,
    Adrenaline,
    Scholarship,
}

/// Static definition of one fragment upgrade line.
#[derive(Debug, Clone, Copy)]
pub struct FragmentUpgradeSpec {
    pub name: &'static str,
    pub currency: FragmentKind,
    pub max_level: u32,
    pub cost_base: u32,
    pub cost_step: u32,
    pub unlock_base: u32,
    pub unlock_step: u32,
}

const FRAGMENT_UPGRADE_SPECS: [FragmentUpgradeSpec; NUM_FRAGMENT_UPGRADES] = [
    FragmentUpgradeSpec {
        name: "Sharpening",
        currency: FragmentKind::Stone,
        max_level: 5,
        cost_base: 40,
        cost_step: 60,
        unlock_base: 10,
        unlock_step: 15,
    },
    FragmentUpgradeSpec {
        name: "Drill Bits",
        currency: FragmentKind::Quartz,
        max_level: 4,
        cost_base: 30,
        cost_step: 45,
        unlock_base: 20,
        unlock_step: 20,
    },
    FragmentUpgradeSpec {
        name: "Canteen",
        currency: FragmentKind::Amber,
        max_level: 5,
        cost_base: 35,
        cost_step: 50,
        unlock_base: 12,
        unlock_step: 15,
    },
    FragmentUpgradeSpec {
        name: "Lucky Lode",
        currency: FragmentKind::Obsidian,
        max_level: 3,
        cost_base: 25,
        cost_step: 40,
        unlock_base: 30,
        unlock_step: 25,
    },
    FragmentUpgradeSpec {
        name: "Adrenaline",
        currency: FragmentKind::Quartz,
        max_level: 5,
        cost_base: 45,
        cost_step: 55,
        unlock_base: 25,
        unlock_step: 20,
    },
    FragmentUpgradeSpec {
        name: "Scholarship",
        currency: FragmentKind::Amber,
        max_level: 5,
        cost_base: 30,
        cost_step: 45,
        unlock_base: 15,
        unlock_step: 15,
    },
];

impl FragmentUpgrade {
    pub fn all() -> [FragmentUpgrade; NUM_FRAGMENT_UPGRADES] {
        [
            FragmentUpgrade::Sharpening,
            FragmentUpgrade::DrillBits,
            FragmentUpgrade::Canteen,
            FragmentUpgrade::LuckyLode,
            FragmentUpgrade::Adrenaline,
            FragmentUpgrade::Scholarship,
        ]
    }

    pub fn index(&self) -> usize {
        match self {
            FragmentUpgrade::Sharpening => 0,
            FragmentUpgrade::DrillBits => 1,
            FragmentUpgrade::Canteen => 2,
            FragmentUpgrade::LuckyLode => 3,
            FragmentUpgrade::Adrenaline => 4,
            FragmentUpgrade::Scholarship => 5,
        }
    }

    pub fn spec(&self) -> &'static FragmentUpgradeSpec {
        &FRAGMENT_UPGRADE_SPECS[self.index()]
    }

    pub fn name(&self) -> &'static str {
        self.spec().name
    }

    pub fn max_level(&self) -> u32 {
        self.spec().max_level
    }

    pub fn currency(&self) -> FragmentKind {
        self.spec().currency
    }
}

/// Fragment cost of buying `level` (1-based) of an upgrade.
pub fn fragment_upgrade_cost(upgrade: FragmentUpgrade, level: u32) -> u32 {
    let spec = upgrade.spec();
    spec.cost_base + spec.cost_step * level.saturating_sub(1)
}

/// Best floor required before `level` (1-based) of an upgrade can be bought.
pub fn fragment_upgrade_unlock_floor(upgrade: FragmentUpgrade, level: u32) -> u32 {
    let spec = upgrade.spec();
    spec.unlock_base + spec.unlock_step * level.saturating_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gem_indices_match_all_order() {
        for (i, gem) in GemKind::all().iter().enumerate() {
            assert_eq!(gem.index(), i);
        }
    }

    #[test]
    fn test_upgrade_indices_match_all_order() {
        for (i, upgrade) in FragmentUpgrade::all().iter().enumerate() {
            assert_eq!(upgrade.index(), i);
        }
    }

    #[test]
    fn test_gem_cost_increases_with_level() {
        for gem in GemKind::all() {
            assert!(gem_upgrade_cost(gem, 0) < gem_upgrade_cost(gem, 1));
            assert!(gem_upgrade_cost(gem, 1) < gem_upgrade_cost(gem, 10));
        }
    }

    #[test]
    fn test_fragment_cost_and_unlock_increase_with_level() {
        for upgrade in FragmentUpgrade::all() {
            for level in 1..upgrade.max_level() {
                assert!(
                    fragment_upgrade_cost(upgrade, level)
                        < fragment_upgrade_cost(upgrade, level + 1)
                );
                assert!(
                    fragment_upgrade_unlock_floor(upgrade, level)
                        < fragment_upgrade_unlock_floor(upgrade, level + 1)
                );
            }
        }
    }

    #[test]
    fn test_sharpening_unlock_schedule() {
        // 10, 25, 40, 55, 70 across the five levels.
        assert_eq!(
            fragment_upgrade_unlock_floor(FragmentUpgrade::Sharpening, 1),
            10
        );
        assert_eq!(
            fragment_upgrade_unlock_floor(FragmentUpgrade::Sharpening, 5),
            70
        );
    }

    #[test]
    fn test_every_upgrade_has_positive_cap() {
        for upgrade in FragmentUpgrade::all() {
            assert!(upgrade.max_level() > 0);
        }
    }
}
