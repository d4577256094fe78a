//! Character build input: skill allocation, upgrades, cards, toggles.
//!
//! The configuration layer owns and mutates builds; the simulation core only
//! reads them. `validate` is the gate that keeps nonsense inputs out of the
//! resolver.

use super::upgrades::{self, FragmentUpgrade, GemKind, GEM_MAX_LEVEL};
use crate::blocks::BlockKind;
use crate::core::constants::{CARD_LEVEL_BONUS, DEFAULT_SKILL_CAP, MAX_CARD_LEVEL, NUM_SKILLS};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SkillKind {
    Power,
    Precision,
    Endurance,
    Fortune,
    Celerity,
}

impl SkillKind {
    pub fn all() -> [SkillKind; NUM_SKILLS] {
        [
            SkillKind::Power,
            SkillKind::Precision,
            SkillKind::Endurance,
            SkillKind::Fortune,
            SkillKind::Celerity,
        ]
    }

    pub fn index(&self) -> usize {
        match self {
            SkillKind::Power => 0,
            SkillKind::Precision => 1,
            SkillKind::Endurance => 2,
            SkillKind::Fortune => 3,
            SkillKind::Celerity => 4,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            SkillKind::Power => "Power",
            SkillKind::Precision => "Precision",
            SkillKind::Endurance => "Endurance",
            SkillKind::Fortune => "Fortune",
            SkillKind::Celerity => "Celerity",
        }
    }

    pub fn abbrev(&self) -> &str {
        match self {
            SkillKind::Power => "POW",
            SkillKind::Precision => "PRE",
            SkillKind::Endurance => "END",
            SkillKind::Fortune => "FOR",
            SkillKind::Celerity => "CEL",
        }
    }
}

/// Per-kind card levels plus the polychrome bonus applied at level 3.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CardConfig {
    #[serde(default)]
    pub block_cards: HashMap<BlockKind, u8>,
    #[serde(default)]
    pub polychrome_bonus: f64,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            block_cards: HashMap::new(),
            polychrome_bonus: 0.0,
        }
    }
}

impl CardConfig {
    pub fn level(&self, kind: BlockKind) -> u8 {
        self.block_cards.get(&kind).copied().unwrap_or(0)
    }

    pub fn set_level(&mut self, kind: BlockKind, level: u8) {
        self.block_cards.insert(kind, level);
    }

    /// Yield factor for a kind: 1 + tier bonus, plus the polychrome bonus at
    /// the top tier. Block health is divided by the same factor.
    pub fn factor(&self, kind: BlockKind) -> f64 {
        let level = self.level(kind).min(MAX_CARD_LEVEL) as usize;
        let mut factor = 1.0 + CARD_LEVEL_BONUS[level];
        if level == MAX_CARD_LEVEL as usize {
            factor += self.polychrome_bonus;
        }
        factor
    }

    /// Factors for every kind, indexed by `BlockKind::index()`.
    pub fn factors(&self) -> [f64; crate::core::constants::NUM_BLOCK_KINDS] {
        BlockKind::all().map(|kind| self.factor(kind))
    }
}

/// Which abilities (and the crit roll chain) a run actually uses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AbilityToggles {
    pub use_crit: bool,
    pub enrage: bool,
    pub flurry: bool,
    pub quake: bool,
}

impl Default for AbilityToggles {
    fn default() -> Self {
        Self {
            use_crit: true,
            enrage: true,
            flurry: true,
            quake: true,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum BuildError {
    #[error("allocated {allocated} skill points but the budget is {budget}")]
    BudgetExceeded { allocated: u32, budget: u32 },
    #[error("{skill} has {points} points, cap is {cap}")]
    SkillOverCap { skill: String, points: u32, cap: u32 },
    #[error("{gem} gem is level {level}, cap is {cap}")]
    GemOverCap { gem: String, level: u32, cap: u32 },
    #[error("{upgrade} is level {level}, cap is {cap}")]
    UpgradeOverCap {
        upgrade: String,
        level: u32,
        cap: u32,
    },
    #[error("{upgrade} level {level} unlocks at floor {required_floor}, best floor is {best_floor}")]
    UpgradeLocked {
        upgrade: String,
        level: u32,
        required_floor: u32,
        best_floor: u32,
    },
    #[error("{kind} card is level {level}, cap is {cap}")]
    CardOverCap { kind: String, level: u8, cap: u8 },
}

/// Immutable character configuration fed to the stat resolver.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CharacterBuild {
    /// Deepest floor ever reached; gates fragment upgrade levels.
    pub best_floor: u32,
    /// Total skill points available.
    pub stat_budget: u32,
    /// Points per skill, indexed by `SkillKind::index()`.
    pub skills: [u32; NUM_SKILLS],
    /// Permanent gem upgrade levels, indexed by `GemKind::index()`.
    pub gems: [u32; upgrades::NUM_GEM_KINDS],
    /// One-time fragment upgrade levels, indexed by `FragmentUpgrade::index()`.
    pub fragment_upgrades: [u32; upgrades::NUM_FRAGMENT_UPGRADES],
    pub cards: CardConfig,
    pub abilities: AbilityToggles,
}

impl Default for CharacterBuild {
    fn default() -> Self {
        Self::new(1, 0)
    }
}

impl CharacterBuild {
    pub fn new(best_floor: u32, stat_budget: u32) -> Self {
        Self {
            best_floor,
            stat_budget,
            skills: [0; NUM_SKILLS],
            gems: [0; upgrades::NUM_GEM_KINDS],
            fragment_upgrades: [0; upgrades::NUM_FRAGMENT_UPGRADES],
            cards: CardConfig::default(),
            abilities: AbilityToggles::default(),
        }
    }

    pub fn skill(&self, skill: SkillKind) -> u32 {
        self.skills[skill.index()]
    }

    pub fn set_skill(&mut self, skill: SkillKind, points: u32) {
        self.skills[skill.index()] = points;
    }

    pub fn gem_level(&self, gem: GemKind) -> u32 {
        self.gems[gem.index()]
    }

    pub fn upgrade_level(&self, upgrade: FragmentUpgrade) -> u32 {
        self.fragment_upgrades[upgrade.index()]
    }

    pub fn allocated_points(&self) -> u32 {
        self.skills.iter().sum()
    }

    pub fn unspent_points(&self) -> u32 {
        self.stat_budget.saturating_sub(self.allocated_points())
    }

    /// Same build with a different skill allocation. Used by the optimizer to
    /// evaluate candidates without touching the rest of the configuration.
    pub fn with_skills(&self, skills: [u32; NUM_SKILLS]) -> Self {
        let mut build = self.clone();
        build.skills = skills;
        build
    }

    /// Checks the budget, cap, and unlock-gating invariants.
    pub fn validate(&self) -> Result<(), BuildError> {
        let allocated = self.allocated_points();
        if allocated > self.stat_budget {
            return Err(BuildError::BudgetExceeded {
                allocated,
                budget: self.stat_budget,
            });
        }

        for skill in SkillKind::all() {
            let points = self.skill(skill);
            if points > DEFAULT_SKILL_CAP {
                return Err(BuildError::SkillOverCap {
                    skill: skill.name().to_string(),
                    points,
                    cap: DEFAULT_SKILL_CAP,
                });
            }
        }

        for gem in GemKind::all() {
            let level = self.gem_level(gem);
            if level > GEM_MAX_LEVEL {
                return Err(BuildError::GemOverCap {
                    gem: gem.name().to_string(),
                    level,
                    cap: GEM_MAX_LEVEL,
                });
            }
        }

        for upgrade in FragmentUpgrade::all() {
            let level = self.upgrade_level(upgrade);
            let cap = upgrade.max_level();
            if level > cap {
                return Err(BuildError::UpgradeOverCap {
                    upgrade: upgrade.name().to_string(),
                    level,
                    cap,
                });
            }
            if level > 0 {
                let required_floor = upgrades::fragment_upgrade_unlock_floor(upgrade, level);
                if self.best_floor < required_floor {
                    return Err(BuildError::UpgradeLocked {
                        upgrade: upgrade.name().to_string(),
                        level,
                        required_floor,
                        best_floor: self.best_floor,
                    });
                }
            }
        }

        for kind in BlockKind::all() {
            let level = self.cards.level(kind);
            if level > MAX_CARD_LEVEL {
                return Err(BuildError::CardOverCap {
                    kind: kind.name().to_string(),
                    level,
                    cap: MAX_CARD_LEVEL,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skill_indices_match_all_order() {
        for (i, skill) in SkillKind::all().iter().enumerate() {
            assert_eq!(skill.index(), i);
        }
    }

    #[test]
    fn test_new_build_validates() {
        assert_eq!(CharacterBuild::new(1, 0).validate(), Ok(()));
        assert_eq!(CharacterBuild::new(50, 120).validate(), Ok(()));
    }

    #[test]
    fn test_budget_exceeded() {
        let mut build = CharacterBuild::new(1, 10);
        build.set_skill(SkillKind::Power, 8);
        build.set_skill(SkillKind::Endurance, 8);
        assert_eq!(
            build.validate(),
            Err(BuildError::BudgetExceeded {
                allocated: 16,
                budget: 10
            })
        );
    }

    #[test]
    fn test_skill_over_cap() {
        let mut build = CharacterBuild::new(1, 500);
        build.set_skill(SkillKind::Precision, DEFAULT_SKILL_CAP + 1);
        assert!(matches!(
            build.validate(),
            Err(BuildError::SkillOverCap { .. })
        ));
    }

    #[test]
    fn test_upgrade_gated_by_best_floor() {
        let mut build = CharacterBuild::new(1, 0);
        build.fragment_upgrades[FragmentUpgrade::Sharpening.index()] = 1;
        assert!(matches!(
            build.validate(),
            Err(BuildError::UpgradeLocked { .. })
        ));

        // Unlocks once the best floor clears the threshold.
        build.best_floor =
            upgrades::fragment_upgrade_unlock_floor(FragmentUpgrade::Sharpening, 1);
        assert_eq!(build.validate(), Ok(()));
    }

    #[test]
    fn test_card_over_cap() {
        let mut build = CharacterBuild::new(1, 0);
        build.cards.set_level(BlockKind::Amber, 4);
        assert!(matches!(build.validate(), Err(BuildError::CardOverCap { .. })));
    }

    #[test]
    fn test_card_factor_tiers() {
        let mut cards = CardConfig::default();
        assert_eq!(cards.factor(BlockKind::Stone), 1.0);

        cards.set_level(BlockKind::Stone, 1);
        assert!((cards.factor(BlockKind::Stone) - 1.10).abs() < 1e-12);

        cards.set_level(BlockKind::Stone, 2);
        assert!((cards.factor(BlockKind::Stone) - 1.25).abs() < 1e-12);

        cards.set_level(BlockKind::Stone, 3);
        assert!((cards.factor(BlockKind::Stone) - 1.50).abs() < 1e-12);
    }

    #[test]
    fn test_polychrome_applies_only_at_top_tier() {
        let mut cards = CardConfig {
            polychrome_bonus: 0.2,
            ..Default::default()
        };
        cards.set_level(BlockKind::Quartz, 2);
        assert!((cards.factor(BlockKind::Quartz) - 1.25).abs() < 1e-12);

        cards.set_level(BlockKind::Quartz, 3);
        assert!((cards.factor(BlockKind::Quartz) - 1.70).abs() < 1e-12);
    }

    #[test]
    fn test_with_skills_keeps_rest_of_build() {
        let mut build = CharacterBuild::new(40, 60);
        build.gems[GemKind::Ruby.index()] = 3;
        let candidate = build.with_skills([10, 20, 10, 10, 10]);
        assert_eq!(candidate.allocated_points(), 60);
        assert_eq!(candidate.gem_level(GemKind::Ruby), 3);
        assert_eq!(build.allocated_points(), 0);
    }
}
