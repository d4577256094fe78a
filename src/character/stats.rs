//! Stat resolution: `CharacterBuild` to the flat `DerivedStats` record.
//!
//! The resolver mirrors the host game's integer math: flat contributions are
//! truncated toward zero before the percentage stage multiplies them, and the
//! product is truncated again. The two-step truncation is observable (a
//! fractional flat total rounds down before the multiplier compounds on it),
//! so both stages are kept explicit.

use super::build::{CharacterBuild, SkillKind};
use super::upgrades::{FragmentUpgrade, GemKind, *};
use crate::core::constants::*;
use serde::{Deserialize, Serialize};

/// The ~30 derived combat/economy coefficients consumed by the simulator.
///
/// Counts (damage, armor penetration, stamina) carry integer values;
/// chance fields are probabilities in [0, 1] after clamping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedStats {
    // Core counts
    pub damage: u32,
    pub armor_pen: u32,
    pub max_stamina: u32,

    // Crit chain
    pub crit_chance: f64,
    pub crit_mult: f64,
    pub super_crit_chance: f64,
    pub super_crit_mult: f64,
    pub ultra_crit_chance: f64,
    pub ultra_crit_mult: f64,
    pub one_hit_kill_chance: f64,

    // Yield multipliers
    pub xp_mult: f64,
    pub fragment_mult: f64,

    // Mod procs (per kill)
    pub xp_mod_chance: f64,
    pub xp_mod_mult: f64,
    pub loot_mod_chance: f64,
    pub loot_mod_mult: f64,
    pub speed_mod_chance: f64,
    pub speed_mod_hits: f64,
    pub stamina_mod_chance: f64,
    pub stamina_mod_min: f64,
    pub stamina_mod_max: f64,

    // Enrage
    pub enrage_charges: u32,
    pub enrage_cooldown: f64,
    pub enrage_damage_mult: f64,
    pub enrage_crit_bonus: f64,

    // Quake
    pub quake_charges: u32,
    pub quake_cooldown: f64,
    pub quake_splash_fraction: f64,

    // Flurry
    pub flurry_cooldown: f64,
    pub flurry_restore: f64,

    pub insta_recharge_chance: f64,
}

impl Default for DerivedStats {
    fn default() -> Self {
        resolve_stats(&CharacterBuild::default())
    }
}

/// Resolves a build into derived stats.
///
/// Total and pure: every build resolves, and the same build always resolves
/// to the same stats. Out-of-cap levels contribute linearly like any other;
/// `CharacterBuild::validate` is the place that rejects them.
pub fn resolve_stats(build: &CharacterBuild) -> DerivedStats {
    let power = build.skill(SkillKind::Power) as f64;
    let precision = build.skill(SkillKind::Precision) as f64;
    let endurance = build.skill(SkillKind::Endurance) as f64;
    let fortune = build.skill(SkillKind::Fortune) as f64;
    let celerity = build.skill(SkillKind::Celerity) as f64;

    let ruby = build.gem_level(GemKind::Ruby) as f64;
    let topaz = build.gem_level(GemKind::Topaz) as f64;
    let emerald = build.gem_level(GemKind::Emerald) as f64;
    let sapphire = build.gem_level(GemKind::Sapphire) as f64;
    let amethyst = build.gem_level(GemKind::Amethyst) as f64;
    let diamond = build.gem_level(GemKind::Diamond) as f64;

    let sharpening = build.upgrade_level(FragmentUpgrade::Sharpening) as f64;
    let drill_bits = build.upgrade_level(FragmentUpgrade::DrillBits) as f64;
    let canteen = build.upgrade_level(FragmentUpgrade::Canteen) as f64;
    let lucky_lode = build.upgrade_level(FragmentUpgrade::LuckyLode) as f64;
    let adrenaline = build.upgrade_level(FragmentUpgrade::Adrenaline);
    let scholarship = build.upgrade_level(FragmentUpgrade::Scholarship) as f64;

    // Damage = trunc(base + power + ruby), then the Sharpening percentage,
    // then trunc again.
    let damage_flat =
        (BASE_DAMAGE + DAMAGE_PER_POWER_POINT * power + RUBY_DAMAGE_PER_LEVEL * ruby).trunc();
    let damage = (damage_flat * (1.0 + SHARPENING_DAMAGE_PCT_PER_LEVEL * sharpening))
        .trunc()
        .max(1.0) as u32;

    // Armor penetration = trunc(base + power + drill bits); no percentage stage.
    let armor_pen =
        (BASE_ARMOR_PEN + ARMOR_PEN_PER_POWER_POINT * power + DRILL_BITS_PEN_PER_LEVEL * drill_bits)
            .trunc() as u32;

    // Max stamina = trunc(base + endurance + emerald), then the Canteen
    // percentage, then trunc again.
    let stamina_flat =
        (BASE_MAX_STAMINA + STAMINA_PER_ENDURANCE_POINT * endurance + EMERALD_STAMINA_PER_LEVEL * emerald)
            .trunc();
    let max_stamina = (stamina_flat * (1.0 + CANTEEN_STAMINA_PCT_PER_LEVEL * canteen))
        .trunc()
        .max(1.0) as u32;

    // Chances clamp to [0, 1] after all contributions are combined.
    let crit_chance = (BASE_CRIT_CHANCE
        + CRIT_CHANCE_PER_PRECISION_POINT * precision
        + TOPAZ_CRIT_CHANCE_PER_LEVEL * topaz)
        .clamp(0.0, 1.0);
    let super_crit_chance =
        (BASE_SUPER_CRIT_CHANCE + SUPER_CRIT_CHANCE_PER_PRECISION_POINT * precision).clamp(0.0, 1.0);
    let ultra_crit_chance = BASE_ULTRA_CRIT_CHANCE.clamp(0.0, 1.0);
    let one_hit_kill_chance =
        (BASE_ONE_HIT_KILL_CHANCE + OHK_CHANCE_PER_PRECISION_POINT * precision).clamp(0.0, 1.0);

    let xp_mod_chance =
        (BASE_XP_MOD_CHANCE + XP_MOD_CHANCE_PER_FORTUNE_POINT * fortune).clamp(0.0, 1.0);
    let loot_mod_chance =
        (BASE_LOOT_MOD_CHANCE + LOOT_MOD_CHANCE_PER_FORTUNE_POINT * fortune).clamp(0.0, 1.0);
    let speed_mod_chance =
        (BASE_SPEED_MOD_CHANCE + SPEED_MOD_CHANCE_PER_CELERITY_POINT * celerity).clamp(0.0, 1.0);
    let stamina_mod_chance =
        (BASE_STAMINA_MOD_CHANCE + STAMINA_MOD_CHANCE_PER_ENDURANCE_POINT * endurance)
            .clamp(0.0, 1.0);
    let insta_recharge_chance =
        (BASE_INSTA_RECHARGE_CHANCE + INSTA_RECHARGE_PER_CELERITY_POINT * celerity).clamp(0.0, 1.0);

    // Cooldowns shrink with Celerity down to their floors.
    let enrage_cooldown =
        (ENRAGE_BASE_COOLDOWN - ENRAGE_COOLDOWN_CUT_PER_CELERITY_POINT * celerity)
            .max(ENRAGE_MIN_COOLDOWN);
    let quake_cooldown = (QUAKE_BASE_COOLDOWN - QUAKE_COOLDOWN_CUT_PER_CELERITY_POINT * celerity)
        .max(QUAKE_MIN_COOLDOWN);
    let flurry_cooldown =
        (FLURRY_BASE_COOLDOWN - FLURRY_COOLDOWN_CUT_PER_CELERITY_POINT * celerity)
            .max(FLURRY_MIN_COOLDOWN);

    DerivedStats {
        damage,
        armor_pen,
        max_stamina,
        crit_chance,
        crit_mult: BASE_CRIT_MULT + DIAMOND_CRIT_MULT_PER_LEVEL * diamond,
        super_crit_chance,
        super_crit_mult: BASE_SUPER_CRIT_MULT,
        ultra_crit_chance,
        ultra_crit_mult: BASE_ULTRA_CRIT_MULT,
        one_hit_kill_chance,
        xp_mult: BASE_XP_MULT
            + SAPPHIRE_XP_MULT_PER_LEVEL * sapphire
            + SCHOLARSHIP_XP_MULT_PER_LEVEL * scholarship,
        fragment_mult: BASE_FRAGMENT_MULT
            + AMETHYST_FRAGMENT_MULT_PER_LEVEL * amethyst
            + FRAGMENT_MULT_PER_FORTUNE_POINT * fortune,
        xp_mod_chance,
        xp_mod_mult: XP_MOD_MULT,
        loot_mod_chance,
        loot_mod_mult: LOOT_MOD_MULT + LUCKY_LODE_LOOT_MULT_PER_LEVEL * lucky_lode,
        speed_mod_chance,
        speed_mod_hits: SPEED_MOD_HITS,
        stamina_mod_chance,
        stamina_mod_min: STAMINA_MOD_MIN,
        stamina_mod_max: STAMINA_MOD_MAX,
        enrage_charges: ENRAGE_BASE_CHARGES + ADRENALINE_CHARGES_PER_LEVEL * adrenaline,
        enrage_cooldown,
        enrage_damage_mult: ENRAGE_DAMAGE_MULT,
        enrage_crit_bonus: ENRAGE_CRIT_BONUS,
        quake_charges: QUAKE_BASE_CHARGES,
        quake_cooldown,
        quake_splash_fraction: QUAKE_SPLASH_FRACTION,
        flurry_cooldown,
        flurry_restore: FLURRY_BASE_RESTORE,
        insta_recharge_chance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::BlockKind;

    #[test]
    fn test_resolve_base_build() {
        let stats = resolve_stats(&CharacterBuild::default());

        assert_eq!(stats.damage, 5);
        assert_eq!(stats.armor_pen, 0);
        assert_eq!(stats.max_stamina, 200);
        assert_eq!(stats.crit_chance, 0.05);
        assert_eq!(stats.crit_mult, 2.0);
        assert_eq!(stats.one_hit_kill_chance, 0.0);
        assert_eq!(stats.xp_mult, 1.0);
        assert_eq!(stats.fragment_mult, 1.0);
        assert_eq!(stats.enrage_charges, 10);
        assert_eq!(stats.enrage_cooldown, 60.0);
        assert_eq!(stats.flurry_cooldown, 45.0);
    }

    #[test]
    fn test_resolve_is_pure() {
        let mut build = CharacterBuild::new(80, 120);
        build.set_skill(SkillKind::Power, 40);
        build.set_skill(SkillKind::Fortune, 30);
        build.gems[GemKind::Topaz.index()] = 7;
        build.cards.set_level(BlockKind::Amber, 2);

        assert_eq!(resolve_stats(&build), resolve_stats(&build));
    }

    #[test]
    fn test_damage_truncates_flat_stage_before_percentage() {
        // Flat: 5 + 2.5 = 7.5, truncated to 7 before Sharpening multiplies.
        // 7 * 1.25 = 8.75, truncated to 8. Without the first truncation the
        // result would be trunc(7.5 * 1.25) = 9.
        let mut build = CharacterBuild::new(70, 0);
        build.gems[GemKind::Ruby.index()] = 1;
        build.fragment_upgrades[FragmentUpgrade::Sharpening.index()] = 1;

        assert_eq!(resolve_stats(&build).damage, 8);
    }

    #[test]
    fn test_stamina_percentage_stage_truncates() {
        // Flat: 200 + 6 * 7 = 242; Canteen level 1 gives x1.2.
        // 242 * 1.2 = 290.4, truncated to 290.
        let mut build = CharacterBuild::new(80, 10);
        build.set_skill(SkillKind::Endurance, 7);
        build.fragment_upgrades[FragmentUpgrade::Canteen.index()] = 1;

        assert_eq!(resolve_stats(&build).max_stamina, 290);
    }

    #[test]
    fn test_armor_pen_truncates_fractional_points() {
        // 0.25 per Power point: 3 points is 0.75, truncated to 0.
        let mut build = CharacterBuild::new(1, 10);
        build.set_skill(SkillKind::Power, 3);
        assert_eq!(resolve_stats(&build).armor_pen, 0);

        build.set_skill(SkillKind::Power, 4);
        assert_eq!(resolve_stats(&build).armor_pen, 1);
    }

    #[test]
    fn test_probabilities_clamped_under_extreme_input() {
        // resolve_stats is total; absurd unvalidated levels must still land
        // every chance inside [0, 1].
        let mut build = CharacterBuild::new(1, u32::MAX);
        build.set_skill(SkillKind::Precision, 1_000_000);
        build.set_skill(SkillKind::Fortune, 1_000_000);
        build.set_skill(SkillKind::Celerity, 1_000_000);
        build.set_skill(SkillKind::Endurance, 1_000_000);
        build.gems[GemKind::Topaz.index()] = 1_000_000;

        let stats = resolve_stats(&build);
        for chance in [
            stats.crit_chance,
            stats.super_crit_chance,
            stats.ultra_crit_chance,
            stats.one_hit_kill_chance,
            stats.xp_mod_chance,
            stats.loot_mod_chance,
            stats.speed_mod_chance,
            stats.stamina_mod_chance,
            stats.insta_recharge_chance,
        ] {
            assert!((0.0..=1.0).contains(&chance), "chance {} escaped", chance);
        }
    }

    #[test]
    fn test_celerity_cannot_push_cooldowns_below_floor() {
        let mut build = CharacterBuild::new(1, 100_000);
        build.set_skill(SkillKind::Celerity, 100_000);

        let stats = resolve_stats(&build);
        assert_eq!(stats.enrage_cooldown, ENRAGE_MIN_COOLDOWN);
        assert_eq!(stats.quake_cooldown, QUAKE_MIN_COOLDOWN);
        assert_eq!(stats.flurry_cooldown, FLURRY_MIN_COOLDOWN);
    }

    #[test]
    fn test_adrenaline_adds_enrage_charges() {
        let mut build = CharacterBuild::new(100, 0);
        build.fragment_upgrades[FragmentUpgrade::Adrenaline.index()] = 3;
        assert_eq!(resolve_stats(&build).enrage_charges, 13);
    }

    #[test]
    fn test_lucky_lode_raises_loot_mod_mult() {
        let mut build = CharacterBuild::new(100, 0);
        build.fragment_upgrades[FragmentUpgrade::LuckyLode.index()] = 2;
        assert_eq!(resolve_stats(&build).loot_mod_mult, 2.5);
    }
}
