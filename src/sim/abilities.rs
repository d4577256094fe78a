//! Ability state machines: Enrage, Quake, Flurry.
//!
//! Enrage and Quake share one shape: a bank of charges spent one per hit,
//! then a cooldown counted in hits, then a refill. Flurry has no charges at
//! all; its cooldown ticks down per kill and pays out stamina on expiry.
//! Refills and Flurry payouts roll the same insta-recharge chance to double.

use crate::character::DerivedStats;
use rand::Rng;

/// Charge bank plus hit-counted cooldown for one ability.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChargeState {
    pub charges: u32,
    pub cooldown: f64,
}

impl ChargeState {
    fn new(charges: u32, cooldown: f64) -> Self {
        Self { charges, cooldown }
    }

    /// Advances the machine by one hit. Returns true when this hit is
    /// empowered (a charge was spent). The hit whose cooldown tick reaches
    /// zero triggers the refill but is itself unpowered.
    fn step(
        &mut self,
        max_charges: u32,
        full_cooldown: f64,
        insta_chance: f64,
        rng: &mut impl Rng,
    ) -> bool {
        if self.charges > 0 {
            self.charges -= 1;
            return true;
        }
        self.cooldown -= 1.0;
        if self.cooldown <= 0.0 {
            let refill = if rng.gen::<f64>() < insta_chance {
                max_charges * 2
            } else {
                max_charges
            };
            self.charges = refill;
            self.cooldown = full_cooldown;
        }
        false
    }
}

/// Mutable ability state carried through a run (or a whole batch when the
/// caller persists it).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbilityStates {
    pub enrage: ChargeState,
    pub quake: ChargeState,
    pub flurry_cooldown: f64,
}

impl AbilityStates {
    /// Fully charged state, cooldowns at their resolved full values.
    pub fn fresh(stats: &DerivedStats) -> Self {
        Self {
            enrage: ChargeState::new(stats.enrage_charges, stats.enrage_cooldown),
            quake: ChargeState::new(stats.quake_charges, stats.quake_cooldown),
            flurry_cooldown: stats.flurry_cooldown,
        }
    }

    /// One hit of Enrage. Returns true when the hit is enraged.
    pub fn step_enrage(&mut self, stats: &DerivedStats, rng: &mut impl Rng) -> bool {
        self.enrage.step(
            stats.enrage_charges,
            stats.enrage_cooldown,
            stats.insta_recharge_chance,
            rng,
        )
    }

    /// One hit of Quake. Returns true when the hit splashes.
    pub fn step_quake(&mut self, stats: &DerivedStats, rng: &mut impl Rng) -> bool {
        self.quake.step(
            stats.quake_charges,
            stats.quake_cooldown,
            stats.insta_recharge_chance,
            rng,
        )
    }

    /// Advances Flurry by a kill's worth of hits. Returns the stamina restored
    /// (zero when the cooldown has not expired). A single expiry pays out once
    /// and resets regardless of how far the kill overshot the cooldown.
    pub fn step_flurry(&mut self, stats: &DerivedStats, hits: u64, rng: &mut impl Rng) -> f64 {
        self.flurry_cooldown -= hits as f64;
        if self.flurry_cooldown > 0.0 {
            return 0.0;
        }
        self.flurry_cooldown = stats.flurry_cooldown;
        if rng.gen::<f64>() < stats.insta_recharge_chance {
            stats.flurry_restore * 2.0
        } else {
            stats.flurry_restore
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::{resolve_stats, CharacterBuild};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn base_stats() -> DerivedStats {
        resolve_stats(&CharacterBuild::default())
    }

    #[test]
    fn test_enrage_spends_charges_then_cools_down() {
        let stats = base_stats();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut state = AbilityStates::fresh(&stats);

        // All ten charges empower consecutive hits.
        for _ in 0..stats.enrage_charges {
            assert!(state.step_enrage(&stats, &mut rng));
        }
        // The next hit starts the cooldown instead.
        assert!(!state.step_enrage(&stats, &mut rng));
        assert_eq!(state.enrage.cooldown, stats.enrage_cooldown - 1.0);
    }

    #[test]
    fn test_enrage_refills_after_cooldown() {
        let stats = base_stats();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut state = AbilityStates::fresh(&stats);
        state.enrage.charges = 0;

        // Burn the whole cooldown; the final tick refills but the triggering
        // hit itself is unpowered.
        for _ in 0..stats.enrage_cooldown as u64 {
            assert!(!state.step_enrage(&stats, &mut rng));
        }
        assert!(state.enrage.charges >= stats.enrage_charges);
        assert_eq!(state.enrage.cooldown, stats.enrage_cooldown);
        assert!(state.step_enrage(&stats, &mut rng));
    }

    #[test]
    fn test_refill_can_double_on_insta_recharge() {
        let mut stats = base_stats();
        stats.insta_recharge_chance = 1.0;
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut state = AbilityStates::fresh(&stats);
        state.enrage.charges = 0;
        state.enrage.cooldown = 1.0;

        state.step_enrage(&stats, &mut rng);
        assert_eq!(state.enrage.charges, stats.enrage_charges * 2);
    }

    #[test]
    fn test_flurry_pays_out_once_per_expiry() {
        let mut stats = base_stats();
        stats.insta_recharge_chance = 0.0;
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut state = AbilityStates::fresh(&stats);

        // A kill far longer than the cooldown still pays a single restore.
        let restored = state.step_flurry(&stats, 10_000, &mut rng);
        assert_eq!(restored, stats.flurry_restore);
        assert_eq!(state.flurry_cooldown, stats.flurry_cooldown);

        // A short kill right after restores nothing.
        assert_eq!(state.step_flurry(&stats, 1, &mut rng), 0.0);
    }

    #[test]
    fn test_flurry_doubles_on_insta_recharge() {
        let mut stats = base_stats();
        stats.insta_recharge_chance = 1.0;
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut state = AbilityStates::fresh(&stats);

        let restored = state.step_flurry(&stats, 100, &mut rng);
        assert_eq!(restored, stats.flurry_restore * 2.0);
    }
}
