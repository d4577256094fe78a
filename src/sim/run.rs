//! Single-run simulation: floors, spawns, kill resolution, stamina.
//!
//! One run descends floor by floor from a starting floor. Each floor fills a
//! fixed number of slots from the floor's spawn table, resolves every spawned
//! block left to right, then settles the floor's accumulated stamina cost
//! against remaining stamina. A floor the character cannot fully afford is
//! committed fractionally and ends the run.

use super::abilities::AbilityStates;
use super::config::SimOptions;
use crate::blocks::{block_descriptors_for_floor, spawn_rates_for_floor, BlockKind, FragmentKind};
use crate::character::{CardConfig, DerivedStats};
use crate::core::constants::{
    MAX_FLOORS_PER_RUN, MAX_HITS_PER_BLOCK, NUM_BLOCK_KINDS, NUM_FRAGMENT_KINDS, SECONDS_PER_HIT,
    SECONDS_PER_HOUR, SLOTS_PER_FLOOR,
};
use log::warn;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Everything one simulated run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunMetrics {
    /// Whole floors fully cleared plus the fractional last floor.
    pub floors_cleared: f64,
    pub xp: f64,
    /// Fragment income per kind, indexed by `FragmentKind::index()`.
    pub fragments: [f64; NUM_FRAGMENT_KINDS],
    pub total_hits: u64,
    /// Simulated wall-clock duration, never below one second.
    pub duration_secs: f64,
    /// Kill counts per kind, indexed by `BlockKind::index()`.
    pub kills_by_kind: [u64; NUM_BLOCK_KINDS],
    /// Hit counts per kind, indexed by `BlockKind::index()`.
    pub hits_by_kind: [u64; NUM_BLOCK_KINDS],
    /// Most hits any single block took.
    pub max_hits_single_block: u64,
    /// Blocks abandoned at the per-block hit safety cutoff.
    pub cutoff_triggers: u32,
}

impl RunMetrics {
    pub fn xp_per_hour(&self) -> f64 {
        self.xp / self.duration_secs * SECONDS_PER_HOUR
    }

    pub fn fragments_per_hour(&self, kind: FragmentKind) -> f64 {
        self.fragments[kind.index()] / self.duration_secs * SECONDS_PER_HOUR
    }

    /// The kind that consumed the most hits, ties going to the earlier kind.
    /// None when nothing was hit.
    pub fn slowest_kind(&self) -> Option<BlockKind> {
        let mut best: Option<(usize, u64)> = None;
        for (idx, &hits) in self.hits_by_kind.iter().enumerate() {
            if hits > 0 && best.map_or(true, |(_, top)| hits > top) {
                best = Some((idx, hits));
            }
        }
        best.map(|(idx, _)| BlockKind::all()[idx])
    }
}

/// One spawned block being worked down.
struct FloorBlock {
    kind_idx: usize,
    /// Card-adjusted remaining health.
    health: f64,
    armor: u32,
    xp_yield: u32,
    fragment_yield: u32,
}

/// Contributions of the floor in progress. Committed whole when the floor is
/// affordable, scaled by the cleared fraction when it is not.
#[derive(Default)]
struct FloorTally {
    /// Stamina cost, in hits net of speed-mod discounts.
    cost: f64,
    hits: u64,
    xp: f64,
    fragments: [f64; NUM_FRAGMENT_KINDS],
    kills_by_kind: [u64; NUM_BLOCK_KINDS],
    hits_by_kind: [u64; NUM_BLOCK_KINDS],
    max_hits_single_block: u64,
    cutoff_triggers: u32,
}

/// Committed run totals.
struct RunState {
    stamina: f64,
    max_stamina: f64,
    floors_cleared: f64,
    xp: f64,
    fragments: [f64; NUM_FRAGMENT_KINDS],
    total_hits: u64,
    kills_by_kind: [u64; NUM_BLOCK_KINDS],
    hits_by_kind: [u64; NUM_BLOCK_KINDS],
    max_hits_single_block: u64,
    cutoff_triggers: u32,
}

impl RunState {
    fn new(max_stamina: f64) -> Self {
        Self {
            stamina: max_stamina,
            max_stamina,
            floors_cleared: 0.0,
            xp: 0.0,
            fragments: [0.0; NUM_FRAGMENT_KINDS],
            total_hits: 0,
            kills_by_kind: [0; NUM_BLOCK_KINDS],
            hits_by_kind: [0; NUM_BLOCK_KINDS],
            max_hits_single_block: 0,
            cutoff_triggers: 0,
        }
    }

    fn restore_stamina(&mut self, amount: f64) {
        self.stamina = (self.stamina + amount).min(self.max_stamina);
    }

    fn commit_full(&mut self, tally: &FloorTally) {
        self.stamina -= tally.cost;
        self.floors_cleared += 1.0;
        self.xp += tally.xp;
        self.total_hits += tally.hits;
        for i in 0..NUM_FRAGMENT_KINDS {
            self.fragments[i] += tally.fragments[i];
        }
        for i in 0..NUM_BLOCK_KINDS {
            self.kills_by_kind[i] += tally.kills_by_kind[i];
            self.hits_by_kind[i] += tally.hits_by_kind[i];
        }
        self.max_hits_single_block = self.max_hits_single_block.max(tally.max_hits_single_block);
        self.cutoff_triggers += tally.cutoff_triggers;
    }

    /// Commits the affordable fraction of an unaffordable floor. Integer
    /// counters scale and truncate; observed maxima and cutoff counts are
    /// events that happened and stay whole.
    fn commit_partial(&mut self, tally: &FloorTally, fraction: f64) {
        self.stamina = 0.0;
        self.floors_cleared += fraction;
        self.xp += tally.xp * fraction;
        self.total_hits += (tally.hits as f64 * fraction).trunc() as u64;
        for i in 0..NUM_FRAGMENT_KINDS {
            self.fragments[i] += tally.fragments[i] * fraction;
        }
        for i in 0..NUM_BLOCK_KINDS {
            self.kills_by_kind[i] += (tally.kills_by_kind[i] as f64 * fraction).trunc() as u64;
            self.hits_by_kind[i] += (tally.hits_by_kind[i] as f64 * fraction).trunc() as u64;
        }
        self.max_hits_single_block = self.max_hits_single_block.max(tally.max_hits_single_block);
        self.cutoff_triggers += tally.cutoff_triggers;
    }

    fn into_metrics(self) -> RunMetrics {
        RunMetrics {
            floors_cleared: self.floors_cleared,
            xp: self.xp,
            fragments: self.fragments,
            total_hits: self.total_hits,
            duration_secs: self.total_hits.max(1) as f64 * SECONDS_PER_HIT,
            kills_by_kind: self.kills_by_kind,
            hits_by_kind: self.hits_by_kind,
            max_hits_single_block: self.max_hits_single_block,
            cutoff_triggers: self.cutoff_triggers,
        }
    }
}

/// Simulate one run starting at `starting_floor`.
///
/// Ability state is supplied by the caller so a batch can either reset it per
/// run or carry it across runs.
pub fn simulate_run(
    stats: &DerivedStats,
    options: &SimOptions,
    cards: &CardConfig,
    starting_floor: u32,
    abilities: &mut AbilityStates,
    rng: &mut impl Rng,
) -> RunMetrics {
    let mut state = RunState::new(stats.max_stamina as f64);
    let card_factors = cards.factors();
    let mut floor = starting_floor.max(1);
    let floor_cap = options.max_floors.min(MAX_FLOORS_PER_RUN);

    for _ in 0..floor_cap {
        let mut blocks = spawn_floor(floor, &card_factors, rng);
        let mut tally = FloorTally::default();

        for target in 0..blocks.len() {
            let hits = resolve_block(
                &mut blocks,
                target,
                floor,
                stats,
                options,
                abilities,
                &mut tally,
                rng,
            );
            if let Some(hits) = hits {
                credit_kill(
                    &blocks[target],
                    hits,
                    stats,
                    options,
                    &card_factors,
                    abilities,
                    &mut state,
                    &mut tally,
                    rng,
                );
            }
        }

        if tally.cost <= state.stamina {
            state.commit_full(&tally);
            floor += 1;
        } else {
            let fraction = state.stamina / tally.cost;
            state.commit_partial(&tally, fraction);
            break;
        }
    }

    state.into_metrics()
}

/// Fill the floor's slots from its spawn table.
fn spawn_floor(floor: u32, card_factors: &[f64; NUM_BLOCK_KINDS], rng: &mut impl Rng) -> Vec<FloorBlock> {
    let descriptors = block_descriptors_for_floor(floor);
    let rates = spawn_rates_for_floor(floor);
    let mut blocks = Vec::with_capacity(SLOTS_PER_FLOOR);

    for _ in 0..SLOTS_PER_FLOOR {
        if let Some(kind) = sample_spawn(&rates, rng) {
            let idx = kind.index();
            let descriptor = &descriptors[idx];
            blocks.push(FloorBlock {
                kind_idx: idx,
                health: descriptor.health as f64 / card_factors[idx],
                armor: descriptor.armor,
                xp_yield: descriptor.xp_yield,
                fragment_yield: descriptor.fragment_yield,
            });
        }
    }
    blocks
}

/// One slot's categorical draw; the weight deficit below 1.0 is the empty
/// slot chance.
fn sample_spawn(rates: &[(BlockKind, f64)], rng: &mut impl Rng) -> Option<BlockKind> {
    let roll: f64 = rng.gen();
    let mut cumulative = 0.0;
    for &(kind, rate) in rates {
        cumulative += rate;
        if roll < cumulative {
            return Some(kind);
        }
    }
    None
}

enum HitOutcome {
    OneHitKill,
    /// `applied` lands on the target; `mitigated` is the pre-crit amount
    /// splash damage derives from.
    Damage { applied: f64, mitigated: f64 },
}

/// One swing against a block with `armor`, rolling the kill chain when
/// probabilistic mode is on. The crit chain is nested: super-crit only rolls
/// on a crit, ultra-crit only on a super-crit, and the deepest tier reached
/// replaces the multiplier.
fn roll_hit(
    stats: &DerivedStats,
    use_crit: bool,
    enraged: bool,
    armor: u32,
    rng: &mut impl Rng,
) -> HitOutcome {
    if use_crit && rng.gen::<f64>() < stats.one_hit_kill_chance {
        return HitOutcome::OneHitKill;
    }

    let mut raw = stats.damage as f64;
    if enraged {
        raw *= stats.enrage_damage_mult;
    }
    let mitigation = armor.saturating_sub(stats.armor_pen) as f64;
    let mitigated = (raw - mitigation).trunc().max(1.0);

    let mut applied = mitigated;
    if use_crit {
        let crit_chance = if enraged {
            stats.crit_chance + stats.enrage_crit_bonus
        } else {
            stats.crit_chance
        };
        if rng.gen::<f64>() < crit_chance {
            let mut mult = stats.crit_mult;
            if rng.gen::<f64>() < stats.super_crit_chance {
                mult = stats.super_crit_mult;
                if rng.gen::<f64>() < stats.ultra_crit_chance {
                    mult = stats.ultra_crit_mult;
                }
            }
            applied = mitigated * mult;
        }
    }
    HitOutcome::Damage { applied, mitigated }
}

/// Work the target block down to zero health. Returns the hits spent, or
/// None when the safety cutoff abandoned the block (its swings still cost
/// stamina but it yields nothing).
#[allow(clippy::too_many_arguments)]
fn resolve_block(
    blocks: &mut [FloorBlock],
    target: usize,
    floor: u32,
    stats: &DerivedStats,
    options: &SimOptions,
    abilities: &mut AbilityStates,
    tally: &mut FloorTally,
    rng: &mut impl Rng,
) -> Option<u64> {
    // Splash from an earlier block may already have finished it; it counts
    // as a zero-hit kill and still yields on arrival.
    if blocks[target].health <= 0.0 {
        return Some(0);
    }

    let mut hits: u64 = 0;
    while blocks[target].health > 0.0 {
        if hits >= MAX_HITS_PER_BLOCK {
            warn!(
                "abandoning block on floor {} after {} hits (safety cutoff)",
                floor, MAX_HITS_PER_BLOCK
            );
            let kind_idx = blocks[target].kind_idx;
            tally.cutoff_triggers += 1;
            tally.hits += hits;
            tally.hits_by_kind[kind_idx] += hits;
            tally.cost += hits as f64;
            tally.max_hits_single_block = tally.max_hits_single_block.max(hits);
            return None;
        }
        hits += 1;

        let enraged = options.enrage_enabled && abilities.step_enrage(stats, rng);
        let quaking = options.quake_enabled && abilities.step_quake(stats, rng);

        match roll_hit(stats, options.use_crit, enraged, blocks[target].armor, rng) {
            HitOutcome::OneHitKill => {
                blocks[target].health = 0.0;
            }
            HitOutcome::Damage { applied, mitigated } => {
                blocks[target].health -= applied;
                if quaking {
                    splash_other_blocks(
                        blocks,
                        target,
                        mitigated * stats.quake_splash_fraction,
                        stats,
                        options.use_crit,
                        rng,
                    );
                }
            }
        }
    }
    Some(hits)
}

/// Quake splash onto every other living block on the floor. Each splash rolls
/// its own crit, independent of the triggering hit's.
fn splash_other_blocks(
    blocks: &mut [FloorBlock],
    target: usize,
    base: f64,
    stats: &DerivedStats,
    use_crit: bool,
    rng: &mut impl Rng,
) {
    for (idx, block) in blocks.iter_mut().enumerate() {
        if idx == target || block.health <= 0.0 {
            continue;
        }
        let mut amount = base;
        if use_crit && rng.gen::<f64>() < stats.crit_chance {
            amount *= stats.crit_mult;
        }
        block.health -= amount;
    }
}

/// Book a finished kill: yields, per-kill procs, stamina cost, Flurry tick.
#[allow(clippy::too_many_arguments)]
fn credit_kill(
    block: &FloorBlock,
    hits: u64,
    stats: &DerivedStats,
    options: &SimOptions,
    card_factors: &[f64; NUM_BLOCK_KINDS],
    abilities: &mut AbilityStates,
    state: &mut RunState,
    tally: &mut FloorTally,
    rng: &mut impl Rng,
) {
    let kind = BlockKind::all()[block.kind_idx];
    tally.kills_by_kind[block.kind_idx] += 1;
    tally.hits_by_kind[block.kind_idx] += hits;
    tally.hits += hits;
    tally.max_hits_single_block = tally.max_hits_single_block.max(hits);

    // Filler blocks yield nothing and skip the yield procs.
    if !kind.is_filler() {
        let mut xp = block.xp_yield as f64 * card_factors[block.kind_idx] * stats.xp_mult;
        if rng.gen::<f64>() < stats.xp_mod_chance {
            xp *= stats.xp_mod_mult;
        }
        tally.xp += xp;

        if let Some(fragment) = kind.fragment() {
            let mut yielded =
                block.fragment_yield as f64 * card_factors[block.kind_idx] * stats.fragment_mult;
            if rng.gen::<f64>() < stats.loot_mod_chance {
                yielded *= stats.loot_mod_mult;
            }
            tally.fragments[fragment.index()] += yielded;
        }
    }

    if rng.gen::<f64>() < stats.stamina_mod_chance {
        let restored = rng.gen_range(stats.stamina_mod_min..=stats.stamina_mod_max);
        state.restore_stamina(restored);
    }

    let mut cost = hits as f64;
    if rng.gen::<f64>() < stats.speed_mod_chance {
        cost -= stats.speed_mod_hits.min(cost);
    }
    tally.cost += cost;

    if options.flurry_enabled {
        let restored = abilities.step_flurry(stats, hits, rng);
        if restored > 0.0 {
            state.restore_stamina(restored);
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

    fn run_with_seed(
        stats: &DerivedStats,
        options: &SimOptions,
        starting_floor: u32,
        seed: u64,
    ) -> RunMetrics {
        let cards = CardConfig::default();
        let mut abilities = AbilityStates::fresh(stats);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        simulate_run(stats, options, &cards, starting_floor, &mut abilities, &mut rng)
    }

    #[test]
    fn test_fresh_build_always_clears_the_first_floor() {
        // Worst case on floor 1 is five Obsidian blocks: 19 effective health
        // each against an effective damage of 1 is 95 hits, inside the 200
        // base stamina. No seed can fail the first floor.
        let stats = base_stats();
        for seed in 0..20 {
            let metrics = run_with_seed(&stats, &SimOptions::default(), 1, seed);
            assert!(
                metrics.floors_cleared >= 1.0,
                "seed {} cleared only {}",
                seed,
                metrics.floors_cleared
            );
        }
    }

    #[test]
    fn test_identical_seed_reproduces_the_run() {
        let stats = base_stats();
        let a = run_with_seed(&stats, &SimOptions::default(), 5, 99);
        let b = run_with_seed(&stats, &SimOptions::default(), 5, 99);
        assert_eq!(a, b);
    }

    #[test]
    fn test_duration_never_below_one_second() {
        let stats = base_stats();
        // A floor cap of zero simulates nothing at all.
        let metrics = run_with_seed(&stats, &SimOptions::floor_capped(0), 1, 3);
        assert_eq!(metrics.total_hits, 0);
        assert_eq!(metrics.duration_secs, 1.0);
    }

    #[test]
    fn test_floor_cap_stops_an_unexhausted_run() {
        let mut stats = base_stats();
        stats.max_stamina = 1_000_000;
        let metrics = run_with_seed(&stats, &SimOptions::floor_capped(3), 1, 11);
        assert_eq!(metrics.floors_cleared, 3.0);
    }

    #[test]
    fn test_fractional_part_stays_in_unit_interval() {
        let stats = base_stats();
        for seed in 0..20 {
            let metrics = run_with_seed(&stats, &SimOptions::default(), 1, seed);
            let fractional = metrics.floors_cleared.fract();
            assert!((0.0..1.0).contains(&fractional));
        }
    }

    #[test]
    fn test_exhausted_run_ends_with_partial_floor() {
        // At 1 damage the cheapest possible floor-1 block takes 6 hits, and
        // the speed mod can shave at most 2, so no spawned floor fits in 3
        // stamina. The run has to end on a fraction.
        let mut stats = base_stats();
        stats.max_stamina = 3;
        stats.damage = 1;
        let options = SimOptions {
            use_crit: false,
            ..SimOptions::abilities_off()
        };
        for seed in 0..10 {
            let metrics = run_with_seed(&stats, &options, 1, seed);
            let fractional = metrics.floors_cleared.fract();
            assert!(
                fractional > 0.0,
                "seed {} ended on a whole floor count {}",
                seed,
                metrics.floors_cleared
            );
        }
    }

    #[test]
    fn test_vault_floor_spawns_only_its_kind() {
        let mut stats = base_stats();
        stats.max_stamina = 1_000_000;
        // Floor 10 is the first vault: all Stone, every slot filled.
        let metrics = run_with_seed(&stats, &SimOptions::floor_capped(1), 10, 17);
        assert_eq!(metrics.kills_by_kind[BlockKind::Stone.index()], 5);
        for kind in [
            BlockKind::Dirt,
            BlockKind::Amber,
            BlockKind::Quartz,
            BlockKind::Obsidian,
        ] {
            assert_eq!(metrics.kills_by_kind[kind.index()], 0);
        }
        assert!(metrics.fragments[FragmentKind::Stone.index()] > 0.0);
    }

    #[test]
    fn test_safety_cutoff_abandons_block_and_counts() {
        // Deep floor, plain hits for 1 damage against six-figure health:
        // every spawned block exceeds the cutoff deterministically.
        let stats = base_stats();
        let options = SimOptions {
            use_crit: false,
            enrage_enabled: false,
            flurry_enabled: false,
            quake_enabled: false,
            ..SimOptions::default()
        };
        let metrics = run_with_seed(&stats, &options, 320, 4);
        assert!(metrics.cutoff_triggers >= 1);
        assert_eq!(metrics.kills_by_kind.iter().sum::<u64>(), 0);
        assert_eq!(metrics.max_hits_single_block, MAX_HITS_PER_BLOCK);
    }

    #[test]
    fn test_slowest_kind_reports_the_biggest_hit_sink() {
        let mut metrics = RunMetrics {
            floors_cleared: 1.0,
            xp: 0.0,
            fragments: [0.0; NUM_FRAGMENT_KINDS],
            total_hits: 30,
            duration_secs: 30.0,
            kills_by_kind: [0; NUM_BLOCK_KINDS],
            hits_by_kind: [3, 7, 20, 0, 0],
            max_hits_single_block: 20,
            cutoff_triggers: 0,
        };
        assert_eq!(metrics.slowest_kind(), Some(BlockKind::Amber));

        metrics.hits_by_kind = [0; NUM_BLOCK_KINDS];
        assert_eq!(metrics.slowest_kind(), None);
    }

    #[test]
    fn test_rates_derive_from_duration() {
        let metrics = RunMetrics {
            floors_cleared: 2.0,
            xp: 100.0,
            fragments: [36.0, 0.0, 0.0, 0.0],
            total_hits: 7_200,
            duration_secs: 7_200.0,
            kills_by_kind: [0; NUM_BLOCK_KINDS],
            hits_by_kind: [0; NUM_BLOCK_KINDS],
            max_hits_single_block: 0,
            cutoff_triggers: 0,
        };
        assert_eq!(metrics.xp_per_hour(), 50.0);
        assert_eq!(metrics.fragments_per_hour(FragmentKind::Stone), 18.0);
    }
}
