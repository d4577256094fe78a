//! Block balance lookup: per-floor descriptors and spawn tables.
//!
//! Pure data, no state. The simulator consults these on every floor; the
//! numbers themselves live in `core::constants` next to the other tuning
//! tables.

use super::{BlockKind, FragmentKind};
use crate::core::constants::{
    BLOCK_KIND_BALANCE, BLOCK_TIER_STATS, FLOOR_BAND_SIZE, NUM_BLOCK_KINDS, NUM_BLOCK_TIERS,
    SPAWN_BANDS, VAULT_FLOOR_INTERVAL,
};

/// Stats for one block kind on one floor.
#[derive(Debug, Clone, Copy)]
pub struct BlockDescriptor {
    pub kind: BlockKind,
    /// 1-based tier band index.
    pub tier: u32,
    pub health: u32,
    pub armor: u32,
    pub xp_yield: u32,
    pub fragment_yield: u32,
    /// First floor of the tier band this descriptor was derived from.
    pub floor_lo: u32,
    /// Last floor of the band; the final band is open-ended.
    pub floor_hi: u32,
}

/// Tier band index and depth within the band for a floor.
///
/// Floors past the last band keep counting depth against it, so the endgame
/// scaling continues indefinitely.
fn tier_and_depth(floor: u32) -> (usize, u32) {
    let floor = floor.max(1);
    let raw_tier = ((floor - 1) / FLOOR_BAND_SIZE) as usize;
    let tier = raw_tier.min(NUM_BLOCK_TIERS - 1);
    let band_start = tier as u32 * FLOOR_BAND_SIZE + 1;
    (tier, floor - band_start)
}

/// Descriptor for one kind on one floor.
pub fn block_descriptor(kind: BlockKind, floor: u32) -> BlockDescriptor {
    let (tier, depth) = tier_and_depth(floor);
    let (base_health, health_step, base_armor, armor_step, base_xp, xp_step) =
        BLOCK_TIER_STATS[tier];
    let (health_mult, armor_bonus, xp_mult, fragment_yield) = BLOCK_KIND_BALANCE[kind.index()];

    let health = (((base_health + health_step * depth) as f64) * health_mult).trunc() as u32;
    let armor = base_armor + (armor_step * depth as f64).trunc() as u32 + armor_bonus;
    let xp_yield = (((base_xp + xp_step * depth) as f64) * xp_mult).trunc() as u32;

    let floor_lo = tier as u32 * FLOOR_BAND_SIZE + 1;
    let floor_hi = if tier == NUM_BLOCK_TIERS - 1 {
        u32::MAX
    } else {
        (tier as u32 + 1) * FLOOR_BAND_SIZE
    };

    BlockDescriptor {
        kind,
        tier: tier as u32 + 1,
        health: health.max(1),
        armor,
        xp_yield,
        fragment_yield,
        floor_lo,
        floor_hi,
    }
}

/// Descriptors for every kind on a floor, indexed by `BlockKind::index()`.
pub fn block_descriptors_for_floor(floor: u32) -> [BlockDescriptor; NUM_BLOCK_KINDS] {
    BlockKind::all().map(|kind| block_descriptor(kind, floor))
}

/// Whether the floor is a vault floor (deterministic single-kind spawns).
pub fn is_vault_floor(floor: u32) -> bool {
    floor > 0 && floor % VAULT_FLOOR_INTERVAL == 0
}

/// The kind a vault floor spawns. Vaults cycle through the non-filler kinds.
pub fn vault_kind_for_floor(floor: u32) -> BlockKind {
    let cycle = (floor / VAULT_FLOOR_INTERVAL - 1) as usize % FragmentKind::all().len();
    FragmentKind::all()[cycle].block()
}

/// Spawn probabilities per kind for a floor. Weights sum to at most 1.0; the
/// remainder is the empty-slot chance. Vault floors override the table with a
/// single certain kind.
pub fn spawn_rates_for_floor(floor: u32) -> Vec<(BlockKind, f64)> {
    if is_vault_floor(floor) {
        return vec![(vault_kind_for_floor(floor), 1.0)];
    }

    let floor = floor.max(1);
    let mut band = SPAWN_BANDS[0];
    for row in SPAWN_BANDS.iter() {
        if row.0 <= floor {
            band = *row;
        }
    }
    let (_, dirt, stone, amber, quartz, obsidian) = band;
    vec![
        (BlockKind::Dirt, dirt),
        (BlockKind::Stone, stone),
        (BlockKind::Amber, amber),
        (BlockKind::Quartz, quartz),
        (BlockKind::Obsidian, obsidian),
    ]
}
