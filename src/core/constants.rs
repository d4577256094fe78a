// Floor geometry
pub const SLOTS_PER_FLOOR: usize = 5;
pub const VAULT_FLOOR_INTERVAL: u32 = 10;
pub const FLOOR_BAND_SIZE: u32 = 25;

// Block kinds and fragment currencies
pub const NUM_BLOCK_KINDS: usize = 5;
pub const NUM_FRAGMENT_KINDS: usize = 4;
pub const NUM_BLOCK_TIERS: usize = 8;

// Block tier stats: (base_health, health_step, base_armor, armor_step, base_xp, xp_step)
// Tier 1 covers floors 1-25, tier 2 floors 26-50, and so on; the steps apply per
// floor above the band start. Floors past the last band keep its steps.
pub const BLOCK_TIER_STATS: [(u32, u32, u32, f64, u32, u32); NUM_BLOCK_TIERS] = [
    (8, 2, 0, 0.20, 5, 1),               // Tier 1: floors 1-25
    (70, 7, 5, 0.30, 34, 2),             // Tier 2: floors 26-50
    (260, 18, 13, 0.40, 92, 4),          // Tier 3: floors 51-75
    (750, 40, 24, 0.50, 210, 8),         // Tier 4: floors 76-100
    (1_900, 90, 38, 0.60, 440, 14),      // Tier 5: floors 101-125
    (4_400, 190, 55, 0.80, 860, 22),     // Tier 6: floors 126-150
    (9_800, 400, 76, 1.00, 1_600, 34),   // Tier 7: floors 151-175
    (21_000, 850, 100, 1.20, 2_900, 52), // Tier 8: floors 176+ (endgame wall)
];

// Per-kind balance: (health_mult, armor_bonus, xp_mult, fragment_yield)
// Dirt is filler: no XP, no fragments.
pub const BLOCK_KIND_BALANCE: [(f64, u32, f64, u32); NUM_BLOCK_KINDS] = [
    (0.75, 0, 0.0, 0), // Dirt
    (1.00, 0, 1.0, 1), // Stone
    (1.30, 1, 1.4, 1), // Amber
    (1.70, 2, 1.9, 1), // Quartz
    (2.40, 4, 2.8, 2), // Obsidian
];

// Spawn weight bands: (first_floor, dirt, stone, amber, quartz, obsidian)
// Each row sums to 0.90; the remaining 0.10 is the empty-slot gap.
pub const SPAWN_BANDS: [(u32, f64, f64, f64, f64, f64); 6] = [
    (1, 0.40, 0.30, 0.12, 0.06, 0.02),
    (11, 0.34, 0.30, 0.15, 0.08, 0.03),
    (26, 0.28, 0.30, 0.17, 0.10, 0.05),
    (51, 0.22, 0.28, 0.20, 0.13, 0.07),
    (101, 0.16, 0.26, 0.22, 0.16, 0.10),
    (151, 0.10, 0.24, 0.24, 0.19, 0.13),
];

// Character skills
pub const NUM_SKILLS: usize = 5;
pub const DEFAULT_SKILL_CAP: u32 = 100;

// Base combat stats
pub const BASE_DAMAGE: f64 = 5.0;
pub const BASE_ARMOR_PEN: f64 = 0.0;
pub const BASE_MAX_STAMINA: f64 = 200.0;
pub const BASE_CRIT_CHANCE: f64 = 0.05;
pub const BASE_CRIT_MULT: f64 = 2.0;
pub const BASE_SUPER_CRIT_CHANCE: f64 = 0.02;
pub const BASE_SUPER_CRIT_MULT: f64 = 4.0;
pub const BASE_ULTRA_CRIT_CHANCE: f64 = 0.01;
pub const BASE_ULTRA_CRIT_MULT: f64 = 8.0;
pub const BASE_ONE_HIT_KILL_CHANCE: f64 = 0.0;
pub const BASE_XP_MULT: f64 = 1.0;
pub const BASE_FRAGMENT_MULT: f64 = 1.0;

// Per-point skill bonuses
pub const DAMAGE_PER_POWER_POINT: f64 = 2.0;
pub const ARMOR_PEN_PER_POWER_POINT: f64 = 0.25;
pub const CRIT_CHANCE_PER_PRECISION_POINT: f64 = 0.0025;
pub const SUPER_CRIT_CHANCE_PER_PRECISION_POINT: f64 = 0.0008;
pub const OHK_CHANCE_PER_PRECISION_POINT: f64 = 0.0002;
pub const STAMINA_PER_ENDURANCE_POINT: f64 = 6.0;
pub const STAMINA_MOD_CHANCE_PER_ENDURANCE_POINT: f64 = 0.0005;
pub const XP_MOD_CHANCE_PER_FORTUNE_POINT: f64 = 0.001;
pub const LOOT_MOD_CHANCE_PER_FORTUNE_POINT: f64 = 0.001;
pub const FRAGMENT_MULT_PER_FORTUNE_POINT: f64 = 0.003;
pub const ENRAGE_COOLDOWN_CUT_PER_CELERITY_POINT: f64 = 0.10;
pub const QUAKE_COOLDOWN_CUT_PER_CELERITY_POINT: f64 = 0.12;
pub const FLURRY_COOLDOWN_CUT_PER_CELERITY_POINT: f64 = 0.15;
pub const SPEED_MOD_CHANCE_PER_CELERITY_POINT: f64 = 0.0008;
pub const INSTA_RECHARGE_PER_CELERITY_POINT: f64 = 0.0005;

// Mod procs (rolled once per kill)
pub const BASE_XP_MOD_CHANCE: f64 = 0.05;
pub const XP_MOD_MULT: f64 = 2.0;
pub const BASE_LOOT_MOD_CHANCE: f64 = 0.05;
pub const LOOT_MOD_MULT: f64 = 2.0;
pub const BASE_SPEED_MOD_CHANCE: f64 = 0.04;
pub const SPEED_MOD_HITS: f64 = 2.0;
pub const BASE_STAMINA_MOD_CHANCE: f64 = 0.03;
pub const STAMINA_MOD_MIN: f64 = 5.0;
pub const STAMINA_MOD_MAX: f64 = 15.0;

// Enrage: charge/cooldown machine, cooldown counted in hits
pub const ENRAGE_BASE_CHARGES: u32 = 10;
pub const ENRAGE_BASE_COOLDOWN: f64 = 60.0;
pub const ENRAGE_MIN_COOLDOWN: f64 = 20.0;
pub const ENRAGE_DAMAGE_MULT: f64 = 2.0;
pub const ENRAGE_CRIT_BONUS: f64 = 0.15;

// Quake: charge/cooldown machine with splash onto other living blocks
pub const QUAKE_BASE_CHARGES: u32 = 5;
pub const QUAKE_BASE_COOLDOWN: f64 = 80.0;
pub const QUAKE_MIN_COOLDOWN: f64 = 30.0;
pub const QUAKE_SPLASH_FRACTION: f64 = 0.35;

// Flurry: cooldown-only, restores stamina on activation
pub const FLURRY_BASE_COOLDOWN: f64 = 45.0;
pub const FLURRY_MIN_COOLDOWN: f64 = 15.0;
pub const FLURRY_BASE_RESTORE: f64 = 12.0;

// Insta-recharge doubles the refill (or restore) when it procs
pub const BASE_INSTA_RECHARGE_CHANCE: f64 = 0.05;

// Card tiers: levels 0-3 map to fixed yield bonuses; level 3 additionally
// receives the polychrome bonus. The factor also divides block health.
pub const NUM_CARD_LEVELS: usize = 4;
pub const MAX_CARD_LEVEL: u8 = 3;
pub const CARD_LEVEL_BONUS: [f64; NUM_CARD_LEVELS] = [0.0, 0.10, 0.25, 0.50];

// Simulated time: one swing per second
pub const SECONDS_PER_HIT: f64 = 1.0;
pub const SECONDS_PER_HOUR: f64 = 3600.0;

// Simulation safety bounds (termination guards, not game rules)
pub const MAX_HITS_PER_BLOCK: u64 = 100_000;
pub const MAX_FLOORS_PER_RUN: u32 = 10_000;

// Optimizer phase sizes
pub const SCREEN_CANDIDATES: usize = 600;
pub const SCREEN_RUNS: u32 = 12;
pub const ANCHOR_FRACTION: f64 = 0.05;
pub const NEIGHBORS_PER_ANCHOR: usize = 6;
pub const REFINE_RUNS: u32 = 60;
pub const FINAL_RUNS: u32 = 1_000;
pub const PERTURB_RADIUS: i64 = 3;
// Each repair pass fully resolves one violation; five buckets and four
// violation classes need at most 20 passes, so 32 is a hard stop.
pub const ALLOCATION_REPAIR_MAX_ITERS: usize = 32;

// Tie-break tolerance: eps = max(floor, fraction x best observed metric)
pub const TIE_EPSILON_FLOOR: f64 = 0.01;
pub const TIE_EPSILON_FRACTION: f64 = 0.03;

// Worker pool
pub const DEFAULT_MAX_WORKERS: usize = 8;
pub const DEFAULT_MAX_IN_FLIGHT: usize = 32;

// Histogram rendering
pub const REPORT_HISTOGRAM_BINS: usize = 16;
