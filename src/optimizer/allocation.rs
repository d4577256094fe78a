//! Candidate generation: exponential-weights sampling, perturbation, repair.
//!
//! Every allocation that leaves this module satisfies the constraints: the
//! point sum never exceeds the budget, no skill exceeds its cap, and every
//! minimum is met when the budget allows it.

use crate::core::constants::{
    ALLOCATION_REPAIR_MAX_ITERS, DEFAULT_SKILL_CAP, NUM_SKILLS, PERTURB_RADIUS,
};
use rand::Rng;

/// Bounds the optimizer searches within.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationConstraints {
    /// Total points to distribute.
    pub budget: u32,
    /// Per-skill ceilings, indexed by `SkillKind::index()`.
    pub caps: [u32; NUM_SKILLS],
    /// Per-skill floors ("at least 1 point in skill X" style pins).
    pub minimums: [u32; NUM_SKILLS],
}

impl AllocationConstraints {
    /// Default caps, no minimums.
    pub fn for_budget(budget: u32) -> Self {
        Self {
            budget,
            caps: [DEFAULT_SKILL_CAP; NUM_SKILLS],
            minimums: [0; NUM_SKILLS],
        }
    }

    pub fn with_minimum(mut self, skill_idx: usize, minimum: u32) -> Self {
        self.minimums[skill_idx] = minimum;
        self
    }
}

/// Draw one candidate: an Exp(1) weight per skill, normalized to the budget,
/// floored, with the rounding remainder going to the largest fractional
/// remainders first.
pub fn sample_allocation(
    constraints: &AllocationConstraints,
    rng: &mut impl Rng,
) -> [u32; NUM_SKILLS] {
    let mut weights = [0.0f64; NUM_SKILLS];
    for weight in weights.iter_mut() {
        let u: f64 = rng.gen();
        // Inverse transform; u is in [0, 1) so the argument stays positive.
        *weight = -(1.0 - u).ln();
    }
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        // All weights collapsed to zero; fall back to an even split.
        weights = [1.0; NUM_SKILLS];
    }
    let total: f64 = weights.iter().sum();

    let budget = constraints.budget as f64;
    let mut alloc = [0u32; NUM_SKILLS];
    let mut remainders = [0.0f64; NUM_SKILLS];
    let mut assigned = 0u32;
    for i in 0..NUM_SKILLS {
        let share = weights[i] / total * budget;
        alloc[i] = share.floor() as u32;
        remainders[i] = share - share.floor();
        assigned += alloc[i];
    }

    // Largest remainders first; ties resolve to the lower index.
    let mut order: [usize; NUM_SKILLS] = std::array::from_fn(|i| i);
    order.sort_by(|&a, &b| remainders[b].total_cmp(&remainders[a]).then(a.cmp(&b)));
    let mut leftover = constraints.budget.saturating_sub(assigned);
    for &idx in order.iter() {
        if leftover == 0 {
            break;
        }
        alloc[idx] += 1;
        leftover -= 1;
    }

    repair_allocation(&mut alloc, constraints);
    alloc
}

/// Shift each skill by a signed offset within the perturbation radius, then
/// repair the sum and caps the same way sampling does.
pub fn perturb_allocation(
    base: &[u32; NUM_SKILLS],
    constraints: &AllocationConstraints,
    rng: &mut impl Rng,
) -> [u32; NUM_SKILLS] {
    let mut alloc = [0u32; NUM_SKILLS];
    for i in 0..NUM_SKILLS {
        let delta = rng.gen_range(-PERTURB_RADIUS..=PERTURB_RADIUS);
        alloc[i] = (base[i] as i64 + delta).max(0) as u32;
    }
    repair_allocation(&mut alloc, constraints);
    alloc
}

/// Deterministic bounded repair. Each pass fully resolves one violation:
/// an over-cap bucket sheds its excess into the bucket with the most
/// headroom, an under-minimum bucket pulls from the largest donor above its
/// own minimum, a sum above the budget is trimmed from the largest bucket,
/// and a sum below it is topped back up wherever headroom remains. A build
/// never banks points, so full spend is part of the canonical form. The
/// iteration bound is a safety property; five buckets need far fewer
/// passes than the cap.
pub fn repair_allocation(alloc: &mut [u32; NUM_SKILLS], constraints: &AllocationConstraints) {
    for _ in 0..ALLOCATION_REPAIR_MAX_ITERS {
        // Cap violations first: they can mask everything else.
        if let Some(i) = (0..NUM_SKILLS).find(|&i| alloc[i] > constraints.caps[i]) {
            let excess = alloc[i] - constraints.caps[i];
            alloc[i] = constraints.caps[i];
            if let Some(j) = largest_headroom(alloc, constraints) {
                let headroom = constraints.caps[j] - alloc[j];
                alloc[j] += excess.min(headroom);
            }
            // With no headroom anywhere the excess is dropped; a sum below
            // the budget is allowed.
            continue;
        }

        if let Some(i) = (0..NUM_SKILLS).find(|&i| alloc[i] < constraints.minimums[i]) {
            let deficit = constraints.minimums[i] - alloc[i];
            if let Some(j) = largest_donor(alloc, constraints, i) {
                let available = alloc[j] - constraints.minimums[j];
                let moved = deficit.min(available);
                alloc[j] -= moved;
                alloc[i] += moved;
            } else {
                // Nothing left to move; the minimum is unsatisfiable.
                return;
            }
            continue;
        }

        let sum: u32 = alloc.iter().sum();
        if sum > constraints.budget {
            let overshoot = sum - constraints.budget;
            if let Some(j) = largest_donor(alloc, constraints, NUM_SKILLS) {
                let available = alloc[j] - constraints.minimums[j];
                alloc[j] -= overshoot.min(available);
            } else {
                return;
            }
            continue;
        }

        if sum < constraints.budget {
            let deficit = constraints.budget - sum;
            if let Some(j) = largest_headroom(alloc, constraints) {
                let headroom = constraints.caps[j] - alloc[j];
                alloc[j] += deficit.min(headroom);
            } else {
                // Every cap is full; the rest of the budget has nowhere
                // to go.
                return;
            }
            continue;
        }

        return;
    }
}

/// Bucket with the most room below its cap; ties go to the lower index.
fn largest_headroom(
    alloc: &[u32; NUM_SKILLS],
    constraints: &AllocationConstraints,
) -> Option<usize> {
    let mut best: Option<(usize, u32)> = None;
    for i in 0..NUM_SKILLS {
        let headroom = constraints.caps[i].saturating_sub(alloc[i]);
        if headroom > 0 && best.map_or(true, |(_, top)| headroom > top) {
            best = Some((i, headroom));
        }
    }
    best.map(|(i, _)| i)
}

/// Largest bucket still above its minimum, excluding `skip`; ties go to the
/// lower index.
fn largest_donor(
    alloc: &[u32; NUM_SKILLS],
    constraints: &AllocationConstraints,
    skip: usize,
) -> Option<usize> {
    let mut best: Option<(usize, u32)> = None;
    for i in 0..NUM_SKILLS {
        if i == skip || alloc[i] <= constraints.minimums[i] {
            continue;
        }
        if best.map_or(true, |(_, top)| alloc[i] > top) {
            best = Some((i, alloc[i]));
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_samples_respect_budget_and_caps() {
        let constraints = AllocationConstraints::for_budget(120);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..200 {
            let alloc = sample_allocation(&constraints, &mut rng);
            assert!(alloc.iter().sum::<u32>() <= constraints.budget);
            for (i, &points) in alloc.iter().enumerate() {
                assert!(points <= constraints.caps[i]);
            }
        }
    }

    #[test]
    fn test_samples_spend_the_whole_budget_when_caps_allow() {
        let constraints = AllocationConstraints::for_budget(120);
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        for _ in 0..100 {
            let alloc = sample_allocation(&constraints, &mut rng);
            assert_eq!(alloc.iter().sum::<u32>(), 120);
        }
    }

    #[test]
    fn test_sampling_is_deterministic_per_seed() {
        let constraints = AllocationConstraints::for_budget(80);
        let a = sample_allocation(&constraints, &mut ChaCha8Rng::seed_from_u64(9));
        let b = sample_allocation(&constraints, &mut ChaCha8Rng::seed_from_u64(9));
        assert_eq!(a, b);
    }

    #[test]
    fn test_minimums_are_repaired_in() {
        let constraints = AllocationConstraints::for_budget(50).with_minimum(2, 1);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..100 {
            let alloc = sample_allocation(&constraints, &mut rng);
            assert!(alloc[2] >= 1);
            assert_eq!(alloc.iter().sum::<u32>(), 50);
        }
    }

    #[test]
    fn test_repair_spreads_an_overfull_bucket() {
        let constraints = AllocationConstraints::for_budget(300);
        let mut alloc = [300, 0, 0, 0, 0];
        repair_allocation(&mut alloc, &constraints);
        assert_eq!(alloc.iter().sum::<u32>(), 300);
        for (i, &points) in alloc.iter().enumerate() {
            assert!(points <= constraints.caps[i]);
        }
    }

    #[test]
    fn test_repair_drops_points_a_budget_over_all_caps_cannot_place() {
        // 600 points cannot fit under five caps of 100.
        let constraints = AllocationConstraints::for_budget(600);
        let mut alloc = [600, 0, 0, 0, 0];
        repair_allocation(&mut alloc, &constraints);
        assert_eq!(alloc, [100, 100, 100, 100, 100]);
    }

    #[test]
    fn test_perturbation_keeps_constraints() {
        let constraints = AllocationConstraints::for_budget(120).with_minimum(0, 1);
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let base = sample_allocation(&constraints, &mut rng);
        for _ in 0..200 {
            let neighbor = perturb_allocation(&base, &constraints, &mut rng);
            assert!(neighbor.iter().sum::<u32>() <= constraints.budget);
            assert!(neighbor[0] >= 1);
            for (i, &points) in neighbor.iter().enumerate() {
                assert!(points <= constraints.caps[i]);
            }
        }
    }

    #[test]
    fn test_perturbation_restores_full_spend() {
        let constraints = AllocationConstraints::for_budget(250);
        let base = [50, 50, 50, 50, 50];
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut moved = false;
        for _ in 0..200 {
            let neighbor = perturb_allocation(&base, &constraints, &mut rng);
            assert_eq!(neighbor.iter().sum::<u32>(), 250);
            moved |= neighbor != base;
            for i in 0..NUM_SKILLS {
                // The raw offset is within the radius; the sum trim or
                // top-up can move one bucket by at most the other four
                // offsets combined.
                let drift = (neighbor[i] as i64 - base[i] as i64).abs();
                assert!(drift <= NUM_SKILLS as i64 * PERTURB_RADIUS);
            }
        }
        assert!(moved, "two hundred perturbations never left the base");
    }
}
