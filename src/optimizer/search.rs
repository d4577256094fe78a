//! Three-phase allocation search.
//!
//! Phase 1 screens a broad random field of allocations cheaply. Phase 2
//! re-samples the neighborhood of the best screening results at a higher
//! run count. Phase 3 audits the single overall winner with a large run
//! count and keeps the raw per-run samples for downstream distribution
//! views. Every evaluation goes through the worker pool as a
//! self-contained request with its own derived seed, so a search result is
//! reproducible from the base seed alone regardless of worker count.

use crate::character::{resolve_stats, CharacterBuild, SkillKind};
use crate::core::constants::{
    ANCHOR_FRACTION, DEFAULT_MAX_IN_FLIGHT, FINAL_RUNS, NEIGHBORS_PER_ANCHOR, NUM_SKILLS,
    REFINE_RUNS, SCREEN_CANDIDATES, SCREEN_RUNS,
};
use crate::core::rng::derive_seed;
use crate::error::SimError;
use crate::optimizer::allocation::{
    perturb_allocation, sample_allocation, AllocationConstraints,
};
use crate::optimizer::ranking::{select_best, MetricTuple, Objective};
use crate::pool::{SimPool, WorkRequest};
use crate::sim::{RunSample, SimOptions, StageSummary};
use log::info;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::atomic::{AtomicBool, Ordering};

/// Everything a search needs besides a pool and a cancel flag.
#[derive(Debug, Clone)]
pub struct OptimizerConfig {
    pub objective: Objective,
    /// Skills on this build are ignored; everything else (gems, upgrades,
    /// cards, ability toggles, floor) carries into every candidate.
    pub base_build: CharacterBuild,
    pub starting_floor: u32,
    pub options: SimOptions,
    pub constraints: AllocationConstraints,
    pub base_seed: u64,
    pub screen_candidates: usize,
    pub screen_runs: u32,
    pub neighbors_per_anchor: usize,
    pub refine_runs: u32,
    pub final_runs: u32,
    /// Upper bound on requests outstanding at once.
    pub max_in_flight: usize,
}

impl OptimizerConfig {
    pub fn new(objective: Objective, base_build: CharacterBuild, base_seed: u64) -> Self {
        Self {
            objective,
            starting_floor: base_build.best_floor.max(1),
            options: SimOptions::from_toggles(&base_build.abilities),
            constraints: AllocationConstraints::for_budget(base_build.stat_budget),
            base_build,
            base_seed,
            screen_candidates: SCREEN_CANDIDATES,
            screen_runs: SCREEN_RUNS,
            neighbors_per_anchor: NEIGHBORS_PER_ANCHOR,
            refine_runs: REFINE_RUNS,
            final_runs: FINAL_RUNS,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }

    /// Shrunk phase sizes for smoke runs and tests.
    pub fn quick(objective: Objective, base_build: CharacterBuild, base_seed: u64) -> Self {
        Self {
            screen_candidates: 30,
            screen_runs: 4,
            neighbors_per_anchor: 3,
            refine_runs: 8,
            final_runs: 50,
            ..Self::new(objective, base_build, base_seed)
        }
    }

    /// Pin a skill to at least `points` in every candidate.
    pub fn require_skill(mut self, skill: SkillKind, points: u32) -> Self {
        self.constraints = self.constraints.with_minimum(skill.index(), points);
        self
    }
}

/// The search winner and the evidence behind it.
#[derive(Debug, Clone)]
pub struct OptimizationOutcome {
    /// Winning allocation, indexed by `SkillKind::index()`.
    pub skills: [u32; NUM_SKILLS],
    /// Final-audit aggregate over `final_runs` runs.
    pub summary: StageSummary,
    /// The winner's score under the configured objective.
    pub metrics: MetricTuple,
    /// Raw per-run samples from the final audit.
    pub samples: Vec<RunSample>,
    /// Evaluations performed across all three phases.
    pub candidates_evaluated: usize,
}

/// Run the full three-phase search on `pool`.
///
/// `cancel` is checked between evaluations; flipping it makes the search
/// unwind with [`SimError::Cancelled`] without producing a result.
pub fn optimize(
    pool: &SimPool,
    config: &OptimizerConfig,
    cancel: &AtomicBool,
) -> Result<OptimizationOutcome, SimError> {
    if config.constraints.budget == 0 {
        return Err(SimError::EmptyBudget);
    }
    if config.screen_candidates == 0 {
        return Err(SimError::NoCandidates);
    }

    let mut alloc_rng = ChaCha8Rng::seed_from_u64(config.base_seed);
    let mut request_idx: u64 = 0;

    // Phase 1: broad random screen.
    info!(
        "phase 1: screening {} allocations at {} runs each",
        config.screen_candidates, config.screen_runs
    );
    let mut allocations: Vec<[u32; NUM_SKILLS]> = (0..config.screen_candidates)
        .map(|_| sample_allocation(&config.constraints, &mut alloc_rng))
        .collect();
    let mut summaries = evaluate_all(
        pool,
        config,
        &allocations,
        config.screen_runs,
        &mut request_idx,
        cancel,
    )?;

    // Anchors: the top slice of the screen by raw primary metric. This cut
    // uses a strict total order; the tolerance tie-break only decides the
    // overall winner.
    let screen_tuples: Vec<MetricTuple> = summaries
        .iter()
        .map(|summary| config.objective.metrics(summary))
        .collect();
    let mut order: Vec<usize> = (0..screen_tuples.len()).collect();
    order.sort_by(|&a, &b| screen_tuples[b].primary.total_cmp(&screen_tuples[a].primary));
    let anchor_count = ((config.screen_candidates as f64 * ANCHOR_FRACTION).ceil() as usize)
        .clamp(1, config.screen_candidates);

    // Phase 2: perturb each anchor and re-evaluate at the refinement run
    // count.
    info!(
        "phase 2: refining {} anchors with {} neighbors at {} runs each",
        anchor_count, config.neighbors_per_anchor, config.refine_runs
    );
    let neighbors: Vec<[u32; NUM_SKILLS]> = order[..anchor_count]
        .iter()
        .flat_map(|&anchor| {
            let base = allocations[anchor];
            (0..config.neighbors_per_anchor)
                .map(|_| perturb_allocation(&base, &config.constraints, &mut alloc_rng))
                .collect::<Vec<_>>()
        })
        .collect();
    let neighbor_summaries = evaluate_all(
        pool,
        config,
        &neighbors,
        config.refine_runs,
        &mut request_idx,
        cancel,
    )?;
    allocations.extend(neighbors);
    summaries.extend(neighbor_summaries);

    // Overall winner across both phases under the tolerance tie-break.
    let tuples: Vec<MetricTuple> = summaries
        .iter()
        .map(|summary| config.objective.metrics(summary))
        .collect();
    let winner = select_best(&tuples).ok_or(SimError::NoCandidates)?;
    let winning_skills = allocations[winner];

    // Phase 3: audit the winner once at full depth, keeping the raw
    // samples. The summary is reduced from those same samples, so the two
    // cannot disagree.
    if cancel.load(Ordering::SeqCst) {
        return Err(SimError::Cancelled);
    }
    info!("phase 3: auditing the winner with {} runs", config.final_runs);
    let build = config.base_build.with_skills(winning_skills);
    let seed = derive_seed(config.base_seed, request_idx);
    request_idx += 1;
    let mut request = WorkRequest::stage_lite(
        resolve_stats(&build),
        config.starting_floor,
        config.final_runs,
        seed,
    );
    request.options = config.options;
    request.card_config = config.base_build.cards.clone();
    let samples = pool
        .execute(request)?
        .into_lite_samples()
        .ok_or_else(|| SimError::Worker("expected stageLite samples".to_string()))?;
    let summary = StageSummary::from_samples(&samples);
    let metrics = config.objective.metrics(&summary);

    Ok(OptimizationOutcome {
        skills: winning_skills,
        summary,
        metrics,
        samples,
        candidates_evaluated: request_idx as usize,
    })
}

/// Evaluate a batch of allocations as `stageSummary` requests, at most
/// `max_in_flight` outstanding at once. Responses are collected in
/// submission order, so the returned summaries align with `allocations`.
fn evaluate_all(
    pool: &SimPool,
    config: &OptimizerConfig,
    allocations: &[[u32; NUM_SKILLS]],
    runs: u32,
    request_idx: &mut u64,
    cancel: &AtomicBool,
) -> Result<Vec<StageSummary>, SimError> {
    let window = config.max_in_flight.max(1);
    let mut summaries = Vec::with_capacity(allocations.len());
    for chunk in allocations.chunks(window) {
        let mut pending = Vec::with_capacity(chunk.len());
        for alloc in chunk {
            if cancel.load(Ordering::SeqCst) {
                return Err(SimError::Cancelled);
            }
            let build = config.base_build.with_skills(*alloc);
            let seed = derive_seed(config.base_seed, *request_idx);
            *request_idx += 1;
            let mut request = WorkRequest::stage_summary(
                resolve_stats(&build),
                config.starting_floor,
                runs,
                seed,
            );
            request.options = config.options;
            request.card_config = config.base_build.cards.clone();
            pending.push(pool.submit(request)?);
        }
        for receiver in pending {
            let result = receiver
                .recv()
                .map_err(|_| SimError::Worker("response channel closed".to_string()))??;
            let summary = result
                .into_stage_summary()
                .ok_or_else(|| SimError::Worker("expected stageSummary".to_string()))?;
            summaries.push(summary);
        }
    }
    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::FragmentKind;

    fn test_build(budget: u32) -> CharacterBuild {
        let mut build = CharacterBuild::default();
        build.stat_budget = budget;
        build.best_floor = 1;
        build
    }

    #[test]
    fn test_zero_budget_is_rejected_before_any_work() {
        let pool = SimPool::new(1).unwrap();
        let config = OptimizerConfig::quick(Objective::MaxFloors, test_build(0), 7);
        let cancel = AtomicBool::new(false);
        let err = optimize(&pool, &config, &cancel).unwrap_err();
        assert_eq!(err, SimError::EmptyBudget);
    }

    #[test]
    fn test_zero_candidates_are_rejected() {
        let pool = SimPool::new(1).unwrap();
        let mut config = OptimizerConfig::quick(Objective::MaxFloors, test_build(20), 7);
        config.screen_candidates = 0;
        let cancel = AtomicBool::new(false);
        let err = optimize(&pool, &config, &cancel).unwrap_err();
        assert_eq!(err, SimError::NoCandidates);
    }

    #[test]
    fn test_preset_cancellation_unwinds() {
        let pool = SimPool::new(1).unwrap();
        let config = OptimizerConfig::quick(Objective::MaxFloors, test_build(20), 7);
        let cancel = AtomicBool::new(true);
        let err = optimize(&pool, &config, &cancel).unwrap_err();
        assert_eq!(err, SimError::Cancelled);
    }

    #[test]
    fn test_outcome_respects_allocation_constraints() {
        let pool = SimPool::new(2).unwrap();
        let config = OptimizerConfig::quick(Objective::MaxXpPerHour, test_build(40), 11);
        let cancel = AtomicBool::new(false);
        let outcome = optimize(&pool, &config, &cancel).unwrap();
        assert_eq!(outcome.skills.iter().sum::<u32>(), 40);
        for (i, &points) in outcome.skills.iter().enumerate() {
            assert!(points <= config.constraints.caps[i]);
        }
        assert_eq!(outcome.summary.run_count, config.final_runs);
        assert_eq!(outcome.samples.len(), config.final_runs as usize);
        // Screen + neighbors + the final audit.
        assert!(outcome.candidates_evaluated > config.screen_candidates);
    }

    #[test]
    fn test_search_is_reproducible_for_a_fixed_seed() {
        let config = OptimizerConfig::quick(Objective::MaxFloors, test_build(30), 99);
        let cancel = AtomicBool::new(false);
        let pool_a = SimPool::new(3).unwrap();
        let first = optimize(&pool_a, &config, &cancel).unwrap();
        // A different worker count must not change the result.
        let pool_b = SimPool::new(1).unwrap();
        let second = optimize(&pool_b, &config, &cancel).unwrap();
        assert_eq!(first.skills, second.skills);
        assert_eq!(first.summary, second.summary);
        assert_eq!(first.candidates_evaluated, second.candidates_evaluated);
    }

    #[test]
    fn test_required_skill_survives_the_whole_search() {
        let pool = SimPool::new(2).unwrap();
        let config = OptimizerConfig::quick(
            Objective::MaxFragmentRate(FragmentKind::Stone),
            test_build(25),
            5,
        )
        .require_skill(SkillKind::Celerity, 1);
        let cancel = AtomicBool::new(false);
        let outcome = optimize(&pool, &config, &cancel).unwrap();
        assert!(outcome.skills[SkillKind::Celerity.index()] >= 1);
        assert_eq!(outcome.skills.iter().sum::<u32>(), 25);
    }
}
