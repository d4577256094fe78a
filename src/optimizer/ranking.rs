//! Objectives and the tolerance tie-break that ranks candidates.

use crate::blocks::FragmentKind;
use crate::core::constants::{TIE_EPSILON_FLOOR, TIE_EPSILON_FRACTION};
use crate::sim::StageSummary;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// What the search maximizes. The other two quantities stay in play as
/// tie-breakers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Objective {
    /// Deepest average clear.
    MaxFloors,
    /// Fastest experience income.
    MaxXpPerHour,
    /// Fastest income of one fragment kind.
    MaxFragmentRate(FragmentKind),
}

impl Objective {
    /// Project a run summary onto this objective's comparison order:
    /// primary first, then the two tie-breakers.
    pub fn metrics(&self, summary: &StageSummary) -> MetricTuple {
        let floors = summary.avg_floors_cleared;
        let xp = summary.xp_per_hour;
        let fragments = match self {
            Objective::MaxFragmentRate(kind) => summary.fragment_rate(*kind),
            _ => summary.fragments_per_hour.iter().sum(),
        };
        match self {
            Objective::MaxFloors => MetricTuple::new(floors, xp, fragments),
            Objective::MaxXpPerHour => MetricTuple::new(xp, floors, fragments),
            Objective::MaxFragmentRate(_) => MetricTuple::new(fragments, floors, xp),
        }
    }

    pub fn label(&self) -> String {
        match self {
            Objective::MaxFloors => "deepest floor".to_string(),
            Objective::MaxXpPerHour => "XP per hour".to_string(),
            Objective::MaxFragmentRate(kind) => format!("{} fragments per hour", kind.name()),
        }
    }
}

/// One candidate's score under an objective.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricTuple {
    pub primary: f64,
    pub secondary: f64,
    pub tertiary: f64,
}

impl MetricTuple {
    pub fn new(primary: f64, secondary: f64, tertiary: f64) -> Self {
        Self {
            primary,
            secondary,
            tertiary,
        }
    }
}

/// Tolerance for each comparison level, derived from the best value that
/// level reaches anywhere in the candidate set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TieBands {
    pub primary: f64,
    pub secondary: f64,
    pub tertiary: f64,
}

impl TieBands {
    pub fn from_tuples(tuples: &[MetricTuple]) -> Self {
        let best = |pick: fn(&MetricTuple) -> f64| {
            tuples
                .iter()
                .map(pick)
                .fold(f64::NEG_INFINITY, f64::max)
                .max(0.0)
        };
        Self {
            primary: tie_epsilon(best(|t| t.primary)),
            secondary: tie_epsilon(best(|t| t.secondary)),
            tertiary: tie_epsilon(best(|t| t.tertiary)),
        }
    }
}

/// Absolute floor or a percentage of the best observed value, whichever is
/// larger.
pub fn tie_epsilon(best: f64) -> f64 {
    TIE_EPSILON_FLOOR.max(TIE_EPSILON_FRACTION * best)
}

/// Compare two scores level by level. A difference below the level's band
/// is a tie that falls through to the next level; a tuple tied on all three
/// compares equal.
pub fn compare_metrics(a: &MetricTuple, b: &MetricTuple, bands: &TieBands) -> Ordering {
    let levels = [
        (a.primary, b.primary, bands.primary),
        (a.secondary, b.secondary, bands.secondary),
        (a.tertiary, b.tertiary, bands.tertiary),
    ];
    for (va, vb, epsilon) in levels {
        if (va - vb).abs() >= epsilon {
            return va.total_cmp(&vb);
        }
    }
    Ordering::Equal
}

/// Index of the winning tuple. The tolerance comparison is not transitive,
/// so this is a single linear pass rather than a sort: each tuple is held
/// against the current leader and replaces it only on a strict win, which
/// keeps the result deterministic.
pub fn select_best(tuples: &[MetricTuple]) -> Option<usize> {
    if tuples.is_empty() {
        return None;
    }
    let bands = TieBands::from_tuples(tuples);
    let mut best = 0;
    for (i, tuple) in tuples.iter().enumerate().skip(1) {
        if compare_metrics(tuple, &tuples[best], &bands) == Ordering::Greater {
            best = i;
        }
    }
    Some(best)
}
