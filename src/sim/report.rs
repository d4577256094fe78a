//! Batch report: distribution stats and text rendering.

use super::aggregate::{RunSample, StageSummary};
use super::run::RunMetrics;
use crate::blocks::{BlockKind, FragmentKind};
use crate::core::constants::{NUM_BLOCK_KINDS, REPORT_HISTOGRAM_BINS};
use serde::Serialize;

/// Aggregated results from a batch of runs, with the per-run samples kept for
/// distribution analysis.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimReport {
    pub starting_floor: u32,
    pub summary: StageSummary,

    // Floors-cleared distribution
    pub min_floors: f64,
    pub median_floors: f64,
    pub max_floors: f64,
    /// Bin counts over floors cleared, spanning min..max.
    pub histogram: Vec<u32>,

    // Block breakdown
    pub avg_kills_by_kind: [f64; NUM_BLOCK_KINDS],
    pub avg_hits_by_kind: [f64; NUM_BLOCK_KINDS],
    pub max_hits_single_block: u64,

    pub samples: Vec<RunSample>,
}

impl SimReport {
    /// Build a report from completed runs.
    pub fn from_runs(starting_floor: u32, runs: &[RunMetrics]) -> Self {
        let summary = StageSummary::from_runs(runs);
        let run_count = runs.len().max(1) as f64;

        let mut floors: Vec<f64> = runs.iter().map(|r| r.floors_cleared).collect();
        floors.sort_by(|a, b| a.total_cmp(b));
        let min_floors = floors.first().copied().unwrap_or(0.0);
        let max_floors = floors.last().copied().unwrap_or(0.0);
        let median_floors = floors.get(floors.len() / 2).copied().unwrap_or(0.0);

        let mut histogram = vec![0u32; REPORT_HISTOGRAM_BINS];
        let span = max_floors - min_floors;
        for &value in &floors {
            let bin = if span > 0.0 {
                (((value - min_floors) / span) * REPORT_HISTOGRAM_BINS as f64) as usize
            } else {
                0
            };
            histogram[bin.min(REPORT_HISTOGRAM_BINS - 1)] += 1;
        }

        let mut avg_kills_by_kind = [0.0; NUM_BLOCK_KINDS];
        let mut avg_hits_by_kind = [0.0; NUM_BLOCK_KINDS];
        for (i, (kills, hits)) in avg_kills_by_kind
            .iter_mut()
            .zip(avg_hits_by_kind.iter_mut())
            .enumerate()
        {
            *kills = runs.iter().map(|r| r.kills_by_kind[i] as f64).sum::<f64>() / run_count;
            *hits = runs.iter().map(|r| r.hits_by_kind[i] as f64).sum::<f64>() / run_count;
        }

        let max_hits_single_block = runs.iter().map(|r| r.max_hits_single_block).max().unwrap_or(0);

        Self {
            starting_floor,
            summary,
            min_floors,
            median_floors,
            max_floors,
            histogram,
            avg_kills_by_kind,
            avg_hits_by_kind,
            max_hits_single_block,
            samples: runs.iter().map(RunSample::from).collect(),
        }
    }

    /// Generate a text report.
    pub fn to_text(&self) -> String {
        let mut report = String::new();

        report.push_str("═══════════════════════════════════════════════════════════════\n");
        report.push_str("                    DELVE SIMULATION REPORT\n");
        report.push_str("═══════════════════════════════════════════════════════════════\n\n");

        report.push_str(&format!(
            "Runs: {} starting at floor {}\n\n",
            self.summary.run_count, self.starting_floor
        ));

        report.push_str("── FLOORS ───────────────────────────────────────────────────────\n");
        report.push_str(&format!(
            "  Avg Floors Cleared:  {:.2}\n",
            self.summary.avg_floors_cleared
        ));
        report.push_str(&format!(
            "  Min/Median/Max:      {:.2} / {:.2} / {:.2}\n",
            self.min_floors, self.median_floors, self.max_floors
        ));
        report.push_str(&format!(
            "  Avg Run Duration:    {:.0}s\n\n",
            self.summary.avg_duration_secs
        ));

        report.push_str("── RATES ────────────────────────────────────────────────────────\n");
        report.push_str(&format!("  XP/hour:             {:.1}\n", self.summary.xp_per_hour));
        for kind in FragmentKind::all() {
            report.push_str(&format!(
                "  {:9} frags/hour: {:.2}\n",
                kind.name(),
                self.summary.fragments_per_hour[kind.index()]
            ));
        }
        report.push('\n');

        report.push_str("── FLOOR DISTRIBUTION ───────────────────────────────────────────\n");
        let top = self.histogram.iter().copied().max().unwrap_or(0).max(1);
        let span = self.max_floors - self.min_floors;
        for (bin, &count) in self.histogram.iter().enumerate() {
            let lo = self.min_floors + span * bin as f64 / REPORT_HISTOGRAM_BINS as f64;
            let bar_len = (count as f64 / top as f64 * 40.0) as usize;
            let bar: String = "█".repeat(bar_len);
            report.push_str(&format!("  {:7.2}+ {:>5} {}\n", lo, count, bar));
        }
        report.push('\n');

        report.push_str("── BLOCK BREAKDOWN ──────────────────────────────────────────────\n");
        report.push_str("  Kind       Kills     Hits\n");
        report.push_str("  ────       ─────     ────\n");
        for kind in BlockKind::all() {
            let kills = self.avg_kills_by_kind[kind.index()];
            let hits = self.avg_hits_by_kind[kind.index()];
            if kills > 0.0 {
                report.push_str(&format!(
                    "  {:8} {:7.1} {:8.0}\n",
                    kind.name(),
                    kills,
                    hits
                ));
            }
        }
        if let Some(kind) = self.slowest_kind() {
            report.push_str(&format!("  Slowest Kind:        {}\n", kind.name()));
        }
        report.push_str(&format!(
            "  Max Hits One Block:  {}\n",
            self.max_hits_single_block
        ));
        if self.summary.total_cutoff_triggers > 0 {
            report.push_str(&format!(
                "  ⚠️  {} block(s) hit the safety cutoff\n",
                self.summary.total_cutoff_triggers
            ));
        }

        report.push_str("\n═══════════════════════════════════════════════════════════════\n");

        report
    }

    /// Generate a JSON report for further analysis.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// The kind that consumed the most hits on average across the batch.
    pub fn slowest_kind(&self) -> Option<BlockKind> {
        let mut best: Option<(usize, f64)> = None;
        for (idx, &hits) in self.avg_hits_by_kind.iter().enumerate() {
            if hits > 0.0 && best.map_or(true, |(_, top)| hits > top) {
                best = Some((idx, hits));
            }
        }
        best.map(|(idx, _)| BlockKind::all()[idx])
    }
}
