//! Delve Build Optimizer
//!
//! Searches the skill allocation space for the build that maximizes a
//! chosen objective, using a worker pool to evaluate candidates in
//! parallel. The search is seeded: the same seed and build always produce
//! the same recommendation regardless of worker count.
//!
//! Usage:
//!   cargo run --bin optimize -- [OPTIONS]
//!
//! Options:
//!   --objective OBJ  floors | xp | stone | amber | quartz | obsidian (default: floors)
//!   --build FILE     Load the character build from JSON (default: fresh build)
//!   --budget N       Override the build's skill point budget
//!   --floor N        Starting floor (default: the build's best floor)
//!   --seed N         Base RNG seed (default: 42)
//!   --workers N      Worker threads (default: CPU count, capped)
//!   --require SKILL  Pin at least 1 point in a skill (repeatable)
//!   --quick          Shrunk phase sizes for a fast smoke search
//!   --json           Save the outcome to a timestamped JSON file

use delvesim::blocks::FragmentKind;
use delvesim::character::{CharacterBuild, SkillKind};
use delvesim::core::constants::DEFAULT_MAX_WORKERS;
use delvesim::optimizer::{optimize, Objective, OptimizerConfig};
use delvesim::pool::SimPool;
use serde_json::json;
use std::sync::atomic::AtomicBool;

// ── CLI Configuration ────────────────────────────────────────────────

struct SearchConfig {
    objective: Objective,
    build_path: Option<String>,
    budget: Option<u32>,
    floor: Option<u32>,
    seed: u64,
    workers: usize,
    required: Vec<SkillKind>,
    quick: bool,
    json: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            objective: Objective::MaxFloors,
            build_path: None,
            budget: None,
            floor: None,
            seed: 42,
            workers: default_workers(),
            required: Vec::new(),
            quick: false,
            json: false,
        }
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(DEFAULT_MAX_WORKERS)
}

fn parse_args() -> SearchConfig {
    let args: Vec<String> = std::env::args().collect();
    let mut config = SearchConfig::default();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--objective" => {
                i += 1;
                config.objective = parse_objective(&args[i]);
            }
            "--build" => {
                i += 1;
                config.build_path = Some(args[i].clone());
            }
            "--budget" => {
                i += 1;
                config.budget = Some(args[i].parse().expect("--budget requires a number"));
            }
            "--floor" => {
                i += 1;
                config.floor = Some(args[i].parse().expect("--floor requires a number"));
            }
            "--seed" => {
                i += 1;
                config.seed = args[i].parse().expect("--seed requires a number");
            }
            "--workers" => {
                i += 1;
                config.workers = args[i].parse().expect("--workers requires a number");
            }
            "--require" => {
                i += 1;
                config.required.push(parse_skill(&args[i]));
            }
            "--quick" => config.quick = true,
            "--json" => config.json = true,
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {other}");
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }
    config
}

fn parse_objective(name: &str) -> Objective {
    match name {
        "floors" => Objective::MaxFloors,
        "xp" => Objective::MaxXpPerHour,
        "stone" => Objective::MaxFragmentRate(FragmentKind::Stone),
        "amber" => Objective::MaxFragmentRate(FragmentKind::Amber),
        "quartz" => Objective::MaxFragmentRate(FragmentKind::Quartz),
        "obsidian" => Objective::MaxFragmentRate(FragmentKind::Obsidian),
        other => {
            eprintln!("Unknown objective: {other}");
            print_usage();
            std::process::exit(1);
        }
    }
}

fn parse_skill(name: &str) -> SkillKind {
    match name {
        "power" => SkillKind::Power,
        "precision" => SkillKind::Precision,
        "endurance" => SkillKind::Endurance,
        "fortune" => SkillKind::Fortune,
        "celerity" => SkillKind::Celerity,
        other => {
            eprintln!("Unknown skill: {other}");
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!(
        "Delve Build Optimizer\n\
         \n\
         Usage: optimize [OPTIONS]\n\
         \n\
         Options:\n\
         \x20 --objective OBJ  floors | xp | stone | amber | quartz | obsidian (default: floors)\n\
         \x20 --build FILE     Load the character build from JSON (default: fresh build)\n\
         \x20 --budget N       Override the build's skill point budget\n\
         \x20 --floor N        Starting floor (default: the build's best floor)\n\
         \x20 --seed N         Base RNG seed (default: 42)\n\
         \x20 --workers N      Worker threads (default: CPU count, capped)\n\
         \x20 --require SKILL  power | precision | endurance | fortune | celerity\n\
         \x20 --quick          Shrunk phase sizes for a fast smoke search\n\
         \x20 --json           Save the outcome to a timestamped JSON file\n\
         \x20 --help, -h       Show this help"
    );
}

// ── Main ─────────────────────────────────────────────────────────────

fn main() {
    env_logger::init();
    let config = parse_args();

    let mut build = match &config.build_path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .unwrap_or_else(|e| panic!("Failed to read {path}: {e}"));
            serde_json::from_str(&raw).unwrap_or_else(|e| panic!("Failed to parse {path}: {e}"))
        }
        None => CharacterBuild::default(),
    };
    if let Some(budget) = config.budget {
        build.stat_budget = budget;
    }
    if let Some(floor) = config.floor {
        build.best_floor = floor;
    }

    let mut search = if config.quick {
        OptimizerConfig::quick(config.objective, build, config.seed)
    } else {
        OptimizerConfig::new(config.objective, build, config.seed)
    };
    for skill in &config.required {
        search = search.require_skill(*skill, 1);
    }

    eprintln!(
        "Delve Optimizer: {} from floor {}, budget {}, seed={}, {} worker(s)",
        config.objective.label(),
        search.starting_floor,
        search.constraints.budget,
        config.seed,
        config.workers,
    );

    let pool = match SimPool::new(config.workers) {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("Failed to start worker pool: {e}");
            std::process::exit(1);
        }
    };
    let cancel = AtomicBool::new(false);
    let outcome = match optimize(&pool, &search, &cancel) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("Optimization failed: {e}");
            std::process::exit(1);
        }
    };

    println!("============================================================");
    println!("  Best allocation for {}", config.objective.label());
    println!("============================================================");
    println!();
    for skill in SkillKind::all() {
        println!(
            "  {:<10} {:>4}",
            skill.name(),
            outcome.skills[skill.index()]
        );
    }
    println!();
    println!(
        "Avg floors cleared: {:.2}  |  XP/hour: {:.0}",
        outcome.summary.avg_floors_cleared, outcome.summary.xp_per_hour
    );
    for kind in FragmentKind::all() {
        let rate = outcome.summary.fragment_rate(kind);
        if rate > 0.0 {
            println!("  {} fragments/hour: {rate:.1}", kind.name());
        }
    }
    println!(
        "Score: {:.3} (over {} runs, {} candidates evaluated)",
        outcome.metrics.primary, outcome.summary.run_count, outcome.candidates_evaluated
    );

    if config.json {
        let doc = json!({
            "objective": config.objective,
            "skills": outcome.skills,
            "summary": outcome.summary,
            "metrics": outcome.metrics,
            "samples": outcome.samples,
            "candidatesEvaluated": outcome.candidates_evaluated,
        });
        let raw = serde_json::to_string_pretty(&doc).unwrap_or_else(|_| "{}".to_string());
        let filename = format!(
            "optimize_report_{}.json",
            chrono::Utc::now().format("%Y%m%d_%H%M%S")
        );
        std::fs::write(&filename, raw).expect("Failed to write JSON report");
        eprintln!("JSON report saved to: {filename}");
    }
}
