//! Headless Delve Batch Simulator
//!
//! Runs a batch of seeded delve simulations for one character build and
//! prints a rate report. The same engine backs the worker pool and the
//! allocation optimizer; this binary is the direct tap into it.
//!
//! Usage:
//!   cargo run --bin simulate -- [OPTIONS]
//!
//! Options:
//!   --build FILE    Load the character build from JSON (default: fresh build)
//!   --skills CSV    Skill points as power,precision,endurance,fortune,celerity
//!   --floor N       Starting floor (default: the build's best floor)
//!   --runs N        Runs in the batch (default: 200)
//!   --seed N        Base RNG seed (default: 42)
//!   --no-abilities  Disable Enrage, Quake and Flurry
//!   --json          Save the full report to a timestamped JSON file
//!   --quiet         Only the final summary line

use delvesim::character::{resolve_stats, CharacterBuild, SkillKind};
use delvesim::core::constants::NUM_SKILLS;
use delvesim::sim::{run_batch, SimOptions, SimReport};

// ── CLI Configuration ────────────────────────────────────────────────

struct BatchConfig {
    build_path: Option<String>,
    skills: Option<[u32; NUM_SKILLS]>,
    floor: Option<u32>,
    runs: u32,
    seed: u64,
    no_abilities: bool,
    json: bool,
    quiet: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            build_path: None,
            skills: None,
            floor: None,
            runs: 200,
            seed: 42,
            no_abilities: false,
            json: false,
            quiet: false,
        }
    }
}

fn parse_args() -> BatchConfig {
    let args: Vec<String> = std::env::args().collect();
    let mut config = BatchConfig::default();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--build" => {
                i += 1;
                config.build_path = Some(args[i].clone());
            }
            "--skills" => {
                i += 1;
                config.skills = Some(parse_skills(&args[i]));
            }
            "--floor" => {
                i += 1;
                config.floor = Some(args[i].parse().expect("--floor requires a number"));
            }
            "--runs" => {
                i += 1;
                config.runs = args[i].parse().expect("--runs requires a number");
            }
            "--seed" => {
                i += 1;
                config.seed = args[i].parse().expect("--seed requires a number");
            }
            "--no-abilities" => config.no_abilities = true,
            "--json" => config.json = true,
            "--quiet" => config.quiet = true,
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

fn parse_skills(csv: &str) -> [u32; NUM_SKILLS] {
    let parts: Vec<u32> = csv
        .split(',')
        .map(|p| p.trim().parse().expect("--skills requires numbers"))
        .collect();
    if parts.len() != NUM_SKILLS {
        eprintln!("--skills requires exactly {NUM_SKILLS} comma-separated values");
        std::process::exit(1);
    }
    let mut skills = [0u32; NUM_SKILLS];
    skills.copy_from_slice(&parts);
    skills
}

fn print_usage() {
    eprintln!(
        "Delve Batch Simulator\n\
         \n\
         Usage: simulate [OPTIONS]\n\
         \n\
         Options:\n\
         \x20 --build FILE    Load the character build from JSON (default: fresh build)\n\
         \x20 --skills CSV    Skill points as power,precision,endurance,fortune,celerity\n\
         \x20 --floor N       Starting floor (default: the build's best floor)\n\
         \x20 --runs N        Runs in the batch (default: 200)\n\
         \x20 --seed N        Base RNG seed (default: 42)\n\
         \x20 --no-abilities  Disable Enrage, Quake and Flurry\n\
         \x20 --json          Save the full report to a timestamped JSON file\n\
         \x20 --quiet         Only the final summary line\n\
         \x20 --help, -h      Show this help"
    );
}

// ── Build Loading ────────────────────────────────────────────────────

fn load_build(config: &BatchConfig) -> CharacterBuild {
    let mut build = match &config.build_path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .unwrap_or_else(|e| panic!("Failed to read {path}: {e}"));
            serde_json::from_str(&raw).unwrap_or_else(|e| panic!("Failed to parse {path}: {e}"))
        }
        None => CharacterBuild::default(),
    };
    if let Some(skills) = config.skills {
        build = build.with_skills(skills);
    }
    build
}

// ── Main ─────────────────────────────────────────────────────────────

fn main() {
    env_logger::init();
    let config = parse_args();
    let build = load_build(&config);
    let stats = resolve_stats(&build);

    let floor = config.floor.unwrap_or(build.best_floor).max(1);
    let options = if config.no_abilities {
        SimOptions::abilities_off()
    } else {
        SimOptions::from_toggles(&build.abilities)
    };

    if !config.quiet {
        let skill_str: Vec<String> = SkillKind::all()
            .iter()
            .map(|s| format!("{}:{}", s.abbrev(), build.skill(*s)))
            .collect();
        eprintln!(
            "Delve Simulator: floor {floor} x {} run(s), seed={}, {}",
            config.runs,
            config.seed,
            skill_str.join("  "),
        );
    }

    let runs = run_batch(&stats, &options, &build.cards, floor, config.runs, config.seed);
    let report = SimReport::from_runs(floor, &runs);

    if config.quiet {
        println!(
            "seed={} runs={} avg_floors={:.2} xp_per_hour={:.0} duration={:.0}s",
            config.seed,
            report.summary.run_count,
            report.summary.avg_floors_cleared,
            report.summary.xp_per_hour,
            report.summary.avg_duration_secs,
        );
    } else {
        println!("{}", report.to_text());
    }

    if config.json {
        let filename = format!(
            "delve_report_{}.json",
            chrono::Utc::now().format("%Y%m%d_%H%M%S")
        );
        std::fs::write(&filename, report.to_json()).expect("Failed to write JSON report");
        if !config.quiet {
            eprintln!("JSON report saved to: {filename}");
        }
    }
}
