// Scenario Runner - Load and execute phase scenario YAML files
//
// Usage:
//   cargo run --bin scenario_runner scenarios/default.yaml
//   cargo run --bin scenario_runner scenarios/  (runs all .yaml files in directory)
//   cargo run --bin scenario_runner scenarios/default.yaml --seed 0x1234...

mod phases;

use log::info;
use phases::{PhaseRunner, PhaseSimConfig};
use simple_logger::SimpleLogger;
use std::env;
use std::fs;
use std::path::Path;

/// Scenario file format
#[derive(Debug, serde::Deserialize)]
struct ScenarioFile {
    /// Scenario metadata
    #[serde(default)]
    meta: ScenarioMeta,

    /// Phase series configuration (any field may be omitted)
    #[serde(default)]
    config: PhaseSimConfig,
}

#[derive(Debug, Default, serde::Deserialize)]
struct ScenarioMeta {
    name: Option<String>,
    description: Option<String>,
}

fn main() {
    SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .init()
        .unwrap();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <scenario.yaml | directory/> [--seed SEED_HEX]", args[0]);
        eprintln!("\nExamples:");
        eprintln!("  {} scenarios/default.yaml", args[0]);
        eprintln!("  {} scenarios/", args[0]);
        eprintln!("  {} scenarios/default.yaml --seed 0x123456...", args[0]);
        std::process::exit(1);
    }

    let path = Path::new(&args[1]);

    // Parse optional seed
    let seed: Option<[u8; 32]> = if args.len() >= 4 && args[2] == "--seed" {
        Some(parse_seed_hex(&args[3]))
    } else {
        None
    };

    if path.is_file() {
        run_scenario_file(path, seed);
    } else if path.is_dir() {
        run_scenario_directory(path, seed);
    } else {
        eprintln!("Error: Path does not exist: {}", path.display());
        std::process::exit(1);
    }
}

fn run_scenario_directory(dir: &Path, seed: Option<[u8; 32]>) {
    let mut scenarios = Vec::new();

    if let Ok(entries) = fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            let ext = path.extension().and_then(|s| s.to_str());
            if ext == Some("yaml") || ext == Some("yml") {
                scenarios.push(path);
            }
        }
    }

    scenarios.sort();

    if scenarios.is_empty() {
        eprintln!("No .yaml files found in {}", dir.display());
        std::process::exit(1);
    }

    println!("Found {} scenario(s) to run\n", scenarios.len());

    for (i, scenario_path) in scenarios.iter().enumerate() {
        println!("\n{}/{} Running: {}\n", i + 1, scenarios.len(), scenario_path.display());
        run_scenario_file(scenario_path, seed);
    }
}

fn run_scenario_file(path: &Path, seed: Option<[u8; 32]>) {
    info!("Loading scenario from: {}", path.display());

    let yaml_content = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Failed to read {}: {}", path.display(), e);
        std::process::exit(1);
    });

    let scenario: ScenarioFile = serde_yaml::from_str(&yaml_content).unwrap_or_else(|e| {
        eprintln!("Failed to parse {}: {}", path.display(), e);
        std::process::exit(1);
    });

    match scenario.meta.name {
        Some(ref name) => println!("Scenario: {}", name),
        None => println!("Scenario: {}", path.display()),
    }
    if let Some(ref desc) = scenario.meta.description {
        println!("{}\n", desc);
    }

    let mut config = scenario.config;
    config.seed = seed;

    println!("Configuration:");
    println!("  Phases: {:?}", config.phases);
    println!("  Source: {}  Destination: {}", config.source, config.destination);
    println!("  Signal range: {}", config.simulation.signal_range);
    println!("  Initial energy: {}", config.simulation.initial_energy);
    println!(
        "  Max escalations: {}",
        config.simulation.handover.max_escalations
    );

    let output = config.output.clone();
    let result = PhaseRunner::new(config).run().unwrap_or_else(|e| {
        eprintln!("Scenario {} failed: {}", path.display(), e);
        std::process::exit(1);
    });

    result.print_summary();

    if let Some(ref csv_path) = output.csv {
        if let Err(e) = fs::write(csv_path, result.to_csv()) {
            eprintln!("Failed to write {}: {}", csv_path, e);
        } else {
            info!("Wrote phase summary to {}", csv_path);
        }
    }

    if let Some(ref yaml_path) = output.yaml {
        match result.to_yaml() {
            Ok(yaml) => {
                if let Err(e) = fs::write(yaml_path, yaml) {
                    eprintln!("Failed to write {}: {}", yaml_path, e);
                } else {
                    info!("Wrote full results to {}", yaml_path);
                }
            }
            Err(e) => eprintln!("Failed to serialize results: {}", e),
        }
    }
}

fn parse_seed_hex(hex: &str) -> [u8; 32] {
    let hex = hex.strip_prefix("0x").unwrap_or(hex);
    let mut seed = [0u8; 32];

    for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
        if i >= 32 {
            break;
        }
        let byte_str = std::str::from_utf8(chunk).unwrap_or_else(|e| {
            eprintln!("Invalid hex seed: {}", e);
            std::process::exit(1);
        });
        seed[i] = u8::from_str_radix(byte_str, 16).unwrap_or_else(|e| {
            eprintln!("Invalid hex seed: {}", e);
            std::process::exit(1);
        });
    }

    seed
}
