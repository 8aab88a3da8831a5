//! Multi-phase Simulation Example
//!
//! Run with: cargo run --example phase_sim

mod phases;

use log::info;
use phases::PhaseSimConfig;
use simple_logger::SimpleLogger;
use uw_rust::{HandoverConfig, SimulationConfig};

fn main() {
    SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .init()
        .unwrap();

    println!("╔════════════════════════════════════════════════════════╗");
    println!("║        Underwater Handover Simulator                   ║");
    println!("╚════════════════════════════════════════════════════════╝\n");

    info!("Setting up phase simulation...");

    let config = PhaseSimConfig {
        phases: vec![150, 250, 500, 750, 1000],
        source: 1,
        destination: 150,
        seed: None, // Will be auto-generated
        log_hops: false,

        simulation: SimulationConfig {
            area_size: 100.0,
            signal_range: 20.0,
            initial_energy: 100.0,
            handover: HandoverConfig {
                max_escalations: 32,
                max_signal_range: None,
            },
            ..Default::default()
        },

        ..Default::default()
    };

    info!("Configuration:");
    info!("  Phases: {:?}", config.phases);
    info!("  Source: {} Destination: {}", config.source, config.destination);
    info!("  Signal range: {}", config.simulation.signal_range);

    let runner = phases::PhaseRunner::new(config);
    info!("Seed: {:?}", runner.seed());

    match runner.run() {
        Ok(result) => {
            result.print_summary();
            print!("{}", result.to_csv());
            info!("✓ Simulation complete!");
        }
        Err(e) => {
            eprintln!("Simulation failed: {}", e);
            std::process::exit(1);
        }
    }
}
