use log::{info, warn};
use rand::Rng;
use simple_logger::SimpleLogger;

use uw_rust::{run_phase, LogSink, SimulationConfig, TransferStatus};

fn main() {
    SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .init()
        .unwrap();

    info!("starting");

    let source = 1;
    let destination = 150;
    let config = SimulationConfig::default();

    let mut seed = [0u8; 32];
    rand::thread_rng().fill(&mut seed);

    let result = match run_phase(150, source, destination, &config, seed, &mut LogSink::new(true)) {
        Ok(result) => result,
        Err(e) => {
            warn!("simulation failed: {}", e);
            std::process::exit(1);
        }
    };

    for hop in result.transfer.path.forwarded() {
        info!("{} -> {}: {:.2} units", hop.from, hop.to, hop.distance);
    }

    match result.transfer.status {
        TransferStatus::Delivered => info!(
            "delivered in {} hops, simulated {:.4}s, wall {:?}",
            result.transfer.path.hop_count(),
            result.transfer.simulated_time,
            result.elapsed
        ),
        TransferStatus::Stalled { at, reason } => {
            warn!("stalled at node {} ({:?})", at, reason)
        }
    }

    info!(
        "active nodes: {} remaining energy: {:.2}",
        result.active_node_count(),
        result.remaining_energy
    );
    info!("let seed = {:?};", seed);
}
